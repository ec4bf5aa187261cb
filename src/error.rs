use thiserror::Error;

/// Errors that invalidate the whole batch before any entry is processed.
///
/// A configuration error produces an immediate failed result with zero
/// counters; it is never folded into the per-entry error count.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required option: {arg}")]
    MissingRequiredArg { arg: String },

    #[error("Invalid value for {arg}: {value} ({reason})")]
    InvalidArgValue {
        arg: String,
        value: String,
        reason: String,
    },

    #[error("Invalid wildcard pattern {pattern:?}: {source}")]
    InvalidWildcard {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Target directory not found and creation is not allowed: {path}")]
    TargetDirectoryMissing { path: String },

    #[error("Target directory is not a folder: {path}")]
    TargetNotAFolder { path: String },

    #[error("Post-action is move but no move-to directory is configured")]
    MoveToDirectoryUnset,

    #[error("Move-to directory not found and creation is not allowed: {path}")]
    MoveToDirectoryMissing { path: String },

    #[error("Move-to directory is not a folder: {path}")]
    MoveToNotAFolder { path: String },

    #[error("Could not prepare directory {path}: {source}")]
    DirectoryCreation {
        path: String,
        #[source]
        source: Box<VfsError>,
    },
}

/// Errors at the virtual file system boundary.
///
/// These are scoped to one entry or one unit: the batch runner logs them
/// and folds them into the error counter instead of propagating them.
#[derive(Error, Debug)]
pub enum VfsError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive error on {path}: {source}")]
    Archive {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Path not found: {path}")]
    NotFound { path: String },

    #[error("Expected a folder: {path}")]
    NotAFolder { path: String },

    #[error("Skipping archive member with unsafe path: {name}")]
    UnsafeMemberPath { name: String },

    #[error("Destination already exists: {path}")]
    AlreadyExists { path: String },
}

impl VfsError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn archive(path: &std::path::Path, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn not_found(path: &std::path::Path) -> Self {
        Self::NotFound {
            path: path.display().to_string(),
        }
    }
}
