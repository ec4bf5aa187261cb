//! Virtual file system collaborator boundary.
//!
//! The engine performs every list/stat/move/delete/extract through the
//! [`Vfs`] trait so tests and embedders can substitute their own
//! backend. Archive access goes through an [`ArchiveOverlay`] obtained
//! from the trait; the overlay owns whatever exclusion the backend
//! needs for its open/enumerate/close span and releases it on drop.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::error::VfsError;

pub mod local;

pub use local::LocalVfs;

/// One concrete file or folder discovered while enumerating a unit, or
/// one archive member. Created per entry and discarded after processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    pub path: PathBuf,
    pub is_folder: bool,
    pub size: u64,
    pub modified: DateTime<Local>,
}

/// Blocking file-system collaborator. All calls run on the caller's
/// thread; the engine is synchronous by design.
pub trait Vfs {
    /// Metadata for `path`, or `None` when nothing exists there.
    fn metadata(&self, path: &Path) -> Result<Option<CandidateEntry>, VfsError>;

    /// Direct children of a folder, sorted by name for a stable
    /// processing order.
    fn list_dir(&self, path: &Path) -> Result<Vec<CandidateEntry>, VfsError>;

    fn create_dir_all(&self, path: &Path) -> Result<(), VfsError>;

    /// Move a file or folder. Replaces an existing file destination.
    fn move_entry(&self, from: &Path, to: &Path) -> Result<(), VfsError>;

    /// Delete a file or a folder tree.
    fn delete(&self, path: &Path) -> Result<(), VfsError>;

    fn set_modified(&self, path: &Path, modified: DateTime<Local>) -> Result<(), VfsError>;

    /// Open an archive overlay for `path`. The overlay holds the
    /// backend's archive exclusion until it is dropped.
    fn open_archive<'a>(&'a self, path: &Path) -> Result<Box<dyn ArchiveOverlay + 'a>, VfsError>;
}

/// A view into one opened archive. Single forward pass: list members,
/// then extract the selected ones.
pub trait ArchiveOverlay {
    /// All members of the archive. The archive root itself is never
    /// listed; members with unsafe (escaping) paths are dropped.
    fn members(&mut self) -> Result<Vec<CandidateEntry>, VfsError>;

    /// Extract one member to `dest`, returning the number of bytes
    /// written. The caller prepares the parent directory.
    fn extract(&mut self, member: &Path, dest: &Path) -> Result<u64, VfsError>;
}
