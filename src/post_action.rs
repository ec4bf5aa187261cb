//! Per-unit post-actions: delete the processed source, or move it into
//! a holding folder.

use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{BatchConfig, MoveConflictPolicy, PostActionKind};
use crate::error::{ConfigError, VfsError};
use crate::naming;
use crate::vfs::Vfs;

/// Post-action with its move-to folder already resolved. Resolution
/// happens once at batch start; a bad move-to configuration aborts the
/// batch before any entry is processed.
#[derive(Debug)]
pub struct PostAction {
    kind: PostActionKind,
    move_to: Option<PathBuf>,
    on_collision: MoveConflictPolicy,
    simulate: bool,
}

impl PostAction {
    pub fn resolve(vfs: &dyn Vfs, config: &BatchConfig) -> Result<Self, ConfigError> {
        let move_to = match config.post_action {
            PostActionKind::Move => {
                let raw = config
                    .move_to_directory
                    .as_deref()
                    .filter(|path| !path.is_empty())
                    .ok_or(ConfigError::MoveToDirectoryUnset)?;
                let path = PathBuf::from(raw);
                match vfs.metadata(&path).map_err(|source| {
                    ConfigError::DirectoryCreation {
                        path: raw.to_string(),
                        source: Box::new(source),
                    }
                })? {
                    Some(meta) if meta.is_folder => {}
                    Some(_) => {
                        return Err(ConfigError::MoveToNotAFolder {
                            path: raw.to_string(),
                        })
                    }
                    None if config.create_move_to_directory => {
                        if !config.simulate {
                            vfs.create_dir_all(&path).map_err(|source| {
                                ConfigError::DirectoryCreation {
                                    path: raw.to_string(),
                                    source: Box::new(source),
                                }
                            })?;
                        }
                        debug!("created move-to directory {}", path.display());
                    }
                    None => {
                        return Err(ConfigError::MoveToDirectoryMissing {
                            path: raw.to_string(),
                        })
                    }
                }
                Some(path)
            }
            _ => None,
        };

        Ok(Self {
            kind: config.post_action,
            move_to,
            on_collision: config.if_moved_file_exists,
            simulate: config.simulate,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.kind != PostActionKind::Nothing
    }

    /// Apply the action to one processed source path. Errors are scoped
    /// to the unit; the runner folds them into the error count.
    pub fn apply(&self, vfs: &dyn Vfs, source: &Path) -> Result<(), VfsError> {
        match self.kind {
            PostActionKind::Nothing => Ok(()),
            PostActionKind::Delete => {
                debug!("deleting processed source {}", source.display());
                if self.simulate {
                    return Ok(());
                }
                vfs.delete(source)
            }
            PostActionKind::Move => self.move_source(vfs, source),
        }
    }

    fn move_source(&self, vfs: &dyn Vfs, source: &Path) -> Result<(), VfsError> {
        // resolve() guarantees the folder when kind is Move.
        let Some(move_to) = self.move_to.as_deref() else {
            return Ok(());
        };
        let base_name = source
            .file_name()
            .ok_or_else(|| VfsError::not_found(source))?;
        let mut destination = move_to.join(base_name);

        if vfs.metadata(&destination)?.is_some() {
            match self.on_collision {
                MoveConflictPolicy::Fail => {
                    return Err(VfsError::AlreadyExists {
                        path: destination.display().to_string(),
                    });
                }
                MoveConflictPolicy::Overwrite => {}
                MoveConflictPolicy::UniqueName => {
                    let minted =
                        naming::unique_name(&base_name.to_string_lossy(), Local::now());
                    destination = move_to.join(minted);
                }
            }
        }

        debug!(
            "moving processed source {} to {}",
            source.display(),
            destination.display()
        );
        if self.simulate {
            return Ok(());
        }
        vfs.move_entry(source, &destination)
    }
}
