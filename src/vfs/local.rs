//! Local-disk implementation of the VFS collaborator, with zip archives
//! as the overlay backend.

use chrono::{DateTime, Local, TimeZone};
use filetime::FileTime;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use zip::read::ZipFile;
use zip::ZipArchive;

use super::{ArchiveOverlay, CandidateEntry, Vfs};
use crate::error::VfsError;

/// VFS backed by `std::fs`.
///
/// Archive overlays are not safe for uncoordinated structural mutation,
/// so every open/enumerate/close span is serialized through one mutex;
/// the guard lives inside the overlay value and is released on drop on
/// every exit path.
#[derive(Debug, Default)]
pub struct LocalVfs {
    overlay_lock: Mutex<()>,
}

impl LocalVfs {
    pub fn new() -> Self {
        Self::default()
    }
}

fn entry_from_fs(path: PathBuf, meta: &std::fs::Metadata) -> CandidateEntry {
    let modified = meta
        .modified()
        .map(DateTime::<Local>::from)
        .unwrap_or_else(|_| Local::now());
    CandidateEntry {
        path,
        is_folder: meta.is_dir(),
        size: if meta.is_dir() { 0 } else { meta.len() },
        modified,
    }
}

impl Vfs for LocalVfs {
    fn metadata(&self, path: &Path) -> Result<Option<CandidateEntry>, VfsError> {
        match std::fs::metadata(path) {
            Ok(meta) => Ok(Some(entry_from_fs(path.to_path_buf(), &meta))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(VfsError::io(path, err)),
        }
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<CandidateEntry>, VfsError> {
        let meta = std::fs::metadata(path).map_err(|err| VfsError::io(path, err))?;
        if !meta.is_dir() {
            return Err(VfsError::NotAFolder {
                path: path.display().to_string(),
            });
        }

        let mut entries = Vec::new();
        for child in std::fs::read_dir(path).map_err(|err| VfsError::io(path, err))? {
            let child = child.map_err(|err| VfsError::io(path, err))?;
            let child_path = child.path();
            let child_meta = child
                .metadata()
                .map_err(|err| VfsError::io(&child_path, err))?;
            entries.push(entry_from_fs(child_path, &child_meta));
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), VfsError> {
        std::fs::create_dir_all(path).map_err(|err| VfsError::io(path, err))
    }

    fn move_entry(&self, from: &Path, to: &Path) -> Result<(), VfsError> {
        match std::fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(rename_err) => {
                // rename fails across mount points; fall back to
                // copy-and-delete for plain files.
                let meta = std::fs::metadata(from).map_err(|err| VfsError::io(from, err))?;
                if !meta.is_file() {
                    return Err(VfsError::io(from, rename_err));
                }
                std::fs::copy(from, to).map_err(|err| VfsError::io(to, err))?;
                std::fs::remove_file(from).map_err(|err| VfsError::io(from, err))
            }
        }
    }

    fn delete(&self, path: &Path) -> Result<(), VfsError> {
        let meta = std::fs::metadata(path).map_err(|err| VfsError::io(path, err))?;
        if meta.is_dir() {
            std::fs::remove_dir_all(path).map_err(|err| VfsError::io(path, err))
        } else {
            std::fs::remove_file(path).map_err(|err| VfsError::io(path, err))
        }
    }

    fn set_modified(&self, path: &Path, modified: DateTime<Local>) -> Result<(), VfsError> {
        let mtime = FileTime::from_unix_time(modified.timestamp(), modified.timestamp_subsec_nanos());
        filetime::set_file_mtime(path, mtime).map_err(|err| VfsError::io(path, err))
    }

    fn open_archive<'a>(&'a self, path: &Path) -> Result<Box<dyn ArchiveOverlay + 'a>, VfsError> {
        let guard = self
            .overlay_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let file = File::open(path).map_err(|err| VfsError::io(path, err))?;
        let archive =
            ZipArchive::new(BufReader::new(file)).map_err(|err| VfsError::archive(path, err))?;
        Ok(Box::new(ZipOverlay {
            _guard: guard,
            archive,
            path: path.to_path_buf(),
        }))
    }
}

struct ZipOverlay<'a> {
    _guard: MutexGuard<'a, ()>,
    archive: ZipArchive<BufReader<File>>,
    path: PathBuf,
}

fn member_mtime<R: std::io::Read>(file: &ZipFile<'_, R>) -> DateTime<Local> {
    file.last_modified()
        .and_then(|dt| {
            Local
                .with_ymd_and_hms(
                    i32::from(dt.year()),
                    u32::from(dt.month()),
                    u32::from(dt.day()),
                    u32::from(dt.hour()),
                    u32::from(dt.minute()),
                    u32::from(dt.second()),
                )
                .single()
        })
        .unwrap_or_else(Local::now)
}

impl ArchiveOverlay for ZipOverlay<'_> {
    fn members(&mut self) -> Result<Vec<CandidateEntry>, VfsError> {
        let mut members = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            let file = self
                .archive
                .by_index(index)
                .map_err(|err| VfsError::archive(&self.path, err))?;
            let Some(member_path) = file.enclosed_name() else {
                tracing::warn!(
                    "skipping archive member with unsafe path: {} in {}",
                    file.name(),
                    self.path.display()
                );
                continue;
            };
            members.push(CandidateEntry {
                modified: member_mtime(&file),
                is_folder: file.is_dir(),
                size: file.size(),
                path: member_path,
            });
        }
        Ok(members)
    }

    fn extract(&mut self, member: &Path, dest: &Path) -> Result<u64, VfsError> {
        let name = member.to_string_lossy();
        let mut file = self
            .archive
            .by_name(&name)
            .map_err(|err| VfsError::archive(&self.path, err))?;
        let mut out = File::create(dest).map_err(|err| VfsError::io(dest, err))?;
        std::io::copy(&mut file, &mut out).map_err(|err| VfsError::io(dest, err))
    }
}
