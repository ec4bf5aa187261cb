//! Unit enumeration: walk a root file or folder, applying wildcards and
//! the recursive-subfolder flag.

use regex::Regex;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, VfsError};
use crate::vfs::{CandidateEntry, Vfs};

/// Compile a configured wildcard into an anchored regex, matching the
/// whole name the way the step configuration expects.
pub fn compile_wildcard(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| ConfigError::InvalidWildcard {
        pattern: pattern.to_string(),
        source,
    })
}

/// True when `entry` passes the include/exclude pair, matched against
/// the full member path. An unset include admits everything; an unset
/// exclude rejects nothing.
pub fn member_selected(
    entry: &CandidateEntry,
    include: Option<&Regex>,
    exclude: Option<&Regex>,
) -> bool {
    let name = entry.path.to_string_lossy();
    let included = include.map_or(true, |re| re.is_match(&name));
    let excluded = exclude.is_some_and(|re| re.is_match(&name));
    included && !excluded
}

/// Traversal knobs for one unit.
pub struct EnumerateOptions<'a> {
    pub include_subfolders: bool,
    /// Base-name filter for files found inside a folder unit.
    pub source_wildcard: Option<&'a Regex>,
    /// Yield empty folders as entries themselves, so they survive a
    /// relocation. Only honored when descending into subfolders and no
    /// wildcard is set.
    pub propagate_folders: bool,
}

/// Lazy, single-pass walk over one unit root. A root that is a plain
/// file is yielded directly; a folder root yields matching children,
/// descending only when `include_subfolders` is set.
pub struct Enumerator<'a> {
    vfs: &'a dyn Vfs,
    options: EnumerateOptions<'a>,
    /// Entries ready to yield, in reverse order.
    ready: Vec<CandidateEntry>,
    /// Folders still to list.
    folders: Vec<PathBuf>,
}

impl<'a> Enumerator<'a> {
    pub fn new(
        vfs: &'a dyn Vfs,
        root: &Path,
        options: EnumerateOptions<'a>,
    ) -> Result<Self, VfsError> {
        let meta = vfs
            .metadata(root)?
            .ok_or_else(|| VfsError::not_found(root))?;

        let mut ready = Vec::new();
        let mut folders = Vec::new();
        if meta.is_folder {
            folders.push(root.to_path_buf());
        } else {
            ready.push(meta);
        }

        Ok(Self {
            vfs,
            options,
            ready,
            folders,
        })
    }

    fn file_matches(&self, entry: &CandidateEntry) -> bool {
        match self.options.source_wildcard {
            Some(wildcard) => entry
                .path
                .file_name()
                .map(|name| wildcard.is_match(&name.to_string_lossy()))
                .unwrap_or(false),
            None => true,
        }
    }

    fn list_next_folder(&mut self) -> Option<Result<(), VfsError>> {
        let folder = self.folders.pop()?;
        let children = match self.vfs.list_dir(&folder) {
            Ok(children) => children,
            Err(err) => return Some(Err(err)),
        };

        // Children arrive sorted; reverse so Vec::pop yields them in order.
        for child in children.into_iter().rev() {
            if child.is_folder {
                if self.options.include_subfolders {
                    // An empty folder is yielded as an entry of its
                    // own; a non-empty one is only descended into.
                    if self.options.propagate_folders && self.options.source_wildcard.is_none() {
                        match self.vfs.list_dir(&child.path) {
                            Ok(grandchildren) if grandchildren.is_empty() => {
                                self.ready.push(child);
                                continue;
                            }
                            Ok(_) => {}
                            Err(err) => return Some(Err(err)),
                        }
                    }
                    self.folders.push(child.path.clone());
                }
            } else if self.file_matches(&child) {
                self.ready.push(child);
            }
        }
        Some(Ok(()))
    }
}

impl Iterator for Enumerator<'_> {
    type Item = Result<CandidateEntry, VfsError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.ready.pop() {
                return Some(Ok(entry));
            }
            match self.list_next_folder() {
                None => return None,
                Some(Err(err)) => return Some(Err(err)),
                Some(Ok(())) => {}
            }
        }
    }
}
