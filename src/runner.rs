//! Batch orchestration: iterate source units, enumerate entries, apply
//! naming and conflict policies, and fold every outcome into the
//! success/error counters.
//!
//! No error escapes [`run_batch`]; failure is only visible through the
//! returned [`BatchResult`].

use chrono::Local;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info};

use crate::config::{BatchConfig, ConflictPolicy, Operation, SourceUnit, SuccessCondition};
use crate::conflict::{self, Decision};
use crate::enumerate::{compile_wildcard, member_selected, EnumerateOptions, Enumerator};
use crate::error::ConfigError;
use crate::naming;
use crate::post_action::PostAction;
use crate::vfs::{ArchiveOverlay, CandidateEntry, Vfs};

/// Running totals, mutated exclusively by the batch runner.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub success_count: u32,
    pub error_count: u32,
}

/// The only value returned to the caller.
#[derive(Debug)]
pub struct BatchResult {
    pub succeeded: bool,
    pub success_count: u32,
    pub error_count: u32,
    /// Destination paths written, in processing order.
    pub produced_paths: Vec<String>,
    /// Set when the batch was rejected before processing anything.
    pub config_error: Option<String>,
}

impl BatchResult {
    fn rejected(err: &ConfigError) -> Self {
        Self {
            succeeded: false,
            success_count: 0,
            error_count: 0,
            produced_paths: Vec::new(),
            config_error: Some(err.to_string()),
        }
    }
}

/// Converts the accumulated counters into break/pass decisions for the
/// configured success condition.
#[derive(Debug, Clone, Copy)]
pub struct SuccessEvaluator {
    condition: SuccessCondition,
    limit: u32,
}

impl SuccessEvaluator {
    pub fn new(condition: SuccessCondition, limit: u32) -> Self {
        Self { condition, limit }
    }

    /// True when the condition is irrecoverably violated and the batch
    /// must stop. `success_if_at_least` can only be judged at the end,
    /// so it never breaks early.
    pub fn broken(&self, counters: &Counters) -> bool {
        match self.condition {
            SuccessCondition::NoErrors => counters.error_count > 0,
            SuccessCondition::ErrorsBelowLimit => counters.error_count >= self.limit,
            SuccessCondition::AtLeastLimitSucceed => false,
        }
    }

    /// Final pass/fail outcome, computed once after the loop ends.
    pub fn succeeded(&self, counters: &Counters) -> bool {
        match self.condition {
            SuccessCondition::NoErrors => counters.error_count == 0,
            SuccessCondition::AtLeastLimitSucceed => counters.success_count >= self.limit,
            SuccessCondition::ErrorsBelowLimit => counters.error_count <= self.limit,
        }
    }
}

/// Run one batch to completion (or early termination) on the calling
/// thread.
///
/// `rows` is consulted only when the configuration sets
/// `from_previous_rows`; each row supplies its own `(path, wildcard)`
/// pair. `cancel` is the enclosing job's cooperative stop flag, polled
/// before each unit and each entry. When `add_files_to_result_list` is
/// set, produced destination paths are appended to `result_files`.
pub fn run_batch(
    config: &BatchConfig,
    vfs: &dyn Vfs,
    rows: &[SourceUnit],
    cancel: &AtomicBool,
    result_files: Option<&mut Vec<String>>,
) -> BatchResult {
    let units = match configured_units(config, rows) {
        Ok(units) => units,
        Err(err) => {
            error!("batch rejected: {err}");
            return BatchResult::rejected(&err);
        }
    };

    let mut runner = match BatchRunner::prepare(config, vfs, cancel) {
        Ok(runner) => runner,
        Err(err) => {
            error!("batch rejected: {err}");
            return BatchResult::rejected(&err);
        }
    };

    runner.run(&units, result_files)
}

fn configured_units(
    config: &BatchConfig,
    rows: &[SourceUnit],
) -> Result<Vec<SourceUnit>, ConfigError> {
    if config.from_previous_rows {
        return Ok(rows.to_vec());
    }
    let path = config
        .source_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ConfigError::MissingRequiredArg {
            arg: "source_path".to_string(),
        })?;
    Ok(vec![SourceUnit::new(path, config.wildcard_source.clone())])
}

/// One batch invocation: owns the counters, the broken flag, and the
/// produced-path list for its whole lifetime.
pub struct BatchRunner<'a> {
    config: &'a BatchConfig,
    vfs: &'a dyn Vfs,
    cancel: &'a AtomicBool,
    evaluator: SuccessEvaluator,
    counters: Counters,
    broken: bool,
    broken_reported: bool,
    stop_reported: bool,
    produced: Vec<String>,
    target_dir: PathBuf,
    member_include: Option<Regex>,
    member_exclude: Option<Regex>,
    source_wildcard: Option<Regex>,
    post_action: PostAction,
}

impl<'a> BatchRunner<'a> {
    /// Validate the configuration against the file system: wildcards
    /// must compile, the target directory must exist (or be created),
    /// and a move post-action must have a usable move-to folder. Any
    /// failure here aborts the batch before the first entry.
    pub fn prepare(
        config: &'a BatchConfig,
        vfs: &'a dyn Vfs,
        cancel: &'a AtomicBool,
    ) -> Result<Self, ConfigError> {
        let member_include = config
            .wildcard
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(compile_wildcard)
            .transpose()?;
        let member_exclude = config
            .wildcard_exclude
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(compile_wildcard)
            .transpose()?;
        let source_wildcard = config
            .wildcard_source
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(compile_wildcard)
            .transpose()?;

        if config.target_directory.is_empty() {
            return Err(ConfigError::MissingRequiredArg {
                arg: "target_directory".to_string(),
            });
        }
        let target_dir = PathBuf::from(&config.target_directory);
        match vfs
            .metadata(&target_dir)
            .map_err(|source| ConfigError::DirectoryCreation {
                path: config.target_directory.clone(),
                source: Box::new(source),
            })? {
            Some(meta) if meta.is_folder => {}
            Some(_) => {
                return Err(ConfigError::TargetNotAFolder {
                    path: config.target_directory.clone(),
                })
            }
            None if config.create_target_directory => {
                if !config.simulate {
                    vfs.create_dir_all(&target_dir).map_err(|source| {
                        ConfigError::DirectoryCreation {
                            path: config.target_directory.clone(),
                            source: Box::new(source),
                        }
                    })?;
                }
                debug!("created target directory {}", target_dir.display());
            }
            None => {
                return Err(ConfigError::TargetDirectoryMissing {
                    path: config.target_directory.clone(),
                })
            }
        }

        let post_action = PostAction::resolve(vfs, config)?;

        Ok(Self {
            config,
            vfs,
            cancel,
            evaluator: SuccessEvaluator::new(config.success_condition, config.success_limit),
            counters: Counters::default(),
            broken: false,
            broken_reported: false,
            stop_reported: false,
            produced: Vec::new(),
            target_dir,
            member_include,
            member_exclude,
            source_wildcard,
            post_action,
        })
    }

    /// Process every unit, stopping early when the success condition
    /// breaks or the job requests a stop.
    pub fn run(
        &mut self,
        units: &[SourceUnit],
        result_files: Option<&mut Vec<String>>,
    ) -> BatchResult {
        for unit in units {
            if self.stop_requested() || self.condition_broken() {
                break;
            }
            self.process_unit(unit);
        }

        if self.config.add_files_to_result_list {
            if let Some(list) = result_files {
                list.extend(self.produced.iter().cloned());
            }
        }

        let succeeded = self.evaluator.succeeded(&self.counters);
        info!(
            "batch finished: {} succeeded, {} failed, outcome {}",
            self.counters.success_count,
            self.counters.error_count,
            if succeeded { "success" } else { "failure" }
        );
        BatchResult {
            succeeded,
            success_count: self.counters.success_count,
            error_count: self.counters.error_count,
            produced_paths: std::mem::take(&mut self.produced),
            config_error: None,
        }
    }

    /// Polls the enclosing job's stop flag, emitting the diagnostic
    /// exactly once.
    fn stop_requested(&mut self) -> bool {
        let stop = self.cancel.load(Ordering::Relaxed);
        if stop && !self.stop_reported {
            info!("stop requested, terminating batch");
            self.stop_reported = true;
        }
        stop
    }

    /// Emits the condition-broken diagnostic exactly once.
    fn condition_broken(&mut self) -> bool {
        if self.broken && !self.broken_reported {
            error!(
                "success condition broken after {} error(s)",
                self.counters.error_count
            );
            self.broken_reported = true;
        }
        self.broken
    }

    fn record_error(&mut self) {
        self.counters.error_count += 1;
        if self.evaluator.broken(&self.counters) {
            self.broken = true;
        }
    }

    fn record_success(&mut self, destination: &Path) {
        self.counters.success_count += 1;
        self.produced.push(destination.display().to_string());
    }

    fn process_unit(&mut self, unit: &SourceUnit) {
        debug!("processing unit {}", unit.path);
        let root = PathBuf::from(&unit.path);

        // A row-supplied wildcard overrides the configured one for this
        // unit only. Bad row data counts as an error on the unit.
        let row_wildcard = match unit.wildcard.as_deref().filter(|p| !p.is_empty()) {
            Some(pattern) => match compile_wildcard(pattern) {
                Ok(re) => Some(re),
                Err(err) => {
                    error!("unit {}: {err}", unit.path);
                    self.record_error();
                    return;
                }
            },
            None => None,
        };
        // Cloning a compiled regex is cheap; it keeps the unit loop free
        // of borrows into the runner itself.
        let wildcard = row_wildcard.or_else(|| self.source_wildcard.clone());

        let root_meta = match self.vfs.metadata(&root) {
            Ok(Some(meta)) => meta,
            Ok(None) => {
                error!("unit path not found: {}", unit.path);
                self.record_error();
                return;
            }
            Err(err) => {
                error!("unit {}: {err}", unit.path);
                self.record_error();
                return;
            }
        };

        match self.config.operation {
            Operation::Extract => {
                self.process_extract_unit(&root, root_meta.is_folder, wildcard.as_ref())
            }
            Operation::Relocate => self.process_relocate_unit(&root, wildcard.as_ref()),
        }
    }

    /// Extract mode: the unit is an archive, or a folder whose matching
    /// files are archives.
    fn process_extract_unit(&mut self, root: &Path, is_folder: bool, wildcard: Option<&Regex>) {
        if !is_folder {
            self.process_archive(root);
            return;
        }

        let vfs = self.vfs;
        let enumerator = match Enumerator::new(
            vfs,
            root,
            EnumerateOptions {
                include_subfolders: self.config.include_subfolders,
                source_wildcard: wildcard,
                propagate_folders: false,
            },
        ) {
            Ok(enumerator) => enumerator,
            Err(err) => {
                error!("cannot enumerate {}: {err}", root.display());
                self.record_error();
                return;
            }
        };

        for item in enumerator {
            if self.stop_requested() || self.condition_broken() {
                return;
            }
            match item {
                Ok(entry) if !entry.is_folder => self.process_archive(&entry.path),
                Ok(_) => {}
                Err(err) => {
                    error!("cannot enumerate {}: {err}", root.display());
                    self.record_error();
                    return;
                }
            }
        }
    }

    /// Open one archive, write its selected members, then run the
    /// post-action on the archive file itself.
    fn process_archive(&mut self, archive_path: &Path) {
        info!("processing archive {}", archive_path.display());

        let target_root = if self.config.create_root_folder {
            let stem = archive_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.target_dir.join(stem)
        } else {
            self.target_dir.clone()
        };
        if self.config.create_root_folder && !self.config.simulate {
            if let Err(err) = self.vfs.create_dir_all(&target_root) {
                error!("cannot create root folder: {err}");
                self.record_error();
                return;
            }
        }

        // The overlay holds the archive exclusion; keep this scope tight
        // so the post-action below sees a closed archive.
        {
            let mut overlay = match self.vfs.open_archive(archive_path) {
                Ok(overlay) => overlay,
                Err(err) => {
                    error!("cannot open archive {}: {err}", archive_path.display());
                    self.record_error();
                    return;
                }
            };
            let members = match overlay.members() {
                Ok(members) => members,
                Err(err) => {
                    error!("cannot read archive {}: {err}", archive_path.display());
                    self.record_error();
                    return;
                }
            };

            for member in members {
                if self.stop_requested() || self.condition_broken() {
                    return;
                }
                if member.is_folder {
                    // Folder members are recreated, never counted.
                    let folder = target_root.join(&member.path);
                    if !self.config.simulate {
                        if let Err(err) = self.vfs.create_dir_all(&folder) {
                            error!("cannot create {}: {err}", folder.display());
                            self.record_error();
                        }
                    }
                    continue;
                }
                if !member_selected(
                    &member,
                    self.member_include.as_ref(),
                    self.member_exclude.as_ref(),
                ) {
                    continue;
                }
                self.write_member(overlay.as_mut(), &member, &target_root);
            }
        }

        if self.post_action.is_configured() && !self.broken && !self.cancel.load(Ordering::Relaxed)
        {
            if let Err(err) = self.post_action.apply(self.vfs, archive_path) {
                error!("post-action failed for {}: {err}", archive_path.display());
                self.record_error();
            }
        }
    }

    /// Write one archive member through the naming and conflict
    /// pipeline.
    fn write_member(
        &mut self,
        overlay: &mut dyn ArchiveOverlay,
        member: &CandidateEntry,
        target_root: &Path,
    ) {
        let Some(base_name) = member.path.file_name().map(|n| n.to_string_lossy().into_owned())
        else {
            return;
        };
        let named = naming::destination_name(&base_name, &self.config.naming, member.modified);
        let relative = if self.config.flatten_folder_structure {
            PathBuf::from(&named)
        } else {
            member.path.with_file_name(&named)
        };
        let mut destination = target_root.join(relative);

        let (exists, dest_size) = match self.vfs.metadata(&destination) {
            Ok(Some(meta)) => (true, meta.size),
            Ok(None) => (false, 0),
            Err(err) => {
                error!("cannot stat {}: {err}", destination.display());
                self.record_error();
                return;
            }
        };

        match conflict::decide(exists, dest_size, member.size, self.config.if_file_exists) {
            Decision::Skip => {
                debug!("skipping existing destination {}", destination.display());
            }
            Decision::Fail => {
                error!("destination already exists: {}", destination.display());
                self.record_error();
            }
            Decision::Proceed => {
                if self.config.if_file_exists == ConflictPolicy::UniqueName && exists {
                    destination = self.uniquify(destination);
                }
                debug!(
                    "extracting {} to {}",
                    member.path.display(),
                    destination.display()
                );
                if !self.config.simulate {
                    if let Some(parent) = destination.parent() {
                        if let Err(err) = self.vfs.create_dir_all(parent) {
                            error!("cannot create {}: {err}", parent.display());
                            self.record_error();
                            return;
                        }
                    }
                    if let Err(err) = overlay.extract(&member.path, &destination) {
                        error!("cannot extract {}: {err}", member.path.display());
                        self.record_error();
                        return;
                    }
                    if self.config.set_original_mtime {
                        // Restoring the timestamp is best effort.
                        if let Err(err) = self.vfs.set_modified(&destination, member.modified) {
                            debug!(
                                "could not restore mtime on {}: {err}",
                                destination.display()
                            );
                        }
                    }
                }
                self.record_success(&destination);
            }
        }
    }

    /// Relocate mode: move every matching entry under the unit root
    /// into the target directory, then run the post-action on the root.
    fn process_relocate_unit(&mut self, root: &Path, wildcard: Option<&Regex>) {
        let vfs = self.vfs;
        let enumerator = match Enumerator::new(
            vfs,
            root,
            EnumerateOptions {
                include_subfolders: self.config.include_subfolders,
                source_wildcard: wildcard,
                propagate_folders: self.config.move_empty_folders,
            },
        ) {
            Ok(enumerator) => enumerator,
            Err(err) => {
                error!("cannot enumerate {}: {err}", root.display());
                self.record_error();
                return;
            }
        };

        for item in enumerator {
            if self.stop_requested() || self.condition_broken() {
                return;
            }
            match item {
                Ok(entry) => self.relocate_entry(root, &entry),
                Err(err) => {
                    error!("cannot enumerate {}: {err}", root.display());
                    self.record_error();
                    return;
                }
            }
        }

        if self.post_action.is_configured() && !self.broken && !self.cancel.load(Ordering::Relaxed)
        {
            if let Err(err) = self.post_action.apply(self.vfs, root) {
                error!("post-action failed for {}: {err}", root.display());
                self.record_error();
            }
        }
    }

    /// Move one entry through the naming and conflict pipeline.
    fn relocate_entry(&mut self, unit_root: &Path, entry: &CandidateEntry) {
        let Some(base_name) = entry.path.file_name().map(|n| n.to_string_lossy().into_owned())
        else {
            return;
        };
        // Folders keep their name; the timestamp suffix applies to files.
        let named = if entry.is_folder {
            base_name
        } else {
            naming::destination_name(&base_name, &self.config.naming, entry.modified)
        };

        let relative = if self.config.flatten_folder_structure {
            PathBuf::from(&named)
        } else {
            match entry.path.strip_prefix(unit_root) {
                Ok(rel) if rel.as_os_str().is_empty() => PathBuf::from(&named),
                Ok(rel) => rel.with_file_name(&named),
                Err(_) => PathBuf::from(&named),
            }
        };
        let mut destination = self.target_dir.join(relative);

        let (exists, dest_size) = match self.vfs.metadata(&destination) {
            Ok(Some(meta)) => (true, meta.size),
            Ok(None) => (false, 0),
            Err(err) => {
                error!("cannot stat {}: {err}", destination.display());
                self.record_error();
                return;
            }
        };

        match conflict::decide(exists, dest_size, entry.size, self.config.if_file_exists) {
            Decision::Skip => {
                debug!("skipping existing destination {}", destination.display());
            }
            Decision::Fail => {
                error!("destination already exists: {}", destination.display());
                self.record_error();
            }
            Decision::Proceed => {
                if self.config.if_file_exists == ConflictPolicy::UniqueName && exists {
                    destination = self.uniquify(destination);
                }
                debug!(
                    "moving {} to {}",
                    entry.path.display(),
                    destination.display()
                );
                if !self.config.simulate {
                    if let Some(parent) = destination.parent() {
                        if let Err(err) = self.vfs.create_dir_all(parent) {
                            error!("cannot create {}: {err}", parent.display());
                            self.record_error();
                            return;
                        }
                    }
                    if let Err(err) = self.vfs.move_entry(&entry.path, &destination) {
                        error!("cannot move {}: {err}", entry.path.display());
                        self.record_error();
                        return;
                    }
                }
                self.record_success(&destination);
            }
        }
    }

    fn uniquify(&self, destination: PathBuf) -> PathBuf {
        let base = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let minted = naming::unique_name(&base, Local::now());
        destination.with_file_name(minted)
    }

}
