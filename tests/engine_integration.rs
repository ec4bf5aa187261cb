//! End-to-end tests for the batch engine over a real temp directory.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeZone};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use filebatch::config::{
    BatchConfig, ConflictPolicy, MoveConflictPolicy, Operation, PostActionKind, SourceUnit,
    SuccessCondition,
};
use filebatch::error::VfsError;
use filebatch::runner::run_batch;
use filebatch::vfs::{ArchiveOverlay, CandidateEntry, LocalVfs, Vfs};

fn write_zip(path: &Path, members: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    for (name, data) in members {
        if name.ends_with('/') {
            writer
                .add_directory(name.trim_end_matches('/'), SimpleFileOptions::default())
                .unwrap();
        } else {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap();
}

fn extract_config(source: &Path, target: &Path) -> BatchConfig {
    BatchConfig {
        operation: Operation::Extract,
        source_path: Some(source.display().to_string()),
        target_directory: target.display().to_string(),
        ..Default::default()
    }
}

fn relocate_config(source: &Path, target: &Path) -> BatchConfig {
    BatchConfig {
        operation: Operation::Relocate,
        source_path: Some(source.display().to_string()),
        target_directory: target.display().to_string(),
        ..Default::default()
    }
}

fn run(config: &BatchConfig) -> filebatch::BatchResult {
    let vfs = LocalVfs::new();
    run_batch(config, &vfs, &[], &AtomicBool::new(false), None)
}

#[test]
fn test_extract_archive_with_member_wildcard() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("data.zip");
    let target = dir.path().join("out");
    std::fs::create_dir_all(&target).unwrap();
    write_zip(
        &archive,
        &[
            ("a.csv", b"1" as &[u8]),
            ("b.txt", b"22"),
            ("sub/", b""),
            ("sub/c.csv", b"333"),
        ],
    );

    let mut config = extract_config(&archive, &target);
    config.wildcard = Some(r".*\.csv".to_string());

    let result = run(&config);
    assert!(result.succeeded);
    assert_eq!(result.success_count, 2);
    assert_eq!(result.error_count, 0);
    assert!(target.join("a.csv").exists());
    assert!(target.join("sub/c.csv").exists());
    assert!(!target.join("b.txt").exists());
}

#[test]
fn test_extract_exclude_wildcard() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("data.zip");
    let target = dir.path().join("out");
    std::fs::create_dir_all(&target).unwrap();
    write_zip(
        &archive,
        &[("keep.csv", b"1" as &[u8]), ("sub/", b""), ("sub/drop.csv", b"2")],
    );

    let mut config = extract_config(&archive, &target);
    config.wildcard = Some(r".*\.csv".to_string());
    config.wildcard_exclude = Some(r"sub/.*".to_string());

    let result = run(&config);
    assert_eq!(result.success_count, 1);
    assert!(target.join("keep.csv").exists());
    assert!(!target.join("sub/drop.csv").exists());
}

#[test]
fn test_extract_creates_target_directory_on_demand() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("data.zip");
    let target = dir.path().join("made/by/engine");
    write_zip(&archive, &[("f.txt", b"x" as &[u8])]);

    let mut config = extract_config(&archive, &target);
    config.create_target_directory = true;

    let result = run(&config);
    assert!(result.succeeded);
    assert!(target.join("f.txt").exists());
}

#[test]
fn test_missing_target_directory_rejects_batch() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("data.zip");
    write_zip(&archive, &[("f.txt", b"x" as &[u8])]);

    let config = extract_config(&archive, &dir.path().join("absent"));
    let result = run(&config);
    assert!(!result.succeeded);
    assert_eq!(result.success_count, 0);
    assert_eq!(result.error_count, 0);
    assert!(result.config_error.is_some());
    // Nothing was processed, the archive is untouched.
    assert!(archive.exists());
}

#[test]
fn test_move_post_action_without_directory_rejects_batch() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("data.zip");
    let target = dir.path().join("out");
    std::fs::create_dir_all(&target).unwrap();
    write_zip(&archive, &[("f.txt", b"x" as &[u8])]);

    let mut config = extract_config(&archive, &target);
    config.post_action = PostActionKind::Move;

    let result = run(&config);
    assert!(!result.succeeded);
    assert!(result.config_error.is_some());
    assert!(!target.join("f.txt").exists());
}

#[test]
fn test_post_action_delete_removes_archive() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("data.zip");
    let target = dir.path().join("out");
    std::fs::create_dir_all(&target).unwrap();
    write_zip(&archive, &[("f.txt", b"x" as &[u8])]);

    let mut config = extract_config(&archive, &target);
    config.post_action = PostActionKind::Delete;

    let result = run(&config);
    assert!(result.succeeded);
    assert!(target.join("f.txt").exists());
    assert!(!archive.exists());
}

#[test]
fn test_post_action_move_with_unique_name_collision() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("data.zip");
    let target = dir.path().join("out");
    let hold = dir.path().join("hold");
    std::fs::create_dir_all(&target).unwrap();
    std::fs::create_dir_all(&hold).unwrap();
    std::fs::write(hold.join("data.zip"), b"previous run").unwrap();
    write_zip(&archive, &[("f.txt", b"x" as &[u8])]);

    let mut config = extract_config(&archive, &target);
    config.post_action = PostActionKind::Move;
    config.move_to_directory = Some(hold.display().to_string());
    config.if_moved_file_exists = MoveConflictPolicy::UniqueName;

    let result = run(&config);
    assert!(result.succeeded);
    assert!(!archive.exists());
    assert_eq!(std::fs::read_dir(&hold).unwrap().count(), 2);
}

#[test]
fn test_relocate_folder_recursively_preserves_structure() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("in");
    let target = dir.path().join("out");
    std::fs::create_dir_all(source.join("sub")).unwrap();
    std::fs::create_dir_all(&target).unwrap();
    std::fs::write(source.join("top.txt"), b"t").unwrap();
    std::fs::write(source.join("sub/nested.txt"), b"n").unwrap();

    let mut config = relocate_config(&source, &target);
    config.include_subfolders = true;

    let result = run(&config);
    assert!(result.succeeded);
    assert!(target.join("top.txt").exists());
    assert!(target.join("sub/nested.txt").exists());
    assert!(!source.join("top.txt").exists());
}

#[test]
fn test_relocate_flatten_keeps_base_names_only() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("in");
    let target = dir.path().join("out");
    std::fs::create_dir_all(source.join("sub")).unwrap();
    std::fs::create_dir_all(&target).unwrap();
    std::fs::write(source.join("sub/nested.txt"), b"n").unwrap();

    let mut config = relocate_config(&source, &target);
    config.include_subfolders = true;
    config.flatten_folder_structure = true;

    let result = run(&config);
    assert!(result.succeeded);
    assert!(target.join("nested.txt").exists());
    assert!(!target.join("sub").exists());
}

#[test]
fn test_empty_folder_stays_without_recursive_flag() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("in");
    let target = dir.path().join("out");
    std::fs::create_dir_all(source.join("empty")).unwrap();
    std::fs::create_dir_all(&target).unwrap();
    std::fs::write(source.join("a.txt"), b"x").unwrap();

    // Default configuration: no recursion, folder propagation enabled.
    let config = relocate_config(&source, &target);

    let result = run(&config);
    assert!(result.succeeded);
    assert_eq!(result.success_count, 1);
    assert!(target.join("a.txt").exists());
    // Folder propagation only applies while recursing into subfolders.
    assert!(source.join("empty").exists());
    assert!(!target.join("empty").exists());
}

#[test]
fn test_empty_folder_relocated_when_recursing() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("in");
    let target = dir.path().join("out");
    std::fs::create_dir_all(source.join("empty")).unwrap();
    std::fs::create_dir_all(&target).unwrap();

    let mut config = relocate_config(&source, &target);
    config.include_subfolders = true;

    let result = run(&config);
    assert!(result.succeeded);
    assert_eq!(result.success_count, 1);
    assert!(!source.join("empty").exists());
    assert!(target.join("empty").is_dir());
}

#[test]
fn test_set_original_mtime_restores_member_timestamp() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("data.zip");
    let target = dir.path().join("out");
    std::fs::create_dir_all(&target).unwrap();

    // Even second: the archive timestamp has two-second resolution.
    let stamp = zip::DateTime::from_date_and_time(2021, 6, 15, 10, 30, 20).unwrap();
    let file = File::create(&archive).unwrap();
    let mut writer = ZipWriter::new(file);
    writer
        .start_file(
            "old.txt",
            SimpleFileOptions::default().last_modified_time(stamp),
        )
        .unwrap();
    writer.write_all(b"x").unwrap();
    writer.finish().unwrap();

    let mut config = extract_config(&archive, &target);
    config.set_original_mtime = true;

    let result = run(&config);
    assert!(result.succeeded);
    let meta = std::fs::metadata(target.join("old.txt")).unwrap();
    let restored = DateTime::<Local>::from(meta.modified().unwrap());
    let expected = Local.with_ymd_and_hms(2021, 6, 15, 10, 30, 20).unwrap();
    assert_eq!(restored.timestamp(), expected.timestamp());
}

#[test]
fn test_overwrite_if_size_equal_branch() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("in");
    let target = dir.path().join("out");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::create_dir_all(&target).unwrap();
    std::fs::write(source.join("same.bin"), b"fresh").unwrap();
    std::fs::write(target.join("same.bin"), b"stale").unwrap(); // same length

    let mut config = relocate_config(&source, &target);
    config.if_file_exists = ConflictPolicy::OverwriteIfSizeEqual;

    let result = run(&config);
    assert!(result.succeeded);
    assert_eq!(result.success_count, 1);
    assert_eq!(std::fs::read(target.join("same.bin")).unwrap(), b"fresh");
}

#[test]
fn test_overwrite_if_size_equal_skips_different_size() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("in");
    let target = dir.path().join("out");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::create_dir_all(&target).unwrap();
    std::fs::write(source.join("same.bin"), b"longer content").unwrap();
    std::fs::write(target.join("same.bin"), b"short").unwrap();

    let mut config = relocate_config(&source, &target);
    config.if_file_exists = ConflictPolicy::OverwriteIfSizeEqual;

    let result = run(&config);
    // A skipped entry counts toward neither success nor failure.
    assert!(result.succeeded);
    assert_eq!(result.success_count, 0);
    assert_eq!(result.error_count, 0);
    assert!(source.join("same.bin").exists());
    assert_eq!(std::fs::read(target.join("same.bin")).unwrap(), b"short");
}

#[test]
fn test_all_must_succeed_short_circuits() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("in");
    let target = dir.path().join("out");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::create_dir_all(&target).unwrap();
    for name in ["a.txt", "b.txt", "c.txt"] {
        std::fs::write(source.join(name), b"x").unwrap();
    }
    // Pre-existing destination makes the second entry fail.
    std::fs::write(target.join("b.txt"), b"blocker").unwrap();

    let mut config = relocate_config(&source, &target);
    config.if_file_exists = ConflictPolicy::Fail;

    let result = run(&config);
    assert!(!result.succeeded);
    assert_eq!(result.success_count, 1);
    assert_eq!(result.error_count, 1);
    // The third entry was never attempted.
    assert!(source.join("c.txt").exists());
    assert!(!target.join("c.txt").exists());
}

#[test]
fn test_at_least_condition_passes_with_enough_successes() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("in");
    let target = dir.path().join("out");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::create_dir_all(&target).unwrap();
    for name in ["a.txt", "b.txt", "c.txt"] {
        std::fs::write(source.join(name), b"x").unwrap();
    }

    let mut config = relocate_config(&source, &target);
    config.success_condition = SuccessCondition::AtLeastLimitSucceed;
    config.success_limit = 2;

    let result = run(&config);
    assert!(result.succeeded);
    assert_eq!(result.success_count, 3);
}

#[test]
fn test_errors_below_limit_breaks_at_limit_but_still_passes() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("in");
    let target = dir.path().join("out");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::create_dir_all(&target).unwrap();
    for name in ["a.txt", "b.txt"] {
        std::fs::write(source.join(name), b"x").unwrap();
        std::fs::write(target.join(name), b"blocker").unwrap();
    }

    let mut config = relocate_config(&source, &target);
    config.if_file_exists = ConflictPolicy::Fail;
    config.success_condition = SuccessCondition::ErrorsBelowLimit;
    config.success_limit = 1;

    let result = run(&config);
    // The batch breaks as soon as the error count reaches the limit, so
    // only one error accumulates; at exactly the limit the outcome is
    // still a pass.
    assert_eq!(result.error_count, 1);
    assert_eq!(result.success_count, 0);
    assert!(result.succeeded);
}

#[test]
fn test_unit_error_continues_to_next_unit() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("out");
    std::fs::create_dir_all(&target).unwrap();
    let good = dir.path().join("good.zip");
    write_zip(&good, &[("f.txt", b"x" as &[u8])]);

    let mut config = extract_config(Path::new("ignored"), &target);
    config.from_previous_rows = true;
    config.success_condition = SuccessCondition::ErrorsBelowLimit;
    config.success_limit = 5;

    let rows = vec![
        SourceUnit::new(dir.path().join("absent.zip").display().to_string(), None),
        SourceUnit::new(good.display().to_string(), None),
    ];
    let vfs = LocalVfs::new();
    let result = run_batch(&config, &vfs, &rows, &AtomicBool::new(false), None);

    assert!(result.succeeded);
    assert_eq!(result.error_count, 1);
    assert_eq!(result.success_count, 1);
    assert!(target.join("f.txt").exists());
}

#[test]
fn test_unique_name_policy_mints_new_destination() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("data.zip");
    let target = dir.path().join("out");
    std::fs::create_dir_all(&target).unwrap();
    write_zip(&archive, &[("f.txt", b"x" as &[u8])]);
    std::fs::write(target.join("f.txt"), b"already here").unwrap();

    let mut config = extract_config(&archive, &target);
    config.if_file_exists = ConflictPolicy::UniqueName;

    let result = run(&config);
    assert!(result.succeeded);
    assert_eq!(result.success_count, 1);
    // Original untouched, a minted sibling appeared.
    assert_eq!(std::fs::read(target.join("f.txt")).unwrap(), b"already here");
    assert_eq!(std::fs::read_dir(&target).unwrap().count(), 2);
}

#[test]
fn test_naming_date_suffix_applied_to_extracted_member() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("data.zip");
    let target = dir.path().join("out");
    std::fs::create_dir_all(&target).unwrap();
    write_zip(&archive, &[("report.txt", b"x" as &[u8])]);

    let mut config = extract_config(&archive, &target);
    config.naming.add_date = true;

    let result = run(&config);
    assert!(result.succeeded);
    let expected = format!("report_{}.txt", Local::now().format("%Y%m%d"));
    assert!(
        target.join(&expected).exists(),
        "expected {expected} in target"
    );
}

#[test]
fn test_result_file_list_receives_produced_paths() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("data.zip");
    let target = dir.path().join("out");
    std::fs::create_dir_all(&target).unwrap();
    write_zip(&archive, &[("a.txt", b"1" as &[u8]), ("b.txt", b"2")]);

    let mut config = extract_config(&archive, &target);
    config.add_files_to_result_list = true;

    let vfs = LocalVfs::new();
    let mut result_files = vec!["earlier-step.txt".to_string()];
    let result = run_batch(
        &config,
        &vfs,
        &[],
        &AtomicBool::new(false),
        Some(&mut result_files),
    );

    assert_eq!(result.success_count, 2);
    assert_eq!(result.produced_paths.len(), 2);
    // Appended after the caller's own entries, in processing order.
    assert_eq!(result_files.len(), 3);
    assert_eq!(result_files[0], "earlier-step.txt");
    assert_eq!(result_files[1..], result.produced_paths[..]);
}

#[test]
fn test_simulate_counts_without_touching_files() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("in");
    let target = dir.path().join("out");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::create_dir_all(&target).unwrap();
    std::fs::write(source.join("a.txt"), b"x").unwrap();

    let mut config = relocate_config(&source, &target);
    config.simulate = true;
    config.post_action = PostActionKind::Delete;

    let result = run(&config);
    assert!(result.succeeded);
    assert_eq!(result.success_count, 1);
    assert!(source.join("a.txt").exists());
    assert!(!target.join("a.txt").exists());
}

/// Delegating VFS that raises the job's stop flag after the first move,
/// as if the user cancelled mid-run.
struct StopAfterFirstMove<'a> {
    inner: LocalVfs,
    cancel: &'a AtomicBool,
}

impl Vfs for StopAfterFirstMove<'_> {
    fn metadata(&self, path: &Path) -> Result<Option<CandidateEntry>, VfsError> {
        self.inner.metadata(path)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<CandidateEntry>, VfsError> {
        self.inner.list_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), VfsError> {
        self.inner.create_dir_all(path)
    }

    fn move_entry(&self, from: &Path, to: &Path) -> Result<(), VfsError> {
        let outcome = self.inner.move_entry(from, to);
        self.cancel.store(true, Ordering::Relaxed);
        outcome
    }

    fn delete(&self, path: &Path) -> Result<(), VfsError> {
        self.inner.delete(path)
    }

    fn set_modified(&self, path: &Path, modified: DateTime<Local>) -> Result<(), VfsError> {
        self.inner.set_modified(path, modified)
    }

    fn open_archive<'b>(&'b self, path: &Path) -> Result<Box<dyn ArchiveOverlay + 'b>, VfsError> {
        self.inner.open_archive(path)
    }
}

#[test]
fn test_cancellation_stops_after_current_unit_entry() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("out");
    std::fs::create_dir_all(&target).unwrap();
    let mut rows = Vec::new();
    for name in ["u1.txt", "u2.txt", "u3.txt"] {
        let path = dir.path().join(name);
        std::fs::write(&path, b"x").unwrap();
        rows.push(SourceUnit::new(path.display().to_string(), None));
    }

    let mut config = relocate_config(Path::new("ignored"), &target);
    config.from_previous_rows = true;

    let cancel = AtomicBool::new(false);
    let vfs = StopAfterFirstMove {
        inner: LocalVfs::new(),
        cancel: &cancel,
    };
    let result = run_batch(&config, &vfs, &rows, &cancel, None);

    // Only the first unit's work is reflected in the result.
    assert_eq!(result.success_count, 1);
    assert_eq!(result.error_count, 0);
    assert!(target.join("u1.txt").exists());
    assert!(dir.path().join("u2.txt").exists());
    assert!(dir.path().join("u3.txt").exists());
}

/// Collects formatted log output so tests can assert on diagnostics.
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn test_stop_diagnostic_emitted_once() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("in");
    let target = dir.path().join("out");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::create_dir_all(&target).unwrap();
    // Two entries in the unit plus a second unit, so both the entry
    // loop and the unit loop poll the flag after it is raised.
    std::fs::write(source.join("a.txt"), b"x").unwrap();
    std::fs::write(source.join("b.txt"), b"x").unwrap();
    let extra_unit = dir.path().join("u2.txt");
    std::fs::write(&extra_unit, b"x").unwrap();

    let mut config = relocate_config(&source, &target);
    config.from_previous_rows = true;
    let rows = vec![
        SourceUnit::new(source.display().to_string(), None),
        SourceUnit::new(extra_unit.display().to_string(), None),
    ];

    let cancel = AtomicBool::new(false);
    let vfs = StopAfterFirstMove {
        inner: LocalVfs::new(),
        cancel: &cancel,
    };

    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, || {
        run_batch(&config, &vfs, &rows, &cancel, None)
    });

    assert_eq!(result.success_count, 1);
    assert!(source.join("b.txt").exists());
    assert!(extra_unit.exists());
    let logs = capture.contents();
    assert_eq!(logs.matches("stop requested").count(), 1, "{logs}");
}

#[test]
fn test_extract_into_root_folder_named_after_archive() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("bundle.zip");
    let target = dir.path().join("out");
    std::fs::create_dir_all(&target).unwrap();
    write_zip(&archive, &[("f.txt", b"x" as &[u8])]);

    let mut config = extract_config(&archive, &target);
    config.create_root_folder = true;

    let result = run(&config);
    assert!(result.succeeded);
    assert!(target.join("bundle/f.txt").exists());
}

#[test]
fn test_folder_unit_extracts_matching_archives_only() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("drop");
    let target = dir.path().join("out");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::create_dir_all(&target).unwrap();
    write_zip(&source.join("one.zip"), &[("one.txt", b"1" as &[u8])]);
    write_zip(&source.join("two.zip"), &[("two.txt", b"2" as &[u8])]);
    std::fs::write(source.join("note.txt"), b"not an archive").unwrap();

    let mut config = extract_config(&source, &target);
    config.wildcard_source = Some(r".*\.zip".to_string());

    let result = run(&config);
    assert!(result.succeeded);
    assert_eq!(result.success_count, 2);
    assert!(target.join("one.txt").exists());
    assert!(target.join("two.txt").exists());
}

#[test]
fn test_produced_paths_are_absolute_destinations() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("data.zip");
    let target = dir.path().join("out");
    std::fs::create_dir_all(&target).unwrap();
    write_zip(&archive, &[("a.txt", b"1" as &[u8])]);

    let config = extract_config(&archive, &target);
    let result = run(&config);
    assert_eq!(
        result.produced_paths,
        vec![target.join("a.txt").display().to_string()]
    );
    let _ = PathBuf::from(&result.produced_paths[0]);
}
