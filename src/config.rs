//! Batch configuration: the plain data consumed from the surrounding
//! step-configuration collaborator.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::ConfigError;

/// One configured or row-supplied root to process: a file, a folder, or
/// an archive, with an optional per-unit wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    pub path: String,
    pub wildcard: Option<String>,
}

impl SourceUnit {
    pub fn new(path: impl Into<String>, wildcard: Option<String>) -> Self {
        Self {
            path: path.into(),
            wildcard,
        }
    }
}

/// What the batch does with each entry it discovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Source units are archives (or folders of archives); entries are
    /// archive members written into the target directory.
    Extract,
    /// Source units are files/folders; entries are moved into the target
    /// directory.
    Relocate,
}

/// What to do when an entry's destination already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    Skip,
    Overwrite,
    UniqueName,
    Fail,
    OverwriteIfSizeDiffers,
    OverwriteIfSizeEqual,
    OverwriteIfSourceLarger,
    OverwriteIfSourceLargerOrEqual,
    OverwriteIfSourceSmaller,
    OverwriteIfSourceSmallerOrEqual,
}

impl ConflictPolicy {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "skip" => Some(Self::Skip),
            "overwrite" => Some(Self::Overwrite),
            "unique_name" => Some(Self::UniqueName),
            "fail" => Some(Self::Fail),
            "overwrite_if_size_differs" => Some(Self::OverwriteIfSizeDiffers),
            "overwrite_if_size_equal" => Some(Self::OverwriteIfSizeEqual),
            "overwrite_if_source_larger" => Some(Self::OverwriteIfSourceLarger),
            "overwrite_if_source_larger_or_equal" => Some(Self::OverwriteIfSourceLargerOrEqual),
            "overwrite_if_source_smaller" => Some(Self::OverwriteIfSourceSmaller),
            "overwrite_if_source_smaller_or_equal" => Some(Self::OverwriteIfSourceSmallerOrEqual),
            _ => None,
        }
    }
}

/// Batch-level policy converting accumulated counters into one
/// pass/fail outcome. The associated limit lives in
/// [`BatchConfig::success_limit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuccessCondition {
    #[serde(rename = "success_if_no_errors")]
    NoErrors,
    #[serde(rename = "success_if_at_least")]
    AtLeastLimitSucceed,
    #[serde(rename = "success_if_errors_less")]
    ErrorsBelowLimit,
}

impl SuccessCondition {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "success_if_no_errors" => Some(Self::NoErrors),
            "success_if_at_least" => Some(Self::AtLeastLimitSucceed),
            "success_if_errors_less" => Some(Self::ErrorsBelowLimit),
            _ => None,
        }
    }
}

/// Optional cleanup applied to a unit's original path once its entries
/// are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostActionKind {
    Nothing,
    Delete,
    Move,
}

impl PostActionKind {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "nothing" => Some(Self::Nothing),
            "delete" => Some(Self::Delete),
            "move" => Some(Self::Move),
            _ => None,
        }
    }
}

/// Restricted collision policy for the post-action move path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveConflictPolicy {
    Fail,
    Overwrite,
    UniqueName,
}

impl MoveConflictPolicy {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "fail" => Some(Self::Fail),
            "overwrite" => Some(Self::Overwrite),
            "unique_name" => Some(Self::UniqueName),
            _ => None,
        }
    }
}

/// Timestamp-suffix options for destination file names.
///
/// `specify_format` takes precedence over `add_date`/`add_time` when a
/// non-empty `date_time_format` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingOptions {
    pub add_date: bool,
    pub add_time: bool,
    pub specify_format: bool,
    /// chrono strftime pattern used when `specify_format` is set.
    pub date_time_format: Option<String>,
    /// Insert the suffix between stem and extension (default) instead of
    /// after the full original name.
    pub date_before_extension: bool,
    /// Use the source entry's modification time instead of the wall
    /// clock as the timestamp basis.
    pub use_source_timestamp: bool,
}

impl Default for NamingOptions {
    fn default() -> Self {
        Self {
            add_date: false,
            add_time: false,
            specify_format: false,
            date_time_format: None,
            date_before_extension: true,
            use_source_timestamp: false,
        }
    }
}

/// Raw option map handed over by the step-configuration collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepArgs {
    pub args: HashMap<String, Value>,
}

impl StepArgs {
    fn opt_str(&self, key: &str) -> Result<Option<String>, ConfigError> {
        match self.args.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_str()
                .map(|s| Some(s.to_string()))
                .ok_or_else(|| ConfigError::InvalidArgValue {
                    arg: key.to_string(),
                    value: value.to_string(),
                    reason: format!("{key} must be a string"),
                }),
        }
    }

    fn opt_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        match self.args.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| ConfigError::InvalidArgValue {
                    arg: key.to_string(),
                    value: value.to_string(),
                    reason: format!("{key} must be a boolean"),
                }),
        }
    }

    fn opt_u32(&self, key: &str) -> Result<Option<u32>, ConfigError> {
        match self.args.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .map(|n| Some(n as u32))
                .ok_or_else(|| ConfigError::InvalidArgValue {
                    arg: key.to_string(),
                    value: value.to_string(),
                    reason: format!("{key} must be a non-negative integer"),
                }),
        }
    }

    fn req_str(&self, key: &str) -> Result<String, ConfigError> {
        self.opt_str(key)?
            .ok_or_else(|| ConfigError::MissingRequiredArg {
                arg: key.to_string(),
            })
    }
}

/// Full configuration of one batch run. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub operation: Operation,
    /// Root path of the configured source unit. Ignored when
    /// `from_previous_rows` is set.
    pub source_path: Option<String>,
    /// Include wildcard matched against the full archive member path.
    pub wildcard: Option<String>,
    /// Exclude wildcard matched against the full archive member path.
    pub wildcard_exclude: Option<String>,
    /// Wildcard matched against the base name of files found inside a
    /// folder unit.
    pub wildcard_source: Option<String>,
    pub target_directory: String,
    pub create_target_directory: bool,
    pub move_to_directory: Option<String>,
    pub create_move_to_directory: bool,
    pub if_file_exists: ConflictPolicy,
    pub success_condition: SuccessCondition,
    /// Resolved limit for `success_if_at_least` / `success_if_errors_less`.
    pub success_limit: u32,
    pub naming: NamingOptions,
    pub post_action: PostActionKind,
    pub if_moved_file_exists: MoveConflictPolicy,
    pub from_previous_rows: bool,
    pub include_subfolders: bool,
    /// Keep only the base name when re-rooting entries under the target
    /// directory.
    pub flatten_folder_structure: bool,
    pub add_files_to_result_list: bool,
    /// Extract into a sub-folder named after the archive's stem.
    pub create_root_folder: bool,
    /// Restore each extracted file's modification time from the member.
    pub set_original_mtime: bool,
    /// Run the whole decision pipeline without touching the file system.
    pub simulate: bool,
    /// Propagate folder entries when no wildcard is configured.
    pub move_empty_folders: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            operation: Operation::Extract,
            source_path: None,
            wildcard: None,
            wildcard_exclude: None,
            wildcard_source: None,
            target_directory: String::new(),
            create_target_directory: false,
            move_to_directory: None,
            create_move_to_directory: false,
            if_file_exists: ConflictPolicy::Skip,
            success_condition: SuccessCondition::NoErrors,
            success_limit: 0,
            naming: NamingOptions::default(),
            post_action: PostActionKind::Nothing,
            if_moved_file_exists: MoveConflictPolicy::Fail,
            from_previous_rows: false,
            include_subfolders: false,
            flatten_folder_structure: false,
            add_files_to_result_list: false,
            create_root_folder: false,
            set_original_mtime: false,
            simulate: false,
            move_empty_folders: true,
        }
    }
}

impl BatchConfig {
    /// Build a configuration from the raw option map, validating types
    /// and enum codes. Path-level checks (target directory existence and
    /// the like) happen at batch start, not here.
    pub fn from_step_args(args: &StepArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let operation = args.req_str("operation")?;
        config.operation = match operation.as_str() {
            "extract" => Operation::Extract,
            "relocate" => Operation::Relocate,
            other => {
                return Err(ConfigError::InvalidArgValue {
                    arg: "operation".to_string(),
                    value: other.to_string(),
                    reason: "expected one of: extract, relocate".to_string(),
                })
            }
        };

        config.source_path = args.opt_str("source_path")?;
        config.wildcard = args.opt_str("wildcard")?;
        config.wildcard_exclude = args.opt_str("wildcard_exclude")?;
        config.wildcard_source = args.opt_str("wildcard_source")?;
        config.target_directory = args.req_str("target_directory")?;
        config.move_to_directory = args.opt_str("move_to_directory")?;

        if let Some(code) = args.opt_str("if_file_exists")? {
            config.if_file_exists =
                ConflictPolicy::from_code(&code).ok_or_else(|| ConfigError::InvalidArgValue {
                    arg: "if_file_exists".to_string(),
                    value: code.clone(),
                    reason: "unknown conflict policy code".to_string(),
                })?;
        }

        if let Some(code) = args.opt_str("success_condition")? {
            config.success_condition =
                SuccessCondition::from_code(&code).ok_or_else(|| ConfigError::InvalidArgValue {
                    arg: "success_condition".to_string(),
                    value: code.clone(),
                    reason: "unknown success condition code".to_string(),
                })?;
        }

        if let Some(code) = args.opt_str("post_action")? {
            config.post_action =
                PostActionKind::from_code(&code).ok_or_else(|| ConfigError::InvalidArgValue {
                    arg: "post_action".to_string(),
                    value: code.clone(),
                    reason: "expected one of: nothing, delete, move".to_string(),
                })?;
        }

        if let Some(code) = args.opt_str("if_moved_file_exists")? {
            config.if_moved_file_exists = MoveConflictPolicy::from_code(&code).ok_or_else(|| {
                ConfigError::InvalidArgValue {
                    arg: "if_moved_file_exists".to_string(),
                    value: code.clone(),
                    reason: "expected one of: fail, overwrite, unique_name".to_string(),
                }
            })?;
        }

        if let Some(limit) = args.opt_u32("success_limit")? {
            config.success_limit = limit;
        }

        config.naming = NamingOptions {
            add_date: args.opt_bool("add_date")?.unwrap_or(false),
            add_time: args.opt_bool("add_time")?.unwrap_or(false),
            specify_format: args.opt_bool("specify_format")?.unwrap_or(false),
            date_time_format: args.opt_str("date_time_format")?,
            date_before_extension: args.opt_bool("date_before_extension")?.unwrap_or(true),
            use_source_timestamp: args.opt_bool("use_source_timestamp")?.unwrap_or(false),
        };

        if let Some(flag) = args.opt_bool("create_target_directory")? {
            config.create_target_directory = flag;
        }
        if let Some(flag) = args.opt_bool("create_move_to_directory")? {
            config.create_move_to_directory = flag;
        }
        if let Some(flag) = args.opt_bool("from_previous_rows")? {
            config.from_previous_rows = flag;
        }
        if let Some(flag) = args.opt_bool("include_subfolders")? {
            config.include_subfolders = flag;
        }
        if let Some(flag) = args.opt_bool("flatten_folder_structure")? {
            config.flatten_folder_structure = flag;
        }
        if let Some(flag) = args.opt_bool("add_files_to_result_list")? {
            config.add_files_to_result_list = flag;
        }
        if let Some(flag) = args.opt_bool("create_root_folder")? {
            config.create_root_folder = flag;
        }
        if let Some(flag) = args.opt_bool("set_original_mtime")? {
            config.set_original_mtime = flag;
        }
        if let Some(flag) = args.opt_bool("simulate")? {
            config.simulate = flag;
        }
        if let Some(flag) = args.opt_bool("move_empty_folders")? {
            config.move_empty_folders = flag;
        }

        Ok(config)
    }
}
