//! Destination file naming: timestamp suffixes and unique-name minting.
//!
//! Every function here is pure; the timestamp is an explicit parameter
//! and each call formats with its own pattern, so nothing is shared or
//! mutated across calls.

use chrono::{DateTime, Local};

use crate::config::NamingOptions;

const DATE_PATTERN: &str = "%Y%m%d";
const TIME_PATTERN: &str = "%H%M%S%3f";
const UNIQUE_PATTERN: &str = "%Y%m%d%H%M%S%3f";

/// Split a file name at the last dot. The extension keeps its leading
/// dot; a name without a dot is all stem.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    }
}

/// Compute the destination file name for `source_name` with the given
/// timestamp basis already resolved.
///
/// A non-empty custom format takes precedence over `add_date`/`add_time`.
/// With no suffix configured the name is returned unchanged.
pub fn compute_name(
    source_name: &str,
    options: &NamingOptions,
    timestamp: DateTime<Local>,
) -> String {
    let custom_format = options
        .specify_format
        .then(|| options.date_time_format.as_deref())
        .flatten()
        .filter(|pattern| !pattern.is_empty());

    let mut suffix = String::new();
    if let Some(pattern) = custom_format {
        suffix.push_str(&timestamp.format(pattern).to_string());
    } else {
        if options.add_date {
            suffix.push('_');
            suffix.push_str(&timestamp.format(DATE_PATTERN).to_string());
        }
        if options.add_time {
            suffix.push('_');
            suffix.push_str(&timestamp.format(TIME_PATTERN).to_string());
        }
    }

    if suffix.is_empty() {
        return source_name.to_string();
    }

    if options.date_before_extension {
        let (stem, ext) = split_extension(source_name);
        format!("{stem}{suffix}{ext}")
    } else {
        format!("{source_name}{suffix}")
    }
}

/// Resolve the timestamp basis and compute the destination name: the
/// source's modification time when `use_source_timestamp` is set, the
/// wall clock otherwise.
pub fn destination_name(
    source_name: &str,
    options: &NamingOptions,
    source_modified: DateTime<Local>,
) -> String {
    let timestamp = if options.use_source_timestamp {
        source_modified
    } else {
        Local::now()
    };
    compute_name(source_name, options, timestamp)
}

/// Mint a collision-free sibling of `name` by inserting a
/// millisecond-resolution timestamp before the extension.
pub fn unique_name(name: &str, timestamp: DateTime<Local>) -> String {
    let (stem, ext) = split_extension(name);
    format!("{stem}{}{ext}", timestamp.format(UNIQUE_PATTERN))
}
