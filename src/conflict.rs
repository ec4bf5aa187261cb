//! Conflict resolution: decide whether an entry may replace an existing
//! destination.

use crate::config::ConflictPolicy;

/// Outcome of a conflict check for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Write the entry. For [`ConflictPolicy::UniqueName`] the caller
    /// must additionally mint a collision-free destination name.
    Proceed,
    /// Leave the destination alone; the entry counts toward neither
    /// success nor failure.
    Skip,
    /// Count one error for this entry.
    Fail,
}

/// Pure decision function over destination existence, sizes, and the
/// configured policy. A missing destination always proceeds.
pub fn decide(
    destination_exists: bool,
    destination_size: u64,
    entry_size: u64,
    policy: ConflictPolicy,
) -> Decision {
    if !destination_exists {
        return Decision::Proceed;
    }

    match policy {
        ConflictPolicy::Skip => Decision::Skip,
        ConflictPolicy::Overwrite => Decision::Proceed,
        ConflictPolicy::UniqueName => Decision::Proceed,
        ConflictPolicy::Fail => Decision::Fail,
        ConflictPolicy::OverwriteIfSizeDiffers => {
            size_gate(entry_size != destination_size)
        }
        ConflictPolicy::OverwriteIfSizeEqual => size_gate(entry_size == destination_size),
        ConflictPolicy::OverwriteIfSourceLarger => size_gate(entry_size > destination_size),
        ConflictPolicy::OverwriteIfSourceLargerOrEqual => {
            size_gate(entry_size >= destination_size)
        }
        ConflictPolicy::OverwriteIfSourceSmaller => size_gate(entry_size < destination_size),
        ConflictPolicy::OverwriteIfSourceSmallerOrEqual => {
            size_gate(entry_size <= destination_size)
        }
    }
}

fn size_gate(overwrite: bool) -> Decision {
    if overwrite {
        Decision::Proceed
    } else {
        Decision::Skip
    }
}
