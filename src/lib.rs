//! filebatch - batch file-operation engine for workflow steps
//!
//! This crate implements the shared core of bulk file-processing steps:
//! wildcard-driven enumeration over files and archive members, a
//! conflict-resolution policy for existing destinations, timestamp-based
//! destination naming, per-unit post-actions, and a batch-level
//! success/failure state machine with early termination.
//!
//! The surrounding job engine supplies the configuration, the previous
//! step's rows, and a cooperative stop flag; everything file-system
//! shaped goes through the [`vfs::Vfs`] collaborator.

pub mod config;
pub mod conflict;
pub mod enumerate;
pub mod error;
pub mod naming;
pub mod post_action;
pub mod runner;
pub mod vfs;

pub use config::{
    BatchConfig, ConflictPolicy, MoveConflictPolicy, NamingOptions, Operation, PostActionKind,
    SourceUnit, StepArgs, SuccessCondition,
};
pub use error::{ConfigError, VfsError};
pub use runner::{run_batch, BatchResult, BatchRunner, Counters, SuccessEvaluator};
pub use vfs::{CandidateEntry, LocalVfs, Vfs};
