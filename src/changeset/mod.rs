//! Change-set splitting
//!
//! Turns one working copy full of pending changes into a chain of branches:
//! - Manifest loading and validation
//! - Path spec resolution against a pending snapshot
//! - A dry-run plan of which paths each change-set will take
//! - Per change-set branch/stage/commit execution
//! - The chain controller for sibling and stacked topologies
//! - Run reports

pub mod chain;
pub mod executor;
pub mod manifest;
pub mod report;
pub mod resolver;

pub use chain::{BranchChainController, ChainContext, RunOptions, TopologyMode};
pub use executor::StagingExecutor;
pub use manifest::{ChangeSet, Manifest, PathSpec, CATCH_ALL};
pub use report::{BranchChainEntry, GroupOutcome, Halt, RunReport, Step};
pub use resolver::{filter_excluded, plan, Assignment, PathResolver, Plan};
