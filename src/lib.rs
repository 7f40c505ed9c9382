pub mod changeset;
pub mod cli;
pub mod config;
pub mod errors;
pub mod git;
pub mod utils;

pub use errors::ChangesetError;
