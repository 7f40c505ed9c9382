/// Changeset Error Types
#[derive(Debug, thiserror::Error)]
pub enum ChangesetError {
    /// The working directory is not inside a git working copy
    #[error("Not a git repository: {0}")]
    NotARepository(String),

    /// HEAD does not point at a branch, so there is no base ref to return to
    #[error("HEAD is detached at {0}; check out a branch before splitting")]
    DetachedHead(String),

    /// Manifest failed validation; nothing was touched
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// A change-set's branch is already present (leftover of a prior run?)
    #[error("Branch '{0}' already exists")]
    BranchAlreadyExists(String),

    /// A path could not be staged for a reason other than being absent
    #[error("Failed to stage '{path}': {reason}")]
    PathStageFailure { path: String, reason: String },

    /// The commit was rejected even though something was staged
    #[error("Failed to commit on '{branch}': {reason}")]
    CommitFailure { branch: String, reason: String },

    /// Switching the working copy to a ref failed
    #[error("Failed to switch to '{target}': {reason}")]
    SwitchFailure { target: String, reason: String },

    /// A split run stopped part-way through the manifest
    #[error("Run halted at change-set '{group}' during {step}: {reason}")]
    RunHalted {
        group: String,
        step: String,
        reason: String,
    },

    /// Git-related errors
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// Branch management errors
    #[error("Branch error: {0}")]
    Branch(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ChangesetError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ChangesetError::Config(msg.into())
    }

    pub fn branch<S: Into<String>>(msg: S) -> Self {
        ChangesetError::Branch(msg.into())
    }

    pub fn invalid_manifest<S: Into<String>>(msg: S) -> Self {
        ChangesetError::InvalidManifest(msg.into())
    }

    pub fn stage_failure<P: Into<String>, R: Into<String>>(path: P, reason: R) -> Self {
        ChangesetError::PathStageFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn commit_failure<B: Into<String>, R: Into<String>>(branch: B, reason: R) -> Self {
        ChangesetError::CommitFailure {
            branch: branch.into(),
            reason: reason.into(),
        }
    }

    pub fn switch_failure<T: Into<String>, R: Into<String>>(target: T, reason: R) -> Self {
        ChangesetError::SwitchFailure {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Stable identifier recorded in run reports
    pub fn code(&self) -> &'static str {
        match self {
            ChangesetError::NotARepository(_) => "not_a_repository",
            ChangesetError::DetachedHead(_) => "detached_head",
            ChangesetError::InvalidManifest(_) => "invalid_manifest",
            ChangesetError::BranchAlreadyExists(_) => "branch_already_exists",
            ChangesetError::PathStageFailure { .. } => "path_stage_failure",
            ChangesetError::CommitFailure { .. } => "commit_failure",
            ChangesetError::SwitchFailure { .. } => "switch_failure",
            ChangesetError::RunHalted { .. } => "run_halted",
            ChangesetError::Git(_) => "git",
            ChangesetError::Branch(_) => "branch",
            ChangesetError::Config(_) => "config",
            ChangesetError::Io(_) => "io",
            ChangesetError::Json(_) => "json",
            ChangesetError::Toml(_) => "toml",
        }
    }
}

pub type Result<T> = std::result::Result<T, ChangesetError>;
