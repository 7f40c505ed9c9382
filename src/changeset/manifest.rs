use crate::errors::{ChangesetError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

/// Manifest entry that claims every pending path earlier groups left behind
pub const CATCH_ALL: &str = ".";

/// One declared path entry of a change-set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSpec {
    /// A single path, matched exactly
    ExactPath(String),
    /// A directory and everything nested under it
    DirectoryMarker(String),
    /// Every pending path not claimed by an earlier change-set
    CatchAll,
}

impl PathSpec {
    /// Parse manifest syntax: `.` is the catch-all, a trailing `/` marks a
    /// directory, anything else is an exact path.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim().replace('\\', "/");
        if normalized.is_empty() {
            return Err(ChangesetError::invalid_manifest("empty path entry"));
        }
        if normalized == CATCH_ALL || normalized == "./" {
            return Ok(PathSpec::CatchAll);
        }
        if normalized.starts_with('/') {
            return Err(ChangesetError::invalid_manifest(format!(
                "path '{raw}' must be relative to the repository root"
            )));
        }

        let is_directory = normalized.ends_with('/');
        let mut segments = Vec::new();
        for segment in normalized.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(ChangesetError::invalid_manifest(format!(
                        "path '{raw}' may not contain '..'"
                    )));
                }
                other => segments.push(other),
            }
        }
        if segments.is_empty() {
            return Err(ChangesetError::invalid_manifest(format!(
                "path '{raw}' does not name anything"
            )));
        }

        let path = segments.join("/");
        if is_directory {
            Ok(PathSpec::DirectoryMarker(path))
        } else {
            Ok(PathSpec::ExactPath(path))
        }
    }

    /// Whether a pending path falls under this spec.
    ///
    /// Directory matching is segment-aware: `foo/` covers `foo/x` but not `foobar/x`.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathSpec::ExactPath(exact) => path == exact,
            PathSpec::DirectoryMarker(dir) => {
                path == dir
                    || path
                        .strip_prefix(dir.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            PathSpec::CatchAll => true,
        }
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self, PathSpec::CatchAll)
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSpec::ExactPath(path) => write!(f, "{path}"),
            PathSpec::DirectoryMarker(dir) => write!(f, "{dir}/"),
            PathSpec::CatchAll => f.write_str(CATCH_ALL),
        }
    }
}

/// A named group of pending changes destined for one branch and commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    pub name: String,
    pub branch_name: String,
    pub commit_message: String,
    pub path_specs: Vec<PathSpec>,
}

impl ChangeSet {
    pub fn new<N, B, M>(name: N, branch_name: B, commit_message: M, path_specs: Vec<PathSpec>) -> Self
    where
        N: Into<String>,
        B: Into<String>,
        M: Into<String>,
    {
        Self {
            name: name.into(),
            branch_name: branch_name.into(),
            commit_message: commit_message.into(),
            path_specs,
        }
    }

    pub fn has_catch_all(&self) -> bool {
        self.path_specs.iter().any(PathSpec::is_catch_all)
    }
}

/// On-disk shape of a manifest
#[derive(Debug, Serialize, Deserialize)]
struct ManifestFile {
    #[serde(alias = "changesets", alias = "groups")]
    change_sets: Vec<ChangeSetFile>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChangeSetFile {
    name: String,
    #[serde(alias = "branch_name")]
    branch: String,
    #[serde(alias = "commit_message")]
    message: String,
    #[serde(default)]
    paths: Vec<String>,
}

impl ChangeSetFile {
    fn into_change_set(self) -> Result<ChangeSet> {
        let path_specs = self
            .paths
            .iter()
            .map(|raw| {
                PathSpec::parse(raw).map_err(|e| match e {
                    ChangesetError::InvalidManifest(msg) => ChangesetError::invalid_manifest(
                        format!("change-set '{}': {msg}", self.name),
                    ),
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ChangeSet::new(self.name, self.branch, self.message, path_specs))
    }
}

/// Ordered, validated list of change-sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    change_sets: Vec<ChangeSet>,
}

impl Manifest {
    /// Build a manifest, rejecting anything that could misassign paths.
    pub fn new(change_sets: Vec<ChangeSet>) -> Result<Self> {
        let manifest = Self { change_sets };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load a manifest file. `.toml` files are read as TOML, everything else as JSON.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ChangesetError::invalid_manifest(format!(
                "could not read {}: {e}",
                path.display()
            ))
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: ManifestFile = serde_json::from_str(content)
            .map_err(|e| ChangesetError::invalid_manifest(format!("malformed JSON: {e}")))?;
        Self::from_file_model(file)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ManifestFile = toml::from_str(content)
            .map_err(|e| ChangesetError::invalid_manifest(format!("malformed TOML: {e}")))?;
        Self::from_file_model(file)
    }

    fn from_file_model(file: ManifestFile) -> Result<Self> {
        let change_sets = file
            .change_sets
            .into_iter()
            .map(ChangeSetFile::into_change_set)
            .collect::<Result<Vec<_>>>()?;
        Self::new(change_sets)
    }

    pub fn change_sets(&self) -> &[ChangeSet] {
        &self.change_sets
    }

    pub fn len(&self) -> usize {
        self.change_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.change_sets.is_empty()
    }

    /// Whether the manifest ends in a catch-all
    pub fn has_catch_all(&self) -> bool {
        self.change_sets.iter().any(ChangeSet::has_catch_all)
    }

    fn validate(&self) -> Result<()> {
        if self.change_sets.is_empty() {
            return Err(ChangesetError::invalid_manifest(
                "manifest declares no change-sets",
            ));
        }

        let catch_alls = self
            .change_sets
            .iter()
            .flat_map(|change_set| &change_set.path_specs)
            .filter(|spec| spec.is_catch_all())
            .count();
        if catch_alls > 1 {
            return Err(ChangesetError::invalid_manifest(
                "only one catch-all ('.') is allowed",
            ));
        }

        let mut names = HashSet::new();
        let mut branches = HashSet::new();
        let last_group = self.change_sets.len() - 1;

        for (group_index, change_set) in self.change_sets.iter().enumerate() {
            let name = change_set.name.trim();
            if name.is_empty() {
                return Err(ChangesetError::invalid_manifest(format!(
                    "change-set #{} has an empty name",
                    group_index + 1
                )));
            }
            if change_set.branch_name.trim().is_empty() {
                return Err(ChangesetError::invalid_manifest(format!(
                    "change-set '{name}' has an empty branch name"
                )));
            }
            if !git2::Branch::name_is_valid(&change_set.branch_name)? {
                return Err(ChangesetError::invalid_manifest(format!(
                    "change-set '{name}' uses invalid branch name '{}'",
                    change_set.branch_name
                )));
            }
            if change_set.commit_message.trim().is_empty() {
                return Err(ChangesetError::invalid_manifest(format!(
                    "change-set '{name}' has an empty commit message"
                )));
            }
            if change_set.path_specs.is_empty() {
                return Err(ChangesetError::invalid_manifest(format!(
                    "change-set '{name}' declares no paths"
                )));
            }
            if !names.insert(change_set.name.as_str()) {
                return Err(ChangesetError::invalid_manifest(format!(
                    "duplicate change-set name '{name}'"
                )));
            }
            if !branches.insert(change_set.branch_name.as_str()) {
                return Err(ChangesetError::invalid_manifest(format!(
                    "branch '{}' is used by more than one change-set",
                    change_set.branch_name
                )));
            }

            let last_spec = change_set.path_specs.len() - 1;
            for (spec_index, spec) in change_set.path_specs.iter().enumerate() {
                if !spec.is_catch_all() {
                    continue;
                }
                if group_index != last_group || spec_index != last_spec {
                    return Err(ChangesetError::invalid_manifest(format!(
                        "catch-all ('.') in change-set '{name}' must be the last path of the last change-set"
                    )));
                }
            }
        }

        Ok(())
    }
}
