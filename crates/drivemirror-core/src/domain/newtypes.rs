//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for paths and identifiers.
//! Each newtype ensures data validity at construction time, so the engine
//! never has to re-check a path it received from a [`RelativePath`] or
//! [`RemotePath`].

use std::fmt::{self, Display, Formatter};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// Local relative paths
// ============================================================================

/// A path relative to the local base directory
///
/// This is the canonical key used to cross-reference local files and their
/// remote counterparts. It is always non-empty, relative, UTF-8, and made only
/// of normal components (no `.`, `..`, root or prefix components).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "PathBuf", into = "PathBuf")]
pub struct RelativePath(PathBuf);

impl RelativePath {
    /// Create a new RelativePath
    ///
    /// # Errors
    /// Returns error if the path is empty, absolute, not UTF-8, or contains
    /// anything but normal components
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        let mut normalized = PathBuf::new();

        for component in path.components() {
            match component {
                Component::Normal(part) => {
                    if part.to_str().is_none() {
                        return Err(DomainError::InvalidPath(format!(
                            "Path is not valid UTF-8: {}",
                            path.display()
                        )));
                    }
                    normalized.push(part);
                }
                Component::CurDir => continue,
                Component::ParentDir => {
                    return Err(DomainError::InvalidPath(format!(
                        "Path contains traversal: {}",
                        path.display()
                    )));
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(DomainError::InvalidPath(format!(
                        "Path must be relative: {}",
                        path.display()
                    )));
                }
            }
        }

        if normalized.as_os_str().is_empty() {
            return Err(DomainError::InvalidPath("Path cannot be empty".to_string()));
        }

        Ok(Self(normalized))
    }

    /// Get the inner path reference
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Iterate over the path segments
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|c| c.to_str())
    }

    /// The last segment (file or directory name)
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.file_name().and_then(|n| n.to_str()).unwrap_or("")
    }

    /// The first segment, i.e. the name of the top-level entry this path
    /// lives under
    #[must_use]
    pub fn first_component(&self) -> &str {
        self.components().next().unwrap_or("")
    }

    /// The parent path, or `None` for a single-segment path
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let parent = self.0.parent()?;
        if parent.as_os_str().is_empty() {
            None
        } else {
            Some(Self(parent.to_path_buf()))
        }
    }

    /// Join a single name onto this path
    ///
    /// # Errors
    /// Returns error if `name` is empty or contains a separator or traversal
    pub fn join(&self, name: &str) -> Result<Self, DomainError> {
        if name.is_empty() || name == "." || name == ".." || name.contains('/') {
            return Err(DomainError::InvalidPath(format!(
                "Invalid path component: {name}"
            )));
        }
        Ok(Self(self.0.join(name)))
    }

    /// Resolve this path under a local base directory
    #[must_use]
    pub fn to_local(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.0)
    }
}

impl Display for RelativePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl FromStr for RelativePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<PathBuf> for RelativePath {
    type Error = DomainError;

    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl From<RelativePath> for PathBuf {
    fn from(path: RelativePath) -> Self {
        path.0
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

// ============================================================================
// Remote paths
// ============================================================================

/// A slash-separated path in the remote store
///
/// Remote paths are rooted at the drive's top level, so the backup folder
/// itself is `/<backup folder>` and a mirrored file is
/// `/<backup folder>/<relative path>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemotePath(String);

impl RemotePath {
    /// Create a new RemotePath
    ///
    /// # Errors
    /// Returns error if path doesn't start with `/`, contains empty segments,
    /// or contains `.`/`..` segments
    pub fn new(path: String) -> Result<Self, DomainError> {
        if !path.starts_with('/') {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path must start with '/': {path}"
            )));
        }

        // Validate no double slashes (except root)
        if path.len() > 1 && (path.contains("//") || path.ends_with('/')) {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path contains empty segments: {path}"
            )));
        }

        // Validate no path traversal
        if path.split('/').any(|segment| segment == "." || segment == "..") {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path contains invalid traversal: {path}"
            )));
        }

        Ok(Self(path))
    }

    /// Create the root path "/"
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for "/"
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Iterate over the non-empty segments, outermost first
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Join a path component
    ///
    /// # Errors
    /// Returns error if component is invalid
    pub fn join(&self, component: &str) -> Result<Self, DomainError> {
        if component.is_empty() || component.contains('/') || component == "." || component == ".."
        {
            return Err(DomainError::InvalidRemotePath(format!(
                "Invalid path component: {component}"
            )));
        }

        let new_path = if self.0 == "/" {
            format!("/{component}")
        } else {
            format!("{}/{component}", self.0)
        };

        Self::new(new_path)
    }

    /// Get the parent path
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0 == "/" {
            return None;
        }

        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Get the file name component
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        if self.0 == "/" {
            return None;
        }

        self.0.rsplit('/').next()
    }
}

impl Display for RemotePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemotePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for RemotePath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemotePath> for String {
    fn from(path: RemotePath) -> Self {
        path.0
    }
}

// ============================================================================
// Remote identifiers
// ============================================================================

/// Identifier of an entry (file or folder) in the remote store
///
/// Remote IDs end up inside store query strings, so only characters that
/// cannot break out of a quoted literal are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteId(String);

impl RemoteId {
    /// Create a new RemoteId
    ///
    /// # Errors
    /// Returns error if the ID format is invalid
    pub fn new(id: String) -> Result<Self, DomainError> {
        if id.is_empty() {
            return Err(DomainError::InvalidRemoteId(
                "Remote ID cannot be empty".to_string(),
            ));
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '!' || c == '-' || c == '_' || c == '.')
        {
            return Err(DomainError::InvalidRemoteId(format!(
                "Remote ID contains invalid characters: {id}"
            )));
        }

        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RemoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemoteId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for RemoteId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemoteId> for String {
    fn from(id: RemoteId) -> Self {
        id.0
    }
}
