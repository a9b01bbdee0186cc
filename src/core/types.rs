//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`NamespacePath`] - Delimited package/namespace path (`ch.frankel.blog`)
//! - [`RootPrefix`] - The namespace prefix stripped from every file
//! - [`SourcePath`] - Project-relative file path (directories + filename)
//! - [`BaseDir`] - Conventional top-level source directory
//! - [`FileRecord`] - A source file's namespace paired with its location
//! - [`UtcTimestamp`] - RFC3339 timestamp
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use flatlayout::core::types::{NamespacePath, SourcePath};
//!
//! let ns = NamespacePath::parse("ch.frankel.blog", '.').unwrap();
//! assert_eq!(ns.len(), 3);
//!
//! let path = SourcePath::parse("src/main/kotlin/Foo.kt").unwrap();
//! assert_eq!(path.file_name(), "Foo.kt");
//!
//! assert!(NamespacePath::parse("ch..blog", '.').is_err());
//! assert!(SourcePath::parse("../Foo.kt").is_err());
//! ```

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid namespace path: {0}")]
    InvalidNamespace(String),

    #[error("invalid source path: {0}")]
    InvalidSourcePath(String),

    #[error("invalid base directory: {0}")]
    InvalidBaseDir(String),

    #[error("invalid delimiter: {0}")]
    InvalidDelimiter(String),
}

/// Characters that may never appear inside a namespace segment.
///
/// Segments become directory names, so path separators are excluded
/// regardless of the configured delimiter.
const FORBIDDEN_SEGMENT_CHARS: [char; 3] = ['.', '/', '\\'];

/// Check that a character can serve as a namespace delimiter.
///
/// # Errors
///
/// Returns `TypeError::InvalidDelimiter` for alphanumerics, `_`, and whitespace.
pub fn validate_delimiter(delimiter: char) -> Result<(), TypeError> {
    if delimiter.is_alphanumeric() || delimiter == '_' || delimiter.is_whitespace() {
        return Err(TypeError::InvalidDelimiter(format!(
            "'{delimiter}' cannot separate identifiers"
        )));
    }
    Ok(())
}

/// An ordered sequence of namespace segments.
///
/// Externally a namespace is a single delimited string such as
/// `ch.frankel.blog`. Internally only the segments are kept, so comparisons
/// are always segment-aware: `com.example` is not a prefix of
/// `com.exemplary`.
///
/// The empty path (no segments) is representable; it is what a
/// [`RootPrefix`] holds when files share no leading segment.
///
/// # Example
///
/// ```
/// use flatlayout::core::types::NamespacePath;
///
/// let a = NamespacePath::parse("com.example.app", '.').unwrap();
/// let b = NamespacePath::parse("com.exemplary", '.').unwrap();
///
/// assert_eq!(a.common_prefix(&b).to_string(), "com");
/// assert!(a.starts_with(&NamespacePath::parse("com.example", '.').unwrap()));
/// assert!(!b.starts_with(&NamespacePath::parse("com.example", '.').unwrap()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NamespacePath {
    segments: Vec<String>,
}

impl NamespacePath {
    /// The empty namespace path.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a delimited namespace string.
    ///
    /// An empty string parses to the empty path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidNamespace` on empty segments (leading,
    /// trailing, or doubled delimiters), whitespace, or path separators
    /// inside a segment.
    pub fn parse(value: &str, delimiter: char) -> Result<Self, TypeError> {
        validate_delimiter(delimiter)?;
        if value.is_empty() {
            return Ok(Self::empty());
        }

        let segments = value
            .split(delimiter)
            .map(|segment| Self::validate_segment(value, segment).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }

    /// Build a namespace path from already-split segments.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidNamespace` if any segment is invalid.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        let joined = segments.join(".");
        for segment in &segments {
            Self::validate_segment(&joined, segment)?;
        }
        Ok(Self { segments })
    }

    fn validate_segment<'a>(whole: &str, segment: &'a str) -> Result<&'a str, TypeError> {
        if segment.is_empty() {
            return Err(TypeError::InvalidNamespace(format!(
                "'{whole}' contains an empty segment"
            )));
        }
        if segment.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidNamespace(format!(
                "segment '{segment}' of '{whole}' contains whitespace"
            )));
        }
        if segment.contains(FORBIDDEN_SEGMENT_CHARS) {
            return Err(TypeError::InvalidNamespace(format!(
                "segment '{segment}' of '{whole}' contains a path separator"
            )));
        }
        Ok(segment)
    }

    /// The namespace segments in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether `prefix` is a full-segment prefix of this path.
    ///
    /// Every path starts with the empty path.
    pub fn starts_with(&self, prefix: &NamespacePath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Segments remaining after removing `prefix`, or `None` if `prefix`
    /// does not lead this path.
    pub fn strip_prefix(&self, prefix: &NamespacePath) -> Option<&[String]> {
        self.segments.strip_prefix(prefix.segments.as_slice())
    }

    /// Longest shared segment prefix of two paths (possibly empty).
    pub fn common_prefix(&self, other: &NamespacePath) -> NamespacePath {
        let shared = self
            .segments
            .iter()
            .zip(&other.segments)
            .take_while(|(a, b)| a == b)
            .count();
        Self {
            segments: self.segments[..shared].to_vec(),
        }
    }

    /// Render with an explicit delimiter.
    pub fn join(&self, delimiter: char) -> String {
        self.segments.join(delimiter.to_string().as_str())
    }
}

impl TryFrom<String> for NamespacePath {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s, '.')
    }
}

impl From<NamespacePath> for String {
    fn from(path: NamespacePath) -> Self {
        path.join('.')
    }
}

impl std::fmt::Display for NamespacePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.join('.'))
    }
}

/// The namespace prefix considered redundant for the whole project.
///
/// Either configured once by the operator or computed once by discovery,
/// then frozen for the rewrite pass. An empty root means "nothing to
/// flatten".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RootPrefix(NamespacePath);

impl RootPrefix {
    /// The empty root; rewriting with it never moves anything.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether there is nothing to strip.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The underlying namespace path.
    pub fn as_namespace(&self) -> &NamespacePath {
        &self.0
    }
}

impl From<NamespacePath> for RootPrefix {
    fn from(path: NamespacePath) -> Self {
        Self(path)
    }
}

impl std::fmt::Display for RootPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A project-relative file location: directory segments plus a filename.
///
/// Only plain, UTF-8 path components are accepted, so a `SourcePath` can
/// never escape the project root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourcePath {
    dirs: Vec<String>,
    file_name: String,
}

impl SourcePath {
    /// Build from directory segments and a filename.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidSourcePath` if the filename or any
    /// directory segment is empty or not a plain component.
    pub fn new<I, S>(dirs: I, file_name: impl Into<String>) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dirs: Vec<String> = dirs.into_iter().map(Into::into).collect();
        let file_name = file_name.into();
        for component in dirs.iter().chain(std::iter::once(&file_name)) {
            if component.is_empty()
                || component == "."
                || component == ".."
                || component.contains(['/', '\\'])
            {
                return Err(TypeError::InvalidSourcePath(format!(
                    "'{component}' is not a plain path component"
                )));
            }
        }
        Ok(Self { dirs, file_name })
    }

    /// Parse a `/`-separated relative path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidSourcePath` for empty, absolute, or
    /// parent-relative paths.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        Self::from_relative(Path::new(value))
    }

    /// Convert a relative filesystem path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidSourcePath` if the path is absolute,
    /// contains `..`, is not UTF-8, or has no filename.
    pub fn from_relative(path: &Path) -> Result<Self, TypeError> {
        let mut parts = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => {
                    let part = part.to_str().ok_or_else(|| {
                        TypeError::InvalidSourcePath(format!(
                            "'{}' is not valid UTF-8",
                            path.display()
                        ))
                    })?;
                    parts.push(part.to_string());
                }
                Component::CurDir => {}
                _ => {
                    return Err(TypeError::InvalidSourcePath(format!(
                        "'{}' must be relative to the project root",
                        path.display()
                    )))
                }
            }
        }

        let file_name = parts.pop().ok_or_else(|| {
            TypeError::InvalidSourcePath(format!("'{}' has no filename", path.display()))
        })?;
        Ok(Self {
            dirs: parts,
            file_name,
        })
    }

    /// Directory segments leading to the file.
    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    /// The filename (last component).
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The parent directory as a relative path (empty for top-level files).
    pub fn parent(&self) -> PathBuf {
        self.dirs.iter().collect()
    }

    /// Relative path suitable for joining onto the project root.
    pub fn to_path_buf(&self) -> PathBuf {
        let mut path = self.parent();
        path.push(&self.file_name);
        path
    }

    /// Absolute location under `root`.
    pub fn under(&self, root: &Path) -> PathBuf {
        root.join(self.to_path_buf())
    }
}

impl TryFrom<String> for SourcePath {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<SourcePath> for String {
    fn from(path: SourcePath) -> Self {
        path.to_string()
    }
}

impl std::fmt::Display for SourcePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for dir in &self.dirs {
            write!(f, "{dir}/")?;
        }
        write!(f, "{}", self.file_name)
    }
}

/// The conventional top-level source directory flattened files land in.
///
/// `"."` denotes the project root itself.
///
/// # Example
///
/// ```
/// use flatlayout::core::types::BaseDir;
///
/// let base = BaseDir::parse("src/main/kotlin").unwrap();
/// let path = base.place(&["foo".to_string()], "Foo.kt");
/// assert_eq!(path.to_string(), "src/main/kotlin/foo/Foo.kt");
///
/// assert!(BaseDir::parse("/abs").is_err());
/// assert!(BaseDir::parse("src/../kotlin").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BaseDir(Vec<String>);

impl BaseDir {
    /// Parse a `/`-separated relative directory.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBaseDir` for empty, absolute, or
    /// parent-relative values.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        let trimmed = value.trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(TypeError::InvalidBaseDir(format!(
                "'{value}' is empty or absolute"
            )));
        }
        if trimmed.starts_with('/') || trimmed.starts_with('\\') {
            return Err(TypeError::InvalidBaseDir(format!(
                "'{value}' must be relative to the project root"
            )));
        }

        let mut segments = Vec::new();
        for segment in trimmed.split(['/', '\\']) {
            match segment {
                "." => {}
                "" | ".." => {
                    return Err(TypeError::InvalidBaseDir(format!(
                        "'{value}' contains an empty or '..' component"
                    )))
                }
                s => segments.push(s.to_string()),
            }
        }
        Ok(Self(segments))
    }

    /// The project root itself (`"."`).
    pub fn project_root() -> Self {
        Self(Vec::new())
    }

    /// Directory segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether `path` lies under this directory.
    pub fn contains(&self, path: &SourcePath) -> bool {
        path.dirs().starts_with(&self.0)
    }

    /// Relative path of the base directory.
    pub fn to_path_buf(&self) -> PathBuf {
        self.0.iter().collect()
    }

    /// Place `file_name` under this directory and the given sub-directories.
    pub fn place(&self, sub_dirs: &[String], file_name: &str) -> SourcePath {
        SourcePath {
            dirs: self.0.iter().chain(sub_dirs).cloned().collect(),
            file_name: file_name.to_string(),
        }
    }
}

impl TryFrom<String> for BaseDir {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<BaseDir> for String {
    fn from(dir: BaseDir) -> Self {
        dir.to_string()
    }
}

impl std::fmt::Display for BaseDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.0.join("/"))
        }
    }
}

/// A source file as seen by the flattening core.
///
/// Records are never mutated in place: rewriting produces a new record via
/// [`FileRecord::with_path`], leaving the original available for preview
/// and rollback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Declared namespace, if the file has one.
    pub namespace: Option<NamespacePath>,
    /// Current project-relative location.
    pub path: SourcePath,
}

impl FileRecord {
    /// Create a record.
    pub fn new(namespace: Option<NamespacePath>, path: SourcePath) -> Self {
        Self { namespace, path }
    }

    /// A copy of this record relocated to `path`.
    pub fn with_path(&self, path: SourcePath) -> Self {
        Self {
            namespace: self.namespace.clone(),
            path,
        }
    }
}

/// A UTC timestamp, serialized as RFC3339.
///
/// # Example
///
/// ```
/// use flatlayout::core::types::UtcTimestamp;
///
/// let now = UtcTimestamp::now();
/// println!("Current time: {}", now);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }

    /// Create a timestamp from a chrono DateTime.
    pub fn from_datetime(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self(dt)
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &chrono::DateTime<chrono::Utc> {
        &self.0
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
