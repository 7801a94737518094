//! Path resolution confined to a project root.
//!
//! Every user supplied path string goes through [`PathResolver::resolve`]
//! before the rest of the crate touches the filesystem. Leading separators
//! are stripped, `.` and `..` are folded lexically, and the result is checked
//! against the canonical project root so that neither `..` tricks nor
//! symbolic links can reach outside of it.

use crate::{Error, Result};
use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{is_separator, Component, Path, PathBuf};

/// A path inside the project root.
///
/// Equality and hashing only look at the relative part; the absolute part is
/// derived from the root.
#[derive(Debug, Clone)]
pub struct ProjectPath {
    relative: PathBuf,
    absolute: PathBuf,
}

impl ProjectPath {
    fn new(root: &Path, relative: PathBuf) -> Self {
        let absolute = if relative.as_os_str().is_empty() {
            root.to_path_buf()
        } else {
            root.join(&relative)
        };
        Self { relative, absolute }
    }

    /// Path relative to the project root. Empty for the root itself.
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// Absolute path on disk.
    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    /// True when this path is the project root itself
    pub fn is_root(&self) -> bool {
        self.relative.as_os_str().is_empty()
    }

    /// Component-wise prefix test: `backupfoo` is not under `backup`.
    pub fn is_under(&self, other: &ProjectPath) -> bool {
        self.relative.starts_with(&other.relative)
    }

    /// Suffix test on the relative path string.
    pub fn ends_with_str(&self, suffix: &str) -> bool {
        self.relative.to_string_lossy().ends_with(suffix)
    }
}

impl PartialEq for ProjectPath {
    fn eq(&self, other: &Self) -> bool {
        self.relative == other.relative
    }
}

impl Eq for ProjectPath {}

impl Hash for ProjectPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.relative.hash(state);
    }
}

impl fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relative.display())
    }
}

/// Resolves path strings against a fixed project root
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Create a resolver for the given root directory.
    ///
    /// The root is canonicalized once; it must exist and be a directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let root = fs::canonicalize(root).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound {
                path: root.display().to_string(),
            },
            _ => Error::Io(e),
        })?;

        if !root.is_dir() {
            return Err(Error::NotADirectory { path: root });
        }

        Ok(Self { root })
    }

    /// The canonical project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a user supplied path string.
    ///
    /// Absolute-looking input is treated as root-relative. Fails with
    /// [`Error::OutsideRoot`] when the path escapes the root and, if
    /// `must_exist` is set, with [`Error::NotFound`] when nothing exists there.
    pub fn resolve(&self, input: &str, must_exist: bool) -> Result<ProjectPath> {
        let relative = normalize(input)?;
        let path = ProjectPath::new(&self.root, relative);

        if must_exist && !path.absolute.exists() {
            return Err(Error::NotFound {
                path: path.to_string(),
            });
        }

        self.ensure_contained(&path.absolute, input)?;
        Ok(path)
    }

    /// Build a [`ProjectPath`] from an absolute path found while walking.
    ///
    /// Symbolic links are followed and must land inside the root.
    pub fn from_walked(&self, absolute: &Path) -> Result<ProjectPath> {
        let relative = absolute
            .strip_prefix(&self.root)
            .map_err(|_| Error::OutsideRoot {
                path: absolute.display().to_string(),
            })?
            .to_path_buf();

        if fs::symlink_metadata(absolute)?.file_type().is_symlink() {
            let target = fs::canonicalize(absolute)?;
            if !target.starts_with(&self.root) {
                return Err(Error::OutsideRoot {
                    path: relative.display().to_string(),
                });
            }
        }

        Ok(ProjectPath::new(&self.root, relative))
    }

    /// Nest `child` under `base`, re-checking containment of the result.
    pub fn join(&self, base: &ProjectPath, child: &ProjectPath) -> Result<ProjectPath> {
        let path = ProjectPath::new(&self.root, base.relative.join(&child.relative));
        self.ensure_contained(&path.absolute, &path.to_string())?;
        Ok(path)
    }

    /// Check the canonical form of the deepest existing ancestor.
    fn ensure_contained(&self, absolute: &Path, input: &str) -> Result<()> {
        let existing = absolute
            .ancestors()
            .find(|candidate| candidate.exists())
            .unwrap_or(self.root.as_path());
        let canonical = fs::canonicalize(existing)?;

        if canonical.starts_with(&self.root) {
            Ok(())
        } else {
            Err(Error::OutsideRoot {
                path: input.trim().to_string(),
            })
        }
    }
}

/// Lexically normalize `input` into a root-relative path.
fn normalize(input: &str) -> Result<PathBuf> {
    let trimmed = input.trim().trim_start_matches(is_separator);
    let mut normalized = PathBuf::new();

    for component in Path::new(trimmed).components() {
        match component {
            Component::CurDir => {}
            Component::Normal(name) => normalized.push(name),
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(Error::OutsideRoot {
                        path: input.trim().to_string(),
                    });
                }
            }
            // Drive prefixes and UNC roots cannot be made root-relative
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::OutsideRoot {
                    path: input.trim().to_string(),
                });
            }
        }
    }

    Ok(normalized)
}
