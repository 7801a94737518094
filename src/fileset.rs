//! File set computation: walking include/omit paths and filtering them into
//! the set of files a backup run copies.

use crate::resolve::{PathResolver, ProjectPath};
use std::collections::HashSet;
use std::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Relative path suffixes that are never copied (OS metadata files)
pub const DEFAULT_IGNORE: &[&str] = &[".DS_Store"];

/// Recursively walk `paths` and return every existing non-directory file.
///
/// Paths that cannot be resolved are reported and skipped; the rest of the
/// batch is still walked.
pub fn walk<I, S>(resolver: &PathResolver, paths: I) -> HashSet<ProjectPath>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut files = HashSet::new();

    for input in paths {
        let input = input.as_ref();
        let path = match resolver.resolve(input, true) {
            Ok(path) => path,
            Err(e) => {
                warn!("{}. Skipping.", e);
                continue;
            }
        };

        if !path.absolute().is_dir() {
            if path.absolute().is_file() {
                files.insert(path);
            } else {
                warn!("{} is not a regular file. Skipping.", path);
            }
            continue;
        }

        for entry in WalkDir::new(path.absolute()).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping entry due to error: {}", e);
                    continue;
                }
            };

            // Symlinked directories are neither followed nor kept. Pipes,
            // sockets and devices could block a copy.
            if !entry.path().is_file() {
                if !entry.path().is_dir() {
                    debug!("Skipping special file {}", entry.path().display());
                }
                continue;
            }

            match resolver.from_walked(entry.path()) {
                Ok(file) => {
                    files.insert(file);
                }
                Err(e) => warn!("{}. Skipping.", e),
            }
        }
    }

    debug!("Walked {} files", files.len());
    files
}

/// Sum of on-disk sizes of `files` at call time.
///
/// Files that vanished since they were walked count as zero bytes.
pub fn size_of<'a, I>(files: I) -> u64
where
    I: IntoIterator<Item = &'a ProjectPath>,
{
    files
        .into_iter()
        .map(|file| fs::metadata(file.absolute()).map(|m| m.len()).unwrap_or(0))
        .sum()
}

/// Accumulated include and omit sets of a session
#[derive(Debug, Clone, Default)]
pub struct FileSetEngine {
    walked: HashSet<ProjectPath>,
    omitted: HashSet<ProjectPath>,
}

impl FileSetEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk `paths` and add the files to the include set
    pub fn include<I, S>(&mut self, resolver: &PathResolver, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.walked.extend(walk(resolver, paths));
    }

    /// Walk `paths` and add the files to the omit set
    pub fn omit<I, S>(&mut self, resolver: &PathResolver, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.omitted.extend(walk(resolver, paths));
    }

    pub fn walked(&self) -> &HashSet<ProjectPath> {
        &self.walked
    }

    pub fn omitted(&self) -> &HashSet<ProjectPath> {
        &self.omitted
    }

    /// Files a backup run would copy right now.
    ///
    /// `walked - destination subtree - ignored suffixes - omitted`, computed
    /// fresh on every call.
    pub fn effective_copy_set<S: AsRef<str>>(
        &self,
        destination: &ProjectPath,
        ignore: &[S],
    ) -> HashSet<ProjectPath> {
        self.walked
            .iter()
            .filter(|file| !is_excluded(file, destination, ignore))
            .filter(|file| !self.omitted.contains(*file))
            .cloned()
            .collect()
    }

    /// Walked files dropped by the destination or default-ignore filters
    pub fn ignored<S: AsRef<str>>(
        &self,
        destination: &ProjectPath,
        ignore: &[S],
    ) -> HashSet<ProjectPath> {
        self.walked
            .iter()
            .filter(|file| is_excluded(file, destination, ignore))
            .cloned()
            .collect()
    }
}

fn is_excluded<S: AsRef<str>>(file: &ProjectPath, destination: &ProjectPath, ignore: &[S]) -> bool {
    file.is_under(destination) || ignore.iter().any(|suffix| file.ends_with_str(suffix.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::TempDir;

    fn relatives(set: &HashSet<ProjectPath>) -> Vec<String> {
        let mut paths: Vec<String> = set
            .iter()
            .map(|p| p.relative().to_string_lossy().into_owned())
            .collect();
        paths.sort();
        paths
    }

    fn write(root: &Path, relative: &str, bytes: usize) -> Result<()> {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, vec![b'x'; bytes])?;
        Ok(())
    }

    fn setup() -> Result<(TempDir, PathResolver)> {
        let temp_dir = TempDir::new()?;
        write(temp_dir.path(), "a.txt", 10)?;
        write(temp_dir.path(), ".DS_Store", 1)?;
        write(temp_dir.path(), "backup/old.txt", 5)?;
        write(temp_dir.path(), "backupfoo/keep.txt", 3)?;
        write(temp_dir.path(), "data/img.jpg", 4)?;
        write(temp_dir.path(), "data/sub/file.txt", 6)?;
        fs::create_dir_all(temp_dir.path().join("empty"))?;
        let resolver = PathResolver::new(temp_dir.path())?;
        Ok((temp_dir, resolver))
    }

    #[test]
    fn test_walk_keeps_only_files() -> Result<()> {
        let (_temp_dir, resolver) = setup()?;

        let files = walk(&resolver, ["data", "empty", "a.txt"]);
        assert_eq!(
            relatives(&files),
            vec!["a.txt", "data/img.jpg", "data/sub/file.txt"]
        );
        Ok(())
    }

    #[test]
    fn test_walk_skips_bad_entries() -> Result<()> {
        let (_temp_dir, resolver) = setup()?;

        let files = walk(&resolver, ["missing", "../outside", "a.txt"]);
        assert_eq!(relatives(&files), vec!["a.txt"]);
        Ok(())
    }

    #[test]
    fn test_include_is_idempotent() -> Result<()> {
        let (_temp_dir, resolver) = setup()?;

        let mut once = FileSetEngine::new();
        once.include(&resolver, ["data"]);

        let mut twice = FileSetEngine::new();
        twice.include(&resolver, ["data"]);
        twice.include(&resolver, ["/data/", "data/sub"]);

        assert_eq!(once.walked(), twice.walked());
        Ok(())
    }

    #[test]
    fn test_effective_copy_set_scenario() -> Result<()> {
        let (temp_dir, resolver) = setup()?;
        fs::remove_dir_all(temp_dir.path().join("data"))?;
        fs::remove_dir_all(temp_dir.path().join("backupfoo"))?;

        let mut engine = FileSetEngine::new();
        engine.include(&resolver, ["/"]);
        let destination = resolver.resolve("backup", false)?;

        let copy_set = engine.effective_copy_set(&destination, DEFAULT_IGNORE);
        assert_eq!(relatives(&copy_set), vec!["a.txt"]);
        assert_eq!(size_of(&copy_set), 10);

        let ignored = engine.ignored(&destination, DEFAULT_IGNORE);
        assert_eq!(relatives(&ignored), vec![".DS_Store", "backup/old.txt"]);
        Ok(())
    }

    #[test]
    fn test_destination_is_segment_prefix() -> Result<()> {
        let (_temp_dir, resolver) = setup()?;

        let mut engine = FileSetEngine::new();
        engine.include(&resolver, ["backup", "backupfoo"]);
        let destination = resolver.resolve("backup", false)?;

        let copy_set = engine.effective_copy_set(&destination, DEFAULT_IGNORE);
        assert_eq!(relatives(&copy_set), vec!["backupfoo/keep.txt"]);
        Ok(())
    }

    #[test]
    fn test_omit_removes_files() -> Result<()> {
        let (_temp_dir, resolver) = setup()?;

        let mut engine = FileSetEngine::new();
        engine.omit(&resolver, ["data/img.jpg"]);
        engine.include(&resolver, ["data"]);
        let destination = resolver.resolve("simplebackup", false)?;

        let copy_set = engine.effective_copy_set(&destination, DEFAULT_IGNORE);
        assert_eq!(relatives(&copy_set), vec!["data/sub/file.txt"]);
        assert_eq!(relatives(engine.omitted()), vec!["data/img.jpg"]);
        Ok(())
    }

    #[test]
    fn test_ignore_is_suffix_match() -> Result<()> {
        let (temp_dir, resolver) = setup()?;
        write(temp_dir.path(), "notes.DS_Store", 2)?;
        write(temp_dir.path(), "data/.DS_Store", 2)?;

        let mut engine = FileSetEngine::new();
        engine.include(&resolver, ["/"]);
        let destination = resolver.resolve("backup", false)?;

        let copy_set = engine.effective_copy_set(&destination, DEFAULT_IGNORE);
        assert!(copy_set.iter().all(|p| !p.ends_with_str(".DS_Store")));
        assert_eq!(engine.ignored(&destination, DEFAULT_IGNORE).len(), 4);
        Ok(())
    }

    #[test]
    fn test_size_of_missing_file_is_zero() -> Result<()> {
        let (temp_dir, resolver) = setup()?;

        let files = walk(&resolver, ["a.txt", "data/img.jpg"]);
        assert_eq!(size_of(&files), 14);

        fs::remove_file(temp_dir.path().join("a.txt"))?;
        assert_eq!(size_of(&files), 4);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_skips_special_files() -> Result<()> {
        let (temp_dir, resolver) = setup()?;
        let _listener = std::os::unix::net::UnixListener::bind(temp_dir.path().join("data/app.sock"))?;

        let files = walk(&resolver, ["data", "data/app.sock"]);
        assert_eq!(relatives(&files), vec!["data/img.jpg", "data/sub/file.txt"]);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_skips_symlinks_leaving_root() -> Result<()> {
        let outside = TempDir::new()?;
        fs::write(outside.path().join("secret.txt"), b"secret")?;

        let (temp_dir, resolver) = setup()?;
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            temp_dir.path().join("data/secret.txt"),
        )?;
        std::os::unix::fs::symlink(
            temp_dir.path().join("a.txt"),
            temp_dir.path().join("data/alias.txt"),
        )?;

        let files = walk(&resolver, ["data"]);
        assert_eq!(
            relatives(&files),
            vec!["data/alias.txt", "data/img.jpg", "data/sub/file.txt"]
        );
        Ok(())
    }
}
