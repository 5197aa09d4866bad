//! Recursive discovery and reading of list files.

use ahash::AHashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{MergeConfig, DEFAULT_COMMENT_MARKER, DEFAULT_EXTENSION};
use crate::{Error, Result};

/// Collects unique raw entries from every list file under a root directory.
///
/// # Examples
/// ```no_run
/// use k2list::Collector;
/// use std::path::Path;
///
/// let entries = Collector::new("list").collect(Path::new("."))?;
/// println!("{} entries", entries.len());
/// # Ok::<(), k2list::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Collector {
    /// File name suffix, including the dot (e.g. `.list`)
    suffix: String,
    comment_marker: String,
    /// Canonical paths of files never read (the merge output)
    excluded: Vec<PathBuf>,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION)
    }
}

impl Collector {
    /// Create a collector for files with the given extension (without dot).
    pub fn new(extension: &str) -> Self {
        Self {
            suffix: format!(".{}", extension.trim_start_matches('.')),
            comment_marker: DEFAULT_COMMENT_MARKER.to_string(),
            excluded: Vec::new(),
        }
    }

    /// Create a collector from a merge configuration.
    ///
    /// The output file is read like any other list file unless
    /// `exclude_output` is set.
    pub fn from_config(config: &MergeConfig) -> Self {
        let collector = Self::new(&config.extension)
            .with_comment_marker(&config.comment_marker);
        if config.exclude_output {
            collector.exclude(&config.output)
        } else {
            collector
        }
    }

    /// Set the comment marker.
    pub fn with_comment_marker(mut self, marker: &str) -> Self {
        self.comment_marker = marker.to_string();
        self
    }

    /// Skip the given file during collection.
    ///
    /// Paths that do not exist yet are ignored.
    pub fn exclude(mut self, path: &Path) -> Self {
        if let Ok(canonical) = fs::canonicalize(path) {
            self.excluded.push(canonical);
        }
        self
    }

    /// Walk `root` recursively and collect unique entries.
    ///
    /// Fails on the first directory or file that cannot be read, or on a list
    /// file that is not valid UTF-8.
    pub fn collect(&self, root: &Path) -> Result<AHashSet<String>> {
        let mut files = Vec::new();
        self.find_list_files(root, &mut files)?;

        let mut entries = AHashSet::new();
        for path in &files {
            let content = fs::read_to_string(path).map_err(|source| Error::ReadFile {
                path: path.clone(),
                source,
            })?;

            let before = entries.len();
            entries.extend(parse_lines(&content, &self.comment_marker).map(str::to_string));
            log::debug!(
                "Read {:?}: {} new entries",
                path,
                entries.len() - before
            );
        }

        log::info!(
            "Collected {} unique entries from {} list files under {:?}",
            entries.len(),
            files.len(),
            root
        );
        Ok(entries)
    }

    /// Depth-first search for list files, in sorted order.
    fn find_list_files(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
        let read_dir_err = |source: std::io::Error| Error::ReadDir {
            path: dir.to_path_buf(),
            source,
        };

        let mut children = fs::read_dir(dir)
            .map_err(read_dir_err)?
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(read_dir_err)?;
        children.sort_by_key(|entry| entry.file_name());

        for child in children {
            let path = child.path();
            let file_type = child.file_type().map_err(read_dir_err)?;

            if file_type.is_dir() {
                self.find_list_files(&path, files)?;
                continue;
            }

            if !self.is_list_file(&path) {
                continue;
            }

            // Symlinked directories are not followed; a dangling link is fatal.
            let is_file = if file_type.is_symlink() {
                match fs::metadata(&path) {
                    Ok(meta) => meta.is_file(),
                    Err(source) => return Err(Error::ReadFile { path, source }),
                }
            } else {
                file_type.is_file()
            };

            if is_file && !self.is_excluded(&path) {
                files.push(path);
            }
        }

        Ok(())
    }

    fn is_list_file(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().ends_with(&self.suffix))
            .unwrap_or(false)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        if self.excluded.is_empty() {
            return false;
        }
        match fs::canonicalize(path) {
            Ok(canonical) => self.excluded.contains(&canonical),
            Err(_) => false,
        }
    }
}

/// Yield the entries of one list file: trimmed, non-empty, non-comment lines.
///
/// Lines end at `\n`, `\r\n` or a lone `\r`.
pub fn parse_lines<'a>(content: &'a str, comment_marker: &'a str) -> impl Iterator<Item = &'a str> {
    content
        .split(['\n', '\r'])
        .map(str::trim)
        .filter(move |line| !line.is_empty() && !line.starts_with(comment_marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_lines() {
        let text = "\n# Comment\n  example.com  \n\t\n   # indented comment\n10.0.0.0/8\r\nfoo # trailing\n";
        let lines: Vec<&str> = parse_lines(text, "#").collect();
        assert_eq!(lines, ["example.com", "10.0.0.0/8", "foo # trailing"]);
    }

    #[test]
    fn test_parse_lines_carriage_returns() {
        let lines: Vec<&str> = parse_lines("a.com\r10.0.0.0/8\r# note\rb.com", "#").collect();
        assert_eq!(lines, ["a.com", "10.0.0.0/8", "b.com"]);
    }

    #[test]
    fn test_collect_old_mac_line_endings() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.list"), "a.com\r10.0.0.0/8\r").unwrap();

        let entries = Collector::default().collect(dir.path()).unwrap();
        let mut entries: Vec<String> = entries.into_iter().collect();
        entries.sort();
        assert_eq!(entries, ["10.0.0.0/8", "a.com"]);
    }

    #[test]
    fn test_output_read_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("full.list");
        fs::write(dir.path().join("src.list"), "a.com\n").unwrap();
        fs::write(&output, "curated.example\n").unwrap();

        let config = MergeConfig {
            root: dir.path().to_path_buf(),
            output: output.clone(),
            ..MergeConfig::default()
        };
        let entries = Collector::from_config(&config).collect(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.contains("curated.example"));

        let config = MergeConfig {
            exclude_output: true,
            ..config
        };
        let entries = Collector::from_config(&config).collect(dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains("a.com"));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.list"), "a.com\n").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("x.list")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("x.txt")).unwrap();

        let err = Collector::default().collect(dir.path()).unwrap_err();
        match err {
            Error::ReadFile { path, .. } => assert!(path.ends_with("x.list")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_read() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.txt");
        fs::write(&target, "linked.com\n").unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("link.list")).unwrap();

        let entries = Collector::default().collect(dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains("linked.com"));
    }

    #[test]
    fn test_collect_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        fs::write(dir.path().join("top.list"), "example.com\n10.0.0.0/8\n").unwrap();
        fs::write(nested.join("deep.list"), "# header\nexample.com\nexample.org\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored.com\n").unwrap();

        let entries = Collector::default().collect(dir.path()).unwrap();
        let mut entries: Vec<String> = entries.into_iter().collect();
        entries.sort();
        assert_eq!(entries, ["10.0.0.0/8", "example.com", "example.org"]);
    }

    #[test]
    fn test_collect_custom_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.list"), "one.com\n").unwrap();
        fs::write(dir.path().join("b.txt"), "two.com\n").unwrap();

        let entries = Collector::new(".txt").collect(dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains("two.com"));
    }

    #[test]
    fn test_custom_comment_marker() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.list"), "! comment\n# kept\n").unwrap();

        let entries = Collector::default()
            .with_comment_marker("!")
            .collect(dir.path())
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains("# kept"));
    }

    #[test]
    fn test_excluded_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("full.list");
        fs::write(dir.path().join("src.list"), "a.com\n").unwrap();
        fs::write(&output, "stale.com\n").unwrap();

        let entries = Collector::default().exclude(&output).collect(dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains("a.com"));
    }

    #[test]
    fn test_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        let entries = Collector::default().collect(dir.path()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = Collector::default()
            .collect(&dir.path().join("missing"))
            .unwrap_err();
        assert!(matches!(err, Error::ReadDir { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.list"), "a.com\n").unwrap();
        fs::write(dir.path().join("bad.list"), [0x66, 0x6f, 0xff, 0x0a]).unwrap();

        let err = Collector::default().collect(dir.path()).unwrap_err();
        match err {
            Error::ReadFile { path, .. } => assert!(path.ends_with("bad.list")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
