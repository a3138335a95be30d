use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::errors::DriverError;

/// A report definition found under the source root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path as walked (source root joined with `relative`)
    pub path: PathBuf,
    /// Path relative to the source root
    pub relative: PathBuf,
}

/// Finds source files by suffix under a root directory
#[derive(Debug, Clone)]
pub struct SourceDiscovery {
    suffix: String,
    follow_links: bool,
    exclude: Option<GlobSet>,
}

impl SourceDiscovery {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            follow_links: false,
            exclude: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, DriverError> {
        Self::new(settings.source_suffix.clone())
            .follow_links(settings.follow_links)
            .exclude(&settings.exclude)
    }

    pub fn follow_links(mut self, yes: bool) -> Self {
        self.follow_links = yes;
        self
    }

    /// Skip files whose root-relative path matches any of `patterns`
    pub fn exclude(mut self, patterns: &[String]) -> Result<Self, DriverError> {
        if patterns.is_empty() {
            self.exclude = None;
            return Ok(self);
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                DriverError::Config(format!("invalid exclude pattern '{pattern}': {e}"))
            })?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|e| DriverError::Config(format!("invalid exclude patterns: {e}")))?;
        self.exclude = Some(set);
        Ok(self)
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Recursively collect matching regular files under `root`.
    ///
    /// Entries are sorted by file name within each directory, so the order is
    /// stable for a given tree. Finding nothing is an error, and so is any
    /// directory or link the walk cannot read.
    pub fn discover(&self, root: &Path) -> Result<Vec<SourceFile>, DriverError> {
        if !root.is_dir() {
            return Err(DriverError::SourceRootMissing(root.to_path_buf()));
        }

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(self.follow_links)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut sources = Vec::new();
        for entry in walker {
            // A template we cannot read is a template we cannot check
            let entry = entry.map_err(|source| DriverError::Unreadable {
                root: root.to_path_buf(),
                source,
            })?;

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            if !entry.file_name().to_string_lossy().ends_with(&self.suffix) {
                continue;
            }

            let path = entry.into_path();
            let relative = match path.strip_prefix(root) {
                Ok(relative) => relative.to_path_buf(),
                Err(_) => continue,
            };

            if let Some(exclude) = &self.exclude {
                if exclude.is_match(&relative) {
                    tracing::debug!("Excluded {}", relative.display());
                    continue;
                }
            }

            tracing::trace!("Discovered {}", path.display());
            sources.push(SourceFile { path, relative });
        }

        if sources.is_empty() {
            return Err(DriverError::NoSourceFiles {
                root: root.to_path_buf(),
                suffix: self.suffix.clone(),
            });
        }

        tracing::info!("Discovered {} {} file(s) in {}", sources.len(), self.suffix, root.display());
        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree(files: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for file in files {
            let path = temp_dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "<jasperReport/>").unwrap();
        }
        temp_dir
    }

    fn relatives(sources: &[SourceFile]) -> Vec<String> {
        sources
            .iter()
            .map(|source| source.relative.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_discovers_recursively_by_suffix() {
        let temp_dir = tree(&[
            "invoice.jrxml",
            "sub/detail.jrxml",
            "sub/deeper/total.jrxml",
            "readme.md",
            "sub/invoice.jasper",
            "sub/.hidden.jrxml",
        ]);

        let sources = SourceDiscovery::new(".jrxml").discover(temp_dir.path()).unwrap();
        let mut found = relatives(&sources);
        found.sort();

        assert_eq!(
            found,
            vec!["invoice.jrxml", "sub/.hidden.jrxml", "sub/deeper/total.jrxml", "sub/detail.jrxml"]
        );
        for source in &sources {
            assert_eq!(source.path, temp_dir.path().join(&source.relative));
        }
    }

    #[test]
    fn test_order_is_stable() {
        let temp_dir = tree(&["b.jrxml", "a.jrxml", "c/a.jrxml", "c/0.jrxml"]);
        let discovery = SourceDiscovery::new(".jrxml");

        let first = relatives(&discovery.discover(temp_dir.path()).unwrap());
        let second = relatives(&discovery.discover(temp_dir.path()).unwrap());

        assert_eq!(first, second);
        assert_eq!(first, vec!["a.jrxml", "b.jrxml", "c/0.jrxml", "c/a.jrxml"]);
    }

    #[test]
    fn test_ignore_files_do_not_hide_sources() {
        let temp_dir = tree(&["kept.jrxml", "generated/skipped.jrxml"]);
        fs::write(temp_dir.path().join(".gitignore"), "generated/\n").unwrap();

        let sources = SourceDiscovery::new(".jrxml").discover(temp_dir.path()).unwrap();
        assert_eq!(sources.len(), 2);
    }

    #[test]
    fn test_exclude_patterns() {
        let temp_dir = tree(&["main.jrxml", "drafts/wip.jrxml", "drafts/old/older.jrxml"]);

        let sources = SourceDiscovery::new(".jrxml")
            .exclude(&["drafts/**".to_string()])
            .unwrap()
            .discover(temp_dir.path())
            .unwrap();

        assert_eq!(relatives(&sources), vec!["main.jrxml"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_aborts_discovery() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tree(&["ok.jrxml", "locked/hidden.jrxml"]);
        let locked = temp_dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users read through the mode bits
        let readable = fs::read_dir(&locked).is_ok();
        let result = SourceDiscovery::new(".jrxml").discover(temp_dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            return;
        }

        let err = result.unwrap_err();
        assert!(matches!(err, DriverError::Unreadable { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_followed_only_when_enabled() {
        let temp_dir = tree(&["main.jrxml"]);
        let shared = TempDir::new().unwrap();
        fs::write(shared.path().join("shared.jrxml"), "<jasperReport/>").unwrap();
        std::os::unix::fs::symlink(shared.path(), temp_dir.path().join("linked")).unwrap();

        let sources = SourceDiscovery::new(".jrxml").discover(temp_dir.path()).unwrap();
        assert_eq!(relatives(&sources), vec!["main.jrxml"]);

        let sources = SourceDiscovery::new(".jrxml")
            .follow_links(true)
            .discover(temp_dir.path())
            .unwrap();
        assert_eq!(relatives(&sources), vec!["linked/shared.jrxml", "main.jrxml"]);
    }

    #[test]
    fn test_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("templates");

        let err = SourceDiscovery::new(".jrxml").discover(&missing).unwrap_err();
        assert!(matches!(err, DriverError::SourceRootMissing(ref path) if path == &missing));
    }

    #[test]
    fn test_no_matching_files() {
        let temp_dir = tree(&["notes.txt", "sub/report.jasper"]);

        let err = SourceDiscovery::new(".jrxml").discover(temp_dir.path()).unwrap_err();
        assert!(matches!(err, DriverError::NoSourceFiles { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_excluding_everything_is_no_source_files() {
        let temp_dir = tree(&["drafts/wip.jrxml"]);

        let err = SourceDiscovery::new(".jrxml")
            .exclude(&["drafts/*".to_string()])
            .unwrap()
            .discover(temp_dir.path())
            .unwrap_err();
        assert!(matches!(err, DriverError::NoSourceFiles { .. }));
    }
}
