//! Project discovery - locating sources and classpath entries
//!
//! Walks a project directory and classifies what it finds:
//! - `.java` files are the sources to parse
//! - directories whose name starts with `src` are source roots
//! - directories named `bin` and `.jar` files are classpath entries;
//!   `bin` directories are recorded but never descended into
//!
//! Entries matched by the project's `.gitignore`, and hidden entries,
//! are skipped.

use crate::{Error, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything discovery found under one project root.
#[derive(Debug, Clone, Default)]
pub struct ProjectLayout {
    /// Source files, in path order
    pub files: Vec<PathBuf>,
    /// Directories a parser should treat as source roots
    pub source_roots: Vec<PathBuf>,
    /// Compiled-code locations a parser needs for semantic resolution
    pub classpath: Vec<PathBuf>,
}

impl ProjectLayout {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

struct Explorer {
    gitignore: Gitignore,
    layout: ProjectLayout,
}

/// Discover the layout of a project rooted at `root`.
pub fn discover(root: &Path) -> Result<ProjectLayout> {
    if !root.is_dir() {
        return Err(Error::InvalidProjectPath(root.display().to_string()));
    }

    let mut builder = GitignoreBuilder::new(root);
    builder.add(root.join(".gitignore"));
    let gitignore = builder.build().unwrap_or_else(|_| Gitignore::empty());

    let mut explorer = Explorer {
        gitignore,
        layout: ProjectLayout::default(),
    };
    explorer.explore(root)?;

    let layout = explorer.layout;
    debug!(
        files = layout.files.len(),
        source_roots = layout.source_roots.len(),
        classpath = layout.classpath.len(),
        "discovered project layout"
    );
    Ok(layout)
}

impl Explorer {
    fn explore(&mut self, dir: &Path) -> Result<()> {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|entry| entry.path())
            .collect();
        entries.sort();

        for path in entries {
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };
            let is_dir = path.is_dir();
            if name.starts_with('.') || self.gitignore.matched(&path, is_dir).is_ignore() {
                continue;
            }

            if is_dir {
                if name == "bin" {
                    // compiled output; record for the classpath, never descend
                    self.layout.classpath.push(path);
                    continue;
                }
                if name.starts_with("src") {
                    self.layout.source_roots.push(path.clone());
                }
                self.explore(&path)?;
            } else if name.ends_with(".java") {
                self.layout.files.push(path);
            } else if name.ends_with(".jar") {
                self.layout.classpath.push(path);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_classifies_sources_roots_and_classpath() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("src/com/example")).unwrap();
        fs::create_dir_all(root.join("src-gen")).unwrap();
        fs::create_dir_all(root.join("bin/com/example")).unwrap();
        fs::create_dir_all(root.join("lib")).unwrap();
        touch(&root.join("src/com/example/A.java"));
        touch(&root.join("src-gen/B.java"));
        touch(&root.join("bin/com/example/A.class"));
        touch(&root.join("lib/dep.jar"));
        touch(&root.join("README.md"));

        let layout = discover(root).unwrap();

        assert_eq!(
            layout.files,
            vec![
                root.join("src/com/example/A.java"),
                root.join("src-gen/B.java"),
            ]
        );
        assert_eq!(
            layout.source_roots,
            vec![root.join("src"), root.join("src-gen")]
        );
        assert_eq!(
            layout.classpath,
            vec![root.join("bin"), root.join("lib/dep.jar")]
        );
    }

    #[test]
    fn test_bin_is_never_descended() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("bin/src")).unwrap();
        // a stray source file under bin must not be picked up
        touch(&root.join("bin/src/Leftover.java"));

        let layout = discover(root).unwrap();
        assert!(layout.files.is_empty());
        assert!(layout.source_roots.is_empty());
        assert_eq!(layout.classpath, vec![root.join("bin")]);
    }

    #[test]
    fn test_hidden_and_ignored_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("scratch")).unwrap();
        touch(&root.join(".git/HEAD.java"));
        touch(&root.join("src/A.java"));
        touch(&root.join("scratch/Tmp.java"));
        fs::write(root.join(".gitignore"), "scratch/\n").unwrap();

        let layout = discover(root).unwrap();
        assert_eq!(layout.files, vec![root.join("src/A.java")]);
    }

    #[test]
    fn test_invalid_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            discover(&missing),
            Err(Error::InvalidProjectPath(_))
        ));

        let file = dir.path().join("A.java");
        touch(&file);
        assert!(discover(&file).is_err());
    }
}
