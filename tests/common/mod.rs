//! Shared test fixtures and utilities for integration tests.
//!
//! # Test Isolation Strategy
//!
//! Every test builds its own documentation tree in a fresh temporary
//! directory, with the fingerprint cache file and the artifact output inside
//! that directory. Nothing is read from or written to the user cache dir.
//!
//! # Available Fixtures
//!
//! - `docs_site`: a small site with nested folders, MDX, a draft and an excluded folder

use docsearch::config::Config;
use rstest::fixture;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary workspace directory for test isolation.
///
/// Provides basic filesystem operations within a temp directory that is
/// automatically cleaned up when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    /// Creates a new empty temporary workspace.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// Returns the root path of this workspace.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a directory (and all parent directories) within this workspace.
    pub fn create_dir(&self, path: &str) {
        let full_path = self.root.join(path);
        std::fs::create_dir_all(&full_path)
            .unwrap_or_else(|e| panic!("Failed to create directory '{}': {}", path, e));
    }

    /// Creates a file with the given content within this workspace.
    ///
    /// Parent directories are created automatically if they don't exist.
    pub fn create_file(&self, path: &str, content: &str) {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
    }

    /// Writes a document with YAML frontmatter under `docs/`.
    pub fn create_doc(&self, path: &str, title: &str, body: &str) {
        self.create_file(
            &format!("docs/{}", path),
            &format!("---\ntitle: {}\n---\n{}", title, body),
        );
    }

    /// A config rooted in this workspace, with cache and output kept inside it.
    pub fn config(&self) -> Config {
        Config {
            docs_dir: self.root.join("docs"),
            output: self.root.join("static/searchIndex.json"),
            cache_file: Some(self.root.join(".cache/docsearch.bin")),
            exclude: vec!["internal".to_string()],
            ..Config::default()
        }
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A small documentation site.
///
/// - `intro.md` → `/intro`
/// - `guides/install.md` → `/guides/install` with sections
/// - `guides/guides.md` → `/guides`
/// - `components/tabs.mdx` → `/components/tabs`
/// - `drafts.md` (draft), `internal/secret.md` (excluded folder)
#[fixture]
pub fn docs_site() -> TempWorkspace {
    let workspace = TempWorkspace::new();

    workspace.create_doc(
        "intro.md",
        "Introduction",
        "Welcome to the documentation.\n\n# Overview\n\nWhat this project does.\n",
    );
    workspace.create_file(
        "docs/guides/install.md",
        "---\n\
         title: Install Guide\n\
         description: Installing the toolchain\n\
         keywords: [setup]\n\
         last_update:\n  date: 2024-03-01\n  author: Ada\n\
         ---\n\
         # Install\n\n\
         Getting Started Guide for new users.\n\n\
         ## Prerequisites\n\n\
         You need a recent compiler.\n\n\
         ```bash\nnpm install\n```\n\n\
         ## Configuration\n\n\
         Edit the configuration file.\n",
    );
    workspace.create_doc("guides/guides.md", "Guides", "Everything about guides.\n");
    workspace.create_file(
        "docs/components/tabs.mdx",
        "---\ntitle: Tabs Component\n---\n\
         import Tabs from '@theme/Tabs';\n\
         export const meta = { hidden: true };\n\n\
         # Usage\n\n<Tabs>\nSwitch between views.\n</Tabs>\n",
    );
    workspace.create_file("docs/drafts.md", "---\ntitle: Upcoming\ndraft: true\n---\nSoon.\n");
    workspace.create_doc("internal/secret.md", "Secret", "Not for search.\n");

    workspace
}
