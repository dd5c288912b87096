//! End-to-end index builds from a documentation tree on disk.

mod common;

use assert2::{check, let_assert};
use common::{TempWorkspace, docs_site};
use docsearch::index::{BuildStatus, FingerprintCache, IndexArtifact};
use docsearch::worker::build_index;
use rstest::rstest;

#[rstest]
fn test_build_walks_tree_in_order(docs_site: TempWorkspace) {
    let config = docs_site.config();
    let mut cache = FingerprintCache::new();

    let outcome = build_index(&config, &mut cache);

    let urls: Vec<_> = outcome.artifact.entries.iter().map(|e| e.url.as_str()).collect();
    check!(urls == ["/components/tabs", "/guides", "/guides/install", "/intro"]);
    check!(outcome.report.status() == BuildStatus::Complete);
    check!(outcome.report.excluded_drafts == 1);
    check!(outcome.report.indexed == 4);
    check!(cache.len() == 4);
}

#[rstest]
fn test_install_guide_entry(docs_site: TempWorkspace) {
    let outcome = build_index(&docs_site.config(), &mut FingerprintCache::new());
    let_assert!(Some(install) = outcome.artifact.entries.iter().find(|e| e.url == "/guides/install"));

    check!(install.title == "Install Guide");
    check!(install.description == "Installing the toolchain");
    check!(install.keywords.iter().any(|k| k == "setup"));
    let_assert!(Some(update) = &install.last_update);
    check!(update.date.starts_with("2024-03-01"));
    check!(update.author.as_deref() == Some("Ada"));

    let ids: Vec<_> = install.sections.iter().map(|s| s.id.as_str()).collect();
    check!(ids == ["install", "prerequisites", "configuration"]);
    let_assert!(Some(prerequisites) = install.sections.get(1));
    check!(prerequisites.content == "You need a recent compiler.");
}

#[rstest]
fn test_section_urls_are_anchored_at_their_document(docs_site: TempWorkspace) {
    let outcome = build_index(&docs_site.config(), &mut FingerprintCache::new());
    for entry in &outcome.artifact.entries {
        for section in &entry.sections {
            check!(section.url == format!("{}#{}", entry.url, section.id));
        }
    }
}

#[rstest]
fn test_excluded_folder_is_not_indexed(docs_site: TempWorkspace) {
    let outcome = build_index(&docs_site.config(), &mut FingerprintCache::new());
    check!(outcome.artifact.entries.iter().all(|e| !e.url.starts_with("/internal")));

    let mut config = docs_site.config();
    config.exclude.clear();
    let outcome = build_index(&config, &mut FingerprintCache::new());
    check!(outcome.artifact.entries.iter().any(|e| e.url == "/internal/secret"));
}

#[rstest]
fn test_rebuild_reuses_cache_and_is_identical(docs_site: TempWorkspace) {
    let config = docs_site.config();
    let mut cache = FingerprintCache::new();
    let first = build_index(&config, &mut cache);

    cache.save(&config.cache_path()).unwrap();
    let mut reloaded = FingerprintCache::load(&config.cache_path()).unwrap();
    let second = build_index(&config, &mut reloaded);

    check!(second.report.reused == 4);
    check!(second.report.extracted == 0);
    check!(second.artifact == first.artifact);
}

#[rstest]
fn test_changed_document_is_extracted_again(docs_site: TempWorkspace) {
    let config = docs_site.config();
    let mut cache = FingerprintCache::new();
    build_index(&config, &mut cache);

    docs_site.create_doc("intro.md", "Introduction", "Rewritten.\n");
    let outcome = build_index(&config, &mut cache);

    check!(outcome.report.reused == 3);
    check!(outcome.report.extracted == 1);
    check!(cache.len() == 4);
    let_assert!(Some(intro) = outcome.artifact.entries.iter().find(|e| e.url == "/intro"));
    check!(intro.description == "Rewritten.");
}

#[rstest]
fn test_artifact_round_trips_through_disk(docs_site: TempWorkspace) {
    let config = docs_site.config();
    let outcome = build_index(&config, &mut FingerprintCache::new());

    let output = config.output_for_version(Some("2.0"));
    outcome.artifact.write(&output).unwrap();
    check!(output.ends_with("static/searchIndex.2.0.json"));

    let_assert!(Ok(read) = IndexArtifact::read(&output));
    check!(read == outcome.artifact);

    let json = std::fs::read_to_string(&output).unwrap();
    check!(json.contains("\"contentPreview\""));
    check!(json.contains("\"lastUpdate\""));
}

#[test]
fn test_missing_docs_dir_fails_the_build() {
    let workspace = TempWorkspace::new();
    let outcome = build_index(&workspace.config(), &mut FingerprintCache::new());

    check!(outcome.report.failed == 1);
    check!(outcome.report.status() == BuildStatus::AllFailed);
    check!(outcome.artifact.entries.is_empty());
}

#[test]
fn test_empty_docs_dir_is_an_empty_build() {
    let workspace = TempWorkspace::new();
    workspace.create_dir("docs");
    let outcome = build_index(&workspace.config(), &mut FingerprintCache::new());

    check!(outcome.report.status() == BuildStatus::Empty);
    check!(outcome.artifact.entries.is_empty());
}

#[test]
fn test_unindented_frontmatter_lists_are_indexed() {
    let workspace = TempWorkspace::new();
    workspace.create_file(
        "docs/tagged.md",
        "---\ntitle: Tagged\ntags:\n- intro\n- basics\n---\n## Usage\n\nSet `threshold` first.\n",
    );
    let outcome = build_index(&workspace.config(), &mut FingerprintCache::new());

    check!(outcome.report.failed == 0);
    let_assert!([entry] = outcome.artifact.entries.as_slice());
    check!(entry.keywords == ["usage", "intro", "basics"]);
    check!(entry.sections[0].content == "Set threshold first.");
}
