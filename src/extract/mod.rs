//! Document extraction: one document body plus its metadata to a [`DocumentEntry`].
//!
//! The body is walked as CommonMark. Every heading opens a [`Section`] that
//! collects the text that follows it until the next heading of any level.

pub mod metadata;

pub use metadata::{DocumentMetadata, split_frontmatter};

use crate::error::ExtractError;
use crate::types::{
    CONTENT_PREVIEW_CHARS, DocumentEntry, SECTION_CONTENT_CHARS, Section, section_url,
    truncate_chars,
};
use ahash::AHashSet;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Maximum number of characters of a derived description.
const DESCRIPTION_CHARS: usize = 200;

/// Source dialect of a document body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Markdown,
    /// Markdown with JSX components and ES `import`/`export` lines.
    Mdx,
}

impl DocumentFormat {
    /// Pick the dialect from a file extension (`.mdx` or anything else).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("mdx") => Self::Mdx,
            _ => Self::Markdown,
        }
    }
}

/// Output of [`extract_document`].
#[derive(Debug, Clone)]
pub struct Extraction {
    pub entry: DocumentEntry,
    /// Set when the markup was malformed and `entry.sections` was left empty.
    pub degraded: Option<ExtractError>,
}

/// Generate a URL-friendly id from heading text.
///
/// Lower-cases the text, collapses every run of characters outside `[a-z0-9]`
/// into one `-`, and trims leading and trailing `-`.
pub fn heading_id(text: &str) -> String {
    let mut id = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !id.is_empty() {
                id.push('-');
            }
            pending_dash = false;
            id.push(ch);
        } else {
            pending_dash = true;
        }
    }
    id
}

/// Build the index entry for one document anchored at `url`.
///
/// Never fails: malformed markup only costs the document its sections.
pub fn extract_document(
    body: &str,
    metadata: &DocumentMetadata,
    format: DocumentFormat,
    url: &str,
) -> Extraction {
    let (markdown, components) = match format {
        DocumentFormat::Markdown => (body.to_string(), Vec::new()),
        DocumentFormat::Mdx => {
            let (markdown, used) = strip_mdx(body);
            let mut components = metadata.components.clone();
            components.extend(used);
            (markdown, components)
        }
    };

    let (outline, degraded) = match check_fences(&markdown) {
        Ok(()) => (walk_outline(&markdown), None),
        Err(err) => {
            tracing::warn!("Malformed markup in {}: {}; indexing without sections", url, err);
            (Outline::default(), Some(err))
        }
    };

    let sections = assign_section_ids(&outline.headings, url);

    let heading_keywords = outline
        .headings
        .iter()
        .filter(|h| h.level <= 2)
        .map(|h| h.text.as_str());
    let keywords = normalize_keywords(
        metadata
            .keywords
            .iter()
            .map(String::as_str)
            .chain(heading_keywords)
            .chain(metadata.tags.iter().map(String::as_str))
            .chain(components.iter().map(String::as_str)),
    );

    let description = metadata.description.clone().unwrap_or_else(|| {
        outline
            .first_paragraph
            .as_deref()
            .map(|p| truncate_chars(p, DESCRIPTION_CHARS).to_string())
            .unwrap_or_default()
    });

    let id = metadata.id.clone().unwrap_or_else(|| {
        url.rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or("index")
            .to_string()
    });

    let entry = DocumentEntry {
        id,
        title: metadata.title.trim().to_string(),
        description,
        keywords,
        last_update: metadata.last_update.clone(),
        url: url.to_string(),
        content_preview: truncate_chars(body.trim_start(), CONTENT_PREVIEW_CHARS).to_string(),
        sections,
    };

    Extraction { entry, degraded }
}

/// A heading and the text collected under it, before ids are assigned.
#[derive(Debug, Default)]
struct HeadingBlock {
    level: u8,
    text: String,
    explicit_id: Option<String>,
    content: String,
}

#[derive(Debug, Default)]
struct Outline {
    headings: Vec<HeadingBlock>,
    first_paragraph: Option<String>,
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn walk_outline(markdown: &str) -> Outline {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options.insert(Options::ENABLE_TABLES);

    let mut outline = Outline::default();
    let mut open_heading: Option<HeadingBlock> = None;
    let mut paragraph: Option<String> = None;
    let mut in_code_block = false;

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                open_heading = Some(HeadingBlock {
                    level: heading_level(level),
                    explicit_id: id.map(|id| id.to_string()),
                    ..HeadingBlock::default()
                });
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(mut heading) = open_heading.take() {
                    heading.text = collapse_whitespace(&heading.text);
                    outline.headings.push(heading);
                }
            }
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Start(Tag::Paragraph) if outline.first_paragraph.is_none() => {
                paragraph = Some(String::new());
            }
            Event::End(TagEnd::Paragraph) => {
                if let Some(text) = paragraph.take().map(|p| collapse_whitespace(&p))
                    && !text.is_empty()
                {
                    outline.first_paragraph = Some(text);
                }
                push_section_break(&mut outline);
            }
            Event::End(TagEnd::Item | TagEnd::TableCell | TagEnd::BlockQuote(_)) => {
                push_section_break(&mut outline);
            }
            Event::Text(text) => {
                if let Some(heading) = open_heading.as_mut() {
                    heading.text.push_str(&text);
                } else if !in_code_block {
                    if let Some(section) = outline.headings.last_mut() {
                        section.content.push_str(&text);
                    }
                    if let Some(p) = paragraph.as_mut() {
                        p.push_str(&text);
                    }
                }
            }
            Event::Code(code) => {
                if let Some(heading) = open_heading.as_mut() {
                    heading.text.push_str(&code);
                } else {
                    if let Some(section) = outline.headings.last_mut() {
                        section.content.push_str(&code);
                    }
                    if let Some(p) = paragraph.as_mut() {
                        p.push_str(&code);
                    }
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(heading) = open_heading.as_mut() {
                    heading.text.push(' ');
                } else {
                    push_section_break(&mut outline);
                    if let Some(p) = paragraph.as_mut() {
                        p.push(' ');
                    }
                }
            }
            _ => {}
        }
    }

    outline
}

/// Separate text fragments of the open section at line and block boundaries.
fn push_section_break(outline: &mut Outline) {
    if let Some(section) = outline.headings.last_mut() {
        section.content.push(' ');
    }
}

/// Turn heading blocks into sections, resolving sibling id collisions.
///
/// The first occurrence of an id keeps it; later ones get `-1`, `-2`, ...,
/// skipping any suffix already taken. Headings with no usable characters use
/// `section` as their base id.
fn assign_section_ids(headings: &[HeadingBlock], url: &str) -> Vec<Section> {
    let mut taken: AHashSet<String> = AHashSet::with_capacity(headings.len());
    headings
        .iter()
        .map(|heading| {
            let base = heading
                .explicit_id
                .clone()
                .unwrap_or_else(|| heading_id(&heading.text));
            let base = if base.is_empty() {
                "section".to_string()
            } else {
                base
            };

            let mut id = base.clone();
            let mut suffix = 1;
            while taken.contains(&id) {
                id = format!("{}-{}", base, suffix);
                suffix += 1;
            }
            taken.insert(id.clone());

            let content = collapse_whitespace(&heading.content);
            Section {
                url: section_url(url, &id),
                id,
                heading: heading.text.clone(),
                level: heading.level,
                content: truncate_chars(&content, SECTION_CONTENT_CHARS).to_string(),
            }
        })
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-case, trim, drop empties and duplicates (first occurrence wins).
fn normalize_keywords<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = AHashSet::new();
    raw.map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty() && seen.insert(keyword.clone()))
        .collect()
}

/// Tracks whether a line-by-line scan is inside a fenced code block.
#[derive(Debug, Default)]
struct FenceTracker {
    /// Fence character, run length, and 1-based line of the opening fence
    open: Option<(char, usize, usize)>,
}

impl FenceTracker {
    /// Feed one line. Returns true when the line is a fence or sits inside one.
    fn feed(&mut self, line: &str, line_number: usize) -> bool {
        let trimmed = line.trim_start_matches(' ');
        let is_fence_indent = line.len() - trimmed.len() <= 3;
        let fence = trimmed
            .chars()
            .next()
            .filter(|c| is_fence_indent && (*c == '`' || *c == '~'))
            .map(|c| (c, trimmed.chars().take_while(|x| *x == c).count()))
            .filter(|(_, run)| *run >= 3);

        match (self.open, fence) {
            (None, Some((ch, run))) => {
                self.open = Some((ch, run, line_number));
                true
            }
            (Some((open_ch, open_run, _)), Some((ch, run)))
                if ch == open_ch && run >= open_run && trimmed[run..].trim().is_empty() =>
            {
                self.open = None;
                true
            }
            (open, _) => open.is_some(),
        }
    }

    fn unclosed_line(&self) -> Option<usize> {
        self.open.map(|(_, _, line)| line)
    }
}

/// Reject bodies whose fenced code blocks never close.
fn check_fences(markdown: &str) -> Result<(), ExtractError> {
    let mut fences = FenceTracker::default();
    for (index, line) in markdown.lines().enumerate() {
        fences.feed(line, index + 1);
    }
    match fences.unclosed_line() {
        Some(line) => Err(ExtractError::UnclosedCodeFence { line }),
        None => Ok(()),
    }
}

/// Remove MDX `import`/`export` lines and collect component names.
///
/// Component names come from import specifiers and from JSX tags starting
/// with an uppercase letter. Lines inside code fences are left untouched.
fn strip_mdx(body: &str) -> (String, Vec<String>) {
    let mut fences = FenceTracker::default();
    let mut kept = Vec::new();
    let mut components = Vec::new();
    // Open brackets of an `export` statement spanning several lines
    let mut export_depth = 0_i64;

    for (index, line) in body.lines().enumerate() {
        if export_depth > 0 {
            export_depth += bracket_balance(line);
            continue;
        }
        if fences.feed(line, index + 1) {
            kept.push(line);
            continue;
        }

        let trimmed = line.trim_start();
        if let Some(spec) = trimmed.strip_prefix("import ") {
            if let Some((names, _)) = spec.split_once(" from ") {
                components.extend(
                    names
                        .split(',')
                        .map(|name| name.trim_matches(|c: char| c == '{' || c == '}' || c.is_whitespace()))
                        .filter_map(|name| name.rsplit(' ').next())
                        .filter(|name| !name.is_empty() && *name != "*")
                        .map(str::to_string),
                );
            }
            continue;
        }
        if trimmed.starts_with("export ") {
            export_depth = bracket_balance(line).max(0);
            continue;
        }

        components.extend(jsx_component_names(line));
        kept.push(line);
    }

    (kept.join("\n"), components)
}

/// Opening minus closing brackets on one line.
fn bracket_balance(line: &str) -> i64 {
    line.chars()
        .map(|c| match c {
            '{' | '[' | '(' => 1,
            '}' | ']' | ')' => -1,
            _ => 0,
        })
        .sum()
}

fn jsx_component_names(line: &str) -> impl Iterator<Item = String> + '_ {
    line.match_indices('<').filter_map(move |(index, _)| {
        let name: String = line[index + 1..]
            .chars()
            .take_while(char::is_ascii_alphanumeric)
            .collect();
        name.starts_with(|c: char| c.is_ascii_uppercase())
            .then_some(name)
    })
}
