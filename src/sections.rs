use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Cell, Section, WeekDocument};

/// Leading `#` run and the whitespace after it.
static HEADING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^#+\s*").expect("valid regex"));

/// Inline anchor tags such as `<a id='intro'></a>`.
static INLINE_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"<a[^>]*>.*?</a>").expect("valid regex"));

/// Markdown link syntax `[text](url)`.
static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid regex"));

/// Titles must be longer than this many UTF-16 code units to open a section.
const MIN_TITLE_UNITS: usize = 3;

/// Split a week's cells into sections opened by level 2+ markdown headings.
///
/// Cells before the first qualifying heading belong to no section. Only the
/// first qualifying heading of a markdown cell is honored. A week with no
/// qualifying heading yields no sections.
pub fn extract_sections(week: &WeekDocument) -> Vec<Section<'_>> {
    let mut sections: Vec<Section<'_>> = Vec::new();

    for (index, cell) in week.cells.iter().enumerate() {
        if let Cell::Markdown { source } = cell
            && let Some(title) = first_section_title(&source.normalized())
        {
            sections.push(Section {
                cells: Vec::new(),
                start_index: index,
                title,
            });
        }

        if let Some(current) = sections.last_mut() {
            current.cells.push(cell);
        }
    }

    tracing::debug!(sections = sections.len(), cells = week.cells.len(), "extracted sections");
    return sections;
}

/// Find the first line of a markdown cell that opens a section.
fn first_section_title(markdown: &str) -> Option<String> {
    return markdown.split('\n').find_map(section_title_from_line);
}

/// Return the cleaned heading title if the line is a qualifying heading.
fn section_title_from_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if !trimmed.starts_with("##") {
        return None;
    }

    let title = clean_heading_title(trimmed);
    if title.encode_utf16().count() > MIN_TITLE_UNITS {
        return Some(title);
    }
    return None;
}

/// Strip the `#` marker, inline anchors, and link syntax from a heading line.
pub fn clean_heading_title(heading: &str) -> String {
    let title = HEADING_MARKER.replace(heading, "");
    let title = INLINE_ANCHOR.replace_all(&title, "");
    let title = MARKDOWN_LINK.replace_all(&title, "$1");
    return title.trim().to_string();
}
