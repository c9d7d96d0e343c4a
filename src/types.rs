/// Core domain types for coursebook catalogs, notebook cells, and sections.
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One entry of the course catalog. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDescriptor {
    /// Content file path relative to the site root.
    #[serde(rename = "contentFile")]
    pub content_file: PathBuf,
    /// Free-form summary shown in course listings.
    #[serde(default)]
    pub description: String,
    /// Human-readable duration, e.g. "8 weeks".
    #[serde(default)]
    pub duration: String,
    /// Stable course identifier, also the progress store key.
    pub id: String,
    /// Audience level, e.g. "Beginner".
    #[serde(default)]
    pub level: String,
    /// Publication state.
    pub status: CourseStatus,
    /// Display title.
    pub title: String,
}

/// Whether a course can be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CourseStatus {
    /// Published and openable.
    Active,
    /// Listed but not openable yet.
    ComingSoon,
}

impl CourseStatus {
    /// Label used in course listings.
    pub const fn label(self) -> &'static str {
        return match self {
            CourseStatus::Active => "available",
            CourseStatus::ComingSoon => "coming soon",
        };
    }
}

/// Text that notebooks store either whole or as line fragments.
/// Always read it through `normalized()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellSource {
    /// Fragments concatenated without separators.
    Lines(Vec<String>),
    /// A single string.
    Text(String),
}

impl CellSource {
    /// The full text with fragments joined.
    pub fn normalized(&self) -> Cow<'_, str> {
        return match self {
            CellSource::Lines(lines) => Cow::Owned(lines.concat()),
            CellSource::Text(text) => Cow::Borrowed(text.as_str()),
        };
    }
}

impl Default for CellSource {
    fn default() -> Self {
        return CellSource::Text(String::new());
    }
}

/// One unit of a week document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    /// A code listing with the outputs captured when it last ran.
    Code {
        /// Captured outputs in execution order.
        #[serde(default)]
        outputs: Vec<Output>,
        /// Program text.
        #[serde(default)]
        source: CellSource,
    },
    /// Explanatory markdown text.
    Markdown {
        /// Markdown text.
        #[serde(default)]
        source: CellSource,
    },
    /// Any other cell kind, e.g. `raw`. Carried along, never rendered.
    #[serde(other)]
    Other,
}

/// Output captured from a code cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum Output {
    /// Rich display output keyed by mime type.
    DisplayData {
        /// Mime type to payload.
        #[serde(default)]
        data: MimeBundle,
    },
    /// An exception raised by the cell.
    Error {
        /// Exception class name.
        #[serde(default)]
        ename: String,
        /// Exception message.
        #[serde(default)]
        evalue: String,
        /// Formatted traceback lines.
        #[serde(default)]
        traceback: Vec<String>,
    },
    /// The value of the cell's last expression, keyed by mime type.
    ExecuteResult {
        /// Mime type to payload.
        #[serde(default)]
        data: MimeBundle,
    },
    /// Text written to stdout or stderr.
    Stream {
        /// Written text.
        #[serde(default)]
        text: CellSource,
    },
}

/// Mime type to payload. Payloads stay as raw JSON because non-text types
/// (images, application/json) are not displayed.
pub type MimeBundle = BTreeMap<String, serde_json::Value>;

/// Extract the `text/plain` entry of a bundle, joining line fragments.
pub fn plain_text(data: &MimeBundle) -> Option<String> {
    let value = data.get("text/plain")?;
    let source: CellSource = serde_json::from_value(value.clone()).ok()?;
    return Some(source.normalized().into_owned());
}

/// One week of a course: a title and its ordered cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekDocument {
    /// Ordered cells.
    #[serde(default)]
    pub cells: Vec<Cell>,
    /// Week title shown next to the week key.
    #[serde(default)]
    pub title: String,
}

/// Week key to week document. Key insertion order is display order.
pub type WeekMap = IndexMap<String, WeekDocument>;

/// A contiguous run of cells opened by a qualifying heading.
/// Derived fresh from a week document; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Section<'a> {
    /// Cells from the heading cell up to the next heading, heading cell included.
    pub cells: Vec<&'a Cell>,
    /// Index of the heading cell within the week.
    pub start_index: usize,
    /// Cleaned heading text.
    pub title: String,
}

/// Progress key of a section: `{course}_week{week}_section{index}`.
/// Positional, so it shifts when headings are inserted before it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SectionId(String);

impl SectionId {
    /// Build the identifier of the `index`-th extracted section of a week.
    pub fn new(course_id: &str, week: &str, index: usize) -> Self {
        return Self(format!("{course_id}_week{week}_section{index}"));
    }

    /// The identifier as stored in the progress store.
    pub fn as_str(&self) -> &str {
        return &self.0;
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.0);
    }
}
