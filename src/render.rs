//! HTML rendering of weeks, cells, and outputs.
//!
//! Markdown conversion and syntax highlighting are injected through
//! `MarkdownRenderer` and `Highlighter`; this module only decides what text
//! goes in and where the returned markup lands.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use crate::aggregate;
use crate::progress::CourseProgress;
use crate::sections::extract_sections;
use crate::types::{Cell, Output, Section, SectionId, WeekDocument, plain_text};

/// Named anchors such as `<a id='intro'></a>` left by notebook exporters.
static NAMED_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"<a id='[^']*'></a>").expect("valid regex"));

/// In-page links `[text](#anchor)`.
static IN_PAGE_LINK: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"\[([^\]]+)\]\(#[^)]+\)").expect("valid regex"));

/// Turns markdown text into markup.
pub trait MarkdownRenderer {
    /// Render markdown to markup.
    fn render(&self, markdown: &str) -> String;
}

/// Turns program text into highlighted markup.
pub trait Highlighter {
    /// Render `code` written in `language` to markup.
    fn highlight(&self, code: &str, language: &str) -> String;
}

/// CommonMark with GFM tables, strikethrough, and task lists. Single line
/// breaks inside a paragraph are kept as `<br />`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmarkRenderer;

impl MarkdownRenderer for CmarkRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut options = pulldown_cmark::Options::empty();
        options.insert(pulldown_cmark::Options::ENABLE_STRIKETHROUGH);
        options.insert(pulldown_cmark::Options::ENABLE_TABLES);
        options.insert(pulldown_cmark::Options::ENABLE_TASKLISTS);

        let parser = pulldown_cmark::Parser::new_ext(markdown, options).map(|event| {
            return match event {
                pulldown_cmark::Event::SoftBreak => pulldown_cmark::Event::HardBreak,
                other => other,
            };
        });
        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, parser);
        return html;
    }
}

/// Escapes code and tags it with a `language-*` class for a client-side highlighter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassHighlighter;

impl Highlighter for ClassHighlighter {
    fn highlight(&self, code: &str, language: &str) -> String {
        let language = escape_html(language);
        let code = escape_html(code);
        return format!("<pre><code class=\"language-{language}\">{code}</code></pre>");
    }
}

/// Renders weeks of a structured course.
#[derive(Debug, Clone)]
pub struct Renderer<M, H> {
    /// Language every code cell is highlighted as.
    code_language: String,
    /// Code highlighter.
    highlighter: H,
    /// Markdown converter.
    markdown: M,
}

impl Renderer<CmarkRenderer, ClassHighlighter> {
    /// Renderer using pulldown-cmark and class-tagged code blocks.
    pub fn with_defaults(code_language: &str) -> Self {
        return Self::new(CmarkRenderer, ClassHighlighter, code_language);
    }
}

impl<M: MarkdownRenderer, H: Highlighter> Renderer<M, H> {
    /// Renderer with injected markdown and highlighting providers.
    pub fn new(markdown: M, highlighter: H, code_language: &str) -> Self {
        return Self { code_language: code_language.to_string(), highlighter, markdown };
    }

    /// Render one cell. Cells other than markdown and code render nothing.
    pub fn render_cell(&self, cell: &Cell) -> String {
        return match cell {
            Cell::Code { outputs, source } => self.render_code(&source.normalized(), outputs),
            Cell::Markdown { source } => {
                let cleaned = clean_markdown(&source.normalized());
                format!("<div class=\"markdown-content\">{}</div>\n", self.markdown.render(&cleaned))
            },
            Cell::Other => String::new(),
        };
    }

    /// Render a code listing followed by its outputs.
    fn render_code(&self, code: &str, outputs: &[Output]) -> String {
        let mut out = String::from("<div class=\"code-block\">\n");
        let _ = writeln!(
            out,
            "<div class=\"code-header\"><span class=\"code-language\">{}</span>\
             <span class=\"code-badge\">Read-only</span></div>",
            escape_html(&display_language(&self.code_language)),
        );
        let _ = writeln!(
            out,
            "<div class=\"code-content\">{}</div>",
            self.highlighter.highlight(code, &self.code_language),
        );
        for output in outputs {
            out.push_str(&render_output(output));
        }
        out.push_str("</div>\n");
        return out;
    }

    /// Render one section: a completion checkbox labelled with the title, then its cells.
    fn render_section(&self, id: &SectionId, section: &Section<'_>, completed: bool) -> String {
        let state = if completed { " completed" } else { "" };
        let checked = if completed { " checked" } else { "" };
        let id = escape_html(id.as_str());

        let mut out = format!("<div class=\"section-item{state}\" data-section-id=\"{id}\">\n");
        let _ = writeln!(
            out,
            "<div class=\"section-header\"><input type=\"checkbox\" class=\"section-checkbox\" \
             id=\"{id}\"{checked}><label class=\"section-label\" for=\"{id}\">{}</label></div>",
            escape_html(&section.title),
        );
        out.push_str("<div class=\"section-content\">\n");
        for cell in &section.cells {
            out.push_str(&self.render_cell(cell));
        }
        out.push_str("</div>\n</div>\n");
        return out;
    }

    /// Render a week: header with title, section count, and percent, then every section.
    pub fn render_week(
        &self,
        course_id: &str,
        week_key: &str,
        week: &WeekDocument,
        progress: &CourseProgress,
    ) -> String {
        let sections = extract_sections(week);
        let percent = aggregate::week_progress(course_id, week_key, week, progress);

        let mut out = String::from("<div class=\"lesson-content\">\n");
        let _ = writeln!(
            out,
            "<div class=\"content-header\"><h2>{}</h2><p class=\"content-subtitle\">{} sections \
             &middot; {percent}%</p></div>",
            escape_html(&week.title),
            sections.len(),
        );
        for (idx, section) in sections.iter().enumerate() {
            let id = SectionId::new(course_id, week_key, idx);
            out.push_str(&self.render_section(&id, section, progress.is_completed(&id)));
        }
        out.push_str("</div>\n");
        return out;
    }
}

/// Render one captured output as preformatted text.
pub fn render_output(output: &Output) -> String {
    let (class, text) = match output {
        Output::DisplayData { data } | Output::ExecuteResult { data } => {
            ("output-text", plain_text(data).unwrap_or_default())
        },
        Output::Error { ename, evalue, traceback } => {
            let text = if traceback.is_empty() {
                format!("{ename}: {evalue}")
            } else {
                traceback.join("\n")
            };
            ("output-error", text)
        },
        Output::Stream { text } => ("output-text", text.normalized().into_owned()),
    };

    let mut out = String::from("<div class=\"output-block\"><div class=\"output-label\">Output</div>");
    if !text.is_empty() {
        let _ = write!(out, "<pre class=\"{class}\">{}</pre>", escape_html(&text));
    }
    out.push_str("</div>\n");
    return out;
}

/// Wrap a markup course with its title. The markup is inserted verbatim.
pub fn render_raw_course(title: &str, markup: &str) -> String {
    return format!(
        "<div class=\"content-header\"><h2>{}</h2><p class=\"content-subtitle\">HTML course</p></div>\n\
         <div class=\"html-course-content\">\n{markup}\n</div>\n",
        escape_html(title),
    );
}

/// Drop named anchors and collapse in-page links to their text.
pub fn clean_markdown(source: &str) -> String {
    let without_anchors = NAMED_ANCHOR.replace_all(source, "");
    return IN_PAGE_LINK.replace_all(&without_anchors, "$1").into_owned();
}

/// Escape text for use in HTML content and attribute values.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    return out;
}

/// Capitalize a language name for the code header, e.g. `python` -> `Python`.
fn display_language(language: &str) -> String {
    let mut chars = language.chars();
    return match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    };
}
