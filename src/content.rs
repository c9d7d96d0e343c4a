//! Course content: a structured week map, or a raw markup document shown verbatim.

use crate::assets::AssetRoot;
use crate::error::Error;
use crate::types::{CourseDescriptor, WeekMap};

/// What a course's content file holds.
#[derive(Debug, Clone)]
pub enum CourseContent {
    /// Markup rendered as-is, outside section extraction and progress tracking.
    RawMarkup(String),
    /// Week key to week document, in display order.
    Structured(WeekMap),
}

impl CourseContent {
    /// Fetch a course's content file. Files with an `html` extension are raw
    /// markup; everything else is decoded as a week map.
    ///
    /// # Errors
    ///
    /// Returns `Error::Fetch` if the file cannot be read or decoded.
    pub fn load(assets: &AssetRoot, course: &CourseDescriptor) -> Result<Self, Error> {
        let path = course.content_file.as_path();
        if is_markup_file(path) {
            let markup = assets.fetch_text(path)?;
            tracing::info!(course = %course.id, bytes = markup.len(), "loaded markup course");
            return Ok(CourseContent::RawMarkup(markup));
        }

        let weeks: WeekMap = assets.fetch_json(path)?;
        tracing::info!(course = %course.id, weeks = weeks.len(), "loaded course content");
        return Ok(CourseContent::Structured(weeks));
    }

    /// The week map, if this is a structured course.
    pub fn weeks(&self) -> Option<&WeekMap> {
        return match self {
            CourseContent::RawMarkup(_) => None,
            CourseContent::Structured(weeks) => Some(weeks),
        };
    }

    /// Key of the first week in display order.
    pub fn first_week(&self) -> Option<&str> {
        return self.weeks()?.keys().next().map(String::as_str);
    }
}

/// Whether the content file extension marks a markup document.
fn is_markup_file(path: &std::path::Path) -> bool {
    return path
        .extension()
        .and_then(|e| return e.to_str())
        .is_some_and(|ext| return ext.eq_ignore_ascii_case("html"));
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::types::CourseStatus;

    fn course(content_file: &str) -> CourseDescriptor {
        CourseDescriptor {
            content_file: PathBuf::from(content_file),
            description: String::new(),
            duration: String::new(),
            id: "c".to_string(),
            level: String::new(),
            status: CourseStatus::Active,
            title: "C".to_string(),
        }
    }

    #[test]
    fn extension_selects_content_kind() {
        assert!(is_markup_file(Path::new("a/b.html")));
        assert!(is_markup_file(Path::new("B.HTML")));
        assert!(!is_markup_file(Path::new("b.json")));
        assert!(!is_markup_file(Path::new("html")));
    }

    #[test]
    fn loads_both_kinds() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.html"), "<h1>Hi</h1>").unwrap();
        std::fs::write(
            dir.path().join("weeks.json"),
            r#"{"2": {"title": "Second", "cells": []}, "1": {"title": "First", "cells": []}}"#,
        )
        .unwrap();
        let assets = AssetRoot::new(dir.path());

        let raw = CourseContent::load(&assets, &course("page.html")).unwrap();
        assert!(matches!(raw, CourseContent::RawMarkup(ref m) if m == "<h1>Hi</h1>"));
        assert_eq!(raw.first_week(), None);

        let structured = CourseContent::load(&assets, &course("weeks.json")).unwrap();
        assert_eq!(structured.first_week(), Some("2"));
        let first = structured.weeks().and_then(|w| w.get("1"));
        assert_eq!(first.map(|w| w.title.as_str()), Some("First"));
    }

    #[test]
    fn missing_content_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = CourseContent::load(&AssetRoot::new(dir.path()), &course("gone.json"));
        assert!(matches!(result, Err(Error::Fetch { .. })));
    }
}
