//! The session controller: owns everything a viewing session touches and
//! threads it through every operation.

use std::path::Path;

use crate::aggregate;
use crate::assets::AssetRoot;
use crate::catalog::Catalog;
use crate::content::CourseContent;
use crate::error::Error;
use crate::events::{CourseEvent, EVENT_BACKLOG, EventReceiver, EventSender};
use crate::progress::{CourseProgress, ProgressStore};
use crate::render::{Highlighter, MarkdownRenderer, Renderer, render_raw_course};
use crate::sections::extract_sections;
use crate::storage::KeyValueStore;
use crate::theme::Theme;
use crate::types::{CourseDescriptor, SectionId, WeekDocument};

/// The course currently being viewed.
#[derive(Debug, Clone)]
pub struct OpenCourse {
    /// Loaded content.
    pub content: CourseContent,
    /// Catalog entry of the course.
    pub course: CourseDescriptor,
    /// Week on display. `None` for markup courses.
    pub current_week: Option<String>,
}

/// One section as listed in a week view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionView {
    /// Number of cells in the section, heading cell included.
    pub cell_count: usize,
    /// Whether the learner marked it complete.
    pub completed: bool,
    /// Index of the heading cell within the week.
    pub first_cell: usize,
    /// Progress key.
    pub id: SectionId,
    /// Heading text.
    pub title: String,
}

/// A week ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekView {
    /// Week key.
    pub key: String,
    /// Completion percentage.
    pub percent: u32,
    /// Sections in order.
    pub sections: Vec<SectionView>,
    /// Week title.
    pub title: String,
}

/// One line of the week list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekSummary {
    /// Week key.
    pub key: String,
    /// Completion percentage.
    pub percent: u32,
    /// Number of sections.
    pub section_count: usize,
    /// Week title.
    pub title: String,
}

/// A viewing session over one course site.
pub struct Session<S> {
    /// Where catalog and content files are read from.
    assets: AssetRoot,
    /// Courses on offer.
    catalog: Catalog,
    /// Sending half of the event channel.
    events: EventSender,
    /// Receiving half, cloned out to observers. Undrained events stop at
    /// `EVENT_BACKLOG`; later ones are dropped.
    observers: EventReceiver,
    /// Course on display, if any.
    open: Option<OpenCourse>,
    /// Completion flags of every course, mirrored to `storage`.
    progress: ProgressStore,
    /// Durable key-value store.
    storage: S,
    /// Color scheme preference, mirrored to `storage`.
    theme: Theme,
}

impl<S: KeyValueStore> Session<S> {
    /// Start a session: read the theme and progress from storage, then fetch
    /// the catalog. A catalog that cannot be fetched leaves the session with
    /// no courses rather than failing.
    ///
    /// # Errors
    ///
    /// Returns errors from the key-value backend.
    pub fn start(assets: AssetRoot, catalog_path: &Path, storage: S) -> Result<Self, Error> {
        let theme = Theme::load(&storage)?;
        let progress = ProgressStore::load(&storage)?;
        // Fetch failures are already logged by the asset layer.
        let catalog = Catalog::load(&assets, catalog_path).unwrap_or_default();
        let (events, observers) = crossbeam_channel::bounded(EVENT_BACKLOG);

        return Ok(Self { assets, catalog, events, observers, open: None, progress, storage, theme });
    }

    /// The course catalog.
    pub const fn catalog(&self) -> &Catalog {
        return &self.catalog;
    }

    /// The course on display, if any.
    pub const fn current(&self) -> Option<&OpenCourse> {
        return self.open.as_ref();
    }

    /// Current theme.
    pub const fn theme(&self) -> Theme {
        return self.theme;
    }

    /// A receiver for events raised by this session.
    pub fn subscribe(&self) -> EventReceiver {
        return self.observers.clone();
    }

    /// Open a course by id. Structured courses land on their first week.
    /// On failure the previously open course stays open.
    ///
    /// # Errors
    ///
    /// Returns `Error::CourseComingSoon` or `Error::CourseNotFound` from the
    /// catalog, or `Error::Fetch` if the content cannot be loaded.
    pub fn open_course(&mut self, id: &str) -> Result<&OpenCourse, Error> {
        let course = self.catalog.require_active(id)?.clone();
        let content = CourseContent::load(&self.assets, &course)?;
        let current_week = content.first_week().map(str::to_string);

        self.progress.get(&course.id);
        tracing::info!(course = %course.id, week = ?current_week, "opened course");
        return Ok(&*self.open.insert(OpenCourse { content, course, current_week }));
    }

    /// Build the view of a week and make it the current week.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCourseOpen`, `Error::NotStructured`, or `Error::UnknownWeek`.
    pub fn display_week(&mut self, key: &str) -> Result<WeekView, Error> {
        let Some(open) = self.open.as_mut() else {
            return Err(Error::NoCourseOpen);
        };
        let progress = self.progress.get(&open.course.id);
        let view = build_week_view(open, key, progress)?;
        open.current_week = Some(key.to_string());
        return Ok(view);
    }

    /// Every week of the open course with its completion percentage.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCourseOpen` or `Error::NotStructured`.
    pub fn week_overview(&mut self) -> Result<Vec<WeekSummary>, Error> {
        let open = self.open.as_ref().ok_or(Error::NoCourseOpen)?;
        let weeks = structured_weeks(open)?;
        let progress = self.progress.get(&open.course.id);

        let summaries = weeks
            .iter()
            .map(|(key, week)| {
                let tally = aggregate::tally_week(&open.course.id, key, week, progress);
                return WeekSummary {
                    key: key.clone(),
                    percent: tally.percent(),
                    section_count: tally.total,
                    title: week.title.clone(),
                };
            })
            .collect();
        return Ok(summaries);
    }

    /// Completion percentage of the whole open course.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCourseOpen` or `Error::NotStructured`.
    pub fn course_progress(&mut self) -> Result<u32, Error> {
        let open = self.open.as_ref().ok_or(Error::NoCourseOpen)?;
        let weeks = structured_weeks(open)?;
        let progress = self.progress.get(&open.course.id);
        return Ok(aggregate::course_progress(&open.course.id, weeks, progress));
    }

    /// Mark a section of the open course complete or incomplete and persist
    /// the whole progress store. Returns the week's new percentage.
    ///
    /// Raises `CourseEvent::WeekCompleted` when this toggle moves a section
    /// from incomplete to complete and every section of the week is complete.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCourseOpen`, `Error::NotStructured`, `Error::UnknownWeek`,
    /// `Error::UnknownSection`, or errors from persisting the store.
    pub fn toggle_section(&mut self, week_key: &str, index: usize, completed: bool) -> Result<u32, Error> {
        let open = self.open.as_ref().ok_or(Error::NoCourseOpen)?;
        let week = week_of(open, week_key)?;
        let course_id = open.course.id.as_str();

        let count = extract_sections(week).len();
        if index >= count {
            return Err(Error::UnknownSection {
                count,
                course: course_id.to_string(),
                index,
                week: week_key.to_string(),
            });
        }

        let id = SectionId::new(course_id, week_key, index);
        let was_completed = self.progress.get(course_id).is_completed(&id);
        self.progress.set(course_id, &id, completed);
        let tally = aggregate::tally_week(course_id, week_key, week, self.progress.get(course_id));
        let percent = tally.percent();
        tracing::info!(section = %id, completed, percent, "toggled section");

        self.progress.persist(&mut self.storage)?;

        if completed && !was_completed && tally.is_complete() {
            tracing::info!(course = course_id, week = week_key, "week completed");
            if self.events.try_send(CourseEvent::WeekCompleted).is_err() {
                tracing::debug!("event backlog full, dropped week completed");
            }
        }
        return Ok(percent);
    }

    /// Clear every completion flag of the open course and persist.
    /// Callers confirm with the learner first.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCourseOpen` or errors from persisting the store.
    pub fn reset_course_progress(&mut self) -> Result<(), Error> {
        let open = self.open.as_ref().ok_or(Error::NoCourseOpen)?;
        self.progress.reset(&open.course.id);
        self.progress.persist(&mut self.storage)?;
        tracing::info!(course = %open.course.id, "reset course progress");
        return Ok(());
    }

    /// Render the open course: a markup course verbatim, or one week of a
    /// structured course (`week`, else the current week).
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCourseOpen`, `Error::EmptyCourse`, or `Error::UnknownWeek`.
    pub fn render<M: MarkdownRenderer, H: Highlighter>(
        &mut self,
        renderer: &Renderer<M, H>,
        week: Option<&str>,
    ) -> Result<String, Error> {
        let open = self.open.as_ref().ok_or(Error::NoCourseOpen)?;
        if let CourseContent::RawMarkup(markup) = &open.content {
            return Ok(render_raw_course(&open.course.title, markup));
        }

        let Some(key) = week.or(open.current_week.as_deref()) else {
            return Err(Error::EmptyCourse { id: open.course.id.clone() });
        };
        let document = week_of(open, key)?;
        let progress = self.progress.get(&open.course.id);
        return Ok(renderer.render_week(&open.course.id, key, document, progress));
    }

    /// Switch between light and dark and persist the choice.
    ///
    /// # Errors
    ///
    /// Returns errors from the key-value backend.
    pub fn toggle_theme(&mut self) -> Result<Theme, Error> {
        self.theme = self.theme.toggled();
        self.theme.persist(&mut self.storage)?;
        return Ok(self.theme);
    }
}

/// The week map of a structured course.
///
/// # Errors
///
/// Returns `Error::NotStructured` for markup courses.
fn structured_weeks(open: &OpenCourse) -> Result<&crate::types::WeekMap, Error> {
    return open.content.weeks().ok_or_else(|| {
        return Error::NotStructured { id: open.course.id.clone() };
    });
}

/// Look a week up by key.
///
/// # Errors
///
/// Returns `Error::NotStructured` or `Error::UnknownWeek`.
fn week_of<'a>(open: &'a OpenCourse, key: &str) -> Result<&'a WeekDocument, Error> {
    return structured_weeks(open)?.get(key).ok_or_else(|| {
        return Error::UnknownWeek { course: open.course.id.clone(), week: key.to_string() };
    });
}

/// Extract a week's sections and pair each with its completion flag.
///
/// # Errors
///
/// Returns `Error::NotStructured` or `Error::UnknownWeek`.
fn build_week_view(open: &OpenCourse, key: &str, progress: &CourseProgress) -> Result<WeekView, Error> {
    let week = week_of(open, key)?;
    let course_id = open.course.id.as_str();

    let sections: Vec<SectionView> = extract_sections(week)
        .into_iter()
        .enumerate()
        .map(|(idx, section)| {
            let id = SectionId::new(course_id, key, idx);
            return SectionView {
                cell_count: section.cells.len(),
                completed: progress.is_completed(&id),
                first_cell: section.start_index,
                id,
                title: section.title,
            };
        })
        .collect();
    let completed = sections.iter().filter(|s| return s.completed).count();

    return Ok(WeekView {
        key: key.to_string(),
        percent: aggregate::percent(completed, sections.len()),
        sections,
        title: week.title.clone(),
    });
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, PROGRESS_KEY};

    const CATALOG: &str = r#"{"courses": [
        {"id": "py", "title": "Python", "status": "active", "contentFile": "data/py.json"},
        {"id": "web", "title": "Web", "status": "active", "contentFile": "data/web.html"},
        {"id": "broken", "title": "Broken", "status": "active", "contentFile": "data/missing.json"},
        {"id": "go", "title": "Go", "status": "coming-soon", "contentFile": "data/go.json"}
    ]}"#;

    const PY: &str = r####"{
        "1": {"title": "Basics", "cells": [
            {"cell_type": "markdown", "source": "intro text"},
            {"cell_type": "markdown", "source": "## Setup"},
            {"cell_type": "code", "source": "print(1)", "outputs": []},
            {"cell_type": "markdown", "source": "## Usage"},
            {"cell_type": "markdown", "source": "details"}
        ]},
        "2": {"title": "Loops", "cells": [
            {"cell_type": "markdown", "source": ["## For loops\n", "text"]},
            {"cell_type": "markdown", "source": "### While loops"}
        ]}
    }"####;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("courses.json"), CATALOG).unwrap();
        std::fs::write(dir.path().join("data/py.json"), PY).unwrap();
        std::fs::write(dir.path().join("data/web.html"), "<p>hello</p>").unwrap();
        dir
    }

    fn start(dir: &tempfile::TempDir, kv: MemoryStore) -> Session<MemoryStore> {
        Session::start(AssetRoot::new(dir.path()), Path::new("courses.json"), kv).unwrap()
    }

    #[test]
    fn opening_lands_on_first_week() {
        let dir = site();
        let mut session = start(&dir, MemoryStore::default());
        let open = session.open_course("py").unwrap();
        assert_eq!(open.current_week.as_deref(), Some("1"));

        let view = session.display_week("1").unwrap();
        let titles: Vec<&str> = view.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Setup", "Usage"]);
        assert_eq!((view.sections[0].first_cell, view.sections[0].cell_count), (1, 2));
        assert_eq!(view.sections[1].id, SectionId::new("py", "1", 1));
    }

    #[test]
    fn failed_open_keeps_previous_course() {
        let dir = site();
        let mut session = start(&dir, MemoryStore::default());
        session.open_course("py").unwrap();

        assert!(matches!(session.open_course("broken"), Err(Error::Fetch { .. })));
        assert!(matches!(session.open_course("go"), Err(Error::CourseComingSoon { .. })));
        assert!(matches!(session.open_course("nope"), Err(Error::CourseNotFound { .. })));
        assert_eq!(session.current().map(|o| o.course.id.as_str()), Some("py"));
    }

    #[test]
    fn missing_catalog_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let session = start(&dir, MemoryStore::default());
        assert!(session.catalog().courses.is_empty());
    }

    #[test]
    fn progress_percentages_follow_toggles() {
        let dir = site();
        let mut session = start(&dir, MemoryStore::default());
        session.open_course("py").unwrap();

        assert_eq!(session.toggle_section("1", 0, true).unwrap(), 50);
        session.toggle_section("2", 0, true).unwrap();
        session.toggle_section("2", 1, true).unwrap();

        assert_eq!(session.display_week("1").unwrap().percent, 50);
        assert_eq!(session.display_week("2").unwrap().percent, 100);
        assert_eq!(session.course_progress().unwrap(), 75);

        let overview = session.week_overview().unwrap();
        assert_eq!(overview.len(), 2);
        assert_eq!((overview[1].section_count, overview[1].percent), (2, 100));
    }

    #[test]
    fn week_completed_fires_once_per_transition() {
        let dir = site();
        let mut session = start(&dir, MemoryStore::default());
        let events = session.subscribe();
        session.open_course("py").unwrap();

        session.toggle_section("1", 0, true).unwrap();
        assert!(events.try_recv().is_err());

        session.toggle_section("1", 1, true).unwrap();
        assert_eq!(events.try_recv(), Ok(CourseEvent::WeekCompleted));

        session.toggle_section("1", 1, true).unwrap();
        assert!(events.try_recv().is_err());

        session.toggle_section("1", 1, false).unwrap();
        session.toggle_section("1", 1, true).unwrap();
        assert_eq!(events.try_iter().count(), 1);
    }

    #[test]
    fn nearly_full_week_raises_no_event() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("data")).unwrap();
        std::fs::write(
            dir.path().join("courses.json"),
            r#"{"courses": [{"id": "big", "title": "Big", "status": "active", "contentFile": "data/big.json"}]}"#,
        )
        .unwrap();
        let cells: Vec<serde_json::Value> = (0..200)
            .map(|i| serde_json::json!({"cell_type": "markdown", "source": format!("## Section {i}")}))
            .collect();
        let content = serde_json::json!({"1": {"title": "Long week", "cells": cells}});
        std::fs::write(dir.path().join("data/big.json"), content.to_string()).unwrap();

        let mut session = start(&dir, MemoryStore::default());
        let events = session.subscribe();
        session.open_course("big").unwrap();

        for idx in 0..198 {
            session.toggle_section("1", idx, true).unwrap();
        }
        assert_eq!(session.toggle_section("1", 198, true).unwrap(), 100);
        assert!(events.try_recv().is_err());

        session.toggle_section("1", 199, true).unwrap();
        assert_eq!(events.try_recv(), Ok(CourseEvent::WeekCompleted));
    }

    #[test]
    fn undrained_events_stay_bounded() {
        let dir = site();
        let mut session = start(&dir, MemoryStore::default());
        session.open_course("py").unwrap();
        session.toggle_section("1", 0, true).unwrap();

        for _ in 0..EVENT_BACKLOG + 4 {
            session.toggle_section("1", 1, false).unwrap();
            session.toggle_section("1", 1, true).unwrap();
        }
        assert_eq!(session.subscribe().len(), EVENT_BACKLOG);
    }

    #[test]
    fn toggles_persist_and_reload() {
        let dir = site();
        let mut session = start(&dir, MemoryStore::default());
        session.open_course("py").unwrap();
        session.toggle_section("1", 1, true).unwrap();

        let Session { storage, .. } = session;
        let blob = storage.get(PROGRESS_KEY).unwrap().unwrap();
        assert!(blob.contains("\"py_week1_section1\":true"));

        let mut reloaded = start(&dir, storage);
        reloaded.open_course("py").unwrap();
        assert!(reloaded.display_week("1").unwrap().sections[1].completed);
    }

    #[test]
    fn bad_section_and_week_are_rejected() {
        let dir = site();
        let mut session = start(&dir, MemoryStore::default());
        assert!(matches!(session.toggle_section("1", 0, true), Err(Error::NoCourseOpen)));

        session.open_course("py").unwrap();
        assert!(matches!(
            session.toggle_section("1", 2, true),
            Err(Error::UnknownSection { count: 2, index: 2, .. })
        ));
        assert!(matches!(session.display_week("9"), Err(Error::UnknownWeek { .. })));
    }

    #[test]
    fn reset_clears_open_course_only() {
        let dir = site();
        let mut kv = MemoryStore::default();
        kv.set(PROGRESS_KEY, r#"{"other":{"other_week1_section0":true}}"#).unwrap();
        let mut session = start(&dir, kv);
        session.open_course("py").unwrap();
        session.toggle_section("1", 0, true).unwrap();

        session.reset_course_progress().unwrap();

        assert_eq!(session.course_progress().unwrap(), 0);
        assert!(session.progress.get("other").is_completed(&SectionId::new("other", "1", 0)));
    }

    #[test]
    fn markup_course_bypasses_weeks() {
        let dir = site();
        let mut session = start(&dir, MemoryStore::default());
        session.open_course("web").unwrap();

        assert!(matches!(session.display_week("1"), Err(Error::NotStructured { .. })));
        assert!(matches!(session.course_progress(), Err(Error::NotStructured { .. })));

        let html = session.render(&Renderer::with_defaults("python"), None).unwrap();
        assert!(html.contains("<p>hello</p>"));
    }

    #[test]
    fn render_uses_current_week() {
        let dir = site();
        let mut session = start(&dir, MemoryStore::default());
        session.open_course("py").unwrap();
        session.display_week("2").unwrap();

        let html = session.render(&Renderer::with_defaults("python"), None).unwrap();
        assert!(html.contains("For loops"));
        assert!(!html.contains("Setup"));
    }

    #[test]
    fn theme_toggle_persists() {
        let dir = site();
        let mut session = start(&dir, MemoryStore::default());
        assert_eq!(session.toggle_theme().unwrap(), Theme::Dark);

        let Session { storage, .. } = session;
        assert_eq!(start(&dir, storage).theme(), Theme::Dark);
    }
}
