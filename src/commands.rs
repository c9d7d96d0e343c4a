//! CLI commands for coursebook: courses, weeks, show, render, mark, progress, reset, theme.

use std::io::BufRead as _;
use std::io::Write as _;
use std::path::Path;

use crate::assets::AssetRoot;
use crate::config::Config;
use crate::error;
use crate::events::{CourseEvent, EventReceiver};
use crate::render::Renderer;
use crate::session::Session;
use crate::storage::FileStore;

/// Load config and storage for the site at `root` and start a session.
///
/// # Errors
///
/// Returns errors from config loading or opening the storage file.
fn start_session(root: &Path) -> Result<(Config, Session<FileStore>), error::Error> {
    let config = Config::load(root)?;
    let storage = FileStore::open(&root.join(&config.storage))?;
    let session = Session::start(AssetRoot::new(root), &config.catalog, storage)?;
    return Ok((config, session));
}

/// Start a session and open one course.
///
/// # Errors
///
/// Returns errors from session start-up or from opening the course.
fn open_session(root: &Path, course: &str) -> Result<(Config, Session<FileStore>), error::Error> {
    let (config, mut session) = start_session(root)?;
    session.open_course(course)?;
    return Ok((config, session));
}

/// List every course in the catalog.
///
/// # Errors
///
/// Returns errors from session start-up.
pub fn courses(root: &Path) -> Result<(), error::Error> {
    let (_, session) = start_session(root)?;
    let catalog = session.catalog();

    if catalog.courses.is_empty() {
        println!("No courses available.");
        return Ok(());
    }

    for course in &catalog.courses {
        println!("{:<16} {:<12} {}", course.id, course.status.label(), course.title);
        let details: Vec<&str> = [course.duration.as_str(), course.level.as_str()]
            .into_iter()
            .filter(|d| return !d.is_empty())
            .collect();
        if !details.is_empty() {
            println!("{:<16} {}", "", details.join(" / "));
        }
        if !course.description.is_empty() {
            println!("{:<16} {}", "", course.description);
        }
    }
    return Ok(());
}

/// Print the week list of a course with per-week and overall percentages.
///
/// # Errors
///
/// Returns errors from opening the course, or `Error::NotStructured` for markup courses.
pub fn weeks(root: &Path, course: &str) -> Result<(), error::Error> {
    let (_, mut session) = open_session(root, course)?;
    let overview = session.week_overview()?;
    let total = session.course_progress()?;

    print_course_heading(&session);
    println!("Progress: {total}%");
    println!();
    for week in &overview {
        println!(
            "Week {:<4} {:>3}%  {} ({} sections)",
            week.key, week.percent, week.title, week.section_count
        );
    }
    return Ok(());
}

/// Print the sections of one week with their completion state.
///
/// # Errors
///
/// Returns errors from opening the course or looking up the week.
pub fn show(root: &Path, course: &str, week: Option<&str>) -> Result<(), error::Error> {
    let (_, mut session) = open_session(root, course)?;
    let key = resolve_week(&session, week)?;
    let view = session.display_week(&key)?;

    print_course_heading(&session);
    println!("Week {}: {}", view.key, view.title);
    println!("{} sections, {}% complete", view.sections.len(), view.percent);
    println!();
    for (idx, section) in view.sections.iter().enumerate() {
        let mark = if section.completed { "x" } else { " " };
        let last_cell = section.first_cell.saturating_add(section.cell_count).saturating_sub(1);
        println!(
            "  [{mark}] {idx:>2}  {}  (cells {}-{last_cell})",
            section.title, section.first_cell
        );
    }
    return Ok(());
}

/// Render a week (or a whole markup course) to HTML on stdout or into a file.
///
/// # Errors
///
/// Returns errors from opening the course, rendering, or writing the output file.
pub fn render(
    root: &Path,
    course: &str,
    week: Option<&str>,
    output: Option<&Path>,
) -> Result<(), error::Error> {
    let (config, mut session) = open_session(root, course)?;
    let renderer = Renderer::with_defaults(&config.code_language);
    let html = session.render(&renderer, week)?;

    match output {
        None => print!("{html}"),
        Some(path) => {
            std::fs::write(path, &html)?;
            eprintln!("Wrote {}", path.display());
        },
    }
    return Ok(());
}

/// Mark a section complete or incomplete.
///
/// # Errors
///
/// Returns errors from opening the course, validating the section, or persisting progress.
pub fn mark(
    root: &Path,
    course: &str,
    week: &str,
    index: usize,
    completed: bool,
) -> Result<(), error::Error> {
    let (_, mut session) = open_session(root, course)?;
    let events = session.subscribe();
    let percent = session.toggle_section(week, index, completed)?;

    let state = if completed { "complete" } else { "incomplete" };
    eprintln!("Marked section {index} of week {week} {state} (week at {percent}%)");
    announce_events(&events, week);
    return Ok(());
}

/// Print overall and per-week progress as percentages.
///
/// # Errors
///
/// Returns errors from opening the course, or `Error::NotStructured` for markup courses.
pub fn progress(root: &Path, course: &str) -> Result<(), error::Error> {
    let (_, mut session) = open_session(root, course)?;
    let total = session.course_progress()?;
    let overview = session.week_overview()?;

    println!("{course}: {total}%");
    for week in &overview {
        println!("  week {}: {}%", week.key, week.percent);
    }
    return Ok(());
}

/// Clear all progress of a course after confirmation.
///
/// # Errors
///
/// Returns errors from opening the course, reading the confirmation, or persisting.
pub fn reset(root: &Path, course: &str, yes: bool) -> Result<(), error::Error> {
    let (_, mut session) = open_session(root, course)?;
    let title = session.current().map(|o| return o.course.title.clone()).unwrap_or_default();

    if !yes && !confirm(&format!("Reset all progress for `{title}`?"))? {
        eprintln!("Reset cancelled.");
        return Ok(());
    }

    session.reset_course_progress()?;
    eprintln!("Progress reset for {course}");
    return Ok(());
}

/// Print the theme preference, or flip it.
///
/// # Errors
///
/// Returns errors from session start-up or persisting the theme.
pub fn theme(root: &Path, toggle: bool) -> Result<(), error::Error> {
    let (_, mut session) = start_session(root)?;
    let theme = if toggle { session.toggle_theme()? } else { session.theme() };
    println!("{theme}");
    return Ok(());
}

/// Report every event raised during the command.
fn announce_events(events: &EventReceiver, week: &str) {
    for event in events.try_iter() {
        match event {
            CourseEvent::WeekCompleted => eprintln!("Week {week} complete. Well done!"),
        }
    }
    return;
}

/// Ask a yes/no question on stderr and read the answer from stdin. Defaults to no.
///
/// # Errors
///
/// Returns `Error::Io` if stdin cannot be read.
fn confirm(question: &str) -> Result<bool, error::Error> {
    eprint!("{question} [y/N] ");
    std::io::stderr().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    return Ok(answer == "y" || answer == "yes");
}

/// Print the open course's title as a heading.
fn print_course_heading(session: &Session<FileStore>) {
    if let Some(open) = session.current() {
        println!("# {}", open.course.title);
    }
    return;
}

/// Pick the week to show: the requested one, else the course's current week.
///
/// # Errors
///
/// Returns `Error::NotStructured` for markup courses or `Error::EmptyCourse`
/// when the course has no weeks.
fn resolve_week(session: &Session<FileStore>, week: Option<&str>) -> Result<String, error::Error> {
    if let Some(key) = week {
        return Ok(key.to_string());
    }
    let open = session.current().ok_or(error::Error::NoCourseOpen)?;
    if open.content.weeks().is_none() {
        return Err(error::Error::NotStructured { id: open.course.id.clone() });
    }
    return open
        .current_week
        .clone()
        .ok_or_else(|| return error::Error::EmptyCourse { id: open.course.id.clone() });
}
