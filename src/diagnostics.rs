use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown notice.
///
/// Each variant produces a block with what happened and, where the learner
/// can act on it, how to fix it.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::CourseComingSoon { id } => render_course_coming_soon(id),
        Error::CourseNotFound { id } => render_course_not_found(id),
        Error::Fetch { path, reason } => render_fetch(&path.display().to_string(), reason),
        Error::NotStructured { id } => render_not_structured(id),
        Error::UnknownSection { count, course, index, week } => {
            render_unknown_section(course, week, *index, *count)
        },
        Error::UnknownWeek { course, week } => render_unknown_week(course, week),
        _ => render_generic(e),
    }
}

fn render_generic(e: &Error) -> String {
    match e {
        Error::EmptyCourse { id } => format!("\
# Error: Empty Course

Course `{id}` has no weeks to show.
"),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),

        Error::Json(e) => format!("\
# Error: JSON

{e}
"),

        Error::NoCourseOpen => "\
# Error: No Course Open

Open a course first.
"
        .to_string(),

        Error::StorageCorrupt { path, reason } => format!("\
# Error: Storage Corrupt

`{}` could not be parsed: {reason}

## Fix

Move the file aside; a fresh one is created on the next write.
", path.display()),

        Error::TomlDe(e) => format!("\
# Error: Invalid Config

{e}

## Fix

Check `.coursebook.toml`. Recognised keys: `catalog`, `storage`, `code_language`.
"),

        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    }
}

fn render_course_coming_soon(id: &str) -> String {
    format!("\
# Course Coming Soon

`{id}` is listed but not available yet.
")
}

fn render_course_not_found(id: &str) -> String {
    format!("\
# Error: Course Not Found

No course with id `{id}` in the catalog.

## Fix

List the available courses:

    coursebook courses
")
}

fn render_fetch(path: &str, reason: &str) -> String {
    format!("\
# Error: Could Not Load Course Content

`{path}`: {reason}

Nothing was changed. Check that the file exists and is valid, then retry.
")
}

fn render_not_structured(id: &str) -> String {
    format!("\
# Error: Markup Course

`{id}` is an HTML document without weeks or progress tracking.

## Fix

Render it instead:

    coursebook render {id}
")
}

fn render_unknown_section(course: &str, week: &str, index: usize, count: usize) -> String {
    let range = match count.checked_sub(1) {
        None => "this week has no sections".to_string(),
        Some(last) => format!("valid indices are 0 to {last}"),
    };
    format!("\
# Error: Unknown Section

Week `{week}` of `{course}` has no section {index}; {range}.

## Fix

List the sections with their indices:

    coursebook show {course} --week {week}
")
}

fn render_unknown_week(course: &str, week: &str) -> String {
    format!("\
# Error: Unknown Week

`{course}` has no week `{week}`.

## Fix

List the weeks:

    coursebook weeks {course}
")
}
