//! Completion percentages for weeks and whole courses.

use crate::progress::CourseProgress;
use crate::sections::extract_sections;
use crate::types::{SectionId, WeekDocument, WeekMap};

/// Completed and total section counts of one or more weeks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Sections marked complete.
    pub completed: usize,
    /// Sections extracted.
    pub total: usize,
}

impl Tally {
    /// Rounded completion percentage of this tally.
    pub fn percent(self) -> u32 {
        return percent(self.completed, self.total);
    }

    /// Every section is complete. Unlike `percent() == 100`, this does not
    /// round up a nearly finished week.
    pub const fn is_complete(self) -> bool {
        return self.total > 0 && self.completed == self.total;
    }
}

/// Round-half-up percentage of `completed` out of `total`; 0 when `total` is 0.
///
/// Computed as `(200c + t) / 2t` so no float rounding creeps in.
pub fn percent(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let numerator = completed.saturating_mul(200).saturating_add(total);
    let denominator = total.saturating_mul(2);
    let rounded = numerator.checked_div(denominator).unwrap_or(0);
    return u32::try_from(rounded).unwrap_or(u32::MAX);
}

/// Count completed sections of a week. Section identity is the zero-based
/// position among the week's extracted sections.
pub fn tally_week(
    course_id: &str,
    week_key: &str,
    week: &WeekDocument,
    progress: &CourseProgress,
) -> Tally {
    let sections = extract_sections(week);
    let completed = (0..sections.len())
        .filter(|&idx| return progress.is_completed(&SectionId::new(course_id, week_key, idx)))
        .count();
    return Tally { completed, total: sections.len() };
}

/// Completion percentage of a single week.
pub fn week_progress(
    course_id: &str,
    week_key: &str,
    week: &WeekDocument,
    progress: &CourseProgress,
) -> u32 {
    return tally_week(course_id, week_key, week, progress).percent();
}

/// Completion percentage across every week of a course, weighting each
/// section equally regardless of which week it sits in.
pub fn course_progress(course_id: &str, weeks: &WeekMap, progress: &CourseProgress) -> u32 {
    let tally = weeks.iter().fold(Tally::default(), |acc, (key, week)| {
        let week_tally = tally_week(course_id, key, week, progress);
        return Tally {
            completed: acc.completed.saturating_add(week_tally.completed),
            total: acc.total.saturating_add(week_tally.total),
        };
    });
    return tally.percent();
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::types::{Cell, CellSource};

    fn week_with_sections(count: usize) -> WeekDocument {
        let cells = (0..count)
            .map(|i| Cell::Markdown { source: CellSource::Text(format!("## Section {i}")) })
            .collect();
        WeekDocument { cells, title: String::new() }
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn empty_week_is_zero_percent() {
        let progress = CourseProgress::default();
        assert_eq!(week_progress("c", "1", &week_with_sections(0), &progress), 0);
    }

    #[test]
    fn week_and_course_percentages() {
        let mut weeks = WeekMap::new();
        weeks.insert("1".to_string(), week_with_sections(2));
        weeks.insert("2".to_string(), week_with_sections(2));

        let mut progress = CourseProgress::default();
        progress.set(&SectionId::new("c", "1", 0), true);
        progress.set(&SectionId::new("c", "2", 0), true);
        progress.set(&SectionId::new("c", "2", 1), true);

        assert_eq!(week_progress("c", "1", &weeks["1"], &progress), 50);
        assert_eq!(week_progress("c", "2", &weeks["2"], &progress), 100);
        assert_eq!(course_progress("c", &weeks, &progress), 75);
    }

    #[test]
    fn full_week_requires_every_flag_true() {
        let week = week_with_sections(2);
        let mut progress = CourseProgress::default();
        progress.set(&SectionId::new("c", "1", 0), true);
        progress.set(&SectionId::new("c", "1", 1), false);
        assert_eq!(week_progress("c", "1", &week, &progress), 50);

        progress.set(&SectionId::new("c", "1", 1), true);
        assert_eq!(week_progress("c", "1", &week, &progress), 100);
    }

    #[test]
    fn rounded_hundred_is_not_complete() {
        let week = week_with_sections(200);
        let mut progress = CourseProgress::default();
        for idx in 0..199 {
            progress.set(&SectionId::new("c", "1", idx), true);
        }
        let tally = tally_week("c", "1", &week, &progress);
        assert_eq!(tally.percent(), 100);
        assert!(!tally.is_complete());

        progress.set(&SectionId::new("c", "1", 199), true);
        assert!(tally_week("c", "1", &week, &progress).is_complete());
        assert!(!Tally::default().is_complete());
    }

    #[test]
    fn flags_of_other_courses_do_not_count() {
        let week = week_with_sections(1);
        let mut progress = CourseProgress::default();
        progress.set(&SectionId::new("other", "1", 0), true);
        assert_eq!(tally_week("c", "1", &week, &progress), Tally { completed: 0, total: 1 });
    }

    #[test]
    fn course_without_sections_is_zero() {
        let mut weeks = WeekMap::new();
        weeks.insert("1".to_string(), week_with_sections(0));
        assert_eq!(course_progress("c", &weeks, &CourseProgress::default()), 0);
    }
}
