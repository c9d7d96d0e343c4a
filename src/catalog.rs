use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assets::AssetRoot;
use crate::error::Error;
use crate::types::{CourseDescriptor, CourseStatus};

/// The list of courses offered by a site, in display order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Course descriptors as listed in the catalog file.
    pub courses: Vec<CourseDescriptor>,
}

/// Outcome of looking a course up by id.
#[derive(Debug, Clone, Copy)]
pub enum CourseLookup<'a> {
    /// Listed and openable.
    Active(&'a CourseDescriptor),
    /// Listed but not openable yet.
    ComingSoon(&'a CourseDescriptor),
    /// No course carries the id.
    NotFound,
}

impl Catalog {
    /// Fetch the catalog document `{ "courses": [...] }`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Fetch` if the catalog cannot be read or decoded.
    pub fn load(assets: &AssetRoot, path: &Path) -> Result<Self, Error> {
        let catalog: Self = assets.fetch_json(path)?;
        tracing::info!(courses = catalog.courses.len(), "loaded catalog");
        return Ok(catalog);
    }

    /// Find a course by id and classify whether it can be opened.
    pub fn lookup(&self, id: &str) -> CourseLookup<'_> {
        return match self.courses.iter().find(|c| return c.id == id) {
            None => CourseLookup::NotFound,
            Some(course) if course.status == CourseStatus::Active => CourseLookup::Active(course),
            Some(course) => CourseLookup::ComingSoon(course),
        };
    }

    /// Find an openable course by id.
    ///
    /// # Errors
    ///
    /// Returns `Error::CourseComingSoon` for unpublished courses and
    /// `Error::CourseNotFound` for unknown ids.
    pub fn require_active(&self, id: &str) -> Result<&CourseDescriptor, Error> {
        return match self.lookup(id) {
            CourseLookup::Active(course) => Ok(course),
            CourseLookup::ComingSoon(course) => Err(Error::CourseComingSoon { id: course.id.clone() }),
            CourseLookup::NotFound => Err(Error::CourseNotFound { id: id.to_string() }),
        };
    }
}
