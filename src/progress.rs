//! Progress persistence: which sections a learner marked complete, per course.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::storage::{KeyValueStore, PROGRESS_KEY};
use crate::types::SectionId;

/// Completion flags of one course, keyed by section identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseProgress(BTreeMap<String, bool>);

impl CourseProgress {
    /// Drop every flag of the course.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Whether the section is marked complete. Unknown sections are not.
    pub fn is_completed(&self, section: &SectionId) -> bool {
        return self.0.get(section.as_str()).copied().unwrap_or(false);
    }

    /// Record the completion flag of a section.
    pub fn set(&mut self, section: &SectionId, completed: bool) {
        self.0.insert(section.to_string(), completed);
    }
}

/// Course id to course progress. Persisted as one JSON blob under
/// `learningProgress`, rewritten whole after every change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressStore {
    /// Progress per course id.
    courses: BTreeMap<String, CourseProgress>,
}

impl ProgressStore {
    /// Load the store from the key-value backend.
    ///
    /// An absent key is an empty store. A malformed blob is discarded in
    /// favor of an empty store; the learner never sees an error for it.
    ///
    /// # Errors
    ///
    /// Returns errors from the key-value backend itself.
    pub fn load(kv: &impl KeyValueStore) -> Result<Self, Error> {
        let Some(blob) = kv.get(PROGRESS_KEY)? else {
            return Ok(Self::default());
        };

        return match serde_json::from_str(&blob) {
            Ok(store) => Ok(store),
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed progress store");
                Ok(Self::default())
            },
        };
    }

    /// Mutable progress of a course, created empty on first access so the
    /// next `persist` records it.
    pub fn get(&mut self, course_id: &str) -> &mut CourseProgress {
        return self.courses.entry(course_id.to_string()).or_default();
    }

    /// Record the completion flag of a section.
    pub fn set(&mut self, course_id: &str, section: &SectionId, completed: bool) {
        self.get(course_id).set(section, completed);
    }

    /// Clear every flag of one course, leaving other courses untouched.
    pub fn reset(&mut self, course_id: &str) {
        self.get(course_id).clear();
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails.
    pub fn serialize(&self) -> Result<String, Error> {
        return Ok(serde_json::to_string(self)?);
    }

    /// Overwrite the stored blob with the whole store.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails, or backend write errors.
    pub fn persist(&self, kv: &mut impl KeyValueStore) -> Result<(), Error> {
        let blob = self.serialize()?;
        kv.set(PROGRESS_KEY, &blob)?;
        tracing::debug!(courses = self.courses.len(), "persisted progress");
        return Ok(());
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn set_persist_load_round_trip() {
        let mut kv = MemoryStore::default();
        let section = SectionId::new("py", "1", 0);

        let mut store = ProgressStore::load(&kv).unwrap();
        store.set("py", &section, true);
        store.persist(&mut kv).unwrap();

        let mut fresh = ProgressStore::load(&kv).unwrap();
        assert!(fresh.get("py").is_completed(&section));
    }

    #[test]
    fn absent_and_malformed_blobs_load_empty() {
        let mut kv = MemoryStore::default();
        assert_eq!(ProgressStore::load(&kv).unwrap(), ProgressStore::default());

        kv.set(PROGRESS_KEY, "{not json").unwrap();
        assert_eq!(ProgressStore::load(&kv).unwrap(), ProgressStore::default());
    }

    #[test]
    fn get_creates_course_entry_that_persists() {
        let mut kv = MemoryStore::default();
        let mut store = ProgressStore::default();
        assert_eq!(*store.get("rust"), CourseProgress::default());
        store.persist(&mut kv).unwrap();
        assert_eq!(kv.get(PROGRESS_KEY).unwrap().as_deref(), Some(r#"{"rust":{}}"#));
    }

    #[test]
    fn reset_touches_only_one_course() {
        let mut store = ProgressStore::default();
        let a = SectionId::new("a", "1", 0);
        let b = SectionId::new("b", "1", 0);
        store.set("a", &a, true);
        store.set("b", &b, true);

        store.reset("a");

        assert_eq!(*store.get("a"), CourseProgress::default());
        assert!(store.get("b").is_completed(&b));
    }

    #[test]
    fn reads_existing_progress_blob() {
        let mut kv = MemoryStore::default();
        kv.set(PROGRESS_KEY, r#"{"py":{"py_week1_section0":true,"py_week1_section1":false}}"#)
            .unwrap();
        let mut store = ProgressStore::load(&kv).unwrap();
        let py = store.get("py");
        assert!(py.is_completed(&SectionId::new("py", "1", 0)));
        assert!(!py.is_completed(&SectionId::new("py", "1", 1)));
        assert!(!py.is_completed(&SectionId::new("py", "2", 0)));
    }
}
