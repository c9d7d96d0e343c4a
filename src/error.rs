/// Crate-level error types for coursebook diagnostics.
use std::path::PathBuf;

/// All errors in coursebook carry enough context to produce a useful notice
/// without a debugger. Each variant names the course, week, file, or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The course exists in the catalog but is not published yet.
    #[error("course `{id}` is coming soon")]
    CourseComingSoon {
        /// Catalog identifier of the course.
        id: String,
    },

    /// No catalog entry carries this identifier.
    #[error("course not found: `{id}`")]
    CourseNotFound {
        /// Identifier that was looked up.
        id: String,
    },

    /// A structured course whose content has no weeks at all.
    #[error("course `{id}` has no weeks")]
    EmptyCourse {
        /// Identifier of the course.
        id: String,
    },

    /// A course asset could not be read or decoded.
    #[error("fetch failed: {}: {reason}", path.display())]
    Fetch {
        /// Asset path relative to the site root.
        path: PathBuf,
        /// Description of the read or decode failure.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// An operation needed an open course but none is selected.
    #[error("no course is open")]
    NoCourseOpen,

    /// The open course is a raw markup document with no weeks or sections.
    #[error("course `{id}` is a markup document and has no weeks")]
    NotStructured {
        /// Identifier of the markup course.
        id: String,
    },

    /// The local key-value store exists but cannot be parsed.
    #[error("storage corrupt: {}: {reason}", path.display())]
    StorageCorrupt {
        /// Path to the storage file.
        path: PathBuf,
        /// Description of the corruption.
        reason: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// A section index is past the end of the week's extracted sections.
    #[error("week `{week}` of `{course}` has {count} sections, no section {index}")]
    UnknownSection {
        /// Number of sections extracted from the week.
        count: usize,
        /// Identifier of the open course.
        course: String,
        /// Zero-based section index that was requested.
        index: usize,
        /// Week key the section was looked up in.
        week: String,
    },

    /// The open course has no week under this key.
    #[error("course `{course}` has no week `{week}`")]
    UnknownWeek {
        /// Identifier of the open course.
        course: String,
        /// Week key that was requested.
        week: String,
    },
}
