//! Identifiers for curriculum entities and completion records.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from anything string-like.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a course, e.g. `linear-algebra`.
    CourseId
);

string_id!(
    /// Identifier of a lecture, unique within its course.
    LectureId
);

string_id!(
    /// Identifier of a curriculum category, e.g. `mathematics`.
    CategoryId
);

/// Separator between the course and lecture halves of a [`CompletionKey`].
pub const KEY_SEPARATOR: &str = "::";

/// Composite key naming one lecture's completion record.
///
/// On the wire this is exactly `"<courseId>::<lectureId>"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompletionKey {
    course_id: CourseId,
    lecture_id: LectureId,
}

/// Error returned when a string is not a valid completion key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// The `::` separator is missing
    #[error("completion key `{0}` has no `::` separator")]
    MissingSeparator(String),
}

impl CompletionKey {
    /// Build a key from its two halves.
    pub fn new(course_id: impl Into<CourseId>, lecture_id: impl Into<LectureId>) -> Self {
        Self {
            course_id: course_id.into(),
            lecture_id: lecture_id.into(),
        }
    }

    /// The course half.
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    /// The lecture half.
    pub fn lecture_id(&self) -> &LectureId {
        &self.lecture_id
    }
}

impl std::fmt::Display for CompletionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.course_id, KEY_SEPARATOR, self.lecture_id)
    }
}

impl std::str::FromStr for CompletionKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (course, lecture) = s
            .split_once(KEY_SEPARATOR)
            .ok_or_else(|| KeyError::MissingSeparator(s.to_string()))?;
        Ok(Self::new(course, lecture))
    }
}

impl Serialize for CompletionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CompletionKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
