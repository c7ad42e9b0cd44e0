//! Curriculum reference data - categories, courses and lectures.
//!
//! The table is loaded once and never mutated; the progress engine only
//! looks entries up by id and sums lecture counts.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use crate::id::{CategoryId, CourseId, LectureId};

/// Errors raised while loading the curriculum table.
#[derive(Debug, thiserror::Error)]
pub enum CurriculumError {
    /// Malformed document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two courses share an id
    #[error("duplicate course id: {0}")]
    DuplicateCourse(CourseId),
}

/// Course difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Advanced practitioner material
    #[default]
    Advanced,
    /// Expert level
    Expert,
    /// Research frontier
    Research,
}

impl Difficulty {
    /// Short badge label.
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Advanced => "ADV",
            Difficulty::Expert => "EXP",
            Difficulty::Research => "RES",
        }
    }
}

/// A curriculum category grouping related courses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    /// Display title
    pub title: String,

    /// Abbreviated title
    #[serde(default)]
    pub short_title: String,

    /// Sort position
    #[serde(default)]
    pub order: u32,
}

/// A course in the curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Unique identifier
    pub id: CourseId,

    /// Owning category
    pub category_id: CategoryId,

    /// Display title
    #[serde(default)]
    pub title: String,

    /// Courses that should be mostly finished first, in display order
    #[serde(default)]
    pub prerequisites: Vec<CourseId>,

    /// Number of lectures the course is made of
    pub lecture_count: u32,

    /// Difficulty tier
    #[serde(default)]
    pub difficulty: Difficulty,

    /// Estimated effort in hours
    #[serde(default)]
    pub estimated_hours: u32,

    /// Sort position
    #[serde(default)]
    pub order: u32,
}

impl Course {
    /// Create a course with the fields the progress engine reads.
    pub fn new(
        id: impl Into<CourseId>,
        category_id: impl Into<CategoryId>,
        lecture_count: u32,
    ) -> Self {
        let id = id.into();
        Self {
            title: id.to_string(),
            id,
            category_id: category_id.into(),
            prerequisites: Vec::new(),
            lecture_count,
            difficulty: Difficulty::default(),
            estimated_hours: 0,
            order: 0,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Add a prerequisite course.
    pub fn with_prerequisite(mut self, id: impl Into<CourseId>) -> Self {
        self.prerequisites.push(id.into());
        self
    }

    /// Set the sort position.
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }
}

/// A lecture within a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    /// Identifier, unique within the course
    pub id: LectureId,

    /// Parent course
    pub course_id: CourseId,

    /// Display title
    #[serde(default)]
    pub title: String,

    /// Position within the course
    pub order: u32,
}

impl Lecture {
    /// Create a lecture.
    pub fn new(
        course_id: impl Into<CourseId>,
        id: impl Into<LectureId>,
        title: impl Into<String>,
        order: u32,
    ) -> Self {
        Self {
            id: id.into(),
            course_id: course_id.into(),
            title: title.into(),
            order,
        }
    }
}

/// The read-only curriculum reference table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curriculum {
    /// All categories
    #[serde(default)]
    pub categories: Vec<Category>,

    /// All courses
    #[serde(default)]
    pub courses: Vec<Course>,

    /// All lectures
    #[serde(default)]
    pub lectures: Vec<Lecture>,
}

impl Curriculum {
    /// Build a table from its parts, rejecting duplicate course ids.
    pub fn new(
        categories: Vec<Category>,
        courses: Vec<Course>,
        lectures: Vec<Lecture>,
    ) -> Result<Self, CurriculumError> {
        let curriculum = Self { categories, courses, lectures };
        curriculum.validate()?;
        Ok(curriculum)
    }

    /// Parse a curriculum JSON document.
    pub fn from_json(json: &str) -> Result<Self, CurriculumError> {
        let curriculum: Self = serde_json::from_str(json)?;
        curriculum.validate()?;
        Ok(curriculum)
    }

    fn validate(&self) -> Result<(), CurriculumError> {
        let mut seen = HashSet::new();
        for course in &self.courses {
            if !seen.insert(&course.id) {
                return Err(CurriculumError::DuplicateCourse(course.id.clone()));
            }
        }
        Ok(())
    }

    /// Look up a course by id.
    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.courses.iter().find(|c| &c.id == id)
    }

    /// Look up a lecture by course and lecture id.
    pub fn lecture(&self, course_id: &CourseId, lecture_id: &LectureId) -> Option<&Lecture> {
        self.lectures
            .iter()
            .find(|l| &l.course_id == course_id && &l.id == lecture_id)
    }

    /// Categories sorted by their display order.
    pub fn categories_in_order(&self) -> Vec<&Category> {
        let mut categories: Vec<_> = self.categories.iter().collect();
        categories.sort_by_key(|c| c.order);
        categories
    }

    /// Courses belonging to a category, in table order.
    pub fn courses_in_category(&self, id: &CategoryId) -> Vec<&Course> {
        self.courses.iter().filter(|c| &c.category_id == id).collect()
    }

    /// Lectures of a course, ordered by their position.
    pub fn lectures_for_course(&self, id: &CourseId) -> Vec<&Lecture> {
        let mut lectures: Vec<_> = self.lectures.iter().filter(|l| &l.course_id == id).collect();
        lectures.sort_by_key(|l| l.order);
        lectures
    }

    /// Previous and next lecture around `lecture_id` within its course.
    pub fn adjacent_lectures(
        &self,
        course_id: &CourseId,
        lecture_id: &LectureId,
    ) -> (Option<&Lecture>, Option<&Lecture>) {
        let lectures = self.lectures_for_course(course_id);
        let Some(index) = lectures.iter().position(|l| &l.id == lecture_id) else {
            return (None, None);
        };
        let prev = index.checked_sub(1).and_then(|i| lectures.get(i).copied());
        let next = lectures.get(index + 1).copied();
        (prev, next)
    }

    /// Sum of lecture counts over every course.
    pub fn total_lectures(&self) -> u64 {
        self.courses.iter().map(|c| u64::from(c.lecture_count)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Curriculum {
        Curriculum::new(
            vec![
                Category { id: "ml".into(), title: "Machine Learning".into(), short_title: "ML".into(), order: 2 },
                Category { id: "math".into(), title: "Mathematics".into(), short_title: "Math".into(), order: 1 },
            ],
            vec![
                Course::new("linear-algebra", "math", 10),
                Course::new("deep-learning", "ml", 12).with_prerequisite("linear-algebra"),
            ],
            vec![
                Lecture::new("linear-algebra", "l2", "Matrices", 2),
                Lecture::new("linear-algebra", "l1", "Vectors", 1),
                Lecture::new("linear-algebra", "l3", "Eigen", 3),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_total_lectures() {
        assert_eq!(sample().total_lectures(), 22);
    }

    #[test]
    fn test_lectures_sorted_by_order() {
        let c = sample();
        let ids: Vec<_> = c
            .lectures_for_course(&"linear-algebra".into())
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(ids, vec!["l1", "l2", "l3"]);
    }

    #[test]
    fn test_adjacent_lectures() {
        let c = sample();
        let course = CourseId::from("linear-algebra");

        let (prev, next) = c.adjacent_lectures(&course, &"l1".into());
        assert!(prev.is_none());
        assert_eq!(next.unwrap().id.as_str(), "l2");

        let (prev, next) = c.adjacent_lectures(&course, &"l3".into());
        assert_eq!(prev.unwrap().id.as_str(), "l2");
        assert!(next.is_none());

        assert_eq!(c.adjacent_lectures(&course, &"missing".into()), (None, None));
    }

    #[test]
    fn test_categories_in_order() {
        let c = sample();
        let ids: Vec<_> = c.categories_in_order().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["math", "ml"]);
    }

    #[test]
    fn test_duplicate_course_rejected() {
        let err = Curriculum::new(
            vec![],
            vec![Course::new("a", "x", 1), Course::new("a", "x", 2)],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, CurriculumError::DuplicateCourse(id) if id.as_str() == "a"));
    }

    #[test]
    fn test_from_json_camel_case() {
        let json = r#"{
            "categories": [{"id": "math", "title": "Mathematics", "shortTitle": "Math", "order": 1}],
            "courses": [{
                "id": "linear-algebra",
                "categoryId": "math",
                "title": "Linear Algebra",
                "prerequisites": [],
                "lectureCount": 10,
                "difficulty": "expert"
            }],
            "lectures": [{"id": "vectors", "courseId": "linear-algebra", "title": "Vectors", "order": 1}]
        }"#;
        let c = Curriculum::from_json(json).unwrap();
        let course = c.course(&"linear-algebra".into()).unwrap();
        assert_eq!(course.lecture_count, 10);
        assert_eq!(course.difficulty, Difficulty::Expert);
        assert!(c.lecture(&"linear-algebra".into(), &"vectors".into()).is_some());
        assert!(c.course(&"unknown".into()).is_none());
    }
}
