//! Dashboard views derived from the progress store.
//!
//! Every view has a neutral value before hydration so a consumer never
//! flashes "0%" over real progress or a wrongly locked course.

use serde::Serialize;
use coursetrack_core::{CategoryId, CourseId, Course, LectureId, Time};
use coursetrack_storage::SnapshotStorage;

use crate::store::{percent, ProgressStore};

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Completed lectures across the curriculum
    pub completed_lectures: usize,
    /// Lectures in the curriculum
    pub total_lectures: u64,
    /// Courses at 100%
    pub completed_courses: usize,
    /// Courses in the curriculum
    pub total_courses: usize,
    /// Streak counter
    pub streak_days: u32,
    /// Overall completion percent
    pub overall_percent: u8,
}

/// Completion of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryProgress {
    /// Category
    pub category_id: CategoryId,
    /// Short display title
    pub title: String,
    /// Completed lectures in the category's courses
    pub completed_lectures: usize,
    /// Lectures in the category's courses
    pub total_lectures: u64,
    /// Completion percent
    pub percent: u8,
}

/// A recently completed lecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentActivity {
    /// Course of the lecture
    pub course_id: CourseId,
    /// Completed lecture
    pub lecture_id: LectureId,
    /// Completion time
    pub completed_at: Time,
    /// Lecture title, if the lecture is in the curriculum
    pub lecture_title: Option<String>,
    /// Course title, if the course is in the curriculum
    pub course_title: Option<String>,
}

impl<S: SnapshotStorage> ProgressStore<S> {
    /// Headline numbers.
    pub fn dashboard_stats(&self) -> DashboardStats {
        let total_courses = self.curriculum.courses.len();
        if !self.is_hydrated() {
            return DashboardStats {
                completed_lectures: 0,
                total_lectures: 0,
                completed_courses: 0,
                total_courses,
                streak_days: 0,
                overall_percent: 0,
            };
        }

        let completed_courses = self
            .curriculum
            .courses
            .iter()
            .filter(|c| self.course_progress_unchecked(&c.id) == 100)
            .count();

        DashboardStats {
            completed_lectures: self.snapshot.completed_total(),
            total_lectures: self.curriculum.total_lectures(),
            completed_courses,
            total_courses,
            streak_days: self.snapshot.streak_days,
            overall_percent: self.overall_progress(),
        }
    }

    /// Per-category completion, in category order.
    pub fn category_progress(&self) -> Vec<CategoryProgress> {
        self.curriculum
            .categories_in_order()
            .into_iter()
            .map(|category| {
                let courses = self.curriculum.courses_in_category(&category.id);
                let total_lectures: u64 = courses.iter().map(|c| u64::from(c.lecture_count)).sum();
                let completed_lectures = if self.is_hydrated() {
                    courses
                        .iter()
                        .map(|c| self.snapshot.completed_in_course(&c.id))
                        .sum()
                } else {
                    0
                };
                let title = if category.short_title.is_empty() {
                    category.title.clone()
                } else {
                    category.short_title.clone()
                };

                CategoryProgress {
                    category_id: category.id.clone(),
                    title,
                    completed_lectures,
                    total_lectures,
                    percent: percent(completed_lectures as u64, total_lectures),
                }
            })
            .collect()
    }

    /// Most recent completions, newest first.
    pub fn recent_activity(&self) -> Vec<RecentActivity> {
        if !self.is_hydrated() {
            return Vec::new();
        }

        let mut entries: Vec<_> = self
            .snapshot
            .lectures
            .values()
            .filter_map(|l| l.completed_at.map(|at| (at, l)))
            .collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0));

        entries
            .into_iter()
            .take(self.config.recent_activity_limit)
            .map(|(completed_at, l)| RecentActivity {
                course_id: l.course_id.clone(),
                lecture_id: l.lecture_id.clone(),
                completed_at,
                lecture_title: self
                    .curriculum
                    .lecture(&l.course_id, &l.lecture_id)
                    .map(|lec| lec.title.clone()),
                course_title: self.curriculum.course(&l.course_id).map(|c| c.title.clone()),
            })
            .collect()
    }

    /// Unfinished, unlocked courses to take next, in curriculum order.
    ///
    /// Before hydration this is the courses with no prerequisites.
    pub fn recommended_courses(&self) -> Vec<&Course> {
        let hydrated = self.is_hydrated();
        self.curriculum
            .courses
            .iter()
            .filter(|c| {
                if !hydrated {
                    return c.prerequisites.is_empty();
                }
                self.course_progress(&c.id) < 100 && self.is_prerequisite_met(&c.id)
            })
            .take(self.config.recommendation_limit)
            .collect()
    }
}
