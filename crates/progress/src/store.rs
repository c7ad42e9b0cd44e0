//! Progress store - completion actions and derived progress queries.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Utc;
use coursetrack_core::{
    CompletionKey, CourseId, Curriculum, Date, LectureCompletion, LectureId, ProgressSnapshot,
    QuizAttempt, Time,
};
use coursetrack_storage::SnapshotStorage;
use tracing::{debug, info, warn};

use crate::hydration::{HydrationGate, HydrationState};

/// Minimum progress every prerequisite needs before a course unlocks.
pub const DEFAULT_PREREQUISITE_THRESHOLD: u8 = 80;

/// Configuration for the progress store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Percent each prerequisite must reach (inclusive)
    pub prerequisite_threshold: u8,
    /// Maximum entries in the recent activity list
    pub recent_activity_limit: usize,
    /// Maximum recommended courses
    pub recommendation_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            prerequisite_threshold: DEFAULT_PREREQUISITE_THRESHOLD,
            recent_activity_limit: 8,
            recommendation_limit: 3,
        }
    }
}

impl StoreConfig {
    /// Set the prerequisite threshold.
    pub fn with_prerequisite_threshold(mut self, percent: u8) -> Self {
        self.prerequisite_threshold = percent;
        self
    }

    /// Set the recent activity limit.
    pub fn with_recent_activity_limit(mut self, limit: usize) -> Self {
        self.recent_activity_limit = limit;
        self
    }

    /// Set the recommendation limit.
    pub fn with_recommendation_limit(mut self, limit: usize) -> Self {
        self.recommendation_limit = limit;
        self
    }
}

/// Owner of one user's progress snapshot.
///
/// Actions mutate the snapshot and write it through the injected storage;
/// storage failures are logged, never returned. Queries are pure reads over
/// the snapshot and the curriculum table and never fail: unknown ids resolve
/// to 0 or, for gating, to "met". Until [`ProgressStore::hydrate`] has run,
/// queries return neutral values and actions are ignored.
pub struct ProgressStore<S: SnapshotStorage> {
    pub(crate) curriculum: Arc<Curriculum>,
    storage: S,
    gate: HydrationGate,
    pub(crate) config: StoreConfig,
    pub(crate) snapshot: ProgressSnapshot,
}

impl<S: SnapshotStorage> ProgressStore<S> {
    /// Create a cold store.
    pub fn new(curriculum: Arc<Curriculum>, storage: S) -> Self {
        Self {
            curriculum,
            storage,
            gate: HydrationGate::new(),
            config: StoreConfig::default(),
            snapshot: ProgressSnapshot::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the persisted snapshot. Only the first call does anything.
    ///
    /// A missing, unreadable or malformed record leaves the default snapshot
    /// in place; the store is hydrated either way.
    pub async fn hydrate(&mut self) -> HydrationState {
        if self.gate.is_hydrated() {
            debug!("Already hydrated, skipping load");
            return self.gate.state();
        }

        match self.storage.load().await {
            Ok(Some(mut snapshot)) => {
                let fixed = snapshot.normalize();
                if fixed > 0 {
                    warn!(fixed, "Dropped or re-keyed inconsistent completion entries");
                }
                info!(
                    lectures = snapshot.lectures.len(),
                    quiz_attempts = snapshot.quiz_attempts.len(),
                    "Hydrated progress"
                );
                self.snapshot = snapshot;
            }
            Ok(None) => {
                info!("No saved progress, starting fresh");
                self.snapshot = ProgressSnapshot::default();
            }
            Err(e) => {
                warn!(error = %e, "Failed to load progress, starting fresh");
                self.snapshot = ProgressSnapshot::default();
            }
        }

        self.gate.open();
        self.gate.state()
    }

    /// Hydration state.
    pub fn hydration_state(&self) -> HydrationState {
        self.gate.state()
    }

    /// Whether derived values can be trusted.
    pub fn is_hydrated(&self) -> bool {
        self.gate.is_hydrated()
    }

    /// The curriculum table.
    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    /// The configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // === Actions ===

    /// Complete a lecture, or un-complete it if it already was.
    pub async fn toggle_lecture_completion(&mut self, course_id: &CourseId, lecture_id: &LectureId) {
        self.toggle_lecture_completion_at(course_id, lecture_id, Utc::now()).await;
    }

    /// Toggle with an explicit completion time.
    pub async fn toggle_lecture_completion_at(
        &mut self,
        course_id: &CourseId,
        lecture_id: &LectureId,
        at: Time,
    ) {
        if !self.accepts("toggle_lecture_completion") {
            return;
        }
        let completed = self.snapshot.toggle(course_id, lecture_id, at);
        debug!(%course_id, %lecture_id, completed, "Toggled lecture");
        self.persist().await;
    }

    /// Append a quiz attempt.
    pub async fn record_quiz_attempt(&mut self, attempt: QuizAttempt) {
        if !self.accepts("record_quiz_attempt") {
            return;
        }
        debug!(quiz_id = %attempt.quiz_id, score = attempt.score, "Recorded quiz attempt");
        self.snapshot.quiz_attempts.push(attempt);
        self.persist().await;
    }

    /// Unlock an achievement. Already unlocked ids are left alone.
    pub async fn unlock_achievement(&mut self, id: impl Into<String>) {
        if !self.accepts("unlock_achievement") {
            return;
        }
        let id = id.into();
        if !self.snapshot.achievements.insert(id.clone()) {
            return;
        }
        info!(achievement = %id, "Unlocked achievement");
        self.persist().await;
    }

    /// Overwrite the streak counter.
    ///
    /// The store never derives the streak itself; whatever rule computes it
    /// lives with the caller.
    pub async fn set_streak_days(&mut self, days: u32) {
        if !self.accepts("set_streak_days") {
            return;
        }
        self.snapshot.streak_days = days;
        self.persist().await;
    }

    fn accepts(&self, action: &str) -> bool {
        if self.gate.is_hydrated() {
            return true;
        }
        warn!(action, "Ignoring action before hydration");
        false
    }

    async fn persist(&mut self) {
        if let Err(e) = self.storage.save(&self.snapshot).await {
            warn!(error = %e, "Failed to persist progress");
        }
    }

    // === Queries ===

    /// Percent of a course's lectures completed, 0 for unknown or empty courses.
    pub fn course_progress(&self, course_id: &CourseId) -> u8 {
        self.gate.select(0, || self.course_progress_unchecked(course_id))
    }

    /// Completions recorded for a course, whether or not the lectures exist.
    pub fn completed_lecture_count(&self, course_id: &CourseId) -> usize {
        self.gate.select(0, || self.snapshot.completed_in_course(course_id))
    }

    /// Percent of all curriculum lectures completed.
    pub fn overall_progress(&self) -> u8 {
        self.gate.select(0, || {
            percent(
                self.snapshot.completed_total() as u64,
                self.curriculum.total_lectures(),
            )
        })
    }

    /// Whether every prerequisite of a course has reached the threshold.
    ///
    /// Courses without prerequisites, unknown courses, and every course
    /// before hydration report `true`.
    pub fn is_prerequisite_met(&self, course_id: &CourseId) -> bool {
        self.gate.select(true, || {
            let Some(course) = self.curriculum.course(course_id) else {
                return true;
            };
            course
                .prerequisites
                .iter()
                .all(|p| self.course_progress_unchecked(p) >= self.config.prerequisite_threshold)
        })
    }

    /// Whether a single lecture is completed.
    pub fn is_lecture_completed(&self, course_id: &CourseId, lecture_id: &LectureId) -> bool {
        self.gate.select(false, || self.snapshot.is_completed(course_id, lecture_id))
    }

    pub(crate) fn course_progress_unchecked(&self, course_id: &CourseId) -> u8 {
        match self.curriculum.course(course_id) {
            Some(course) => percent(
                self.snapshot.completed_in_course(course_id) as u64,
                u64::from(course.lecture_count),
            ),
            None => 0,
        }
    }

    // === Raw state ===

    /// The whole snapshot.
    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    /// Completion records.
    pub fn lectures(&self) -> &BTreeMap<CompletionKey, LectureCompletion> {
        &self.snapshot.lectures
    }

    /// Quiz attempts, oldest first.
    pub fn quiz_attempts(&self) -> &[QuizAttempt] {
        &self.snapshot.quiz_attempts
    }

    /// Unlocked achievements.
    pub fn achievements(&self) -> &BTreeSet<String> {
        &self.snapshot.achievements
    }

    /// Streak counter.
    pub fn streak_days(&self) -> u32 {
        self.snapshot.streak_days
    }

    /// Day of the most recent completion.
    pub fn last_active_date(&self) -> Date {
        self.snapshot.last_active_date
    }
}

/// `round(100 * done / total)` rounding half up, clamped to 100; 0 when
/// `total` is 0.
pub(crate) fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (200 * done + total) / (2 * total);
    rounded.min(100) as u8
}
