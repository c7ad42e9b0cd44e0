//! Progress snapshot - the per-user completion log.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};
use crate::id::{CompletionKey, CourseId, LectureId};
use crate::{Date, Time};

/// One user's completion of one lecture.
///
/// Entries only exist while the lecture is completed; un-completing removes
/// the entry instead of clearing `completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureCompletion {
    /// Completed lecture
    pub lecture_id: LectureId,

    /// Course the lecture belongs to
    pub course_id: CourseId,

    /// Always true for entries held in a snapshot
    #[serde(default = "default_completed")]
    pub completed: bool,

    /// When the lecture was marked complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Time>,
}

fn default_completed() -> bool {
    true
}

impl LectureCompletion {
    /// A fresh completion stamped at `at`.
    pub fn new(course_id: CourseId, lecture_id: LectureId, at: Time) -> Self {
        Self {
            lecture_id,
            course_id,
            completed: true,
            completed_at: Some(at),
        }
    }

    /// Key this completion is stored under.
    pub fn key(&self) -> CompletionKey {
        CompletionKey::new(self.course_id.clone(), self.lecture_id.clone())
    }
}

/// A submitted quiz. Never mutated after it is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    /// Quiz taken
    pub quiz_id: String,

    /// Course the quiz belongs to
    pub course_id: CourseId,

    /// Score as reported by the quiz, not validated
    pub score: f64,

    /// Number of questions
    pub total_questions: u32,

    /// Number answered correctly
    pub correct_answers: u32,

    /// Submission time
    pub attempted_at: Time,
}

/// Everything persisted about one user's progress.
///
/// Every field falls back to its default when missing from a stored record,
/// so older records still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressSnapshot {
    /// Completion records keyed by `<courseId>::<lectureId>`
    #[serde(deserialize_with = "deserialize_lectures")]
    pub lectures: BTreeMap<CompletionKey, LectureCompletion>,

    /// Quiz attempts in submission order
    pub quiz_attempts: Vec<QuizAttempt>,

    /// Unlocked achievement ids
    pub achievements: BTreeSet<String>,

    /// Day of the most recent lecture completion
    pub last_active_date: Date,

    /// Opaque streak counter, only changed by an explicit external rule
    pub streak_days: u32,
}

/// Read completion records without trusting the stored keys.
///
/// A key that does not parse is replaced by the entry's own key, so one bad
/// key cannot fail the whole record.
fn deserialize_lectures<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<CompletionKey, LectureCompletion>, D::Error> {
    let raw = BTreeMap::<String, LectureCompletion>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, entry)| {
            let key = key.parse::<CompletionKey>().unwrap_or_else(|_| entry.key());
            (key, entry)
        })
        .collect())
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            lectures: BTreeMap::new(),
            quiz_attempts: Vec::new(),
            achievements: BTreeSet::new(),
            last_active_date: chrono::Utc::now().date_naive(),
            streak_days: 0,
        }
    }
}

impl ProgressSnapshot {
    /// Flip the completion state of a lecture.
    ///
    /// Returns `true` if the lecture is completed afterwards. Completing also
    /// moves `last_active_date` to the day of `at`; un-completing leaves it.
    pub fn toggle(&mut self, course_id: &CourseId, lecture_id: &LectureId, at: Time) -> bool {
        let key = CompletionKey::new(course_id.clone(), lecture_id.clone());
        if self.lectures.remove(&key).is_some() {
            return false;
        }
        self.lectures.insert(
            key,
            LectureCompletion::new(course_id.clone(), lecture_id.clone(), at),
        );
        self.last_active_date = at.date_naive();
        true
    }

    /// Whether a lecture is currently completed.
    pub fn is_completed(&self, course_id: &CourseId, lecture_id: &LectureId) -> bool {
        self.lectures
            .contains_key(&CompletionKey::new(course_id.clone(), lecture_id.clone()))
    }

    /// Number of completions recorded for a course, known lectures or not.
    pub fn completed_in_course(&self, course_id: &CourseId) -> usize {
        self.lectures
            .values()
            .filter(|l| &l.course_id == course_id)
            .count()
    }

    /// Number of completions across all courses.
    pub fn completed_total(&self) -> usize {
        self.lectures.len()
    }

    /// Restore the key invariant on a record read from storage.
    ///
    /// Drops `completed: false` entries and re-keys every entry from its own
    /// ids. Returns the number of entries dropped or re-keyed.
    pub fn normalize(&mut self) -> usize {
        let before = std::mem::take(&mut self.lectures);
        let mut fixed = 0;
        for (key, entry) in before {
            if !entry.completed {
                fixed += 1;
                continue;
            }
            let own_key = entry.key();
            if own_key != key {
                fixed += 1;
            }
            self.lectures.insert(own_key, entry);
        }
        fixed
    }
}
