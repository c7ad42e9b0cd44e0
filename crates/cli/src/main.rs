//! Coursetrack CLI - curriculum progress tracking.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use coursetrack_core::{CourseId, Curriculum, LectureId, QuizAttempt};
use coursetrack_progress::{ProgressStore, RoadmapLayout, StoreConfig};
use coursetrack_storage::{JsonStorage, DEFAULT_RECORD_NAME};

#[derive(Parser)]
#[command(name = "coursetrack")]
#[command(about = "Curriculum progress tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the progress record
    #[arg(long, global = true, default_value = ".coursetrack")]
    data_dir: PathBuf,

    /// Name of the progress record inside the data directory
    #[arg(long, global = true, default_value = DEFAULT_RECORD_NAME)]
    record_name: String,

    /// Curriculum JSON document
    #[arg(long, global = true, default_value = "curriculum.json")]
    curriculum: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Mark a lecture complete, or un-mark it
    Toggle {
        /// Course ID
        course: String,
        /// Lecture ID
        lecture: String,
    },
    /// Record a quiz attempt
    Quiz {
        /// Quiz ID
        quiz: String,
        /// Course ID
        course: String,
        /// Correct answers
        #[arg(long)]
        correct: u32,
        /// Total questions
        #[arg(long)]
        total: u32,
    },
    /// Unlock an achievement
    Achieve {
        /// Achievement ID
        id: String,
    },
    /// Set the streak counter
    Streak {
        /// Consecutive active days
        days: u32,
    },
    /// Show one course
    Course {
        /// Course ID
        id: String,
    },
    /// Show the progress dashboard
    Dashboard {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the prerequisite roadmap
    Roadmap {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let json = tokio::fs::read_to_string(&cli.curriculum)
        .await
        .with_context(|| format!("reading curriculum {}", cli.curriculum.display()))?;
    let curriculum = Arc::new(Curriculum::from_json(&json)?);
    debug!(courses = curriculum.courses.len(), "Loaded curriculum");

    let storage = JsonStorage::with_record_name(&cli.data_dir, cli.record_name.clone()).await?;
    let mut store = ProgressStore::new(curriculum.clone(), storage).with_config(StoreConfig::default());
    store.hydrate().await;

    match cli.command {
        Commands::Toggle { course, lecture } => {
            let course = CourseId::new(course);
            let lecture = LectureId::new(lecture);
            if curriculum.lecture(&course, &lecture).is_none() {
                info!(%course, %lecture, "Lecture is not in the curriculum");
            }
            store.toggle_lecture_completion(&course, &lecture).await;
            let state = if store.is_lecture_completed(&course, &lecture) { "completed" } else { "not completed" };
            println!("{}::{} {}", course, lecture, state);
            println!("  Course progress: {}%", store.course_progress(&course));
            if let (_, Some(next)) = curriculum.adjacent_lectures(&course, &lecture) {
                println!("  Next: {} ({})", next.title, next.id);
            }
        }
        Commands::Quiz { quiz, course, correct, total } => {
            store
                .record_quiz_attempt(QuizAttempt {
                    quiz_id: quiz.clone(),
                    course_id: CourseId::new(course),
                    score: quiz_score(correct, total),
                    total_questions: total,
                    correct_answers: correct,
                    attempted_at: chrono::Utc::now(),
                })
                .await;
            println!("Recorded {}: {}/{} ({:.0}%)", quiz, correct, total, quiz_score(correct, total));
        }
        Commands::Achieve { id } => {
            store.unlock_achievement(id.clone()).await;
            println!("Achievements ({})", store.achievements().len());
            for a in store.achievements() {
                println!("  - {}", a);
            }
        }
        Commands::Streak { days } => {
            store.set_streak_days(days).await;
            println!("Streak: {} days", store.streak_days());
        }
        Commands::Course { id } => {
            let id = CourseId::new(id);
            let Some(course) = curriculum.course(&id) else {
                println!("Course not found");
                return Ok(());
            };

            println!("Course: {} ({}) [{}]", course.title, course.id, course.difficulty.label());
            println!("  Progress: {}% ({}/{} lectures)",
                store.course_progress(&id),
                store.completed_lecture_count(&id),
                course.lecture_count,
            );
            let gate = if store.is_prerequisite_met(&id) { "unlocked" } else { "locked" };
            println!("  Prerequisites: {} [{}]", format_ids(&course.prerequisites), gate);
            for lecture in curriculum.lectures_for_course(&id) {
                let mark = if store.is_lecture_completed(&id, &lecture.id) { "x" } else { " " };
                println!("  [{}] {:>2}. {} ({})", mark, lecture.order, lecture.title, lecture.id);
            }
        }
        Commands::Dashboard { json } => {
            let stats = store.dashboard_stats();
            let categories = store.category_progress();
            let recent = store.recent_activity();
            let recommended: Vec<_> = store.recommended_courses().iter().map(|c| c.id.clone()).collect();

            if json {
                let out = serde_json::json!({
                    "stats": stats,
                    "categories": categories,
                    "recentActivity": recent,
                    "recommended": recommended,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }

            println!("Coursetrack Dashboard");
            println!("  Lectures: {}/{}", stats.completed_lectures, stats.total_lectures);
            println!("  Courses:  {}/{}", stats.completed_courses, stats.total_courses);
            println!("  Streak:   {} days", stats.streak_days);
            println!("  Overall:  {}%", stats.overall_percent);
            println!("Categories");
            for c in categories {
                println!("  {:<12} {:>3}/{:<3} {:>3}%", c.title, c.completed_lectures, c.total_lectures, c.percent);
            }
            println!("Recent activity");
            for a in recent {
                println!("  {} | {} - {}",
                    a.completed_at.format("%Y-%m-%d %H:%M"),
                    a.course_title.unwrap_or_else(|| a.course_id.to_string()),
                    a.lecture_title.unwrap_or_else(|| a.lecture_id.to_string()),
                );
            }
            println!("Recommended next: {}", format_ids(&recommended));
        }
        Commands::Roadmap { json } => {
            let layout = RoadmapLayout::build(&curriculum)?;
            let nodes = store.roadmap_nodes(&layout);

            if json {
                let out = serde_json::json!({ "nodes": nodes, "edges": layout.edges });
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }

            println!("Roadmap ({} courses, {} edges)", nodes.len(), layout.edges.len());
            for node in nodes {
                println!("  ({:>6.0}, {:>5.0}) {:<32} [{}] {:>3}% {}",
                    node.position.x,
                    node.position.y,
                    node.title,
                    node.difficulty.label(),
                    node.percent_complete,
                    if node.locked { "LOCKED" } else { "" },
                );
            }
        }
    }

    Ok(())
}

/// Quiz score as a whole percentage of correct answers.
fn quiz_score(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(correct) * 100.0 / f64::from(total)).round()
}

fn format_ids(ids: &[CourseId]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(", ")
}
