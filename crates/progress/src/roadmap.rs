//! Roadmap layout - the prerequisite graph as columns of course nodes.
//!
//! A course's column is the length of the longest prerequisite chain
//! beneath it, so every edge points rightwards.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use coursetrack_core::{CategoryId, CourseId, Curriculum, Difficulty};
use coursetrack_storage::SnapshotStorage;

use crate::store::ProgressStore;

/// Horizontal distance between columns.
pub const COLUMN_GAP: f64 = 350.0;

/// Vertical distance between rows.
pub const ROW_GAP: f64 = 120.0;

/// Errors building a roadmap.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoadmapError {
    /// The prerequisite graph is not a DAG
    #[error("prerequisite cycle: {}", format_cycle(.0))]
    Cycle(Vec<CourseId>),
}

fn format_cycle(ids: &[CourseId]) -> String {
    ids.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(" -> ")
}

/// Canvas position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    /// Horizontal offset
    pub x: f64,
    /// Vertical offset
    pub y: f64,
}

/// A course placed on the roadmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    /// Course
    pub course_id: CourseId,
    /// Display title
    pub title: String,
    /// Category, for colouring
    pub category_id: CategoryId,
    /// Difficulty tier
    pub difficulty: Difficulty,
    /// Prerequisite depth
    pub column: usize,
    /// Position within the column
    pub row: usize,
    /// Canvas position
    pub position: Position,
}

/// A prerequisite edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoadmapEdge {
    /// Prerequisite course
    pub from: CourseId,
    /// Dependent course
    pub to: CourseId,
}

/// Static layout of the whole curriculum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadmapLayout {
    /// Nodes, column by column
    pub nodes: Vec<LayoutNode>,
    /// Prerequisite edges between courses in the table
    pub edges: Vec<RoadmapEdge>,
}

/// A layout node decorated with the user's progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadmapNode {
    /// Course
    pub course_id: CourseId,
    /// Display title
    pub title: String,
    /// Category, for colouring
    pub category_id: CategoryId,
    /// Difficulty tier
    pub difficulty: Difficulty,
    /// Canvas position
    pub position: Position,
    /// Course completion percent
    pub percent_complete: u8,
    /// Prerequisites not met yet
    pub locked: bool,
}

impl RoadmapLayout {
    /// Lay out every course of the curriculum.
    ///
    /// Prerequisites that are not in the table are ignored for placement.
    pub fn build(curriculum: &Curriculum) -> Result<Self, RoadmapError> {
        let known: HashMap<&CourseId, usize> = curriculum
            .courses
            .iter()
            .enumerate()
            .map(|(i, c)| (&c.id, i))
            .collect();

        let mut depths: HashMap<&CourseId, usize> = HashMap::new();
        for course in &curriculum.courses {
            let mut on_path = HashSet::new();
            let mut path = Vec::new();
            depth_of(&course.id, curriculum, &known, &mut depths, &mut on_path, &mut path)?;
        }

        let mut order: Vec<usize> = (0..curriculum.courses.len()).collect();
        order.sort_by_key(|&i| {
            let c = &curriculum.courses[i];
            (depths[&c.id], c.order, i)
        });

        let mut rows: HashMap<usize, usize> = HashMap::new();
        let nodes = order
            .into_iter()
            .map(|i| {
                let course = &curriculum.courses[i];
                let column = depths[&course.id];
                let row = rows.entry(column).or_insert(0);
                let node = LayoutNode {
                    course_id: course.id.clone(),
                    title: course.title.clone(),
                    category_id: course.category_id.clone(),
                    difficulty: course.difficulty,
                    column,
                    row: *row,
                    position: Position {
                        x: column as f64 * COLUMN_GAP,
                        y: *row as f64 * ROW_GAP,
                    },
                };
                *row += 1;
                node
            })
            .collect();

        let edges = curriculum
            .courses
            .iter()
            .flat_map(|course| {
                course
                    .prerequisites
                    .iter()
                    .filter(|p| known.contains_key(p))
                    .map(|p| RoadmapEdge { from: p.clone(), to: course.id.clone() })
            })
            .collect();

        Ok(Self { nodes, edges })
    }

    /// Node of a course, if laid out.
    pub fn node(&self, course_id: &CourseId) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| &n.course_id == course_id)
    }
}

/// Longest prerequisite chain below `id`, memoized, failing on a cycle.
fn depth_of<'a>(
    id: &'a CourseId,
    curriculum: &'a Curriculum,
    known: &HashMap<&'a CourseId, usize>,
    depths: &mut HashMap<&'a CourseId, usize>,
    on_path: &mut HashSet<&'a CourseId>,
    path: &mut Vec<&'a CourseId>,
) -> Result<usize, RoadmapError> {
    if let Some(&depth) = depths.get(id) {
        return Ok(depth);
    }
    let Some(&index) = known.get(id) else {
        return Ok(0);
    };

    on_path.insert(id);
    path.push(id);

    let mut depth = 0;
    for prereq in &curriculum.courses[index].prerequisites {
        if !known.contains_key(prereq) {
            continue;
        }
        if on_path.contains(prereq) {
            let start = path.iter().position(|p| *p == prereq).unwrap_or(0);
            let mut cycle: Vec<CourseId> = path[start..].iter().map(|p| (*p).clone()).collect();
            cycle.push(prereq.clone());
            return Err(RoadmapError::Cycle(cycle));
        }
        depth = depth.max(depth_of(prereq, curriculum, known, depths, on_path, path)? + 1);
    }

    path.pop();
    on_path.remove(id);
    depths.insert(id, depth);
    Ok(depth)
}

impl<S: SnapshotStorage> ProgressStore<S> {
    /// Decorate a layout with completion and lock state.
    ///
    /// Before hydration every node shows 0% and unlocked.
    pub fn roadmap_nodes(&self, layout: &RoadmapLayout) -> Vec<RoadmapNode> {
        layout
            .nodes
            .iter()
            .map(|node| RoadmapNode {
                course_id: node.course_id.clone(),
                title: node.title.clone(),
                category_id: node.category_id.clone(),
                difficulty: node.difficulty,
                position: node.position,
                percent_complete: self.course_progress(&node.course_id),
                locked: !self.is_prerequisite_met(&node.course_id),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use coursetrack_core::Course;
    use coursetrack_storage::MemoryStorage;

    fn curriculum() -> Curriculum {
        Curriculum::new(
            vec![],
            vec![
                Course::new("deep-learning", "ml", 2)
                    .with_prerequisite("classical-ml")
                    .with_prerequisite("python-advanced")
                    .with_order(3),
                Course::new("linear-algebra", "math", 2).with_order(2),
                Course::new("python-advanced", "coding", 2).with_order(1),
                Course::new("classical-ml", "ml", 2)
                    .with_prerequisite("linear-algebra")
                    .with_order(1),
            ],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_columns_follow_longest_chain() {
        let layout = RoadmapLayout::build(&curriculum()).unwrap();

        let column = |id: &str| layout.node(&id.into()).unwrap().column;
        assert_eq!(column("python-advanced"), 0);
        assert_eq!(column("linear-algebra"), 0);
        assert_eq!(column("classical-ml"), 1);
        assert_eq!(column("deep-learning"), 2);
    }

    #[test]
    fn test_rows_ordered_within_column() {
        let layout = RoadmapLayout::build(&curriculum()).unwrap();

        let first = layout.node(&"python-advanced".into()).unwrap();
        let second = layout.node(&"linear-algebra".into()).unwrap();
        assert_eq!((first.row, second.row), (0, 1));
        assert_eq!(second.position, Position { x: 0.0, y: ROW_GAP });

        let dl = layout.node(&"deep-learning".into()).unwrap();
        assert_eq!(dl.position, Position { x: 2.0 * COLUMN_GAP, y: 0.0 });

        let ids: Vec<_> = layout.nodes.iter().map(|n| n.course_id.as_str()).collect();
        assert_eq!(ids, vec!["python-advanced", "linear-algebra", "classical-ml", "deep-learning"]);
    }

    #[test]
    fn test_edges_skip_unknown_prerequisites() {
        let mut curriculum = curriculum();
        curriculum.courses[3].prerequisites.push("retired-course".into());

        let layout = RoadmapLayout::build(&curriculum).unwrap();
        assert_eq!(layout.edges.len(), 3);
        assert!(layout
            .edges
            .iter()
            .all(|e| e.from.as_str() != "retired-course"));
        assert!(layout.edges.contains(&RoadmapEdge {
            from: "linear-algebra".into(),
            to: "classical-ml".into(),
        }));
        assert_eq!(layout.node(&"classical-ml".into()).unwrap().column, 1);
    }

    #[test]
    fn test_cycle_detected() {
        let cyclic = Curriculum::new(
            vec![],
            vec![
                Course::new("a", "x", 1).with_prerequisite("b"),
                Course::new("b", "x", 1).with_prerequisite("c"),
                Course::new("c", "x", 1).with_prerequisite("a"),
            ],
            vec![],
        )
        .unwrap();

        let err = RoadmapLayout::build(&cyclic).unwrap_err();
        let RoadmapError::Cycle(ids) = &err;
        assert_eq!(ids.first(), ids.last());
        assert_eq!(ids.len(), 4);
        assert_eq!(err.to_string(), "prerequisite cycle: a -> b -> c -> a");
    }

    #[test]
    fn test_self_prerequisite_is_a_cycle() {
        let cyclic = Curriculum::new(vec![], vec![Course::new("a", "x", 1).with_prerequisite("a")], vec![])
            .unwrap();
        assert_eq!(
            RoadmapLayout::build(&cyclic),
            Err(RoadmapError::Cycle(vec!["a".into(), "a".into()]))
        );
    }

    #[tokio::test]
    async fn test_roadmap_nodes_lock_state() {
        let curriculum = Arc::new(curriculum());
        let layout = RoadmapLayout::build(&curriculum).unwrap();
        let mut store = ProgressStore::new(curriculum, MemoryStorage::new());

        let cold = store.roadmap_nodes(&layout);
        assert!(cold.iter().all(|n| !n.locked && n.percent_complete == 0));

        store.hydrate().await;
        store.toggle_lecture_completion(&"linear-algebra".into(), &"1".into()).await;

        let nodes = store.roadmap_nodes(&layout);
        let find = |id: &str| nodes.iter().find(|n| n.course_id.as_str() == id).unwrap();
        assert_eq!(find("linear-algebra").percent_complete, 50);
        assert!(!find("linear-algebra").locked);
        assert_eq!(find("linear-algebra").category_id.as_str(), "math");
        assert_eq!(find("linear-algebra").difficulty, Difficulty::Advanced);
        assert!(find("classical-ml").locked);
        assert!(find("deep-learning").locked);

        store.toggle_lecture_completion(&"linear-algebra".into(), &"2".into()).await;
        let nodes = store.roadmap_nodes(&layout);
        assert!(!nodes.iter().find(|n| n.course_id.as_str() == "classical-ml").unwrap().locked);
    }
}
