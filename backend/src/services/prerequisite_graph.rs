//! Prerequisite graph expansion.
//!
//! Walks the "requires" relation from a root course with an explicit stack
//! over an arena of interned course ids. Every course is expanded at most
//! once, which bounds the walk on cyclic catalogs and keeps shared
//! prerequisites (diamonds) from producing duplicate edges.

use std::collections::{HashMap, HashSet};

use super::error::{PlannerError, PlannerResult};
use crate::api::{CourseId, GraphEdge, GraphNode, PrerequisiteGraph};
use crate::db::repository::CatalogRepository;

/// Interned course ids. Indices are stable for the lifetime of one build.
#[derive(Debug, Default)]
struct CourseArena {
    ids: Vec<CourseId>,
    index: HashMap<CourseId, usize>,
    visited: Vec<bool>,
}

impl CourseArena {
    fn intern(&mut self, id: CourseId) -> usize {
        if let Some(&slot) = self.index.get(&id) {
            return slot;
        }
        let slot = self.ids.len();
        self.index.insert(id.clone(), slot);
        self.ids.push(id);
        self.visited.push(false);
        slot
    }

    fn id(&self, slot: usize) -> &CourseId {
        &self.ids[slot]
    }
}

/// Build the deduplicated prerequisite graph rooted at `root`.
///
/// Nodes come out in visit order with the root first. Edges point from the
/// prerequisite to the course requiring it, in depth-first pre-order: all
/// direct edges of a course are emitted when it is expanded, then its
/// prerequisites are expanded in the order the store returned them.
///
/// The root does not have to exist in the catalog; a course with no
/// prerequisite rows yields a single node and no edges.
pub async fn build_prerequisite_graph<R: CatalogRepository + ?Sized>(
    repo: &R,
    root: &CourseId,
) -> PlannerResult<PrerequisiteGraph> {
    if root.is_empty() {
        return Err(PlannerError::InvalidInput(
            "course id must not be empty".to_string(),
        ));
    }

    let mut arena = CourseArena::default();
    let root_slot = arena.intern(root.clone());

    let mut stack = vec![root_slot];
    let mut order: Vec<usize> = Vec::new();
    let mut edges: Vec<(usize, usize)> = Vec::new();
    let mut emitted: HashSet<(usize, usize)> = HashSet::new();

    while let Some(current) = stack.pop() {
        if arena.visited[current] {
            continue;
        }
        arena.visited[current] = true;
        order.push(current);

        let prerequisites = repo.get_prerequisites(arena.id(current)).await?;
        let mut children = Vec::with_capacity(prerequisites.len());
        for prerequisite in prerequisites {
            let slot = arena.intern(prerequisite.prerequisite_id);
            if emitted.insert((slot, current)) {
                edges.push((slot, current));
            }
            children.push(slot);
        }

        // Reverse so the first prerequisite is expanded first.
        stack.extend(
            children
                .into_iter()
                .rev()
                .filter(|&slot| !arena.visited[slot]),
        );
    }

    log::debug!(
        "Prerequisite graph for {}: {} nodes, {} edges",
        root,
        order.len(),
        edges.len()
    );

    let nodes = order
        .iter()
        .map(|&slot| {
            let id = arena.id(slot).clone();
            GraphNode {
                label: id.to_string(),
                is_root: slot == root_slot,
                id,
            }
        })
        .collect();
    let edges = edges
        .into_iter()
        .map(|(from, to)| GraphEdge {
            from: arena.id(from).clone(),
            to: arena.id(to).clone(),
        })
        .collect();

    Ok(PrerequisiteGraph { nodes, edges })
}

#[cfg(test)]
#[path = "prerequisite_graph_tests.rs"]
mod tests;
