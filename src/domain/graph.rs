//! Blocking graph for tasks
//!
//! Holds the `blocks` edges of a board and keeps them acyclic.
//! Uses petgraph for graph operations.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use thiserror::Error;

use super::dependency::Dependency;
use super::id::TaskId;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Adding dependency would create a cycle: {0} -> {1}")]
    CycleDetected(TaskId, TaskId),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Task cannot depend on itself: {0}")]
    SelfDependency(TaskId),
}

/// A graph of `blocks` edges between tasks
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Edges point from blocker to dependent
    graph: DiGraph<TaskId, ()>,

    /// Map from TaskId to node index
    node_map: HashMap<TaskId, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Builds a graph from task ids and stored edges
    ///
    /// Only `blocks` edges are added; informational edges never form cycles.
    /// Edges with an endpoint missing from `tasks` are skipped.
    pub fn from_dependencies<'a>(
        tasks: impl IntoIterator<Item = &'a TaskId>,
        dependencies: impl IntoIterator<Item = &'a Dependency>,
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new();

        for id in tasks {
            graph.add_task(id.clone());
        }

        for dep in dependencies {
            if !dep.dep_type.is_blocking() {
                continue;
            }
            if !graph.contains(&dep.task_id) || !graph.contains(&dep.depends_on_task_id) {
                log::debug!("Skipping dangling dependency {}", dep.id);
                continue;
            }
            graph.add_dependency(&dep.task_id, &dep.depends_on_task_id)?;
        }

        Ok(graph)
    }

    /// Adds a task to the graph
    pub fn add_task(&mut self, task_id: TaskId) {
        if !self.node_map.contains_key(&task_id) {
            let idx = self.graph.add_node(task_id.clone());
            self.node_map.insert(task_id, idx);
        }
    }

    /// Adds a dependency edge: `task` depends on `depends_on`
    ///
    /// The edge direction is: depends_on -> task
    pub fn add_dependency(&mut self, task: &TaskId, depends_on: &TaskId) -> Result<(), GraphError> {
        if task == depends_on {
            return Err(GraphError::SelfDependency(task.clone()));
        }

        let task_idx = *self
            .node_map
            .get(task)
            .ok_or_else(|| GraphError::TaskNotFound(task.clone()))?;

        let dep_idx = *self
            .node_map
            .get(depends_on)
            .ok_or_else(|| GraphError::TaskNotFound(depends_on.clone()))?;

        let edge = self.graph.add_edge(dep_idx, task_idx, ());

        if is_cyclic_directed(&self.graph) {
            self.graph.remove_edge(edge);
            return Err(GraphError::CycleDetected(task.clone(), depends_on.clone()));
        }

        Ok(())
    }

    /// Returns true if the graph contains the task
    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.node_map.contains_key(task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DependencyType;
    use chrono::Utc;

    fn make_task_id(seq: u32) -> TaskId {
        TaskId::new(&format!("Task {}", seq), Utc::now())
    }

    fn graph_with(ids: &[&TaskId]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for id in ids {
            graph.add_task((*id).clone());
        }
        graph
    }

    #[test]
    fn add_tasks() {
        let id1 = make_task_id(1);
        let id2 = make_task_id(2);
        let graph = graph_with(&[&id1, &id2]);

        assert!(graph.contains(&id1));
        assert!(graph.contains(&id2));
        assert!(!graph.contains(&make_task_id(3)));
    }

    #[test]
    fn add_dependency() {
        let id1 = make_task_id(1);
        let id2 = make_task_id(2);
        let mut graph = graph_with(&[&id1, &id2]);

        // id2 depends on id1
        graph.add_dependency(&id2, &id1).unwrap();

        // The reverse edge would close a loop
        assert!(matches!(
            graph.add_dependency(&id1, &id2),
            Err(GraphError::CycleDetected(_, _))
        ));
    }

    #[test]
    fn cycle_detection() {
        let id1 = make_task_id(1);
        let id2 = make_task_id(2);
        let id3 = make_task_id(3);
        let mut graph = graph_with(&[&id1, &id2, &id3]);

        graph.add_dependency(&id2, &id1).unwrap();
        graph.add_dependency(&id3, &id2).unwrap();
        let result = graph.add_dependency(&id1, &id3);

        assert!(matches!(result, Err(GraphError::CycleDetected(_, _))));
    }

    #[test]
    fn rejected_edge_is_not_kept() {
        let id1 = make_task_id(1);
        let id2 = make_task_id(2);
        let id3 = make_task_id(3);
        let mut graph = graph_with(&[&id1, &id2, &id3]);

        graph.add_dependency(&id2, &id1).unwrap();
        graph.add_dependency(&id1, &id2).unwrap_err();

        // A leftover edge would leave the graph cyclic and fail every later add
        graph.add_dependency(&id3, &id1).unwrap();
        graph.add_dependency(&id3, &id2).unwrap();
    }

    #[test]
    fn self_dependency_rejected() {
        let id1 = make_task_id(1);
        let mut graph = graph_with(&[&id1]);

        let result = graph.add_dependency(&id1, &id1);
        assert!(matches!(result, Err(GraphError::SelfDependency(_))));
    }

    #[test]
    fn unknown_task_returns_error() {
        let id1 = make_task_id(1);
        let id2 = make_task_id(2);
        let mut graph = graph_with(&[&id1]);

        let result = graph.add_dependency(&id1, &id2);
        assert!(matches!(result, Err(GraphError::TaskNotFound(_))));
    }

    #[test]
    fn from_dependencies_loads_blocking_edges() {
        let id1 = make_task_id(1);
        let id2 = make_task_id(2);
        let deps = vec![Dependency::new(id2.clone(), id1.clone(), DependencyType::Blocks)];

        let mut graph = DependencyGraph::from_dependencies([&id1, &id2], &deps).unwrap();

        assert!(matches!(
            graph.add_dependency(&id1, &id2),
            Err(GraphError::CycleDetected(_, _))
        ));
    }

    #[test]
    fn from_dependencies_ignores_informational_edges() {
        let id1 = make_task_id(1);
        let id2 = make_task_id(2);
        let deps = vec![Dependency::new(id1.clone(), id2.clone(), DependencyType::Related)];

        let mut graph = DependencyGraph::from_dependencies([&id1, &id2], &deps).unwrap();

        // Would be a cycle if the related edge counted
        graph.add_dependency(&id2, &id1).unwrap();
    }

    #[test]
    fn from_dependencies_skips_dangling_edges() {
        let id1 = make_task_id(1);
        let gone = make_task_id(99);
        let deps = vec![Dependency::new(id1.clone(), gone.clone(), DependencyType::Blocks)];

        let graph = DependencyGraph::from_dependencies([&id1], &deps).unwrap();

        assert!(graph.contains(&id1));
        assert!(!graph.contains(&gone));
    }
}
