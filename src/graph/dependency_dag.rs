use crate::task::SchedulableTask;
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Dependency graph over an already priority-sorted task list.
///
/// Node weights are positions in that list; edges run from a dependency to the
/// task that waits on it. Dependencies naming tasks outside the list are dropped.
pub struct DependencyDag {
    pub graph: DiGraph<usize, ()>,
    pub id_to_index: HashMap<String, NodeIndex>,
}

impl DependencyDag {
    pub fn build(tasks: &[&SchedulableTask]) -> Self {
        let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(tasks.len(), tasks.len());
        let mut id_to_index: HashMap<String, NodeIndex> = HashMap::with_capacity(tasks.len());

        for (position, task) in tasks.iter().enumerate() {
            let node_ix = graph.add_node(position);
            // First occurrence wins for duplicated ids.
            id_to_index.entry(task.id.clone()).or_insert(node_ix);
        }

        for (position, task) in tasks.iter().enumerate() {
            let task_ix = NodeIndex::new(position);
            for dep_id in &task.dependencies {
                if let Some(&dep_ix) = id_to_index.get(dep_id) {
                    graph.update_edge(dep_ix, task_ix, ());
                }
            }
        }

        Self { graph, id_to_index }
    }

    /// Positions of every task caught in a cycle, grouped per cycle.
    pub fn cycles(&self) -> Vec<Vec<usize>> {
        let mut cycles: Vec<Vec<usize>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1 || self.graph.contains_edge(component[0], component[0])
            })
            .map(|component| {
                let mut positions: Vec<usize> =
                    component.into_iter().map(|ix| self.graph[ix]).collect();
                positions.sort_unstable();
                positions
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Topological order that always releases the earliest ready position first,
    /// so unrelated tasks keep their priority order. `Err` carries the first cycle.
    pub fn stable_order(&self) -> Result<Vec<usize>, Vec<usize>> {
        if let Some(cycle) = self.cycles().into_iter().next() {
            return Err(cycle);
        }

        let mut pending: Vec<usize> = self
            .graph
            .node_indices()
            .map(|ix| {
                self.graph
                    .neighbors_directed(ix, Direction::Incoming)
                    .count()
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<usize>> = self
            .graph
            .node_indices()
            .filter(|ix| pending[ix.index()] == 0)
            .map(|ix| Reverse(self.graph[ix]))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(position)) = ready.pop() {
            order.push(position);
            let node_ix = NodeIndex::new(position);
            for succ_ix in self.graph.neighbors_directed(node_ix, Direction::Outgoing) {
                let slot = &mut pending[succ_ix.index()];
                *slot -= 1;
                if *slot == 0 {
                    ready.push(Reverse(self.graph[succ_ix]));
                }
            }
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::TaskDuration;

    fn task(id: &str, deps: &[&str]) -> SchedulableTask {
        SchedulableTask::new(id, TaskDuration::days(1.0)).with_dependencies(deps.iter().copied())
    }

    #[test]
    fn builds_edges_only_for_known_dependencies() {
        let tasks = vec![task("a", &[]), task("b", &["a", "ghost"]), task("c", &["a", "a"])];
        let refs: Vec<&SchedulableTask> = tasks.iter().collect();
        let dag = DependencyDag::build(&refs);
        assert_eq!(dag.graph.node_count(), 3);
        assert_eq!(dag.graph.edge_count(), 2);
    }

    #[test]
    fn stable_order_keeps_priority_among_ready_tasks() {
        // Position 0 waits on position 2; 1 is free.
        let tasks = vec![task("a", &["c"]), task("b", &[]), task("c", &[])];
        let refs: Vec<&SchedulableTask> = tasks.iter().collect();
        let order = DependencyDag::build(&refs).stable_order().unwrap();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn reports_cycles_and_self_loops() {
        let tasks = vec![task("a", &["b"]), task("b", &["a"]), task("c", &["c"]), task("d", &[])];
        let refs: Vec<&SchedulableTask> = tasks.iter().collect();
        let dag = DependencyDag::build(&refs);
        assert_eq!(dag.cycles(), vec![vec![0, 1], vec![2]]);
        assert_eq!(dag.stable_order(), Err(vec![0, 1]));
    }
}
