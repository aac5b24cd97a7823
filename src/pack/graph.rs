//! Directed-graph view of a rule pack.
//!
//! Built on demand for traversal (validation, reporting). Edges whose
//! target does not exist are kept aside as dangling instead of failing
//! construction, so callers decide whether that is fatal.

use std::collections::{BTreeSet, HashMap};

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::{Bfs, EdgeRef, Reversed, VisitMap},
};

use crate::pack::{
    RulePack,
    edge::{Branch, Edge},
    node::NodeId,
};

pub struct PackGraph {
    graph: DiGraph<NodeId, Branch>,
    index: HashMap<NodeId, NodeIndex>,
    dangling: Vec<Edge>,
}

impl PackGraph {
    pub fn new(pack: &RulePack) -> Self {
        let mut graph: DiGraph<NodeId, Branch> = DiGraph::new();
        let mut index = HashMap::new();

        for node in pack.nodes() {
            let idx = graph.add_node(node.id.clone());
            index.insert(node.id.clone(), idx);
        }

        let mut dangling = Vec::new();
        for node in pack.nodes() {
            for edge in node.edges() {
                match (index.get(&edge.source), index.get(&edge.target)) {
                    (Some(source), Some(target)) => {
                        graph.add_edge(*source, *target, edge.branch);
                    }
                    _ => dangling.push(edge),
                }
            }
        }

        Self { graph, index, dangling }
    }

    /// Edges naming a node that does not exist.
    pub fn dangling(&self) -> &[Edge] {
        &self.dangling
    }

    pub fn contains(
        &self,
        id: &str,
    ) -> bool {
        self.index.contains_key(id)
    }

    /// Nodes reachable from `start` following every branch, `start` included.
    ///
    /// Each node is visited at most once, so cycles terminate.
    pub fn reachable_from(
        &self,
        start: &str,
    ) -> BTreeSet<NodeId> {
        let mut reachable = BTreeSet::new();
        let Some(start) = self.index.get(start) else {
            return reachable;
        };

        let mut bfs = Bfs::new(&self.graph, *start);
        while let Some(idx) = bfs.next(&self.graph) {
            reachable.insert(self.graph[idx].clone());
        }
        reachable
    }

    /// Nodes with no outgoing edge: terminal nodes and dead ends.
    pub fn exits(&self) -> Vec<NodeId> {
        self.graph
            .node_indices()
            .filter(|idx| self.graph.neighbors_directed(*idx, Direction::Outgoing).next().is_none())
            .map(|idx| self.graph[idx].clone())
            .collect()
    }

    /// Nodes from which at least one exit can be reached.
    pub fn can_exit(&self) -> BTreeSet<NodeId> {
        let mut escapable = BTreeSet::new();
        let exits: Vec<NodeIndex> = self.exits().iter().filter_map(|id| self.index.get(id).copied()).collect();
        let Some((first, rest)) = exits.split_first() else {
            return escapable;
        };

        let reversed = Reversed(&self.graph);
        let mut bfs = Bfs::new(reversed, *first);
        for idx in rest {
            if bfs.discovered.visit(*idx) {
                bfs.stack.push_back(*idx);
            }
        }
        while let Some(idx) = bfs.next(reversed) {
            escapable.insert(self.graph[idx].clone());
        }
        escapable
    }

    /// Human-readable representation of the pack graph.
    pub fn schema(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Rule Pack Graph ===".to_string());
        lines.push(format!("Nodes: {}, Edges: {}", self.graph.node_count(), self.graph.edge_count()));
        lines.push(String::new());

        for idx in self.graph.node_indices() {
            let outgoing: Vec<String> = self
                .graph
                .edges_directed(idx, Direction::Outgoing)
                .map(|e| format!("{}({})", self.graph[e.target()], e.weight().as_ref()))
                .collect();

            if outgoing.is_empty() {
                lines.push(format!("{} -> (end)", self.graph[idx]));
            } else {
                lines.push(format!("{} -> {}", self.graph[idx], outgoing.join(", ")));
            }
        }

        for edge in &self.dangling {
            lines.push(format!("{} -> {}({}) [missing]", edge.source, edge.target, edge.branch.as_ref()));
        }

        lines.join("\n")
    }
}
