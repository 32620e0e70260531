//! Module reference graph using `petgraph`.
//!
//! Built from the references recorded in a [`BuildPlan`], for inspection
//! and export. Edges point from a referenced module to the module that
//! references it, so a topological sort yields dependencies first.

use std::collections::HashMap;

use hdlplan_common::error::{HdlplanError, Result};
use hdlplan_common::types::ScopedPath;
use petgraph::dot::{Config, Dot};
use petgraph::graph::NodeIndex;

use crate::plan::BuildPlan;

/// A directed graph of module references.
#[derive(Debug)]
pub struct ModuleGraph {
    graph: petgraph::Graph<String, ()>,
    nodes: HashMap<ScopedPath, NodeIndex>,
}

impl ModuleGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: petgraph::Graph::new(),
            nodes: HashMap::new(),
        }
    }

    /// Builds the graph of every module and reference in a plan.
    #[must_use]
    pub fn from_plan(plan: &BuildPlan) -> Self {
        let mut graph = Self::new();
        for module in plan.modules() {
            let _ = graph.add_module(&module.key);
        }
        for edge in plan.references() {
            let from = graph.add_module(&edge.from);
            let to = graph.add_module(&edge.to);
            graph.add_reference(from, to);
        }
        graph
    }

    /// Adds a module node, returning the existing node if already present.
    pub fn add_module(&mut self, key: &ScopedPath) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(key) {
            return idx;
        }
        let idx = self.graph.add_node(key.to_string());
        let _ = self.nodes.insert(key.clone(), idx);
        idx
    }

    /// Records that `referrer` references `referenced`.
    ///
    /// Repeated references between the same pair are stored once.
    pub fn add_reference(&mut self, referrer: NodeIndex, referenced: NodeIndex) {
        let _ = self.graph.update_edge(referenced, referrer, ());
    }

    /// Number of modules in the graph.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns module keys ordered so that every module comes after all the
    /// modules it references.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph contains cycles.
    pub fn dependency_order(&self) -> Result<Vec<String>> {
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .iter()
                .filter_map(|&idx| self.graph.node_weight(idx).cloned())
                .collect()),
            Err(_cycle) => Err(HdlplanError::Config {
                message: "cyclic reference detected in module graph".into(),
            }),
        }
    }

    /// Renders the graph in Graphviz DOT format.
    ///
    /// Edges carry no weight, so the graph is rendered through `Debug`.
    #[must_use]
    pub fn to_dot(&self) -> String {
        format!("{:?}", Dot::with_config(&self.graph, &[Config::EdgeNoLabel]))
    }
}

impl Default for ModuleGraph {
    fn default() -> Self {
        Self::new()
    }
}
