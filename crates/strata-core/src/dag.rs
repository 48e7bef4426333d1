//! Dependency graph construction
//!
//! Converts a registry into a directed graph over models. Every reference
//! must resolve to a registered model or source; unresolved references are
//! definition errors raised here, before anything executes. Cycle
//! detection is deliberately left to the scheduler so that the diagnostic
//! can name an offending path.

use crate::error::{CoreError, CoreResult};
use crate::model_name::ModelName;
use crate::registry::Registry;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

/// A directed graph of model dependencies.
///
/// Edges run from dependency to dependent, so walking edge direction
/// follows execution order. Sources are validated during construction but
/// carry no graph nodes: they are roots with no predecessors and nothing
/// to schedule.
#[derive(Debug)]
pub struct ModelDag {
    graph: DiGraph<ModelName, ()>,
    node_map: HashMap<ModelName, NodeIndex>,
}

impl ModelDag {
    /// Build the graph from a registry, validating every reference.
    pub fn build(registry: &Registry) -> CoreResult<Self> {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        for model in registry.all() {
            let idx = graph.add_node(model.name.clone());
            node_map.insert(model.name.clone(), idx);
        }

        for model in registry.all() {
            let to = node_map[&model.name];

            for dep in &model.depends_on {
                let Some(&from) = node_map.get(dep) else {
                    return Err(CoreError::UnresolvedReference {
                        model: model.name.to_string(),
                        reference: dep.to_string(),
                    });
                };
                graph.add_edge(from, to, ());
            }

            for (group, table) in &model.source_deps {
                if registry.source_relation(group, table).is_none() {
                    return Err(CoreError::UnresolvedSource {
                        model: model.name.to_string(),
                        group: group.to_string(),
                        table: table.clone(),
                    });
                }
            }
        }

        Ok(Self { graph, node_map })
    }

    /// Direct dependencies of a model (its predecessors)
    pub fn dependencies(&self, model: &str) -> Vec<ModelName> {
        self.neighbors(model, petgraph::Direction::Incoming)
    }

    /// Direct dependents of a model (its successors)
    pub fn dependents(&self, model: &str) -> Vec<ModelName> {
        self.neighbors(model, petgraph::Direction::Outgoing)
    }

    /// All transitive dependencies of a model
    pub fn ancestors(&self, model: &str) -> HashSet<ModelName> {
        self.reachable(model, petgraph::Direction::Incoming)
    }

    /// All transitive dependents of a model
    pub fn descendants(&self, model: &str) -> HashSet<ModelName> {
        self.reachable(model, petgraph::Direction::Outgoing)
    }

    /// True if the model has a node in the graph
    pub fn contains(&self, model: &str) -> bool {
        self.node_map.contains_key(model)
    }

    /// All model names in the graph, in registration order
    pub fn models(&self) -> Vec<ModelName> {
        self.graph.node_weights().cloned().collect()
    }

    /// Number of models in the graph
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// True if the graph has no models
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    fn neighbors(&self, model: &str, direction: petgraph::Direction) -> Vec<ModelName> {
        let Some(&idx) = self.node_map.get(model) else {
            return Vec::new();
        };
        let mut result: Vec<ModelName> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| {
                let neighbor = match direction {
                    petgraph::Direction::Incoming => e.source(),
                    petgraph::Direction::Outgoing => e.target(),
                };
                self.graph[neighbor].clone()
            })
            .collect();
        result.sort();
        result.dedup();
        result
    }

    fn reachable(&self, model: &str, direction: petgraph::Direction) -> HashSet<ModelName> {
        let Some(&start) = self.node_map.get(model) else {
            return HashSet::new();
        };

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            for edge in self.graph.edges_directed(current, direction) {
                let neighbor = match direction {
                    petgraph::Direction::Incoming => edge.source(),
                    petgraph::Direction::Outgoing => edge.target(),
                };
                if visited.insert(neighbor) {
                    stack.push(neighbor);
                }
            }
        }

        visited
            .into_iter()
            .map(|idx| self.graph[idx].clone())
            .collect()
    }
}

#[cfg(test)]
#[path = "dag_test.rs"]
mod tests;
