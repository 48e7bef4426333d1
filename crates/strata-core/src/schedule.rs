//! Batch scheduling over the dependency graph
//!
//! Kahn-style topological scheduling: repeatedly emit the set of models
//! whose dependencies are all satisfied as one parallel-eligible batch.
//! Models within a batch have no dependency relationship; batches are
//! strictly ordered. Ties inside a batch break by ascending model name so
//! identical inputs always produce identical schedules.

use crate::dag::ModelDag;
use crate::error::{CoreError, CoreResult};
use crate::model_name::ModelName;
use std::collections::{BTreeSet, HashMap, HashSet};

/// An execution plan: ordered batches of models that may run concurrently
/// within a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Ordered parallel-eligible batches
    pub batches: Vec<Vec<ModelName>>,
}

impl Schedule {
    /// Plan execution for the whole graph, or for a selection restricted
    /// to the named models plus every ancestor they need.
    ///
    /// Selecting a name with no registered model is a definition error.
    /// Detects cycles and reports one offending path.
    pub fn plan(dag: &ModelDag, selection: Option<&[String]>) -> CoreResult<Self> {
        let included = match selection {
            Some(names) => Self::selection_closure(dag, names)?,
            None => dag.models().into_iter().collect(),
        };

        // In-degree within the included subgraph
        let mut in_degree: HashMap<ModelName, usize> = included
            .iter()
            .map(|name| {
                let degree = dag
                    .dependencies(name)
                    .into_iter()
                    .filter(|dep| included.contains(dep))
                    .count();
                (name.clone(), degree)
            })
            .collect();

        let mut batches = Vec::new();
        let mut scheduled = 0usize;

        loop {
            let mut batch: Vec<ModelName> = in_degree
                .iter()
                .filter(|(_, &degree)| degree == 0)
                .map(|(name, _)| name.clone())
                .collect();
            if batch.is_empty() {
                break;
            }
            batch.sort();

            for name in &batch {
                in_degree.remove(name);
                for dependent in dag.dependents(name) {
                    if let Some(degree) = in_degree.get_mut(&dependent) {
                        *degree -= 1;
                    }
                }
            }

            scheduled += batch.len();
            batches.push(batch);
        }

        if scheduled < included.len() {
            // Everything left has positive in-degree: at least one cycle
            let stuck: BTreeSet<ModelName> = in_degree.into_keys().collect();
            return Err(CoreError::CircularDependency {
                cycle: find_cycle_path(dag, &stuck),
            });
        }

        Ok(Self { batches })
    }

    /// Selected models plus the transitive closure of their ancestors
    fn selection_closure(dag: &ModelDag, names: &[String]) -> CoreResult<HashSet<ModelName>> {
        let mut included = HashSet::new();
        for name in names {
            if !dag.contains(name) {
                return Err(CoreError::UnknownSelection { name: name.clone() });
            }
            included.insert(ModelName::new(name.as_str()));
            included.extend(dag.ancestors(name));
        }
        Ok(included)
    }

    /// Scheduled models flattened in execution order
    pub fn flatten(&self) -> Vec<ModelName> {
        self.batches.iter().flatten().cloned().collect()
    }

    /// Total number of scheduled models
    pub fn model_count(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    /// True if nothing is scheduled
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

/// Walk predecessors inside the stuck subset until a node repeats, then
/// format the discovered cycle in dependency order.
fn find_cycle_path(dag: &ModelDag, stuck: &BTreeSet<ModelName>) -> String {
    let Some(start) = stuck.iter().next().cloned() else {
        return String::new();
    };

    let mut path = vec![start.clone()];
    let mut position: HashMap<ModelName, usize> = HashMap::from([(start.clone(), 0)]);
    let mut current = start;

    loop {
        // Every stuck node has at least one stuck predecessor
        let Some(pred) = dag
            .dependencies(&current)
            .into_iter()
            .find(|p| stuck.contains(p))
        else {
            return path.join(" -> ");
        };

        if let Some(&pos) = position.get(&pred) {
            let mut cycle = path[pos..].to_vec();
            // Predecessor walk runs against edge direction
            cycle.reverse();
            // Rotate the smallest name to the front for a stable message
            if let Some(min_pos) = cycle
                .iter()
                .enumerate()
                .min_by_key(|(_, name)| (*name).clone())
                .map(|(i, _)| i)
            {
                cycle.rotate_left(min_pos);
            }
            let first = cycle[0].clone();
            cycle.push(first);
            return cycle
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
        }

        position.insert(pred.clone(), path.len());
        path.push(pred.clone());
        current = pred;
    }
}

#[cfg(test)]
#[path = "schedule_test.rs"]
mod tests;
