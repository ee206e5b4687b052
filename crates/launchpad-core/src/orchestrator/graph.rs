//! Step graph validation and wave computation.
//!
//! Uses `petgraph` to model step dependencies as a directed graph. Topological
//! sort detects cycles, and depth-based grouping produces execution waves:
//! wave 0 holds the root steps, and every step in wave k depends only on
//! steps in earlier waves. Each wave boundary is a join barrier.

use std::collections::HashMap;

use launchpad_types::error::CatalogError;
use launchpad_types::step::StepDefinition;
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use thiserror::Error;

use crate::catalog::{Catalog, TaskRef};

/// Errors from building a step graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("duplicate step id '{0}'")]
    DuplicateStep(String),

    #[error("step '{step}' depends on unknown step '{dependency}'")]
    UnknownDependency { step: String, dependency: String },

    #[error("step '{0}' depends on itself")]
    SelfDependency(String),

    #[error("cycle detected involving step '{0}'")]
    CycleDetected(String),

    #[error("step '{step}' is bound to an invalid task: {source}")]
    InvalidBinding {
        step: String,
        #[source]
        source: CatalogError,
    },
}

/// A validated step: its definition, resolved task, and wave depth.
#[derive(Debug, Clone)]
pub struct GraphStep {
    pub definition: StepDefinition,
    pub task: Option<TaskRef>,
    pub depth: usize,
    /// Position in declaration order.
    pub order: usize,
}

impl GraphStep {
    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn is_root(&self) -> bool {
        self.depth == 0
    }
}

/// Validated, immutable step DAG.
#[derive(Debug, Clone)]
pub struct StepGraph {
    steps: Vec<GraphStep>,
    index: HashMap<String, usize>,
    waves: Vec<Vec<usize>>,
}

impl StepGraph {
    /// Validate step definitions against a catalog and compute waves.
    pub fn new(definitions: Vec<StepDefinition>, catalog: &Catalog) -> Result<Self, GraphError> {
        let mut index: HashMap<String, usize> = HashMap::new();
        for (i, step) in definitions.iter().enumerate() {
            if index.insert(step.id.clone(), i).is_some() {
                return Err(GraphError::DuplicateStep(step.id.clone()));
            }
        }

        // Edge from dependency -> dependent
        let mut graph = DiGraph::<usize, ()>::new();
        let nodes: Vec<_> = (0..definitions.len()).map(|i| graph.add_node(i)).collect();
        for (to, step) in definitions.iter().enumerate() {
            for dep in &step.depends_on {
                if *dep == step.id {
                    return Err(GraphError::SelfDependency(step.id.clone()));
                }
                let from = index.get(dep).ok_or_else(|| GraphError::UnknownDependency {
                    step: step.id.clone(),
                    dependency: dep.clone(),
                })?;
                graph.add_edge(nodes[*from], nodes[to], ());
            }
        }

        let sorted = toposort(&graph, None).map_err(|cycle| {
            GraphError::CycleDetected(definitions[graph[cycle.node_id()]].id.clone())
        })?;

        // Root nodes have depth 0; others sit one past their deepest dependency.
        let mut depths = vec![0usize; definitions.len()];
        for node in sorted {
            let i = graph[node];
            let depth = definitions[i]
                .depends_on
                .iter()
                .map(|dep| depths[index[dep]] + 1)
                .max()
                .unwrap_or(0);
            depths[i] = depth;
        }

        let mut steps = Vec::with_capacity(definitions.len());
        for (order, definition) in definitions.into_iter().enumerate() {
            let task = match &definition.task {
                Some(binding) => Some(catalog.task(&binding.section, &binding.task).map_err(
                    |source| GraphError::InvalidBinding {
                        step: definition.id.clone(),
                        source,
                    },
                )?),
                None => None,
            };
            steps.push(GraphStep {
                depth: depths[order],
                definition,
                task,
                order,
            });
        }

        let wave_count = depths.iter().copied().max().map_or(0, |d| d + 1);
        let mut waves = vec![Vec::new(); wave_count];
        for step in &steps {
            waves[step.depth].push(step.order);
        }

        Ok(Self {
            steps,
            index,
            waves,
        })
    }

    /// Steps in declaration order.
    pub fn steps(&self) -> &[GraphStep] {
        &self.steps
    }

    pub fn step(&self, id: &str) -> Option<&GraphStep> {
        self.index.get(id).map(|i| &self.steps[*i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Steps grouped by depth, each wave in declaration order.
    pub fn waves(&self) -> impl Iterator<Item = Vec<&GraphStep>> + '_ {
        self.waves
            .iter()
            .map(|wave| wave.iter().map(|i| &self.steps[*i]).collect())
    }

    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::catalog;
    use launchpad_types::step::default_steps;

    fn step(id: &str, deps: &[&str]) -> StepDefinition {
        StepDefinition::new(id, id.to_uppercase()).depends_on(deps.iter().copied())
    }

    fn wave_ids(graph: &StepGraph) -> Vec<Vec<String>> {
        graph
            .waves()
            .map(|w| w.iter().map(|s| s.id().to_string()).collect())
            .collect()
    }

    #[test]
    fn test_default_pipeline_has_two_waves() {
        let graph = StepGraph::new(default_steps(), &Catalog::default()).unwrap();
        assert_eq!(
            wave_ids(&graph),
            vec![
                vec!["create_repository".to_string(), "copy_subdomain".to_string()],
                vec!["provision_cloud".to_string()],
            ]
        );
        assert!(graph.step("create_repository").unwrap().task.is_some());
        assert!(graph.step("copy_subdomain").unwrap().task.is_none());
    }

    #[test]
    fn test_depth_uses_longest_chain() {
        let catalog = catalog(&[("s", &["t"])]);
        let graph = StepGraph::new(
            vec![
                step("a", &[]),
                step("b", &["a"]),
                step("c", &["a", "b"]),
                step("d", &[]),
            ],
            &catalog,
        )
        .unwrap();
        assert_eq!(
            wave_ids(&graph),
            vec![vec!["a", "d"], vec!["b"], vec!["c"]]
                .into_iter()
                .map(|w| w.into_iter().map(String::from).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_empty_graph() {
        let graph = StepGraph::new(vec![], &Catalog::default()).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.wave_count(), 0);
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = StepGraph::new(vec![step("a", &[]), step("a", &[])], &Catalog::default())
            .unwrap_err();
        assert_eq!(err, GraphError::DuplicateStep("a".into()));
    }

    #[test]
    fn test_rejects_unknown_dependency() {
        let err = StepGraph::new(vec![step("a", &["ghost"])], &Catalog::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "step 'a' depends on unknown step 'ghost'"
        );
    }

    #[test]
    fn test_rejects_self_dependency() {
        let err = StepGraph::new(vec![step("a", &["a"])], &Catalog::default()).unwrap_err();
        assert_eq!(err, GraphError::SelfDependency("a".into()));
    }

    #[test]
    fn test_rejects_cycle() {
        let err = StepGraph::new(
            vec![step("a", &["c"]), step("b", &["a"]), step("c", &["b"])],
            &Catalog::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::CycleDetected(_)));
        assert!(err.to_string().starts_with("cycle detected involving step"));
    }

    #[test]
    fn test_rejects_unknown_binding() {
        let err = StepGraph::new(
            vec![StepDefinition::new("a", "A").bound_to("infrastructure", "dns")],
            &Catalog::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidBinding {
                source: CatalogError::UnknownTask { .. },
                ..
            }
        ));
    }
}
