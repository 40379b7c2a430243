//! Resolve a [`FlowFile`] into a validated, immutable [`FlowDefinition`].
//!
//! Resolution checks ids and edges, rejects cycles, and computes the
//! topological order once. The result holds the graph as plain adjacency
//! data indexed by declaration position, so evaluating a run is a single
//! linear pass and the definition can be shared across threads.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::content_hash::compute_fingerprint;
use crate::parser::load_definition;
use crate::types::{Automation, DefinitionError, FlowFile, SUPPORTED_VERSION};

/// A resolved step. Immutable once the definition is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub id: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Dependency ids, duplicates removed, declaration order kept.
    pub needs: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub automation: Option<Automation>,
}

impl Step {
    /// The job type enqueued when this step becomes ready, if automatable.
    pub fn job_type(&self) -> Option<&str> {
        self.automation.as_ref().map(|a| a.job.as_str())
    }

    /// Returns `true` if the step carries an automation descriptor.
    pub fn is_automatable(&self) -> bool {
        self.automation.is_some()
    }

    /// Title for display, falling back to the id.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() { &self.id } else { &self.title }
    }
}

/// A validated flow: steps, edges and a cached topological order.
///
/// Positions are indices into declaration order; every accessor that takes
/// a position expects one obtained from this same definition.
#[derive(Debug, Clone)]
pub struct FlowDefinition {
    name: String,
    description: String,
    steps: Vec<Step>,
    index: HashMap<String, usize>,
    needs: Vec<Vec<usize>>,
    dependents: Vec<Vec<usize>>,
    order: Vec<usize>,
    rank: Vec<usize>,
    fingerprint: String,
}

/// Validate a flow file and build its definition.
///
/// # Errors
///
/// Returns a [`DefinitionError`] naming the offending step(s) when ids are
/// empty or duplicated, a dependency is unknown, an automation has no job
/// type, or the dependency graph has a cycle.
pub fn resolve(file: &FlowFile) -> Result<FlowDefinition, DefinitionError> {
    if file.version != 0 && file.version != SUPPORTED_VERSION {
        return Err(DefinitionError::UnsupportedVersion(file.version));
    }
    if file.steps.is_empty() {
        return Err(DefinitionError::NoSteps);
    }

    // Ids.
    let mut index: HashMap<String, usize> = HashMap::with_capacity(file.steps.len());
    for (pos, def) in file.steps.iter().enumerate() {
        if def.id.trim().is_empty() {
            return Err(DefinitionError::EmptyStepId { position: pos + 1 });
        }
        if index.insert(def.id.clone(), pos).is_some() {
            return Err(DefinitionError::DuplicateStep(def.id.clone()));
        }
    }

    // Automation and edges.
    let mut steps = Vec::with_capacity(file.steps.len());
    let mut needs: Vec<Vec<usize>> = Vec::with_capacity(file.steps.len());
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); file.steps.len()];
    for (pos, def) in file.steps.iter().enumerate() {
        if let Some(ref automation) = def.automation {
            if automation.job.trim().is_empty() {
                return Err(DefinitionError::EmptyJobType(def.id.clone()));
            }
        }

        let mut seen = HashSet::new();
        let mut dep_ids = Vec::with_capacity(def.needs.len());
        let mut dep_positions = Vec::with_capacity(def.needs.len());
        for dep in &def.needs {
            if !seen.insert(dep.as_str()) {
                continue;
            }
            let dep_pos = *index
                .get(dep)
                .ok_or_else(|| DefinitionError::UnknownDependency {
                    step: def.id.clone(),
                    dependency: dep.clone(),
                })?;
            dep_ids.push(dep.clone());
            dep_positions.push(dep_pos);
            dependents[dep_pos].push(pos);
        }

        needs.push(dep_positions);
        steps.push(Step {
            id: def.id.clone(),
            title: def.title.clone(),
            description: def.description.clone(),
            needs: dep_ids,
            automation: def.automation.clone(),
        });
    }

    let order = topological_order(&needs, &dependents).map_err(|remaining| {
        DefinitionError::Cycle {
            steps: cycle_members(&remaining, &dependents)
                .into_iter()
                .map(|pos| steps[pos].id.clone())
                .collect(),
        }
    })?;

    let mut rank = vec![0; order.len()];
    for (i, &pos) in order.iter().enumerate() {
        rank[pos] = i;
    }

    let fingerprint = compute_fingerprint(&file.flow, &steps);
    debug!(
        flow = %file.flow,
        steps = steps.len(),
        fingerprint = %fingerprint,
        "resolved flow definition"
    );

    Ok(FlowDefinition {
        name: file.flow.clone(),
        description: file.description.clone(),
        steps,
        index,
        needs,
        dependents,
        order,
        rank,
        fingerprint,
    })
}

impl FlowDefinition {
    /// Load a definition file and resolve it.
    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        resolve(&load_definition(path)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// SHA-256 fingerprint of the definition content.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Look up a step by id.
    pub fn get(&self, id: &str) -> Option<&Step> {
        self.index.get(id).map(|&pos| &self.steps[pos])
    }

    /// Declaration position of a step.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// The step at a declaration position.
    pub fn step_at(&self, pos: usize) -> &Step {
        &self.steps[pos]
    }

    /// Positions of the steps that `pos` depends on.
    pub fn dependency_positions(&self, pos: usize) -> &[usize] {
        &self.needs[pos]
    }

    /// Declaration positions in topological order (dependencies first).
    pub fn topological_positions(&self) -> &[usize] {
        &self.order
    }

    /// Index of a step within the topological order.
    pub fn rank(&self, id: &str) -> Option<usize> {
        self.position(id).map(|pos| self.rank[pos])
    }

    /// Steps in declaration order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    /// Steps in topological order.
    pub fn in_order(&self) -> impl Iterator<Item = &Step> {
        self.order.iter().map(|&pos| &self.steps[pos])
    }

    /// Step ids in topological order.
    pub fn topological_ids(&self) -> Vec<&str> {
        self.in_order().map(|s| s.id.as_str()).collect()
    }

    /// Steps that list `id` among their needs, in declaration order.
    pub fn dependents(&self, id: &str) -> Vec<&Step> {
        match self.index.get(id) {
            Some(&pos) => self.dependents[pos].iter().map(|&d| &self.steps[d]).collect(),
            None => Vec::new(),
        }
    }

    /// Group steps into layers by longest dependency path.
    ///
    /// Layer 0 holds steps with no dependencies; a step sits one layer
    /// below its deepest dependency. Steps within a layer keep topological
    /// order.
    pub fn layers(&self) -> Vec<Vec<&Step>> {
        let mut depth = vec![0usize; self.steps.len()];
        for &pos in &self.order {
            depth[pos] = self.needs[pos]
                .iter()
                .map(|&dep| depth[dep] + 1)
                .max()
                .unwrap_or(0);
        }

        let max_layer = depth.iter().copied().max().unwrap_or(0);
        let mut layers: Vec<Vec<&Step>> = vec![Vec::new(); max_layer + 1];
        for &pos in &self.order {
            layers[depth[pos]].push(&self.steps[pos]);
        }
        layers
    }
}

// ---------------------------------------------------------------------------
// Graph algorithms
// ---------------------------------------------------------------------------

/// Kahn's algorithm. Among steps whose dependencies are all placed, the one
/// declared first goes next, so the order depends only on the file.
///
/// On a cycle, returns the positions that could not be placed.
fn topological_order(
    needs: &[Vec<usize>],
    dependents: &[Vec<usize>],
) -> Result<Vec<usize>, Vec<usize>> {
    let mut in_degree: Vec<usize> = needs.iter().map(Vec::len).collect();
    let mut available: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d == 0)
        .map(|(pos, _)| Reverse(pos))
        .collect();

    let mut order = Vec::with_capacity(needs.len());
    while let Some(Reverse(pos)) = available.pop() {
        order.push(pos);
        for &dependent in &dependents[pos] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                available.push(Reverse(dependent));
            }
        }
    }

    if order.len() == needs.len() {
        Ok(order)
    } else {
        Err((0..needs.len()).filter(|&pos| in_degree[pos] > 0).collect())
    }
}

/// Narrow the unplaced steps down to those on (or between) cycles by
/// peeling off steps that only sit downstream of one.
fn cycle_members(remaining: &[usize], dependents: &[Vec<usize>]) -> Vec<usize> {
    let mut alive: HashSet<usize> = remaining.iter().copied().collect();
    loop {
        let sinks: Vec<usize> = alive
            .iter()
            .copied()
            .filter(|&pos| !dependents[pos].iter().any(|d| alive.contains(d)))
            .collect();
        if sinks.is_empty() {
            break;
        }
        for pos in sinks {
            alive.remove(&pos);
        }
    }
    let mut members: Vec<usize> = alive.into_iter().collect();
    members.sort_unstable();
    members
}
