//! LineageSession: the owned state of one lineage view
//!
//! A session holds the graph assembled so far, the leaf sets, and which
//! node/direction pairs have been resolved. Node expansions fetch through a
//! [`LineageSource`] and fold the result in with the pure assembler
//! functions. Snapshots are handed out as `Arc`s and replaced only when their
//! content changes, so `Arc::ptr_eq` tells a caller whether anything moved.

mod guard;

use crate::assembler::{
    self, expansion_direction, merge_lineage_with, record_leaf_if_applicable, AssembleError, LeafNodes,
    LeafState, MergePolicy,
};
use crate::graph::{Edge, EdgeKey, EntityId, EntityLineage, EntityReference, LineageDepth, LineageDirection};
use crate::source::{LineageSource, SourceError};
use dashmap::DashSet;
use guard::InFlightGuard;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur in session operations
#[derive(Debug, Error)]
pub enum LineageError {
    #[error("Already expanding {id} ({direction})")]
    AlreadyExpanding { id: EntityId, direction: LineageDirection },

    #[error("Already expanded {id} ({direction})")]
    AlreadyResolved { id: EntityId, direction: LineageDirection },

    #[error("Lineage view for {0} was reset while a fetch was in flight")]
    Superseded(EntityId),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] SourceError),

    #[error(transparent)]
    Assemble(#[from] AssembleError),
}

/// Result type for session operations
pub type LineageResult<T> = Result<T, LineageError>;

/// What one successful expansion changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandOutcome {
    pub node: EntityId,
    pub direction: LineageDirection,
    pub nodes_added: usize,
    pub edges_added: usize,
    /// The node turned out to have nothing further in `direction`
    pub leaf: bool,
}

type PairKey = (EntityId, LineageDirection);

#[derive(Debug)]
struct ViewState {
    lineage: Arc<EntityLineage>,
    leaves: Arc<LeafNodes>,
    resolved: HashMap<PairKey, LeafState>,
    /// Bumped on reset; fetches started under an older generation are dropped
    generation: u64,
}

impl ViewState {
    fn new(lineage: EntityLineage, generation: u64) -> Self {
        Self {
            lineage: Arc::new(lineage),
            leaves: Arc::new(LeafNodes::new()),
            resolved: HashMap::new(),
            generation,
        }
    }

    /// Install `lineage` as the new snapshot unless it equals the current one
    fn replace_lineage(&mut self, lineage: EntityLineage) {
        if lineage != *self.lineage {
            self.lineage = Arc::new(lineage);
        }
    }

    /// Fold a fetched fragment in; the caller has checked the pair is unresolved
    fn absorb(&mut self, fragment: &EntityLineage, direction: LineageDirection, policy: MergePolicy) -> ExpandOutcome {
        let leaf = direction.edges(fragment).is_empty();
        let before = (self.lineage.node_count(), self.lineage.edge_count());

        let leaves = record_leaf_if_applicable(&self.leaves, fragment, direction);
        if leaves != *self.leaves {
            self.leaves = Arc::new(leaves);
        }
        let merged = merge_lineage_with(&self.lineage, fragment, direction, policy);
        self.replace_lineage(merged);

        let state = if leaf { LeafState::Leaf } else { LeafState::HasChildren };
        self.resolved.insert((fragment.entity.id.clone(), direction), state);

        ExpandOutcome {
            node: fragment.entity.id.clone(),
            direction,
            nodes_added: self.lineage.node_count() - before.0,
            edges_added: self.lineage.edge_count() - before.1,
            leaf,
        }
    }
}

/// The state behind one lineage view
#[derive(Debug)]
pub struct LineageSession {
    policy: MergePolicy,
    state: Mutex<ViewState>,
    in_flight: DashSet<PairKey>,
}

impl LineageSession {
    /// Start a view whose only node is `focal`
    pub fn new(focal: EntityReference, policy: MergePolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(ViewState::new(EntityLineage::seeded(focal), 0)),
            in_flight: DashSet::new(),
        }
    }

    /// Start a view from one fetch around `focal`
    ///
    /// Directions fetched with a non-zero depth count as resolved for the
    /// focal entity.
    pub async fn load<S>(
        focal: &EntityReference,
        source: &S,
        depth: LineageDepth,
        policy: MergePolicy,
    ) -> LineageResult<Self>
    where
        S: LineageSource + ?Sized,
    {
        let lineage = source.fetch_lineage(focal, depth).await?;

        let mut state = ViewState::new(lineage.clone(), 0);
        let mut leaves = LeafNodes::new();
        for direction in [LineageDirection::Upstream, LineageDirection::Downstream] {
            if depth.get(direction) == 0 {
                continue;
            }
            leaves = record_leaf_if_applicable(&leaves, &lineage, direction);
            let resolved = if direction.edges(&lineage).is_empty() {
                LeafState::Leaf
            } else {
                LeafState::HasChildren
            };
            state.resolved.insert((lineage.entity.id.clone(), direction), resolved);
        }
        state.leaves = Arc::new(leaves);

        info!(
            entity = %lineage.entity.id,
            nodes = lineage.node_count(),
            edges = lineage.edge_count(),
            "loaded lineage view"
        );

        Ok(Self {
            policy,
            state: Mutex::new(state),
            in_flight: DashSet::new(),
        })
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// The focal entity
    pub fn focal(&self) -> EntityReference {
        self.state().lineage.entity.clone()
    }

    /// Current graph snapshot
    pub fn lineage(&self) -> Arc<EntityLineage> {
        Arc::clone(&self.state().lineage)
    }

    /// Current leaf sets snapshot
    pub fn leaves(&self) -> Arc<LeafNodes> {
        Arc::clone(&self.state().leaves)
    }

    /// Where a node/direction pair stands
    pub fn leaf_state(&self, id: &EntityId, direction: LineageDirection) -> LeafState {
        self.state()
            .resolved
            .get(&(id.clone(), direction))
            .copied()
            .unwrap_or(LeafState::Unknown)
    }

    /// True while a fetch for this node/direction is running
    pub fn is_expanding(&self, id: &EntityId, direction: LineageDirection) -> bool {
        self.in_flight.contains(&(id.clone(), direction))
    }

    /// Direction the view should offer to expand `id` in, if any
    ///
    /// Resolved and in-flight pairs are not offered.
    pub fn expandable(&self, id: &EntityId) -> Option<LineageDirection> {
        let direction = {
            let state = self.state();
            let offered = expansion_direction(&state.lineage, &state.leaves, id)
                .filter(|d| !state.resolved.contains_key(&(id.clone(), *d)));
            offered
        }?;
        (!self.is_expanding(id, direction)).then_some(direction)
    }

    /// Fetch and merge the lineage one hop beyond `node` in `direction`
    ///
    /// On failure the graph and leaf sets are left as they were and the pair
    /// stays [`LeafState::Unknown`], so the expansion can be retried.
    pub async fn expand<S>(
        &self,
        node: &EntityReference,
        direction: LineageDirection,
        source: &S,
    ) -> LineageResult<ExpandOutcome>
    where
        S: LineageSource + ?Sized,
    {
        let key = (node.id.clone(), direction);
        let generation = {
            let state = self.state();
            if state.resolved.contains_key(&key) {
                return Err(LineageError::AlreadyResolved { id: node.id.clone(), direction });
            }
            state.generation
        };

        let _guard = InFlightGuard::acquire(&self.in_flight, key).ok_or_else(|| LineageError::AlreadyExpanding {
            id: node.id.clone(),
            direction,
        })?;

        debug!(node = %node.id, %direction, "expanding lineage node");
        let fragment = match source.fetch_lineage(node, LineageDepth::towards(direction)).await {
            Ok(fragment) => fragment,
            Err(err) => {
                warn!(node = %node.id, %direction, error = %err, "lineage fetch failed");
                return Err(err.into());
            }
        };

        let mut state = self.state();
        if state.generation != generation {
            debug!(node = %node.id, %direction, "dropping fetch for a reset view");
            return Err(LineageError::Superseded(node.id.clone()));
        }
        // The ledger is keyed by the entity the source answered for
        if state.resolved.contains_key(&(fragment.entity.id.clone(), direction)) {
            return Err(LineageError::AlreadyResolved { id: fragment.entity.id.clone(), direction });
        }

        let outcome = state.absorb(&fragment, direction, self.policy);
        info!(
            node = %outcome.node,
            %direction,
            nodes_added = outcome.nodes_added,
            edges_added = outcome.edges_added,
            leaf = outcome.leaf,
            "expanded lineage node"
        );
        Ok(outcome)
    }

    /// Throw away the graph and start over around `focal`
    ///
    /// Fetches still in flight will not be applied.
    pub fn reset(&self, focal: EntityReference) {
        let mut state = self.state();
        let generation = state.generation + 1;
        debug!(entity = %focal.id, generation, "resetting lineage view");
        *state = ViewState::new(EntityLineage::seeded(focal), generation);
    }

    /// Mirror a lineage edge that was written to the catalog
    pub fn add_edge(&self, edge: Edge, direction: LineageDirection, endpoints: &[EntityReference]) {
        let mut state = self.state();
        let edited = assembler::with_edge_added(&state.lineage, edge, direction, endpoints);
        state.replace_lineage(edited);
    }

    /// Mirror a lineage edge deleted from the catalog
    pub fn remove_edge(&self, key: &EdgeKey) {
        let mut state = self.state();
        let edited = assembler::without_edge(&state.lineage, key);
        state.replace_lineage(edited);
    }

    /// Drop a node and its edges from the view
    pub fn remove_node(&self, id: &EntityId) -> LineageResult<()> {
        let mut state = self.state();
        let edited = assembler::without_node(&state.lineage, id)?;
        state.replace_lineage(edited);
        Ok(())
    }
}
