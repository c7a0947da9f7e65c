pub mod index;
mod parser;
mod set;


use index::{IndexedSet, IndexedVec};

pub use parser::parse_aut;
pub use set::StateSet;

pub type Map<K, V> = rustc_hash::FxHashMap<K, V>;

new_index!(pub index StateId);
new_index!(pub index EdgeId);
new_index!(pub index LabelId);

#[derive(Debug, thiserror::Error)]
pub enum LtsError {
    #[error("syntax error at line {line}: {message} (in {text:?})")]
    Syntax { line: usize, text: String, message: String },
    #[error("wrong number of transitions: got {actual}, expected {declared}")]
    TransitionCountMismatch { declared: usize, actual: usize },
    #[error("state {state} doesn't exist, the lts has {state_count} states")]
    UnknownState { state: usize, state_count: usize },
    #[error("cannot allocate an lts with {state_count} states")]
    TooManyStates { state_count: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub start: StateId,
    pub label: LabelId,
    pub end: StateId,
}

/// A labelled transition system with dense state indexes `0..state_count`.
///
/// All the indexes are built once in [`Lts::new`]; afterwards the system is
/// read-only.
#[derive(Debug)]
pub struct Lts {
    pub first_state: StateId,
    state_count: usize,

    labels: IndexedSet<LabelId, String>,
    edges: IndexedVec<EdgeId, Edge>,

    by_label: IndexedVec<LabelId, Vec<EdgeId>>,
    by_start: IndexedVec<StateId, Vec<EdgeId>>,
    by_end: IndexedVec<StateId, Vec<EdgeId>>,

    // One-step successors for each label, only for states that have an edge with that label.
    successors: IndexedVec<LabelId, Map<StateId, StateSet>>,
    empty: StateSet,
}

impl Lts {
    pub fn new<S: Into<String>>(
        first_state: usize,
        state_count: usize,
        transitions: impl IntoIterator<Item = (usize, S, usize)>,
    ) -> Result<Self, LtsError> {
        let check_state = |state: usize| match state < state_count {
            true => Ok(StateId(state)),
            false => Err(LtsError::UnknownState { state, state_count }),
        };

        let first_state = check_state(first_state)?;

        let mut labels: IndexedSet<LabelId, String> = IndexedSet::default();
        let mut edges: IndexedVec<EdgeId, Edge> = IndexedVec::new();
        for (start, label, end) in transitions {
            let (start, end) = (check_state(start)?, check_state(end)?);
            let (label, _) = labels.insert_full(label.into());
            edges.push(Edge { start, label, end });
        }

        let mut by_label: IndexedVec<LabelId, Vec<EdgeId>> =
            (0..labels.len()).map(|_| Vec::new()).collect();
        let mut by_start = per_state(state_count)?;
        let mut by_end = per_state(state_count)?;
        let mut successors: IndexedVec<LabelId, Map<StateId, StateSet>> =
            (0..labels.len()).map(|_| Map::default()).collect();

        for (id, edge) in edges.enumerate() {
            by_label[edge.label].push(id);
            by_start[edge.start].push(id);
            by_end[edge.end].push(id);

            successors[edge.label]
                .entry(edge.start)
                .or_insert_with(|| StateSet::empty(state_count))
                .insert(edge.end);
        }

        Ok(Lts {
            first_state,
            state_count,
            labels,
            edges,
            by_label,
            by_start,
            by_end,
            successors,
            empty: StateSet::empty(state_count),
        })
    }

    pub fn state_count(&self) -> usize {
        self.state_count
    }

    pub fn transition_count(&self) -> usize {
        self.edges.len()
    }

    pub fn states(&self) -> impl Iterator<Item = StateId> + Clone {
        (0..self.state_count).map(StateId)
    }

    /// The set of all the states.
    pub fn full_set(&self) -> StateSet {
        StateSet::full(self.state_count)
    }

    pub fn empty_set(&self) -> StateSet {
        self.empty.clone()
    }

    pub fn label_id(&self, label: &str) -> Option<LabelId> {
        self.labels.get_index_of(label)
    }

    pub fn label(&self, label: LabelId) -> &str {
        &self.labels[label]
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edges_from(&self, state: StateId) -> impl Iterator<Item = &Edge> {
        self.lookup(self.by_start.get(state))
    }

    pub fn edges_to(&self, state: StateId) -> impl Iterator<Item = &Edge> {
        self.lookup(self.by_end.get(state))
    }

    pub fn edges_labelled(&self, label: &str) -> impl Iterator<Item = &Edge> {
        self.lookup(self.label_id(label).map(|l| &self.by_label[l]))
    }

    fn lookup<'a>(&'a self, ids: Option<&'a Vec<EdgeId>>) -> impl Iterator<Item = &'a Edge> {
        ids.into_iter().flatten().map(move |&id| &self.edges[id])
    }

    /// States reachable from `state` with one `label` step. Empty if there are none.
    pub fn successors(&self, label: &str, state: StateId) -> &StateSet {
        self.label_id(label)
            .and_then(|l| self.successors[l].get(&state))
            .unwrap_or(&self.empty)
    }

    /// Every state with at least one `label` edge, together with its `label` successors.
    pub fn successor_sets(&self, label: &str) -> impl Iterator<Item = (StateId, &StateSet)> {
        self.label_id(label)
            .into_iter()
            .flat_map(move |l| self.successors[l].iter().map(|(&s, set)| (s, set)))
    }
}

// The state count comes straight from the header, so a failed allocation is an input error.
fn per_state(state_count: usize) -> Result<IndexedVec<StateId, Vec<EdgeId>>, LtsError> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(state_count).map_err(|_| LtsError::TooManyStates { state_count })?;
    vec.resize_with(state_count, Vec::new);
    Ok(vec.into())
}
