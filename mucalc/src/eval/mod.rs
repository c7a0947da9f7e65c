mod emerson_lei;
mod naive;

use std::fmt;
use std::time::Duration;

use aut::{Lts, StateSet};

use crate::{Label, Map, Var};

pub use emerson_lei::{solve_emerson_lei, solve_emerson_lei_with};
pub use naive::{solve_naive, solve_naive_with};

/// Values of the free variables of a formula, fixed for a whole evaluation.
pub type Bindings = Map<Var, StateSet>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("variable {0} is not bound by any fixpoint nor by the caller")]
    UnboundVariable(Var),
    #[error("fixpoint on {0} is missing from the analysis, run `analyze` on this formula")]
    NotAnalyzed(Var),
}

/// Performance counters of one evaluation. They never influence the result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    /// Rounds of fixpoint loops.
    pub iterations: usize,
    /// Fixpoint variables set back to their initial value.
    pub resets: usize,
    pub duration: Duration,
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i={}, r={}", self.iterations, self.resets)
    }
}

#[derive(Clone, Debug)]
pub struct Solution {
    pub states: StateSet,
    pub counters: Counters,
}

impl Solution {
    /// Whether the formula holds in the first state of `lts`.
    pub fn holds(&self, lts: &Lts) -> bool {
        self.states.contains(lts.first_state)
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.counters.duration.as_millis();
        write!(f, "{}, {} in {millis} milliseconds", self.counters, self.states)
    }
}

// States with at least one `label` edge into `target`.
fn diamond(lts: &Lts, label: &Label, target: &StateSet) -> StateSet {
    let mut result = lts.empty_set();
    for (state, successors) in lts.successor_sets(&label.0) {
        if successors.intersects(target) {
            result.insert(state);
        }
    }
    result
}

// States whose `label` edges all lead into `target`, including states without such edges.
fn boxx(lts: &Lts, label: &Label, target: &StateSet) -> StateSet {
    let mut result = lts.full_set();
    for (state, successors) in lts.successor_sets(&label.0) {
        if !successors.is_subset(target) {
            result.remove(state);
        }
    }
    result
}
