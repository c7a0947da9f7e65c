mod analysis;
mod depth;
mod display;
mod eval;
mod parser;

#[cfg(test)]
mod test;

pub use analysis::{analyze, scoping, Analysis, BinderInfo, Scoping};
pub use aut::{parse_aut, Lts, LtsError, StateId, StateSet};
pub use eval::{
    solve_emerson_lei, solve_emerson_lei_with, solve_naive, solve_naive_with, Bindings,
    Counters, EvalError, Solution,
};
pub use parser::{parse_mucalc, strip_comments, SyntaxError};

pub type Set<T> = indexmap::IndexSet<T, rustc_hash::FxBuildHasher>;
pub type Map<K, V> = rustc_hash::FxHashMap<K, V>;

aut::new_index!(
    /// Identity of a `mu`/`nu` node, assigned in pre-order by the parser.
    pub index BinderId
);

/// A recursion variable, always a single uppercase letter.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Var(pub char);

/// An action label, matching `[a-z][a-z0-9_]*`.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Label(pub String);

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum FixType {
    Min,
    Max,
}

impl FixType {
    /// The value a fixpoint of this type starts iterating from.
    pub fn neutral(self, lts: &Lts) -> StateSet {
        match self {
            FixType::Min => lts.empty_set(),
            FixType::Max => lts.full_set(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binder {
    pub id: BinderId,
    pub var: Var,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MuCalc {
    True,
    False,
    Var(Var),
    And(Box<MuCalc>, Box<MuCalc>),
    Or(Box<MuCalc>, Box<MuCalc>),
    Diamond(Label, Box<MuCalc>),
    Box(Label, Box<MuCalc>),
    Mu(Binder, Box<MuCalc>),
    Nu(Binder, Box<MuCalc>),
}

impl MuCalc {
    /// The fixpoint type, binder and body if this is a `mu`/`nu` node.
    pub fn as_fix(&self) -> Option<(FixType, Binder, &MuCalc)> {
        match self {
            MuCalc::Mu(b, e) => Some((FixType::Min, *b, e)),
            MuCalc::Nu(b, e) => Some((FixType::Max, *b, e)),
            _ => None,
        }
    }
}
