use crate::{Binder, BinderId, FixType, Map, MuCalc, Set, Var};

/// What the Emerson-Lei evaluation needs to know about a `mu`/`nu` node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinderInfo {
    pub var: Var,
    pub fix_type: FixType,
    /// The body references a variable bound outside of this binder.
    pub is_open: bool,
    /// Open descendant binders with the same fixpoint type, in post-order.
    pub open_subformulae: Vec<BinderId>,
}

/// Dependency annotations of a formula, keyed by binder identity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Analysis {
    binders: Map<BinderId, BinderInfo>,
}

impl Analysis {
    pub fn get(&self, id: BinderId) -> Option<&BinderInfo> {
        self.binders.get(&id)
    }

    pub fn len(&self) -> usize {
        self.binders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binders.is_empty()
    }
}

/// Computes the open flags and the open same-signed subformulae of every binder.
///
/// This is a pure function of the formula, so analysing twice gives equal results.
pub fn analyze(formula: &MuCalc) -> Analysis {
    let mut analysis = Analysis::default();
    analysis.free_vars(formula);
    analysis.open_subformulae(formula);
    analysis
}

impl Analysis {
    // Post-order: the variables referenced in `f` but not bound inside it.
    fn free_vars(&mut self, f: &MuCalc) -> Set<Var> {
        match f {
            MuCalc::True | MuCalc::False => Set::default(),
            MuCalc::Var(x) => Set::from_iter([*x]),
            MuCalc::And(l, r) | MuCalc::Or(l, r) => {
                let mut vars = self.free_vars(l);
                vars.extend(self.free_vars(r));
                vars
            }
            MuCalc::Diamond(_, e) | MuCalc::Box(_, e) => self.free_vars(e),
            MuCalc::Mu(b, e) => self.free_vars_fix(FixType::Min, b, e),
            MuCalc::Nu(b, e) => self.free_vars_fix(FixType::Max, b, e),
        }
    }

    fn free_vars_fix(&mut self, fix_type: FixType, binder: &Binder, body: &MuCalc) -> Set<Var> {
        let mut vars = self.free_vars(body);
        vars.shift_remove(&binder.var);

        let info = BinderInfo {
            var: binder.var,
            fix_type,
            is_open: !vars.is_empty(),
            open_subformulae: Vec::new(),
        };
        self.binders.insert(binder.id, info);

        vars
    }

    // Post-order: the open binders in `f`, of both types.
    fn open_subformulae(&mut self, f: &MuCalc) -> Vec<BinderId> {
        match f {
            MuCalc::True | MuCalc::False | MuCalc::Var(_) => Vec::new(),
            MuCalc::And(l, r) | MuCalc::Or(l, r) => {
                let mut open = self.open_subformulae(l);
                open.extend(self.open_subformulae(r));
                open
            }
            MuCalc::Diamond(_, e) | MuCalc::Box(_, e) => self.open_subformulae(e),
            MuCalc::Mu(b, e) => self.open_subformulae_fix(FixType::Min, b, e),
            MuCalc::Nu(b, e) => self.open_subformulae_fix(FixType::Max, b, e),
        }
    }

    fn open_subformulae_fix(
        &mut self,
        fix_type: FixType,
        binder: &Binder,
        body: &MuCalc,
    ) -> Vec<BinderId> {
        let mut open = self.open_subformulae(body);

        let same_type = open
            .iter()
            .copied()
            .filter(|id| self.binders.get(id).is_some_and(|b| b.fix_type == fix_type))
            .collect();

        if let Some(info) = self.binders.get_mut(&binder.id) {
            info.open_subformulae = same_type;
            if info.is_open {
                open.push(binder.id);
            }
        }

        open
    }
}

/// Every binder of a formula and every variable it references without binding it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scoping {
    pub binders: Vec<(BinderId, FixType)>,
    pub free: Set<Var>,
}

pub fn scoping(formula: &MuCalc) -> Scoping {
    fn walk(f: &MuCalc, bound: &mut Vec<Var>, out: &mut Scoping) {
        match f {
            MuCalc::True | MuCalc::False => {}
            MuCalc::Var(x) => {
                if !bound.contains(x) {
                    out.free.insert(*x);
                }
            }
            MuCalc::And(l, r) | MuCalc::Or(l, r) => {
                walk(l, bound, out);
                walk(r, bound, out);
            }
            MuCalc::Diamond(_, e) | MuCalc::Box(_, e) => walk(e, bound, out),
            MuCalc::Mu(b, e) | MuCalc::Nu(b, e) => {
                bound.push(b.var);
                walk(e, bound, out);
                bound.pop();

                let fix_type = if matches!(f, MuCalc::Mu(..)) { FixType::Min } else { FixType::Max };
                out.binders.push((b.id, fix_type));
            }
        }
    }

    let mut out = Scoping::default();
    walk(formula, &mut Vec::new(), &mut out);
    out
}
