use crate::{FixType, MuCalc, Set, Var};

impl MuCalc {
    /// Maximum number of nested fixpoints.
    pub fn nesting_depth(&self) -> usize {
        match self {
            MuCalc::True | MuCalc::False | MuCalc::Var(_) => 0,
            MuCalc::And(l, r) | MuCalc::Or(l, r) => l.nesting_depth().max(r.nesting_depth()),
            MuCalc::Diamond(_, e) | MuCalc::Box(_, e) => e.nesting_depth(),
            MuCalc::Mu(_, e) | MuCalc::Nu(_, e) => 1 + e.nesting_depth(),
        }
    }

    /// Length of the longest chain of nested fixpoints with alternating types.
    pub fn alternation_depth(&self) -> usize {
        match self {
            MuCalc::True | MuCalc::False | MuCalc::Var(_) => 0,
            MuCalc::And(l, r) | MuCalc::Or(l, r) => {
                l.alternation_depth().max(r.alternation_depth())
            }
            MuCalc::Diamond(_, e) | MuCalc::Box(_, e) => e.alternation_depth(),
            MuCalc::Mu(_, e) => 1 + e.max_alternation_depth(FixType::Max),
            MuCalc::Nu(_, e) => 1 + e.max_alternation_depth(FixType::Min),
        }
    }

    /// Like [`MuCalc::alternation_depth`], but an alternation only counts when the
    /// inner fixpoint references the variable of the outer one.
    pub fn dependent_alternation_depth(&self) -> usize {
        match self {
            MuCalc::True | MuCalc::False | MuCalc::Var(_) => 0,
            MuCalc::And(l, r) | MuCalc::Or(l, r) => {
                l.dependent_alternation_depth().max(r.dependent_alternation_depth())
            }
            MuCalc::Diamond(_, e) | MuCalc::Box(_, e) => e.dependent_alternation_depth(),
            MuCalc::Mu(b, e) => e.dependent_alternation_depth_under(FixType::Max, b.var),
            MuCalc::Nu(b, e) => e.dependent_alternation_depth_under(FixType::Min, b.var),
        }
    }

    fn max_alternation_depth(&self, inner: FixType) -> usize {
        self.fixpoints(inner).iter().map(|g| g.alternation_depth()).max().unwrap_or(0)
    }

    // `self` is the body of a fixpoint binding `var`, `inner` the opposite fixpoint type.
    fn dependent_alternation_depth_under(&self, inner: FixType, var: Var) -> usize {
        let dependent = self
            .fixpoints(inner)
            .into_iter()
            .filter(|g| g.referenced_vars().contains(&var))
            .map(|g| g.alternation_depth())
            .max()
            .unwrap_or(0);
        self.dependent_alternation_depth().max(1 + dependent)
    }

    // Every fixpoint of the given type in this formula, including itself.
    fn fixpoints(&self, fix_type: FixType) -> Vec<&MuCalc> {
        let mut out = Vec::new();
        self.collect_fixpoints(fix_type, &mut out);
        out
    }

    fn collect_fixpoints<'a>(&'a self, fix_type: FixType, out: &mut Vec<&'a MuCalc>) {
        match self {
            MuCalc::True | MuCalc::False | MuCalc::Var(_) => {}
            MuCalc::And(l, r) | MuCalc::Or(l, r) => {
                l.collect_fixpoints(fix_type, out);
                r.collect_fixpoints(fix_type, out);
            }
            MuCalc::Diamond(_, e) | MuCalc::Box(_, e) => e.collect_fixpoints(fix_type, out),
            MuCalc::Mu(_, e) | MuCalc::Nu(_, e) => {
                e.collect_fixpoints(fix_type, out);
                if self.as_fix().is_some_and(|(t, _, _)| t == fix_type) {
                    out.push(self);
                }
            }
        }
    }

    // Every variable occurring in this formula, bound or not.
    fn referenced_vars(&self) -> Set<Var> {
        let mut vars = Set::default();
        let mut stack = vec![self];
        while let Some(f) = stack.pop() {
            match f {
                MuCalc::True | MuCalc::False => {}
                MuCalc::Var(x) => {
                    vars.insert(*x);
                }
                MuCalc::And(l, r) | MuCalc::Or(l, r) => stack.extend([&**l, &**r]),
                MuCalc::Diamond(_, e) | MuCalc::Box(_, e) => stack.push(e),
                MuCalc::Mu(_, e) | MuCalc::Nu(_, e) => stack.push(e),
            }
        }
        vars
    }
}
