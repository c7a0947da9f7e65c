use std::time::Instant;

use aut::{Lts, StateSet};
use log::{debug, trace};

use super::{boxx, diamond, Bindings, Counters, EvalError, Solution};
use crate::analysis::{scoping, Analysis};
use crate::{Binder, BinderId, FixType, Map, MuCalc, Var};

/// Evaluates a closed formula with the Emerson-Lei algorithm.
///
/// Fixpoint approximations are kept for the whole evaluation and reused when a
/// fixpoint is reached again, except for those made stale by a change of an
/// enclosing fixpoint of the opposite type. Those are found through `analysis`,
/// which must come from [`crate::analyze`] on this same formula.
pub fn solve_emerson_lei(
    formula: &MuCalc,
    analysis: &Analysis,
    lts: &Lts,
) -> Result<Solution, EvalError> {
    solve_emerson_lei_with(formula, analysis, lts, &Bindings::default())
}

/// Like [`solve_emerson_lei`], with values for the free variables of `formula`.
pub fn solve_emerson_lei_with(
    formula: &MuCalc,
    analysis: &Analysis,
    lts: &Lts,
    free: &Bindings,
) -> Result<Solution, EvalError> {
    let now = Instant::now();

    let scoping = scoping(formula);
    if let Some(&x) = scoping.free.iter().find(|&&x| !free.contains_key(&x)) {
        return Err(EvalError::UnboundVariable(x));
    }

    // Every fixpoint starts from its neutral value, once.
    let mut env = Map::default();
    for &(id, fix_type) in &scoping.binders {
        env.insert(id, fix_type.neutral(lts));
    }

    let mut ctx = EmersonLeiContext {
        lts,
        analysis,
        free,
        env,
        binder_stack: Vec::new(),
        counters: Counters::default(),
    };
    let states = ctx.eval(formula)?;

    let mut counters = ctx.counters;
    counters.duration = now.elapsed();
    debug!("Emerson-Lei evaluation done: {counters}, {} states", states.len());

    Ok(Solution { states, counters })
}

struct EmersonLeiContext<'a> {
    lts: &'a Lts,
    analysis: &'a Analysis,
    free: &'a Bindings,

    // Current approximation of every fixpoint.
    env: Map<BinderId, StateSet>,
    // Fixpoints being evaluated, innermost last.
    binder_stack: Vec<(Binder, FixType)>,

    counters: Counters,
}

impl EmersonLeiContext<'_> {
    fn eval(&mut self, f: &MuCalc) -> Result<StateSet, EvalError> {
        match f {
            MuCalc::True => Ok(self.lts.full_set()),
            MuCalc::False => Ok(self.lts.empty_set()),
            MuCalc::Var(x) => self.lookup(*x),
            MuCalc::And(l, r) => {
                let mut states = self.eval(l)?;
                states.intersect_with(&self.eval(r)?);
                Ok(states)
            }
            MuCalc::Or(l, r) => {
                let mut states = self.eval(l)?;
                states.union_with(&self.eval(r)?);
                Ok(states)
            }
            MuCalc::Diamond(a, e) => Ok(diamond(self.lts, a, &self.eval(e)?)),
            MuCalc::Box(a, e) => Ok(boxx(self.lts, a, &self.eval(e)?)),
            MuCalc::Mu(b, e) => self.eval_fix(FixType::Min, b, e),
            MuCalc::Nu(b, e) => self.eval_fix(FixType::Max, b, e),
        }
    }

    // The innermost enclosing fixpoint on `x` wins, then the caller's bindings.
    fn lookup(&self, x: Var) -> Result<StateSet, EvalError> {
        let bound = self.binder_stack.iter().rev().find(|(b, _)| b.var == x);
        let states = match bound {
            Some((b, _)) => self.env.get(&b.id),
            None => self.free.get(&x),
        };
        states.cloned().ok_or(EvalError::UnboundVariable(x))
    }

    fn eval_fix(
        &mut self,
        fix_type: FixType,
        binder: &Binder,
        body: &MuCalc,
    ) -> Result<StateSet, EvalError> {
        let analysis = self.analysis;
        let info = analysis
            .get(binder.id)
            .filter(|info| info.var == binder.var && info.fix_type == fix_type)
            .ok_or(EvalError::NotAnalyzed(binder.var))?;

        // Entering from a fixpoint of the opposite type means its variable changed
        // since the last visit, so everything of our type depending on it is stale.
        if self.binder_stack.last().is_some_and(|&(_, outer)| outer != fix_type) {
            let own = info.is_open.then_some(binder.id);
            let stale = own.into_iter().chain(info.open_subformulae.iter().copied());

            let mut resets = 0;
            for id in stale {
                self.env.insert(id, fix_type.neutral(self.lts));
                resets += 1;
            }
            self.counters.resets += resets;

            if resets > 0 {
                debug!("Entering {}: reset {resets} stale fixpoints", binder.var);
            }
        }

        self.binder_stack.push((*binder, fix_type));

        let mut current =
            self.env.get(&binder.id).cloned().ok_or(EvalError::NotAnalyzed(binder.var))?;
        trace!("{}0 = {current}", binder.var);

        for i in 1.. {
            let next = self.eval(body)?;
            self.counters.iterations += 1;
            trace!("{}{i} = {next}", binder.var);

            if next == current {
                break;
            }
            current = next;
            self.env.insert(binder.id, current.clone());
        }

        self.binder_stack.pop();

        Ok(current)
    }
}
