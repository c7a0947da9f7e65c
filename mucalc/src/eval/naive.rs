use std::time::Instant;

use aut::{Lts, StateSet};
use log::{debug, trace};

use super::{boxx, diamond, Bindings, Counters, EvalError, Solution};
use crate::{Binder, FixType, Map, MuCalc, Var};

/// Evaluates a closed formula, restarting every fixpoint from scratch each time
/// it is reached.
pub fn solve_naive(formula: &MuCalc, lts: &Lts) -> Result<Solution, EvalError> {
    solve_naive_with(formula, lts, &Bindings::default())
}

/// Like [`solve_naive`], with values for the free variables of `formula`.
pub fn solve_naive_with(
    formula: &MuCalc,
    lts: &Lts,
    free: &Bindings,
) -> Result<Solution, EvalError> {
    let now = Instant::now();

    let mut ctx = NaiveContext { lts, env: free.clone(), counters: Counters::default() };
    let states = ctx.eval(formula)?;

    let mut counters = ctx.counters;
    counters.duration = now.elapsed();
    debug!("Naive evaluation done: {counters}, {} states", states.len());

    Ok(Solution { states, counters })
}

struct NaiveContext<'a> {
    lts: &'a Lts,
    env: Map<Var, StateSet>,
    counters: Counters,
}

impl NaiveContext<'_> {
    fn eval(&mut self, f: &MuCalc) -> Result<StateSet, EvalError> {
        match f {
            MuCalc::True => Ok(self.lts.full_set()),
            MuCalc::False => Ok(self.lts.empty_set()),
            MuCalc::Var(x) => self.env.get(x).cloned().ok_or(EvalError::UnboundVariable(*x)),
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

    fn eval_fix(
        &mut self,
        fix_type: FixType,
        binder: &Binder,
        body: &MuCalc,
    ) -> Result<StateSet, EvalError> {
        let mut current = fix_type.neutral(self.lts);
        let outer = self.env.insert(binder.var, current.clone());
        self.counters.resets += 1;

        trace!("{}0 = {current}", binder.var);

        for i in 1.. {
            let next = self.eval(body)?;
            self.counters.iterations += 1;
            trace!("{}{i} = {next}", binder.var);

            if next == current {
                break;
            }
            current = next;
            self.env.insert(binder.var, current.clone());
        }

        // Leave the variable as it was outside of this fixpoint.
        match outer {
            Some(outer) => self.env.insert(binder.var, outer),
            None => self.env.remove(&binder.var),
        };

        Ok(current)
    }
}
