use std::fmt;

use crate::{Label, MuCalc, Var};

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Prints the formula in the syntax accepted by [`crate::parse_mucalc`].
impl fmt::Display for MuCalc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MuCalc::True => write!(f, "true"),
            MuCalc::False => write!(f, "false"),
            MuCalc::Var(x) => write!(f, "{x}"),
            MuCalc::And(l, r) => write!(f, "({l} && {r})"),
            MuCalc::Or(l, r) => write!(f, "({l} || {r})"),
            MuCalc::Diamond(a, e) => write!(f, "<{a}>{e}"),
            MuCalc::Box(a, e) => write!(f, "[{a}]{e}"),
            MuCalc::Mu(b, e) => write!(f, "mu {}.{e}", b.var),
            MuCalc::Nu(b, e) => write!(f, "nu {}.{e}", b.var),
        }
    }
}

impl MuCalc {
    pub fn to_latex(&self) -> String {
        let mut out = String::new();
        self.write_latex(&mut out);
        out
    }

    fn write_latex(&self, out: &mut String) {
        let binary = |out: &mut String, l: &MuCalc, op: &str, r: &MuCalc| {
            out.push('(');
            l.write_latex(out);
            out.push_str(op);
            r.write_latex(out);
            out.push(')');
        };

        match self {
            MuCalc::True => out.push_str("\\top"),
            MuCalc::False => out.push_str("\\bot"),
            MuCalc::Var(x) => out.push(x.0),
            MuCalc::And(l, r) => binary(out, l, " \\wedge ", r),
            MuCalc::Or(l, r) => binary(out, l, " \\vee ", r),
            MuCalc::Diamond(a, e) => {
                out.push_str(&format!("\\langle {a} \\rangle "));
                e.write_latex(out);
            }
            MuCalc::Box(a, e) => {
                out.push_str(&format!("[{a}] "));
                e.write_latex(out);
            }
            MuCalc::Mu(b, e) | MuCalc::Nu(b, e) => {
                let symbol = if matches!(self, MuCalc::Mu(..)) { "\\mu" } else { "\\nu" };
                out.push_str(&format!("{symbol} {}.(", b.var));
                e.write_latex(out);
                out.push(')');
            }
        }
    }
}
