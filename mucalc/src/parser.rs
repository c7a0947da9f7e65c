use crate::{Binder, BinderId, FixType, Label, MuCalc, Var};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("failed to parse input \"{0}\"")]
    Unmatched(String),
    #[error("variable {var} is already bound by an enclosing fixpoint in \"{input}\"")]
    ShadowedVariable { var: Var, input: String },
}

// <MuCalc> ::= `true' | `false' | <Var>
//            | `(' <MuCalc> `&&' <MuCalc> `)'
//            | `(' <MuCalc> `||' <MuCalc> `)'
//            | `<' <Label> `>' <MuCalc>
//            | `[' <Label> `]' <MuCalc>
//            | `mu' <Var> `.' <MuCalc>
//            | `nu' <Var> `.' <MuCalc>
//            | `(' <MuCalc> `)'
// <Var>   ::= [A-Z]
// <Label> ::= [a-z][a-z0-9_]*
//
// Binary operators only split bracketed input, at the leftmost operator outside of
// any round brackets. This is the only precedence rule.
pub fn parse_mucalc(source: &str) -> Result<MuCalc, SyntaxError> {
    FormulaParser { next_binder: 0, scope: Vec::new() }.parse(source)
}

/// Drops the `%` comment lines of a formula file.
pub fn strip_comments(source: &str) -> String {
    source
        .lines()
        .filter(|line| !line.trim_start().starts_with('%'))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Clone, Copy)]
enum Node {
    And,
    Or,
    Var,
    True,
    False,
    Diamond,
    Box,
    Nu,
    Mu,
}

const PRIORITY: [Node; 9] = [
    Node::And,
    Node::Or,
    Node::Var,
    Node::True,
    Node::False,
    Node::Diamond,
    Node::Box,
    Node::Nu,
    Node::Mu,
];

struct FormulaParser {
    next_binder: usize,
    // Variables bound by the enclosing fixpoints.
    scope: Vec<Var>,
}

impl FormulaParser {
    fn parse(&mut self, input: &str) -> Result<MuCalc, SyntaxError> {
        let input = input.trim();

        for node in PRIORITY {
            if let Some(result) = self.try_node(node, input) {
                return result;
            }
        }

        match input.strip_prefix('(').and_then(|inner| inner.strip_suffix(')')) {
            Some(inner) => self.parse(inner),
            None => Err(SyntaxError::Unmatched(input.to_string())),
        }
    }

    /// `None` if `input` doesn't have the shape of `node`, otherwise the result of
    /// parsing it as `node`.
    fn try_node(&mut self, node: Node, input: &str) -> Option<Result<MuCalc, SyntaxError>> {
        match node {
            Node::And => self.binary(input, "&&", MuCalc::And),
            Node::Or => self.binary(input, "||", MuCalc::Or),
            Node::Var => single_var(input).map(|v| Ok(MuCalc::Var(v))),
            Node::True => (input == "true").then_some(Ok(MuCalc::True)),
            Node::False => (input == "false").then_some(Ok(MuCalc::False)),
            Node::Diamond => self.modal(input, ('<', '>'), MuCalc::Diamond),
            Node::Box => self.modal(input, ('[', ']'), MuCalc::Box),
            Node::Nu => self.fix(input, FixType::Max),
            Node::Mu => self.fix(input, FixType::Min),
        }
    }

    fn binary(
        &mut self,
        input: &str,
        op: &str,
        make: fn(Box<MuCalc>, Box<MuCalc>) -> MuCalc,
    ) -> Option<Result<MuCalc, SyntaxError>> {
        let inner = input.strip_prefix('(')?.strip_suffix(')')?;
        let at = root_operator_index(inner, op.chars().next()?)?;

        // Past this point the input is committed to this operator.
        let Some(rhs) = inner[at..].strip_prefix(op) else {
            return Some(Err(SyntaxError::Unmatched(input.to_string())));
        };
        let lhs = &inner[..at];

        Some(self.binary_operands(lhs, rhs, make))
    }

    fn binary_operands(
        &mut self,
        lhs: &str,
        rhs: &str,
        make: fn(Box<MuCalc>, Box<MuCalc>) -> MuCalc,
    ) -> Result<MuCalc, SyntaxError> {
        let lhs = self.parse(lhs)?;
        let rhs = self.parse(rhs)?;
        Ok(make(Box::new(lhs), Box::new(rhs)))
    }

    fn modal(
        &mut self,
        input: &str,
        (open, close): (char, char),
        make: fn(Label, Box<MuCalc>) -> MuCalc,
    ) -> Option<Result<MuCalc, SyntaxError>> {
        let rest = input.strip_prefix(open)?;
        let (label, sub) = rest.split_once(close)?;
        if !is_label(label) {
            return None;
        }

        Some(self.parse(sub).map(|sub| make(Label(label.to_string()), Box::new(sub))))
    }

    fn fix(&mut self, input: &str, fix_type: FixType) -> Option<Result<MuCalc, SyntaxError>> {
        let keyword = match fix_type {
            FixType::Min => "mu",
            FixType::Max => "nu",
        };

        // The positions are fixed: one separator, the variable, then the dot.
        let mut chars = input.strip_prefix(keyword)?.chars();
        let (sep, var, dot) = (chars.next()?, chars.next()?, chars.next()?);
        if !sep.is_whitespace() || !var.is_ascii_uppercase() || dot != '.' {
            return None;
        }
        let var = Var(var);
        let body = chars.as_str();

        if self.scope.contains(&var) {
            return Some(Err(SyntaxError::ShadowedVariable { var, input: input.to_string() }));
        }

        let binder = Binder { id: BinderId(self.next_binder), var };
        self.next_binder += 1;

        self.scope.push(var);
        let body = self.parse(body);
        self.scope.pop();

        Some(body.map(|body| match fix_type {
            FixType::Min => MuCalc::Mu(binder, Box::new(body)),
            FixType::Max => MuCalc::Nu(binder, Box::new(body)),
        }))
    }
}

/// Index of the first `op` not enclosed in round brackets.
/// Modality brackets `<>` and `[]` are not counted.
fn root_operator_index(input: &str, op: char) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c == op && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn single_var(input: &str) -> Option<Var> {
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_uppercase() => Some(Var(c)),
        _ => None,
    }
}

fn is_label(label: &str) -> bool {
    let mut chars = label.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
