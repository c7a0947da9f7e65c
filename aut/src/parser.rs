use chumsky::error::Simple;
use chumsky::primitive::{end, just, none_of};
use chumsky::text::{self, TextParser};
use chumsky::Parser;

use crate::{Lts, LtsError};

// aut_header        ::=  ['des'] '(' first_state ',' nr_of_transitions ',' nr_of_states ')'
// first_state       ::=  number
// nr_of_transitions ::=  number
// nr_of_states      ::=  number
// aut_edge    ::=  '(' start_state ',' label ',' end_state ')'
// start_state ::=  number
// label       ::=  '"' string '"'
// end_state   ::=  number
pub fn parse_aut(source: &str) -> Result<Lts, LtsError> {
    let number = text::int::<char, Simple<char>>(10)
        .try_map(|n: String, span| n.parse::<usize>().map_err(|e| Simple::custom(span, e)))
        .padded();
    let comma = just(',').padded();
    let label = none_of('"').repeated().collect::<String>().delimited_by(just('"'), just('"'));

    let counts =
        number.clone().then_ignore(comma.clone()).then(number.clone()).then_ignore(comma.clone());
    let counts = counts.then(number.clone());
    let header = just("des").padded().or_not().ignore_then(counts.delimited_by(just('('), just(')')));

    let edge = number.clone().then_ignore(comma.clone()).then(label.padded()).then_ignore(comma);
    let edge = edge.then(number).delimited_by(just('('), just(')'));
    let edges = edge.map(|((start, label), end)| (start, label, end)).padded().repeated();

    let parser = header.padded().then(edges).then_ignore(end());

    let (((first_state, declared), state_count), edges) =
        parser.parse(source).map_err(|errors| syntax_error(source, errors))?;

    if edges.len() != declared {
        return Err(LtsError::TransitionCountMismatch { declared, actual: edges.len() });
    }

    Lts::new(first_state, state_count, edges)
}

fn syntax_error(source: &str, errors: Vec<Simple<char>>) -> LtsError {
    let Some(error) = errors.into_iter().next() else {
        return LtsError::Syntax { line: 1, text: String::new(), message: "invalid input".into() };
    };

    // Spans count chars, not bytes.
    let offset = error.span().start;
    let line = source.chars().take(offset).filter(|&c| c == '\n').count();
    let text = source.lines().nth(line).unwrap_or_default().trim().to_string();

    LtsError::Syntax { line: line + 1, text, message: error.to_string() }
}
