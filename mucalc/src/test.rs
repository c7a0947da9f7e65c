use itertools::iproduct;
use test_log::test;

use crate::{
    analyze, parse_aut, parse_mucalc, solve_emerson_lei, solve_emerson_lei_with, solve_naive,
    solve_naive_with, strip_comments, Analysis, Binder, BinderId, Bindings, EvalError, Label, Lts,
    MuCalc, StateId, SyntaxError, Var,
};

fn run_test(aut_path: &str, mucalc_path: &str, expected: bool) {
    let aut = std::fs::read_to_string(aut_path).unwrap();
    let lts = parse_aut(&aut).unwrap();

    let mucalc = std::fs::read_to_string(mucalc_path).unwrap();
    let mucalc = parse_mucalc(&strip_comments(&mucalc)).unwrap();
    let analysis = analyze(&mucalc);

    let naive = solve_naive(&mucalc, &lts).unwrap();
    let emerson_lei = solve_emerson_lei(&mucalc, &analysis, &lts).unwrap();

    assert_eq!(naive.states, emerson_lei.states, "{mucalc}");
    assert_eq!(emerson_lei.holds(&lts), expected, "{mucalc}: {}", emerson_lei.states);
}

macro_rules! declare_test {
        ($($aut:ident : [$($f:ident $(: $valid:literal)?),* $(,)?]),* $(,)?) => { $($(
            #[test]
            fn $f() {
                let tests = concat!(env!("CARGO_MANIFEST_DIR"), "/tests");
                let group = stringify!($aut);
                let test = stringify!($f);

                let aut = format!("{tests}/{group}/test.aut");
                let mucalc = format!("{tests}/{group}/{test}.mcf");

                run_test(&aut, &mucalc, true $(&& $valid)?);
            }
        )*)* };
    }

declare_test! {
    boolean: [
        false_constant: false,
        true_constant,
        and_false: false,
        or_true,
        nested_and_false: false,
        nested_or_true,
        right_nested_or,
        commented_and_of_ors,
        or_of_ands: false,
    ],
    modal_operators: [
        diamond_tau,
        box_tau_false: false,
        diamond_tau_diamond_a,
        box_tau_diamond_a: false,
        diamond_tau_box_b_false,
    ],
    fixpoints_only: [
        nu_identity,
        mu_identity: false,
        nu_mu_or,
        mu_nu_and: false,
        disjoint_fixpoints,
    ],
    combined: [
        infinite_a_path: false,
        reach_c,
        always_a_unless_b,
        infinitely_often_b_or_c,
        a_steps_to_c_loop: false,
    ],
}

fn var(c: char) -> MuCalc {
    MuCalc::Var(Var(c))
}

fn states(lts: &Lts, states: &[usize]) -> crate::StateSet {
    let mut set = lts.empty_set();
    for &s in states {
        set.insert(StateId(s));
    }
    set
}

fn cycle3() -> Lts {
    Lts::new(0, 3, [(0, "a", 1), (1, "a", 2), (2, "a", 0)]).unwrap()
}

// 0 -a-> 1 -a-> 2
fn line3() -> Lts {
    Lts::new(0, 3, [(0, "a", 1), (1, "a", 2)]).unwrap()
}

fn solve_both(formula: &str, lts: &Lts) -> crate::StateSet {
    let formula = parse_mucalc(formula).unwrap();
    let naive = solve_naive(&formula, lts).unwrap();
    let emerson_lei = solve_emerson_lei(&formula, &analyze(&formula), lts).unwrap();
    assert_eq!(naive.states, emerson_lei.states, "{formula}");
    emerson_lei.states
}

#[test]
fn parse_and_binds_leftmost_operator() {
    let parsed = parse_mucalc("(A && (B || C))").unwrap();
    let expected = MuCalc::And(
        Box::new(var('A')),
        Box::new(MuCalc::Or(Box::new(var('B')), Box::new(var('C')))),
    );
    assert_eq!(parsed, expected);

    let parsed = parse_mucalc("((A && B) && C)").unwrap();
    let expected = MuCalc::And(
        Box::new(MuCalc::And(Box::new(var('A')), Box::new(var('B')))),
        Box::new(var('C')),
    );
    assert_eq!(parsed, expected);
}

#[test]
fn parse_modalities_and_brackets() {
    let parsed = parse_mucalc("  <a_1>( [b]false ) ").unwrap();
    let expected = MuCalc::Diamond(
        Label("a_1".to_string()),
        Box::new(MuCalc::Box(Label("b".to_string()), Box::new(MuCalc::False))),
    );
    assert_eq!(parsed, expected);

    assert_eq!(parse_mucalc("((true))").unwrap(), MuCalc::True);
    assert_eq!(parse_mucalc("mu X. ( X )").unwrap(), parse_mucalc("mu X.X").unwrap());
}

#[test]
fn parse_assigns_binders_in_pre_order() {
    let parsed = parse_mucalc("nu X.(mu Y.Y && nu Z.Z)").unwrap();

    let x = Binder { id: BinderId(0), var: Var('X') };
    let y = Binder { id: BinderId(1), var: Var('Y') };
    let z = Binder { id: BinderId(2), var: Var('Z') };
    let expected = MuCalc::Nu(
        x,
        Box::new(MuCalc::And(
            Box::new(MuCalc::Mu(y, Box::new(var('Y')))),
            Box::new(MuCalc::Nu(z, Box::new(var('Z')))),
        )),
    );
    assert_eq!(parsed, expected);
}

#[test]
fn parse_errors() {
    for input in ["", "(true & false)", "mu x.true", "<A>true", "(true && false", "maybe"] {
        assert!(matches!(parse_mucalc(input), Err(SyntaxError::Unmatched(_))), "{input:?}");
    }
}

#[test]
fn shadowing_rejected() {
    let err = parse_mucalc("nu X.(<a>X && mu X.X)").unwrap_err();
    assert!(matches!(err, SyntaxError::ShadowedVariable { var: Var('X'), .. }), "{err}");
}

#[test]
fn sibling_binders_share_names() {
    let lts = cycle3();
    let formula = parse_mucalc("(mu X.<a>X || nu X.<a>X)").unwrap();

    let MuCalc::Or(l, r) = &formula else { panic!("{formula}") };
    let (Some((_, lb, _)), Some((_, rb, _))) = (l.as_fix(), r.as_fix()) else { panic!() };
    assert_eq!(lb.var, rb.var);
    assert_ne!(lb.id, rb.id);

    assert_eq!(solve_both("(mu X.<a>X || nu X.<a>X)", &lts), lts.full_set());
    assert_eq!(solve_both("(mu X.<a>X && nu X.<a>X)", &lts), lts.empty_set());
}

#[test]
fn strip_comment_lines() {
    let source = "% first\nnu X.\n  % second\n<a>X\n";
    assert_eq!(strip_comments(source), "nu X.\n<a>X");
    assert!(parse_mucalc(&strip_comments(source)).is_ok());
}

#[test]
fn constant_fixpoints() {
    let lts = cycle3();
    assert_eq!(solve_both("mu X.false", &lts), lts.empty_set());
    assert_eq!(solve_both("nu X.true", &lts), lts.full_set());
    assert_eq!(solve_both("mu X.true", &lts), lts.full_set());
    assert_eq!(solve_both("nu X.false", &lts), lts.empty_set());
}

#[test]
fn modalities_without_successors() {
    let lts = line3();
    assert_eq!(solve_both("[a]false", &lts), states(&lts, &[2]));
    assert_eq!(solve_both("<a>false", &lts), lts.empty_set());
    assert_eq!(solve_both("<b>true", &lts), lts.empty_set());
    assert_eq!(solve_both("[b]false", &lts), lts.full_set());
}

#[test]
fn cycle_has_infinite_path() {
    let lts = cycle3();
    assert_eq!(solve_both("nu X.<a>X", &lts), lts.full_set());
    assert_eq!(solve_both("mu X.<a>X", &lts), lts.empty_set());

    let lts = line3();
    assert_eq!(solve_both("nu X.<a>X", &lts), lts.empty_set());
    assert_eq!(solve_both("mu X.([a]false || <a>X)", &lts), lts.full_set());
}

#[test]
fn evaluators_agree() {
    let formulas = [
        "true",
        "(<a>true && [b]false)",
        "([a]<b>true || <b>[a]false)",
        "nu X.(<a>X && [b]X)",
        "mu X.(<b>true || <a>X)",
        "nu X.mu Y.((<b>X || <c>X) || <a>Y)",
        "mu X.nu Y.(<a>X || <c>Y)",
        "nu X.(<a>X && mu Y.(<b>true || <a>Y))",
        "mu X.(nu Y.(<a>Y && [c]X) || <b>X)",
        "nu X.mu Y.nu Z.((<a>X || <b>Y) || <c>Z)",
        "(mu X.[a]X && nu Y.(<a>Y || mu Z.(<c>true || [b]Z)))",
    ];
    let ltss = [
        cycle3(),
        line3(),
        Lts::new(0, 4, [(0, "a", 1), (1, "b", 2), (2, "a", 0), (2, "c", 2)]).unwrap(),
        Lts::new(0, 4, [(0, "a", 1), (1, "a", 0), (1, "b", 2), (2, "a", 3), (3, "c", 3)]).unwrap(),
        Lts::new(1, 2, [(0, "b", 0), (1, "c", 0)]).unwrap(),
    ];

    for (formula, lts) in iproduct!(formulas, &ltss) {
        solve_both(formula, lts);
    }
}

#[test]
fn emerson_lei_counts_resets() {
    let lts = line3();
    let formula = parse_mucalc("nu X.mu Y.(<a>X || Y)").unwrap();
    let analysis = analyze(&formula);

    let emerson_lei = solve_emerson_lei(&formula, &analysis, &lts).unwrap();
    assert_eq!(emerson_lei.states, lts.empty_set());
    assert_eq!(emerson_lei.counters.iterations, 10);
    assert_eq!(emerson_lei.counters.resets, 4);

    let naive = solve_naive(&formula, &lts).unwrap();
    assert_eq!(naive.states, lts.empty_set());
    assert_eq!(naive.counters.iterations, 10);
    assert_eq!(naive.counters.resets, 5);
}

#[test]
fn emerson_lei_counts_resets_with_free_variable() {
    let lts = line3();
    let formula = parse_mucalc("nu X.(mu Y.(<a>X || Z))").unwrap();
    let analysis = analyze(&formula);

    let mut free = Bindings::default();
    free.insert(Var('Z'), lts.empty_set());

    let emerson_lei = solve_emerson_lei_with(&formula, &analysis, &lts, &free).unwrap();
    assert_eq!(emerson_lei.states, lts.empty_set());
    assert_eq!(emerson_lei.counters.iterations, 10);
    assert_eq!(emerson_lei.counters.resets, 4);

    let naive = solve_naive_with(&formula, &lts, &free).unwrap();
    assert_eq!(naive.states, lts.empty_set());
    assert_eq!(naive.counters.resets, 5);
}

#[test]
fn emerson_lei_reuses_closed_fixpoints() {
    let lts = Lts::new(0, 4, [(0, "a", 1), (1, "a", 0), (1, "b", 2), (2, "a", 3)]).unwrap();
    let formula = parse_mucalc("nu X.(<a>X && mu Y.(<b>true || <a>Y))").unwrap();

    let naive = solve_naive(&formula, &lts).unwrap();
    let emerson_lei = solve_emerson_lei(&formula, &analyze(&formula), &lts).unwrap();

    assert_eq!(naive.states, states(&lts, &[0, 1]));
    assert_eq!(emerson_lei.states, naive.states);
    assert_eq!(naive.counters.iterations, 8);
    assert_eq!(emerson_lei.counters.iterations, 6);
    assert_eq!(emerson_lei.counters.resets, 0);
}

#[test]
fn analysis_flags() {
    let formula = parse_mucalc("nu X.mu Y.(<a>X || nu Z.(Y && mu W.W))").unwrap();
    let analysis = analyze(&formula);
    assert_eq!(analysis.len(), 4);

    let x = analysis.get(BinderId(0)).unwrap();
    let y = analysis.get(BinderId(1)).unwrap();
    let z = analysis.get(BinderId(2)).unwrap();
    let w = analysis.get(BinderId(3)).unwrap();

    assert!(!x.is_open);
    assert!(y.is_open);
    assert!(z.is_open);
    assert!(!w.is_open);

    // Z is the only open descendant of X with the same type.
    assert_eq!(x.open_subformulae, vec![BinderId(2)]);
    assert!(y.open_subformulae.is_empty());
    assert!(z.open_subformulae.is_empty());

    assert_eq!(analyze(&formula), analysis);
}

#[test]
fn unbound_variable() {
    let lts = cycle3();
    let formula = parse_mucalc("(<a>X || nu Y.Y)").unwrap();

    let err = solve_naive(&formula, &lts).unwrap_err();
    assert_eq!(err, EvalError::UnboundVariable(Var('X')));

    let err = solve_emerson_lei(&formula, &analyze(&formula), &lts).unwrap_err();
    assert_eq!(err, EvalError::UnboundVariable(Var('X')));
}

#[test]
fn free_variable_bindings() {
    let lts = line3();
    let formula = parse_mucalc("mu Y.(Z || <a>Y)").unwrap();

    let mut free = Bindings::default();
    free.insert(Var('Z'), states(&lts, &[2]));

    let naive = solve_naive_with(&formula, &lts, &free).unwrap();
    let emerson_lei = solve_emerson_lei_with(&formula, &analyze(&formula), &lts, &free).unwrap();
    assert_eq!(naive.states, lts.full_set());
    assert_eq!(emerson_lei.states, lts.full_set());
}

#[test]
fn missing_analysis() {
    let lts = cycle3();
    let formula = parse_mucalc("nu X.<a>X").unwrap();

    let err = solve_emerson_lei(&formula, &Analysis::default(), &lts).unwrap_err();
    assert_eq!(err, EvalError::NotAnalyzed(Var('X')));

    let other = analyze(&parse_mucalc("mu X.<a>X").unwrap());
    let err = solve_emerson_lei(&formula, &other, &lts).unwrap_err();
    assert_eq!(err, EvalError::NotAnalyzed(Var('X')));
}

#[test]
fn holds_in_first_state() {
    let lts = Lts::new(2, 3, [(0, "a", 1), (1, "a", 2)]).unwrap();
    let formula = parse_mucalc("[a]false").unwrap();

    let solution = solve_naive(&formula, &lts).unwrap();
    assert!(solution.holds(&lts));

    let formula = parse_mucalc("<a>true").unwrap();
    let solution = solve_naive(&formula, &lts).unwrap();
    assert!(!solution.holds(&lts));
}

#[test]
fn depths() {
    let cases = [
        ("(<a>true && [b]false)", 0, 0, 0),
        ("nu X.nu Y.(X && Y)", 2, 1, 1),
        ("nu X.mu Y.(<a>X || Y)", 2, 2, 2),
        ("nu X.(<a>X && mu Y.(<b>true || <a>Y))", 2, 2, 1),
        ("nu X.mu Y.nu Z.((<a>X || <b>Y) || <c>Z)", 3, 3, 3),
    ];

    for (formula, nesting, alternation, dependent) in cases {
        let formula = parse_mucalc(formula).unwrap();
        assert_eq!(formula.nesting_depth(), nesting, "{formula}");
        assert_eq!(formula.alternation_depth(), alternation, "{formula}");
        assert_eq!(formula.dependent_alternation_depth(), dependent, "{formula}");
    }
}

#[test]
fn display_parses_back() {
    let formulas = [
        "true",
        "(A && (B || C))",
        "nu X.(<a>X && mu Y.(<b>true || [a]Y))",
        "(mu X.[a]X && nu Y.(<a>Y || mu Z.(<c>false || [b]Z)))",
    ];

    for formula in formulas {
        let parsed = parse_mucalc(formula).unwrap();
        assert_eq!(parse_mucalc(&parsed.to_string()).unwrap(), parsed, "{formula}");
    }

    let parsed = parse_mucalc("nu X.(<a>X&&[b]true)").unwrap();
    assert_eq!(parsed.to_string(), "nu X.(<a>X && [b]true)");
}

#[test]
fn latex() {
    let formula = parse_mucalc("nu X.(<a>X && [b]true)").unwrap();
    assert_eq!(formula.to_latex(), "\\nu X.((\\langle a \\rangle X \\wedge [b] \\top))");

    let formula = parse_mucalc("mu Y.(false || Y)").unwrap();
    assert_eq!(formula.to_latex(), "\\mu Y.((\\bot \\vee Y))");
}
