//! End-to-end tests: parse, check, generate.

use std::time::Duration;

use num_bigint::BigUint;

use taut_rs::ast::{Formula, NodeKind};
use taut_rs::config::TimeBudget;
use taut_rs::eval::{Assignment, EvalError, Evaluator, TimeoutCause, Verdict};
use taut_rs::generator::{FormulaGenerator, GeneratorConfig};
use taut_rs::instance::{parse_instances, write_instances, InstanceKind};
use taut_rs::parser::{parse, SyntaxError};
use taut_rs::truth_table::{generate_truth_table, row_count};

// ─── Parsing ───────────────────────────────────────────────────────────────────

#[test]
fn variables_in_discovery_order() {
    assert_eq!(parse("(a ∧ b)").unwrap().collect_variables(), vec!['a', 'b']);
    assert_eq!(parse("(b ∧ a)").unwrap().collect_variables(), vec!['b', 'a']);
    assert_eq!(parse("c → (a ∨ c) ∧ b").unwrap().collect_variables(), vec!['c', 'a', 'b']);
}

#[test]
fn implication_is_left_associative() {
    let f = parse("a → b → c").unwrap();
    assert_eq!(f.kind(), NodeKind::Implies);
    let left = f.left().unwrap();
    assert_eq!(left.kind(), NodeKind::Implies);
    assert_eq!(left.left().unwrap().name(), Some('a'));
    assert_eq!(left.right().unwrap().name(), Some('b'));
    assert_eq!(f.right().unwrap().name(), Some('c'));
}

#[test]
fn deep_negation_text_is_checked() {
    // Even number of negations: equivalent to `p`.
    let f = parse(&format!("{}p", "¬".repeat(100_000))).unwrap();
    let mut evaluator = Evaluator::new();
    assert!(!evaluator.is_tautology(&f, &['p']).unwrap());
    assert_eq!(evaluator.metrics().evaluations, 1);

    let g = parse(&format!("{}(p ∨ ¬p)", "¬".repeat(100_000))).unwrap();
    assert!(evaluator.is_tautology(&g, &['p']).unwrap());
    assert_ne!(f, g);
}

#[test]
fn syntax_errors() {
    assert!(matches!(parse("(a ∧"), Err(SyntaxError::UnexpectedToken { .. })));
    assert!(matches!(parse("a b"), Err(SyntaxError::TrailingInput { .. })));
    assert!(matches!(parse("(a ∧ b"), Err(SyntaxError::UnclosedParen { .. })));
}

// ─── Evaluation ────────────────────────────────────────────────────────────────

#[test]
fn evaluation_matches_truth_table_by_hand() {
    // Rows in order 00, 01, 10, 11 for (a, b).
    let cases = [
        ("a ∧ b", [false, false, false, true]),
        ("a ∨ b", [false, true, true, true]),
        ("a → b", [true, true, false, true]),
        ("¬a ∨ b", [true, true, false, true]),
        ("¬(a ∧ b) → ¬a", [true, true, false, true]),
    ];
    let mut evaluator = Evaluator::new();
    for (text, expected) in cases {
        let f = parse(text).unwrap();
        for (row, want) in generate_truth_table(2).iter().zip(expected) {
            let assignment = Assignment::from_row(&['a', 'b'], row);
            assert_eq!(evaluator.evaluate(&f, &assignment).unwrap(), want, "{} at {:?}", text, row);
        }
    }
}

#[test]
fn excluded_middle_is_tautology() {
    let f = parse("¬(a ∧ ¬a)").unwrap();
    let mut evaluator = Evaluator::new();
    for value in [false, true] {
        let assignment: Assignment = [('a', value)].into_iter().collect();
        assert!(evaluator.evaluate(&f, &assignment).unwrap());
    }
    assert!(evaluator.is_tautology(&f, &['a']).unwrap());
}

#[test]
fn contradiction_fails_on_first_row() {
    let f = parse("(a ∧ ¬a)").unwrap();
    let mut evaluator = Evaluator::new();
    assert!(!evaluator.is_tautology(&f, &['a']).unwrap());
    assert_eq!(evaluator.metrics().evaluations, 1);
}

#[test]
fn short_circuit_follows_row_order() {
    // b is the low bit: the first row with a=1, b=0 is row 2.
    let f = parse("a → b").unwrap();
    let mut evaluator = Evaluator::new();
    assert!(!evaluator.is_tautology(&f, &['a', 'b']).unwrap());
    assert_eq!(evaluator.metrics().evaluations, 3);

    // Swapping the variable order changes which row fails first.
    assert!(!evaluator.is_tautology(&f, &['b', 'a']).unwrap());
    assert_eq!(evaluator.metrics().evaluations, 2);
}

#[test]
fn classic_tautologies() {
    let mut evaluator = Evaluator::new();
    for text in [
        "a ∨ ¬a",
        "(p → q) ∧ p → q",
        "(p → q) ∧ ¬q → ¬p",
        "((p → q) → p) → p",
        "¬(p ∧ q) → ¬p ∨ ¬q",
        "(p → q) ∧ (q → r) → (p → r)",
    ] {
        let f = parse(text).unwrap();
        let vars = f.collect_variables();
        assert!(evaluator.is_tautology(&f, &vars).unwrap(), "{}", text);
        assert_eq!(evaluator.metrics().evaluations, 1 << vars.len());
    }
}

#[test]
fn verdicts_and_model_counts() {
    let mut evaluator = Evaluator::new();
    let f = parse("a ∨ b").unwrap();
    let vars = f.collect_variables();
    assert_eq!(evaluator.classify(&f, &vars).unwrap(), Verdict::Contingent);
    assert_eq!(evaluator.count_models(&f, &vars).unwrap(), BigUint::from(3u32));

    let f = parse("a ∧ ¬a").unwrap();
    assert_eq!(evaluator.classify(&f, &['a']).unwrap(), Verdict::Contradiction);
    assert!(evaluator.is_contradiction(&f, &['a']).unwrap());
}

#[test]
fn deep_formula_evaluates_and_drops() {
    let mut f = Formula::var('p');
    for _ in 0..100_000 {
        f = Formula::not(f);
    }
    let mut evaluator = Evaluator::new();
    assert_eq!(evaluator.classify(&f, &['p']).unwrap(), Verdict::Contingent);
    drop(f);
}

// ─── Timeouts ──────────────────────────────────────────────────────────────────

#[test]
fn timeout_is_never_a_verdict() {
    let text = "a ∨ b ∨ c ∨ d ∨ e ∨ f ∨ g ∨ h ∨ i ∨ j ∨ k ∨ l ∨ m ∨ n ∨ o \
                ∨ p ∨ q ∨ r ∨ s ∨ t ∨ u ∨ v ∨ w ∨ x ∨ y ∨ z ∨ ¬z";
    let f = parse(text).unwrap();
    let vars = f.collect_variables();
    assert_eq!(row_count(vars.len()), BigUint::from(1u64 << 26));

    let limit = TimeBudget::from_secs(30).with_budget(Duration::from_millis(20));
    let mut evaluator = Evaluator::new();
    match evaluator.is_tautology_with_timeout(&f, &vars, &limit) {
        Err(EvalError::Timeout { elapsed, cause }) => {
            assert_eq!(cause, TimeoutCause::Budget);
            assert!(elapsed >= Duration::from_millis(20));
        }
        other => panic!("expected timeout, got {:?}", other),
    }
    assert!(evaluator.metrics().evaluations < 1 << 26);
}

#[test]
fn watchdog_cancels_long_check() {
    let text = "a ∨ b ∨ c ∨ d ∨ e ∨ f ∨ g ∨ h ∨ i ∨ j ∨ k ∨ l ∨ m ∨ n ∨ o \
                ∨ p ∨ q ∨ r ∨ s ∨ t ∨ u ∨ v ∨ w ∨ x ∨ y ∨ z ∨ ¬z";
    let f = parse(text).unwrap();
    let vars = f.collect_variables();

    // Generous per-row budget, one-second hard deadline.
    let limit = TimeBudget::from_secs(1).with_budget(Duration::from_secs(3600));
    let res = Evaluator::new().is_tautology_with_timeout(&f, &vars, &limit);
    match res {
        Err(EvalError::Timeout { cause, .. }) => assert_eq!(cause, TimeoutCause::Deadline),
        other => panic!("expected timeout, got {:?}", other),
    }
}

// ─── Generated instances ───────────────────────────────────────────────────────

#[test]
fn generated_instances_match_their_labels() {
    let config = GeneratorConfig::new(1, 5, 4).unwrap();
    let mut generator = FormulaGenerator::new(config, 2024);
    let instances = generator.instances(20);

    let mut buf = Vec::new();
    write_instances(&mut buf, &instances, &[]).unwrap();
    let parsed = parse_instances(&String::from_utf8(buf).unwrap()).unwrap();
    assert_eq!(parsed, instances);

    let mut evaluator = Evaluator::new();
    for instance in &parsed {
        let f = instance.parse_formula().unwrap();
        let mut vars = f.collect_variables();
        vars.sort_unstable();
        assert_eq!(vars.len(), instance.num_vars);

        let verdict = evaluator.classify(&f, &vars).unwrap();
        match instance.kind {
            InstanceKind::Tautology => assert_eq!(verdict, Verdict::Tautology),
            InstanceKind::Contradiction => assert_eq!(verdict, Verdict::Contradiction),
            InstanceKind::Random => {}
        }
        assert!(instance.kind.is_consistent(verdict == Verdict::Tautology));
    }
}
