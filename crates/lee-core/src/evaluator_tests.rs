//! Tests for compiling and evaluating expressions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::*;

type Flags = HashMap<String, bool>;
type CallLog = Arc<Mutex<Vec<String>>>;

/// Compiles `input` so that every condition looks its own name up in the
/// model and records the lookup in `log`.
fn compile_recording(input: &str, log: &CallLog) -> CompiledExpression<Flags> {
    parse(input)
        .unwrap()
        .compile(|condition| -> Result<Predicate<Flags>, ExprError> {
            let name = condition.name().to_string();
            let log = Arc::clone(log);
            Ok(Box::new(move |flags: &Flags| {
                log.lock().unwrap().push(name.clone());
                flags.get(&name).copied().unwrap_or(false)
            }))
        })
        .unwrap()
}

fn flags(pairs: &[(&str, bool)]) -> Flags {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[derive(Debug, Clone)]
struct Aircraft {
    callsign: String,
    altitude: f64,
    groundspeed: f64,
}

fn aircraft(callsign: &str, altitude: f64, groundspeed: f64) -> Aircraft {
    Aircraft {
        callsign: callsign.to_string(),
        altitude,
        groundspeed,
    }
}

fn compile_aircraft(condition: &Condition) -> ExprResult<Predicate<Aircraft>> {
    match condition.name() {
        "callsign" => {
            let expected = condition.value().unquoted()?;
            match condition.op() {
                CompareOp::Equals => Ok(Box::new(move |a: &Aircraft| a.callsign == expected)),
                CompareOp::NotEquals => Ok(Box::new(move |a: &Aircraft| a.callsign != expected)),
                op => Err(ExprError::condition(
                    condition,
                    format!("operator {op} is not supported for callsign"),
                )),
            }
        }
        "altitude" | "groundspeed" => {
            let limit = condition.value().as_number()?;
            let field: fn(&Aircraft) -> f64 = if condition.name() == "altitude" {
                |a| a.altitude
            } else {
                |a| a.groundspeed
            };
            let op = condition.op();
            Ok(Box::new(move |a: &Aircraft| {
                let v = field(a);
                match op {
                    CompareOp::Equals => v == limit,
                    CompareOp::NotEquals => v != limit,
                    CompareOp::Less => v < limit,
                    CompareOp::LessOrEqual => v <= limit,
                    CompareOp::Greater => v > limit,
                    CompareOp::GreaterOrEqual => v >= limit,
                    CompareOp::Matches | CompareOp::NotMatches => false,
                }
            }))
        }
        _ => Err(ExprError::condition(condition, "unknown field")),
    }
}

// ==================== Compile Tests ====================

#[test]
fn test_compile_visits_conditions_depth_first() {
    let mut seen = Vec::new();
    parse("a = 1 or (b = 2 and (c = 3)) and d = 4")
        .unwrap()
        .compile(|condition| -> Result<Predicate<Flags>, ExprError> {
            seen.push(condition.name().to_string());
            Ok(Box::new(|_: &Flags| true))
        })
        .unwrap();
    assert_eq!(seen, vec!["a", "b", "c", "d"]);
}

#[test]
fn test_compile_returns_callback_error_untouched() {
    #[derive(Debug, PartialEq)]
    struct UnknownField(String);

    let mut visited = 0;
    let result = parse("a = 1 and nope = 2 and c = 3")
        .unwrap()
        .compile(|condition| -> Result<Predicate<Flags>, UnknownField> {
            visited += 1;
            if condition.name() == "nope" {
                return Err(UnknownField(condition.name().to_string()));
            }
            Ok(Box::new(|_: &Flags| true))
        });

    assert_eq!(result.unwrap_err(), UnknownField("nope".to_string()));
    assert_eq!(visited, 2, "compilation must stop at the first failure");
}

#[test]
fn test_compile_condition_error_points_at_identifier() {
    let err = parse("altitude > 1000 and\n  squawk = 7700")
        .unwrap()
        .compile(compile_aircraft)
        .unwrap_err();
    assert_eq!(
        err,
        ExprError::Condition {
            message: "unknown field".to_string(),
            literal: "squawk".to_string(),
            kind: TokenKind::Identifier,
            line: 2,
            column: 3,
        }
    );
    assert_eq!(
        err.to_string(),
        "unknown field: squawk (Identifier) at line 2 pos 3"
    );
}

#[test]
fn test_compile_wrong_literal_kind_is_error() {
    let err = parse("altitude > \"high\"")
        .unwrap()
        .compile(compile_aircraft)
        .unwrap_err();
    assert_eq!(
        err,
        ExprError::WrongValueKind {
            expected: ValueKind::Number,
            found: ValueKind::String,
        }
    );
}

#[test]
fn test_compile_unsupported_operator() {
    let err = parse("callsign =~ \"DLH.*\"")
        .unwrap()
        .compile(compile_aircraft)
        .unwrap_err();
    assert!(matches!(
        err,
        ExprError::Condition { ref message, .. } if message == "operator =~ is not supported for callsign"
    ));
}

#[test]
fn test_compile_same_expression_for_two_models() {
    let expr = parse("len > 3").unwrap();
    let for_strings = expr
        .compile(|c| -> Result<Predicate<String>, ExprError> {
            let n = c.value().as_number()? as usize;
            Ok(Box::new(move |s: &String| s.len() > n))
        })
        .unwrap();
    let for_vecs = expr
        .compile(|c| -> Result<Predicate<Vec<u8>>, ExprError> {
            let n = c.value().as_number()? as usize;
            Ok(Box::new(move |v: &Vec<u8>| v.len() > n))
        })
        .unwrap();

    assert!(for_strings.evaluate(&"abcd".to_string()));
    assert!(!for_vecs.evaluate(&vec![1, 2, 3]));
}

// ==================== Evaluate Tests ====================

#[test]
fn test_evaluate_single_condition() {
    let log = CallLog::default();
    let compiled = compile_recording("a = 1", &log);
    assert!(compiled.evaluate(&flags(&[("a", true)])));
    assert!(!compiled.evaluate(&flags(&[("a", false)])));
}

#[test]
fn test_and_short_circuits_on_false_left() {
    let log = CallLog::default();
    let compiled = compile_recording("a = 1 and b = 1", &log);

    assert!(!compiled.evaluate(&flags(&[("a", false), ("b", true)])));
    assert_eq!(calls(&log), vec!["a"]);
}

#[test]
fn test_and_evaluates_right_on_true_left() {
    let log = CallLog::default();
    let compiled = compile_recording("a = 1 and b = 1", &log);

    assert!(compiled.evaluate(&flags(&[("a", true), ("b", true)])));
    assert_eq!(calls(&log), vec!["a", "b"]);
}

#[test]
fn test_or_short_circuits_on_true_left() {
    let log = CallLog::default();
    let compiled = compile_recording("a = 1 or b = 1", &log);

    assert!(compiled.evaluate(&flags(&[("a", true), ("b", false)])));
    assert_eq!(calls(&log), vec!["a"]);
}

#[test]
fn test_or_evaluates_right_on_false_left() {
    let log = CallLog::default();
    let compiled = compile_recording("a = 1 or b = 1", &log);

    assert!(compiled.evaluate(&flags(&[("a", false), ("b", true)])));
    assert_eq!(calls(&log), vec!["a", "b"]);
}

#[test]
fn test_or_chain_stops_after_first_true() {
    let log = CallLog::default();
    let compiled = compile_recording("a = 1 or b = 1 or c = 1", &log);

    assert!(compiled.evaluate(&flags(&[("a", true), ("b", true), ("c", true)])));
    assert_eq!(calls(&log), vec!["a"]);
}

#[test]
fn test_mixed_chain_is_right_associative() {
    let log = CallLog::default();
    // a or (b and c)
    let compiled = compile_recording("a = 1 or b = 1 and c = 1", &log);

    assert!(!compiled.evaluate(&flags(&[("a", false), ("b", true), ("c", false)])));
    assert_eq!(calls(&log), vec!["a", "b", "c"]);

    log.lock().unwrap().clear();
    assert!(compiled.evaluate(&flags(&[("a", true), ("b", false), ("c", false)])));
    assert_eq!(calls(&log), vec!["a"]);
}

#[test]
fn test_and_then_or_is_not_precedence_based() {
    let log = CallLog::default();
    // a and (b or c): false when a is false, even though c is true
    let compiled = compile_recording("a = 1 and b = 1 or c = 1", &log);

    assert!(!compiled.evaluate(&flags(&[("a", false), ("b", false), ("c", true)])));
    assert_eq!(calls(&log), vec!["a"]);
}

#[test]
fn test_grouping_evaluated_before_combining() {
    let log = CallLog::default();
    let compiled = compile_recording("(a = 1 or b = 1) and c = 1", &log);

    assert!(compiled.evaluate(&flags(&[("a", false), ("b", true), ("c", true)])));
    assert_eq!(calls(&log), vec!["a", "b", "c"]);

    log.lock().unwrap().clear();
    assert!(!compiled.evaluate(&flags(&[("a", false), ("b", false), ("c", true)])));
    assert_eq!(calls(&log), vec!["a", "b"]);
}

#[test]
fn test_grouping_short_circuit_skips_whole_group() {
    let log = CallLog::default();
    let compiled = compile_recording("a = 1 or (b = 1 and c = 1)", &log);

    assert!(compiled.evaluate(&flags(&[("a", true)])));
    assert_eq!(calls(&log), vec!["a"]);
}

#[test]
fn test_evaluate_is_idempotent() {
    let log = CallLog::default();
    let compiled = compile_recording("a = 1 and (b = 1 or c = 1)", &log);
    let model = flags(&[("a", true), ("b", false), ("c", true)]);

    let results: Vec<bool> = (0..5).map(|_| compiled.evaluate(&model)).collect();
    assert_eq!(results, vec![true; 5]);
    assert_eq!(calls(&log).len(), 15);
}

#[test]
fn test_evaluate_aircraft() {
    let compiled = parse("altitude > 3000 and (callsign = \"DLH123\" or groundspeed >= 450)")
        .unwrap()
        .compile(compile_aircraft)
        .unwrap();

    assert!(compiled.evaluate(&aircraft("DLH123", 35000.0, 300.0)));
    assert!(compiled.evaluate(&aircraft("BAW1", 35000.0, 450.0)));
    assert!(!compiled.evaluate(&aircraft("BAW1", 35000.0, 449.0)));
    assert!(!compiled.evaluate(&aircraft("DLH123", 2500.0, 500.0)));
}

#[test]
fn test_filter_keeps_order() {
    let compiled = parse("altitude >= 10000")
        .unwrap()
        .compile(compile_aircraft)
        .unwrap();
    let fleet = vec![
        aircraft("A", 12000.0, 0.0),
        aircraft("B", 900.0, 0.0),
        aircraft("C", 10000.0, 0.0),
    ];

    let matched: Vec<&str> = compiled
        .filter(&fleet)
        .into_iter()
        .map(|a| a.callsign.as_str())
        .collect();
    assert_eq!(matched, vec!["A", "C"]);
}

#[test]
fn test_compiled_conditions_and_display() {
    let expr = parse("altitude>1 && (callsign='X' || groundspeed<=2)").unwrap();
    let compiled = expr.compile(compile_aircraft).unwrap();

    let names: Vec<&str> = compiled
        .conditions()
        .iter()
        .map(|c| c.condition().name())
        .collect();
    assert_eq!(names, vec!["altitude", "callsign", "groundspeed"]);
    assert_eq!(compiled.to_string(), expr.to_string());
    assert_eq!(
        compiled.to_string(),
        "altitude > 1 and (callsign = 'X' or groundspeed <= 2)"
    );
}

#[test]
fn test_compiled_condition_evaluate() {
    let compiled = parse("altitude < 100")
        .unwrap()
        .compile(compile_aircraft)
        .unwrap();
    let conditions = compiled.conditions();
    assert!(conditions[0].evaluate(&aircraft("X", 50.0, 0.0)));
    assert!(!conditions[0].evaluate(&aircraft("X", 150.0, 0.0)));
}

#[test]
fn test_compiled_expression_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CompiledExpression<Aircraft>>();
}

#[test]
fn test_evaluate_concurrently() {
    let compiled = parse("altitude > 1000 and groundspeed < 300")
        .unwrap()
        .compile(compile_aircraft)
        .unwrap();
    let fleet: Vec<Aircraft> = (0..200)
        .map(|i| aircraft(&format!("T{i}"), f64::from(i) * 10.0, f64::from(i) * 2.0))
        .collect();
    let expected = compiled.filter(&fleet).len();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| compiled.filter(&fleet).len()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
    // altitude > 1000 means i > 100, groundspeed < 300 means i < 150
    assert_eq!(expected, 49);
}

fn chain_of(condition: &str, op: &str, n: usize) -> String {
    vec![condition; n].join(&format!(" {op} "))
}

#[test]
fn test_long_chain_compiles_and_evaluates() {
    let source = chain_of("altitude > 1000", "and", 100_000);
    let compiled = parse(&source).unwrap().compile(compile_aircraft).unwrap();

    assert_eq!(compiled.conditions().len(), 100_000);
    assert!(compiled.evaluate(&aircraft("DLH123", 35000.0, 450.0)));
    assert!(!compiled.evaluate(&aircraft("DLH123", 500.0, 120.0)));
    assert_eq!(compiled.to_string(), source);
    drop(compiled);
}

#[test]
fn test_long_or_chain_reaches_last_condition() {
    let mut source = chain_of("groundspeed > 1000", "or", 100_000);
    source.push_str(" or callsign = 'DLH123'");
    let compiled = parse(&source).unwrap().compile(compile_aircraft).unwrap();

    assert!(compiled.evaluate(&aircraft("DLH123", 35000.0, 450.0)));
    assert!(!compiled.evaluate(&aircraft("BAW1", 35000.0, 450.0)));
}

#[test]
fn test_long_chain_short_circuits() {
    let log = CallLog::default();
    let source = chain_of("a = 1", "and", 100_000);
    let compiled = compile_recording(&source, &log);

    assert!(!compiled.evaluate(&flags(&[("a", false)])));
    assert_eq!(calls(&log), vec!["a"]);
}
