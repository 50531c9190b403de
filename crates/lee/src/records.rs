//! Predicates over JSON records.
//!
//! A condition's identifier names a top-level key of a JSON object. A missing
//! key, `null`, or a value of the wrong JSON type never matches, whatever the
//! operator.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use lee_core::{CompareOp, Condition, ExprError, ExprResult, Predicate, Value, ValueKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use strsim::levenshtein;

/// A record being filtered.
pub type Record = serde_json::Value;

/// Maximum Levenshtein distance to consider a field name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Declared type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
}

impl FieldType {
    /// The literal kind a condition on this field must use.
    pub fn value_kind(self) -> ValueKind {
        match self {
            FieldType::String => ValueKind::String,
            FieldType::Number => ValueKind::Number,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value_kind(), f)
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" | "str" => Ok(FieldType::String),
            "number" | "num" => Ok(FieldType::Number),
            _ => Err(format!(
                "invalid field type '{s}'. Valid types: string, number"
            )),
        }
    }
}

/// Builds record predicates for the conditions of an expression.
///
/// Without declared fields any identifier is accepted. Once at least one
/// field is declared, the schema is closed: unknown fields and literals of
/// the wrong kind are rejected at compile time.
#[derive(Debug, Default, Clone)]
pub struct RecordCompiler {
    fields: BTreeMap<String, FieldType>,
    case_insensitive: bool,
}

impl RecordCompiler {
    /// Creates a compiler with no schema and case-sensitive matching.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares field types. Later declarations override earlier ones.
    pub fn with_fields<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (String, FieldType)>,
    {
        self.fields.extend(fields);
        self
    }

    /// Makes `=~` and `!~` ignore case.
    pub fn case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    /// Returns the declared fields.
    pub fn fields(&self) -> &BTreeMap<String, FieldType> {
        &self.fields
    }

    /// Compiles one condition into a record predicate.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::Condition`] for an unknown field, a literal that
    /// does not fit the declared field type, a regex operator with a number
    /// literal, or an invalid regular expression.
    pub fn compile(&self, condition: &Condition) -> ExprResult<Predicate<Record>> {
        self.check_schema(condition)?;

        let field = condition.name().to_string();
        match condition.value() {
            Value::Number(n) => compile_number(condition, field, *n),
            Value::String(_) => {
                let expected = condition.value().unquoted()?;
                self.compile_string(condition, field, expected)
            }
        }
    }

    fn check_schema(&self, condition: &Condition) -> ExprResult<()> {
        if self.fields.is_empty() {
            return Ok(());
        }

        let Some(field_type) = self.fields.get(condition.name()) else {
            let suggestion =
                find_similar_name(condition.name(), self.fields.keys().map(String::as_str));
            let message = match suggestion {
                Some(s) => format!("unknown field, did you mean '{s}'?"),
                None => "unknown field".to_string(),
            };
            return Err(ExprError::condition(condition, message));
        };

        let kind = condition.value().kind();
        if field_type.value_kind() != kind {
            return Err(ExprError::condition(
                condition,
                format!("field is a {field_type} but the literal is a {kind}"),
            ));
        }
        Ok(())
    }

    fn compile_string(
        &self,
        condition: &Condition,
        field: String,
        expected: String,
    ) -> ExprResult<Predicate<Record>> {
        let op = condition.op();
        match op {
            CompareOp::Matches | CompareOp::NotMatches => {
                let pattern = if self.case_insensitive {
                    format!("(?i){expected}")
                } else {
                    expected
                };
                let re = Regex::new(&pattern).map_err(|e| {
                    ExprError::condition(condition, format!("invalid regular expression: {e}"))
                })?;
                let negate = op == CompareOp::NotMatches;
                Ok(Box::new(move |record: &Record| {
                    string_field(record, &field).is_some_and(|s| re.is_match(s) != negate)
                }))
            }
            _ => Ok(Box::new(move |record: &Record| {
                string_field(record, &field)
                    .is_some_and(|s| ordering_matches(op, Some(s.cmp(expected.as_str()))))
            })),
        }
    }
}

fn compile_number(condition: &Condition, field: String, n: f64) -> ExprResult<Predicate<Record>> {
    let op = condition.op();
    if matches!(op, CompareOp::Matches | CompareOp::NotMatches) {
        return Err(ExprError::condition(
            condition,
            format!("operator {op} needs a string literal"),
        ));
    }
    Ok(Box::new(move |record: &Record| {
        record
            .get(field.as_str())
            .and_then(Record::as_f64)
            .is_some_and(|v| ordering_matches(op, v.partial_cmp(&n)))
    }))
}

fn string_field<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Record::as_str)
}

/// Applies a comparison operator to the ordering of field value and literal.
fn ordering_matches(op: CompareOp, ordering: Option<Ordering>) -> bool {
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        CompareOp::Equals => ordering == Ordering::Equal,
        CompareOp::NotEquals => ordering != Ordering::Equal,
        CompareOp::Less => ordering == Ordering::Less,
        CompareOp::LessOrEqual => ordering != Ordering::Greater,
        CompareOp::Greater => ordering == Ordering::Greater,
        CompareOp::GreaterOrEqual => ordering != Ordering::Less,
        CompareOp::Matches | CompareOp::NotMatches => false,
    }
}

/// Finds the best matching name from a list of candidates using Levenshtein distance.
///
/// Returns the best match if its edit distance is within the threshold,
/// otherwise returns `None`.
fn find_similar_name<'a>(query: &str, candidates: impl Iterator<Item = &'a str>) -> Option<String> {
    let query_lower = query.to_lowercase();

    let (best_match, best_distance) = candidates
        .filter(|name| !name.is_empty())
        .map(|name| (name, levenshtein(&query_lower, &name.to_lowercase())))
        .min_by_key(|(_, d)| *d)?;

    // Field names are case-sensitive; a case-only difference still gets a suggestion.
    if best_match != query && best_distance <= MAX_SUGGESTION_DISTANCE {
        Some(best_match.to_string())
    } else {
        None
    }
}
