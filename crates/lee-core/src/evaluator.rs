//! Compilation of parsed expressions into predicates, and their evaluation.
//!
//! Compiling walks the [`Expression`] once and asks an application callback
//! for a [`Predicate`] per condition. The result is a separate
//! [`CompiledExpression`], so a tree whose leaves have not been bound can
//! never be evaluated.
//!
//! # Example
//!
//! ```
//! use lee_core::{parse, CompareOp, ExprError, Predicate};
//!
//! struct Flight {
//!     callsign: String,
//!     altitude: f64,
//! }
//!
//! let expr = parse(r#"altitude > 3000 and callsign = "DLH123""#).unwrap();
//! let compiled = expr
//!     .compile(|condition| -> Result<Predicate<Flight>, ExprError> {
//!         match (condition.name(), condition.op()) {
//!             ("altitude", CompareOp::Greater) => {
//!                 let limit = condition.value().as_number()?;
//!                 Ok(Box::new(move |f: &Flight| f.altitude > limit))
//!             }
//!             ("callsign", CompareOp::Equals) => {
//!                 let expected = condition.value().unquoted()?;
//!                 Ok(Box::new(move |f: &Flight| f.callsign == expected))
//!             }
//!             _ => Err(ExprError::condition(condition, "unsupported condition")),
//!         }
//!     })
//!     .unwrap();
//!
//! let flight = Flight { callsign: "DLH123".to_string(), altitude: 35000.0 };
//! assert!(compiled.evaluate(&flight));
//! ```

use std::fmt;

use crate::ast::{CombineOp, Condition, Expression, Operand};

/// A predicate bound to one condition, evaluated against a model.
pub type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

impl Expression {
    /// Binds every condition to a predicate produced by `callback`.
    ///
    /// Conditions are visited depth-first, left to right, the same order
    /// [`Expression::conditions`] returns them in. The tree is left untouched,
    /// so one expression can be compiled for several model types.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `callback`, unchanged. No partial
    /// result is kept.
    pub fn compile<T, E, F>(&self, mut callback: F) -> Result<CompiledExpression<T>, E>
    where
        F: FnMut(&Condition) -> Result<Predicate<T>, E>,
    {
        let compiled = self.compile_with(&mut callback)?;
        tracing::debug!(
            conditions = compiled.conditions().len(),
            "compiled expression"
        );
        Ok(compiled)
    }

    fn compile_with<T, E, F>(&self, callback: &mut F) -> Result<CompiledExpression<T>, E>
    where
        F: FnMut(&Condition) -> Result<Predicate<T>, E>,
    {
        let first = compile_operand(&self.left, callback)?;
        let mut rest = Vec::new();
        let mut expr = self;
        while let Some((operator, right)) = &expr.right {
            rest.push((operator.op, compile_operand(&right.left, callback)?));
            expr = &**right;
        }
        Ok(CompiledExpression::chain(first, rest))
    }
}

fn compile_operand<T, E, F>(operand: &Operand, callback: &mut F) -> Result<CompiledOperand<T>, E>
where
    F: FnMut(&Condition) -> Result<Predicate<T>, E>,
{
    match operand {
        Operand::Condition(condition) => {
            let predicate = callback(condition)?;
            Ok(CompiledOperand::Condition(CompiledCondition {
                condition: condition.clone(),
                predicate,
            }))
        }
        Operand::Grouping(inner) => Ok(CompiledOperand::Grouping(Box::new(
            inner.compile_with(callback)?,
        ))),
    }
}

/// A condition together with the predicate bound to it.
pub struct CompiledCondition<T> {
    condition: Condition,
    predicate: Predicate<T>,
}

impl<T> CompiledCondition<T> {
    /// Returns the source condition.
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Runs the bound predicate.
    pub fn evaluate(&self, model: &T) -> bool {
        (self.predicate)(model)
    }
}

impl<T> fmt::Debug for CompiledCondition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledCondition")
            .field("condition", &self.condition)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
enum CompiledOperand<T> {
    Condition(CompiledCondition<T>),
    Grouping(Box<CompiledExpression<T>>),
}

impl<T> CompiledOperand<T> {
    fn evaluate(&self, model: &T) -> bool {
        match self {
            CompiledOperand::Condition(condition) => condition.evaluate(model),
            CompiledOperand::Grouping(expr) => expr.evaluate(model),
        }
    }
}

/// An expression whose conditions are all bound to predicates.
///
/// Only [`Expression::compile`] builds one. It holds no mutable state, so it
/// can be evaluated any number of times, from several threads at once.
#[derive(Debug)]
pub struct CompiledExpression<T> {
    left: CompiledOperand<T>,
    right: Option<(CombineOp, Box<CompiledExpression<T>>)>,
}

impl<T> CompiledExpression<T> {
    fn chain(first: CompiledOperand<T>, rest: Vec<(CombineOp, CompiledOperand<T>)>) -> Self {
        let mut links = rest.into_iter().rev();
        let Some((mut op, last)) = links.next() else {
            return CompiledExpression {
                left: first,
                right: None,
            };
        };
        let mut tail = CompiledExpression {
            left: last,
            right: None,
        };
        for (previous, operand) in links {
            tail = CompiledExpression {
                left: operand,
                right: Some((op, Box::new(tail))),
            };
            op = previous;
        }
        CompiledExpression {
            left: first,
            right: Some((op, Box::new(tail))),
        }
    }

    /// Evaluates the expression against `model`.
    ///
    /// Operands are evaluated left to right with short-circuiting: once the
    /// left side of an `and` is false, or the left side of an `or` is true,
    /// nothing to its right is evaluated.
    pub fn evaluate(&self, model: &T) -> bool {
        let mut expr = self;
        loop {
            let left = expr.left.evaluate(model);
            let Some((op, right)) = &expr.right else {
                return left;
            };
            match (op, left) {
                (CombineOp::And, false) => return false,
                (CombineOp::Or, true) => return true,
                _ => expr = &**right,
            }
        }
    }

    /// Returns the items the expression matches, in their original order.
    pub fn filter<'a, I>(&self, items: I) -> Vec<&'a T>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        items.into_iter().filter(|item| self.evaluate(item)).collect()
    }

    /// Returns the compiled conditions in evaluation order.
    pub fn conditions(&self) -> Vec<&CompiledCondition<T>> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a CompiledCondition<T>>) {
        let mut expr = self;
        loop {
            match &expr.left {
                CompiledOperand::Condition(condition) => out.push(condition),
                CompiledOperand::Grouping(inner) => inner.collect_conditions(out),
            }
            match &expr.right {
                Some((_, right)) => expr = &**right,
                None => break,
            }
        }
    }
}

impl<T> Drop for CompiledExpression<T> {
    fn drop(&mut self) {
        let mut next = self.right.take();
        while let Some((_, mut expr)) = next {
            next = expr.right.take();
        }
    }
}

impl<T> fmt::Display for CompiledExpression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut expr = self;
        loop {
            match &expr.left {
                CompiledOperand::Condition(c) => fmt::Display::fmt(&c.condition, f)?,
                CompiledOperand::Grouping(inner) => write!(f, "({inner})")?,
            }
            match &expr.right {
                Some((op, right)) => {
                    write!(f, " {op} ")?;
                    expr = &**right;
                }
                None => return Ok(()),
            }
        }
    }
}
