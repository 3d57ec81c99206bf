//! Default [`Evaluator`]: the restricted arithmetic language from
//! [`crate::domain::expression`].
//!
//! Only numeric literals, `+ - * / %`, unary signs and parentheses are
//! accepted.  Anything else is rejected before any computation happens.

use serde_json::Value;

use crate::application::{EvalError, Evaluator};
use crate::domain::{evaluate, Number};

/// Evaluates arithmetic expressions and returns the result as a JSON number.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArithmeticEvaluator;

impl Evaluator for ArithmeticEvaluator {
    fn evaluate(&self, expression: &str) -> Result<Value, EvalError> {
        Ok(evaluate(expression).map(Number::to_json)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
