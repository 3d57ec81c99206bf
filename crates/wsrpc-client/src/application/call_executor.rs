//! Call execution: evaluates `eval` requests and builds correlated results.
//!
//! The peer decides *what* to evaluate; the [`Evaluator`] decides what is
//! *allowed*.  The executor only glues the two together and copies the call
//! id into the result.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use wsrpc_core::{CallAction, CallRequest, CallResult};

use crate::domain::ExpressionError;

/// Error type for evaluation failures.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The expression did not parse or could not be computed.
    #[error("expression error: {0}")]
    Expression(#[from] ExpressionError),

    /// Evaluator-specific failure.
    #[error("evaluation rejected: {0}")]
    Rejected(String),
}

/// Capability that turns an expression string into a JSON value.
///
/// Implementations decide what expressions are permitted; the protocol itself
/// places no restriction on the string the peer sends.
#[cfg_attr(test, mockall::automock)]
pub trait Evaluator: Send + Sync {
    /// Evaluates `expression` synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] when the expression is rejected or fails.
    fn evaluate(&self, expression: &str) -> Result<Value, EvalError>;
}

/// Evaluates call requests.
pub struct CallExecutor {
    evaluator: Arc<dyn Evaluator>,
}

impl CallExecutor {
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Self {
        Self { evaluator }
    }

    /// Executes `request`.
    ///
    /// Returns `Ok(Some(result))` for a recognised action, `Ok(None)` for an
    /// unknown action (no reply is ever sent for those).  Non-string `eval`
    /// data is not an expression and is returned unchanged as the result.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] if evaluation fails.  The caller logs it and
    /// sends nothing.
    pub fn execute(&self, request: CallRequest) -> Result<Option<CallResult>, EvalError> {
        match request.action {
            CallAction::Eval => {
                let value = match request.data {
                    Value::String(ref expression) => self.evaluator.evaluate(expression)?,
                    other => other,
                };
                Ok(Some(CallResult::new(request.id, value)))
            }
            CallAction::Unknown => {
                debug!("ignoring call with unrecognised action");
                Ok(None)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use serde_json::json;
    use wsrpc_core::CallId;

    fn eval_request(id: &str, data: Value) -> CallRequest {
        CallRequest {
            id: Some(CallId::from(id)),
            action: CallAction::Eval,
            data,
        }
    }

    #[test]
    fn test_eval_result_carries_request_id() {
        // Arrange
        let mut evaluator = MockEvaluator::new();
        evaluator
            .expect_evaluate()
            .with(eq("1+1"))
            .times(1)
            .returning(|_| Ok(json!(2)));
        let executor = CallExecutor::new(Arc::new(evaluator));

        // Act
        let result = executor.execute(eval_request("42", json!("1+1"))).unwrap();

        // Assert
        assert_eq!(result, Some(CallResult::new(Some(CallId::from("42")), json!(2))));
    }

    #[test]
    fn test_unknown_action_never_reaches_evaluator() {
        let mut evaluator = MockEvaluator::new();
        evaluator.expect_evaluate().times(0);
        let executor = CallExecutor::new(Arc::new(evaluator));

        let request = CallRequest {
            id: Some(CallId::from("1")),
            action: CallAction::Unknown,
            data: json!("1+1"),
        };

        assert!(executor.execute(request).unwrap().is_none());
    }

    #[test]
    fn test_non_string_data_is_returned_unchanged() {
        // Arrange
        let mut evaluator = MockEvaluator::new();
        evaluator.expect_evaluate().times(0);
        let executor = CallExecutor::new(Arc::new(evaluator));

        // Act
        let number = executor.execute(eval_request("n", json!(42))).unwrap();
        let object = executor
            .execute(eval_request("o", json!({"a": [1, 2]})))
            .unwrap();

        // Assert
        assert_eq!(number, Some(CallResult::new(Some(CallId::from("n")), json!(42))));
        assert_eq!(
            object,
            Some(CallResult::new(Some(CallId::from("o")), json!({"a": [1, 2]})))
        );
    }

    #[test]
    fn test_evaluator_failure_is_propagated() {
        let mut evaluator = MockEvaluator::new();
        evaluator
            .expect_evaluate()
            .returning(|_| Err(EvalError::Rejected("not allowed".into())));
        let executor = CallExecutor::new(Arc::new(evaluator));

        let err = executor
            .execute(eval_request("8", json!("rm -rf /")))
            .unwrap_err();

        assert_eq!(err.to_string(), "evaluation rejected: not allowed");
    }

    #[test]
    fn test_missing_id_yields_result_without_id() {
        let mut evaluator = MockEvaluator::new();
        evaluator.expect_evaluate().returning(|_| Ok(json!(3)));
        let executor = CallExecutor::new(Arc::new(evaluator));

        let request = CallRequest {
            id: None,
            action: CallAction::Eval,
            data: json!("1+2"),
        };

        let result = executor.execute(request).unwrap().unwrap();
        assert!(result.id.is_none());
    }
}
