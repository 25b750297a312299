//! Per-request checkout progress.

use common::OrderId;
use serde::Serialize;

use crate::error::{CheckoutError, ServiceError};
use crate::state::CheckoutState;

/// A failure that was logged but did not fail the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutWarning {
    /// The step whose side effect failed.
    pub step: CheckoutState,
    pub reason: String,
}

/// Tracks one checkout through its states.
///
/// Lives only for the duration of a single `place_order` call.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutProgress {
    order_id: OrderId,
    state: CheckoutState,
    history: Vec<CheckoutState>,
    transaction_id: Option<String>,
    tracking_id: Option<String>,
    failed_step: Option<CheckoutState>,
    failure_reason: Option<String>,
    warnings: Vec<CheckoutWarning>,
}

impl CheckoutProgress {
    /// Starts tracking a newly received order.
    pub fn new(order_id: OrderId) -> Self {
        Self {
            order_id,
            state: CheckoutState::Received,
            history: vec![CheckoutState::Received],
            transaction_id: None,
            tracking_id: None,
            failed_step: None,
            failure_reason: None,
            warnings: Vec::new(),
        }
    }

    /// Moves to the next state on the success path.
    pub(crate) fn advance(&mut self, to: CheckoutState) {
        debug_assert_eq!(self.state.next(), Some(to), "out-of-order checkout transition");

        self.state = to;
        self.history.push(to);

        metrics::counter!("checkout_state_transitions_total", "state" => to.as_str()).increment(1);
        tracing::debug!(order_id = %self.order_id, state = %to, "checkout state advanced");
    }

    pub(crate) fn record_transaction(&mut self, transaction_id: &str) {
        self.transaction_id = Some(transaction_id.to_string());
    }

    pub(crate) fn record_tracking(&mut self, tracking_id: &str) {
        self.tracking_id = Some(tracking_id.to_string());
    }

    /// Records a best-effort step failure without leaving the success path.
    pub(crate) fn warn(&mut self, step: CheckoutState, error: &ServiceError) {
        metrics::counter!("checkout_best_effort_failures_total", "step" => step.as_str())
            .increment(1);
        tracing::warn!(
            order_id = %self.order_id,
            %step,
            kind = %error.kind(),
            error = %error,
            "best-effort checkout step failed"
        );

        self.warnings.push(CheckoutWarning {
            step,
            reason: error.to_string(),
        });
    }

    /// Records a best-effort step cut short by cancellation.
    ///
    /// Everything up to shipment has already happened, so the order stands.
    pub(crate) fn warn_canceled(&mut self, step: CheckoutState) {
        metrics::counter!("checkout_best_effort_failures_total", "step" => step.as_str())
            .increment(1);
        tracing::warn!(
            order_id = %self.order_id,
            %step,
            "best-effort checkout step canceled"
        );

        self.warnings.push(CheckoutWarning {
            step,
            reason: format!("canceled at {step}"),
        });
    }

    /// Moves to the terminal failed state.
    pub(crate) fn fail(&mut self, error: &CheckoutError) {
        self.state = CheckoutState::Failed;
        self.history.push(CheckoutState::Failed);
        self.failed_step = Some(error.step());
        self.failure_reason = Some(error.to_string());

        metrics::counter!("checkout_state_transitions_total", "state" => CheckoutState::Failed.as_str())
            .increment(1);
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// Every state reached, in order.
    pub fn history(&self) -> &[CheckoutState] {
        &self.history
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn tracking_id(&self) -> Option<&str> {
        self.tracking_id.as_deref()
    }

    /// The step that was being attempted when the checkout failed.
    pub fn failed_step(&self) -> Option<CheckoutState> {
        self.failed_step
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn warnings(&self) -> &[CheckoutWarning] {
        &self.warnings
    }
}
