//! Checkout error types.

use domain::MoneyError;
use thiserror::Error;

use crate::state::CheckoutState;

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed money value (sign or range violation).
    InvalidValue,
    /// A collaborator could not be reached.
    UpstreamUnavailable,
    /// A collaborator answered with a domain error.
    UpstreamError,
    /// The caller's deadline or cancellation fired.
    Canceled,
    /// Unexpected failure; what callers of `place_order` see for every
    /// non-cancellation error.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidValue => "invalid_value",
            ErrorKind::UpstreamUnavailable => "upstream_unavailable",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::Canceled => "canceled",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The backend service a call was made to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collaborator {
    Cart,
    Catalog,
    Shipping,
    Payment,
    Email,
}

impl Collaborator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collaborator::Cart => "cart",
            Collaborator::Catalog => "catalog",
            Collaborator::Shipping => "shipping",
            Collaborator::Payment => "payment",
            Collaborator::Email => "email",
        }
    }
}

impl std::fmt::Display for Collaborator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by collaborator clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service could not be reached (connection refused, timeout, 5xx
    /// gateway errors). Safe to retry at a higher layer.
    #[error("{service} service unavailable: {reason}")]
    Unavailable {
        service: Collaborator,
        reason: String,
    },

    /// The service answered with an error.
    #[error("{service} service error: {reason}")]
    Upstream {
        service: Collaborator,
        reason: String,
    },

    /// The requested entity does not exist.
    #[error("{service} service: {id} not found")]
    NotFound { service: Collaborator, id: String },

    /// The payment service rejected the charge. Never retried.
    #[error("payment declined: {reason}")]
    Declined { reason: String },
}

impl ServiceError {
    pub fn unavailable(service: Collaborator, reason: impl Into<String>) -> Self {
        ServiceError::Unavailable {
            service,
            reason: reason.into(),
        }
    }

    pub fn upstream(service: Collaborator, reason: impl Into<String>) -> Self {
        ServiceError::Upstream {
            service,
            reason: reason.into(),
        }
    }

    pub fn not_found(service: Collaborator, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            service,
            id: id.into(),
        }
    }

    pub fn declined(reason: impl Into<String>) -> Self {
        ServiceError::Declined {
            reason: reason.into(),
        }
    }

    /// Which collaborator produced the error.
    pub fn service(&self) -> Collaborator {
        match self {
            ServiceError::Unavailable { service, .. }
            | ServiceError::Upstream { service, .. }
            | ServiceError::NotFound { service, .. } => *service,
            ServiceError::Declined { .. } => Collaborator::Payment,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Unavailable { .. } => ErrorKind::UpstreamUnavailable,
            ServiceError::Upstream { .. }
            | ServiceError::NotFound { .. }
            | ServiceError::Declined { .. } => ErrorKind::UpstreamError,
        }
    }

    /// Returns true if a retry might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceError::Unavailable { .. })
    }
}

/// Terminal failure of a `place_order` call.
///
/// Callers see [`ErrorKind::Internal`] or [`ErrorKind::Canceled`] from
/// [`CheckoutError::kind`]; the originating kind stays available through
/// [`CheckoutError::origin_kind`] for logging.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A collaborator call failed.
    #[error("checkout failed at {step}: {source}")]
    Service {
        step: CheckoutState,
        #[source]
        source: ServiceError,
    },

    /// A money value could not be aggregated.
    #[error("checkout failed at {step}: {source}")]
    Money {
        step: CheckoutState,
        #[source]
        source: MoneyError,
    },

    /// The caller canceled or the deadline passed.
    #[error("checkout canceled at {step}")]
    Canceled { step: CheckoutState },
}

impl CheckoutError {
    /// The step that was being attempted when the failure happened.
    pub fn step(&self) -> CheckoutState {
        match self {
            CheckoutError::Service { step, .. }
            | CheckoutError::Money { step, .. }
            | CheckoutError::Canceled { step } => *step,
        }
    }

    /// Kind reported to the caller.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckoutError::Canceled { .. } => ErrorKind::Canceled,
            _ => ErrorKind::Internal,
        }
    }

    /// Kind of the underlying failure.
    pub fn origin_kind(&self) -> ErrorKind {
        match self {
            CheckoutError::Service { source, .. } => source.kind(),
            CheckoutError::Money { .. } => ErrorKind::InvalidValue,
            CheckoutError::Canceled { .. } => ErrorKind::Canceled,
        }
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_kinds() {
        assert_eq!(
            ServiceError::unavailable(Collaborator::Cart, "refused").kind(),
            ErrorKind::UpstreamUnavailable
        );
        assert_eq!(
            ServiceError::upstream(Collaborator::Cart, "unknown user").kind(),
            ErrorKind::UpstreamError
        );
        assert_eq!(
            ServiceError::not_found(Collaborator::Catalog, "P1").kind(),
            ErrorKind::UpstreamError
        );
        assert_eq!(
            ServiceError::declined("insufficient funds").kind(),
            ErrorKind::UpstreamError
        );
    }

    #[test]
    fn test_only_unavailable_is_transient() {
        assert!(ServiceError::unavailable(Collaborator::Payment, "timeout").is_transient());
        assert!(!ServiceError::declined("card expired").is_transient());
        assert!(!ServiceError::upstream(Collaborator::Payment, "bad request").is_transient());
    }

    #[test]
    fn test_declined_belongs_to_payment() {
        assert_eq!(
            ServiceError::declined("no").service(),
            Collaborator::Payment
        );
    }

    #[test]
    fn test_checkout_error_surfaces_internal() {
        let err = CheckoutError::Service {
            step: CheckoutState::PaymentCharged,
            source: ServiceError::declined("insufficient funds"),
        };
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.origin_kind(), ErrorKind::UpstreamError);
        assert_eq!(err.step(), CheckoutState::PaymentCharged);
        assert_eq!(
            err.to_string(),
            "checkout failed at PaymentCharged: payment declined: insufficient funds"
        );
    }

    #[test]
    fn test_money_error_keeps_invalid_value_origin() {
        let err = CheckoutError::Money {
            step: CheckoutState::ItemsPriced,
            source: MoneyError::Overflow,
        };
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.origin_kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_canceled_kind() {
        let err = CheckoutError::Canceled {
            step: CheckoutState::Shipped,
        };
        assert_eq!(err.kind(), ErrorKind::Canceled);
        assert_eq!(err.origin_kind(), ErrorKind::Canceled);
    }
}
