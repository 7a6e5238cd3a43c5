//! Domain error types.
//!
//! These errors represent validation failures and data inconsistencies
//! in the domain layer. They are distinct from API/IO errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    /// Invalid leg construction (e.g., start equals end)
    #[error("invalid leg: {0}")]
    InvalidLeg(&'static str),

    /// Consecutive legs don't connect
    #[error("leg ending at {end} is followed by a leg starting at {start}")]
    BrokenChain { end: String, start: String },

    /// Route has no legs
    #[error("route must have at least one leg")]
    EmptyRoute,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::InvalidLeg("start and end must differ");
        assert_eq!(err.to_string(), "invalid leg: start and end must differ");

        let err = DomainError::BrokenChain {
            end: "A".into(),
            start: "B".into(),
        };
        assert_eq!(
            err.to_string(),
            "leg ending at A is followed by a leg starting at B"
        );

        let err = DomainError::EmptyRoute;
        assert_eq!(err.to_string(), "route must have at least one leg");
    }
}
