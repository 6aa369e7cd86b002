use std::fmt;
use thiserror::Error;

/// Which side of the factorization a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    User,
    Item,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::User => write!(f, "user"),
            Axis::Item => write!(f, "item"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecError {
    #[error("invalid weight {weight} for user {user}, item {item}: weights must be finite and non-negative")]
    InvalidWeight { user: usize, item: usize, weight: f32 },

    #[error("interaction ({user}, {item}) lies outside the {num_users}x{num_items} matrix")]
    InteractionOutOfBounds {
        user: usize,
        item: usize,
        num_users: usize,
        num_items: usize,
    },

    #[error("interaction matrix has no non-zero entries")]
    EmptyMatrix,

    #[error("invalid hyperparameter: {0}")]
    InvalidHyperparameter(String),

    #[error("linear system for {axis} row {index} is singular after regularization")]
    DegenerateRow { axis: Axis, index: usize },

    #[error("unknown user index {index} (model has {num_users} users)")]
    UnknownUser { index: usize, num_users: usize },

    #[error("unknown item index {index} (model has {num_items} items)")]
    UnknownItem { index: usize, num_items: usize },
}

impl RecError {
    /// Query-time failures are per-request; everything else aborts a training run.
    pub fn is_query_error(&self) -> bool {
        matches!(self, RecError::UnknownUser { .. } | RecError::UnknownItem { .. })
    }
}

pub type RecResult<T> = std::result::Result<T, RecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_errors_are_recoverable() {
        assert!(RecError::UnknownUser { index: 3, num_users: 2 }.is_query_error());
        assert!(RecError::UnknownItem { index: 9, num_items: 2 }.is_query_error());
        assert!(!RecError::EmptyMatrix.is_query_error());
        assert!(!RecError::DegenerateRow { axis: Axis::Item, index: 0 }.is_query_error());
    }

    #[test]
    fn test_error_messages() {
        let err = RecError::DegenerateRow { axis: Axis::User, index: 7 };
        assert_eq!(
            err.to_string(),
            "linear system for user row 7 is singular after regularization"
        );
    }
}
