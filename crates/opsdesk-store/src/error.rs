//! # Store Errors
//!
//! The error type application surfaces see. Wraps domain and database
//! errors and adds the permission-denial case that only exists at this
//! layer.

use thiserror::Error;

use opsdesk_core::CoreError;
use opsdesk_db::DbError;

/// Errors returned by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The actor's role lacks the capability for this operation.
    #[error("Role {role} may not {action}")]
    Forbidden { role: String, action: String },

    /// Referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Business rule violation from opsdesk-core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database failure from opsdesk-db.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl StoreError {
    pub fn forbidden(role: impl std::fmt::Display, action: impl Into<String>) -> Self {
        StoreError::Forbidden {
            role: role.to_string(),
            action: action.into(),
        }
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Convenience type alias for Results with StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use opsdesk_core::Role;

    #[test]
    fn test_forbidden_message() {
        let err = StoreError::forbidden(Role::Viewer, "create orders");
        assert_eq!(err.to_string(), "Role viewer may not create orders");
    }

    #[test]
    fn test_core_error_passes_through() {
        let core = CoreError::TotalMismatch {
            declared_cents: 100,
            computed_cents: 200,
        };
        let err: StoreError = core.into();
        assert!(err.to_string().contains("does not match"));
    }
}
