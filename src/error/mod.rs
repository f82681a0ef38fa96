use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Person store errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("Person not found: {person_id}")]
    PersonNotFound { person_id: String },

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Wizard handler errors
#[derive(Debug, Error)]
pub enum WizardError {
    /// A relationship step ran before the self person was established.
    #[error("Self person ID is missing")]
    MissingSelfPerson,

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Failed to link {relationship}: {source}")]
    Link {
        relationship: String,
        #[source]
        source: StorageError,
    },

    #[error("Lookup failed: {0}")]
    Lookup(#[from] StorageError),
}

impl WizardError {
    /// Wrap a store failure with the relationship that was being written.
    pub fn link(relationship: impl Into<String>, source: StorageError) -> Self {
        WizardError::Link {
            relationship: relationship.into(),
            source,
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for wizard handlers
pub type WizardResult<T> = Result<T, WizardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config {
            message: "missing key".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration error: missing key");

        let err = AppError::Internal {
            message: "unexpected".to_string(),
        };
        assert_eq!(err.to_string(), "Internal error: unexpected");
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Connection {
            message: "failed to connect".to_string(),
        };
        assert_eq!(err.to_string(), "Database connection failed: failed to connect");

        let err = StorageError::PersonNotFound {
            person_id: "person-123".to_string(),
        };
        assert_eq!(err.to_string(), "Person not found: person-123");

        let err = StorageError::Migration {
            message: "version mismatch".to_string(),
        };
        assert_eq!(err.to_string(), "Migration failed: version mismatch");
    }

    #[test]
    fn test_wizard_error_display() {
        assert_eq!(
            WizardError::MissingSelfPerson.to_string(),
            "Self person ID is missing"
        );

        let err = WizardError::InvalidInput {
            reason: "birth year out of range".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid input: birth year out of range");

        let err = WizardError::link(
            "mother",
            StorageError::Query {
                message: "disk full".to_string(),
            },
        );
        assert_eq!(err.to_string(), "Failed to link mother: Query failed: disk full");
    }

    #[test]
    fn test_storage_error_conversion_to_app_error() {
        let storage_err = StorageError::PersonNotFound {
            person_id: "test-123".to_string(),
        };
        let app_err: AppError = storage_err.into();
        assert!(matches!(app_err, AppError::Storage(_)));
    }

    #[test]
    fn test_wizard_error_conversion_to_app_error() {
        let app_err: AppError = WizardError::MissingSelfPerson.into();
        assert!(matches!(app_err, AppError::Wizard(_)));
        assert!(app_err.to_string().contains("Self person ID is missing"));
    }
}
