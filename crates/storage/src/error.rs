use thiserror::Error;
use uuid::Uuid;

use crate::models::ParticipantType;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("{0}")]
    NotAuthorized(String),

    #[error("Event not found")]
    EventNotFound,

    #[error("Team not found")]
    TeamNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    WrongFormat(String),

    #[error("Already registered for this event")]
    AlreadyRegistered,

    #[error("Maximum number of participants reached")]
    CapacityReached,

    #[error("Not registered for this event")]
    NotRegistered,

    #[error("You are not a member of this team")]
    NotTeamMember,

    #[error("Team size ({team_size}) does not match the event format ({required})")]
    TeamSizeMismatch { team_size: usize, required: usize },

    #[error("{0}")]
    MemberConflict(String),

    #[error("Invalid results format: {0}")]
    InvalidResultsFormat(String),

    #[error("{participant_type} not found: {participant_id}")]
    ParticipantNotFound {
        participant_type: ParticipantType,
        participant_id: Uuid,
    },

    #[error("Event format cannot change while registrations exist")]
    FormatLocked,

    #[error("Team already has the maximum of {0} members")]
    TeamFull(usize),

    #[error("User is already a member of this team")]
    AlreadyMember,

    #[error("{0}")]
    TeamBusy(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Coarse error taxonomy the API layer maps onto status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotAuthenticated,
    NotAuthorized,
    NotFound,
    Validation,
    Conflict,
    Internal,
}

impl StorageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Database(_) | Self::Migration(_) => ErrorKind::Internal,
            Self::NotAuthenticated => ErrorKind::NotAuthenticated,
            Self::NotAuthorized(_) | Self::NotTeamMember => ErrorKind::NotAuthorized,
            Self::NotFound
            | Self::EventNotFound
            | Self::TeamNotFound
            | Self::UserNotFound
            | Self::NotRegistered
            | Self::ParticipantNotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) | Self::WrongFormat(_) | Self::InvalidResultsFormat(_) => {
                ErrorKind::Validation
            }
            Self::ConstraintViolation(_)
            | Self::AlreadyRegistered
            | Self::CapacityReached
            | Self::TeamSizeMismatch { .. }
            | Self::MemberConflict(_)
            | Self::FormatLocked
            | Self::TeamFull(_)
            | Self::AlreadyMember
            | Self::TeamBusy(_) => ErrorKind::Conflict,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }

    /// Swap a unique violation for a domain error, leave everything else alone
    pub fn on_unique_violation(self, replacement: StorageError) -> StorageError {
        if self.is_unique_violation() {
            replacement
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_errors_are_conflicts() {
        assert_eq!(StorageError::AlreadyRegistered.kind(), ErrorKind::Conflict);
        assert_eq!(StorageError::CapacityReached.kind(), ErrorKind::Conflict);
        assert_eq!(
            StorageError::TeamSizeMismatch {
                team_size: 3,
                required: 2
            }
            .kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_lookup_errors_are_not_found() {
        assert_eq!(StorageError::EventNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(
            StorageError::ParticipantNotFound {
                participant_type: ParticipantType::Team,
                participant_id: Uuid::nil(),
            }
            .kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_participant_not_found_message_names_type() {
        let err = StorageError::ParticipantNotFound {
            participant_type: ParticipantType::User,
            participant_id: Uuid::nil(),
        };
        assert_eq!(
            err.to_string(),
            "user not found: 00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_non_database_error_survives_unique_mapping() {
        let err = StorageError::NotFound.on_unique_violation(StorageError::AlreadyRegistered);
        assert!(matches!(err, StorageError::NotFound));
    }
}
