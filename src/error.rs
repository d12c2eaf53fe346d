use crate::note::RecordId;
use thiserror::Error;

/// Failures raised by the audit core and its collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// A record id no longer resolves in the store.
    #[error("Record {0} not found")]
    LookupMiss(RecordId),

    /// The entry point was invoked without any selected records.
    #[error("No records selected")]
    EmptySelection,

    /// The preference store could not write the value back.
    #[error("Could not persist preference {key}: {reason}")]
    PreferencePersist { key: String, reason: String },

    /// The session is not accepting interaction.
    #[error("Audit session is not ready")]
    NotReady,

    /// No chip is displayed for this tag.
    #[error("Tag {0} is not displayed")]
    UnknownTag(String),

    /// No chip is displayed at this index (0-based).
    #[error("No chip at position {0}")]
    UnknownChip(usize),
}
