//! Error types for the CEL engine

use thiserror::Error;

/// Result type alias for CEL engine operations
pub type CelResult<T> = Result<T, CelError>;

/// Comprehensive error types for CEL engine operations
#[derive(Error, Debug)]
pub enum CelError {
    /// `cel.conf` failed to parse or failed pre-apply validation.
    /// The previously active configuration remains in effect.
    #[error("config error: {message}")]
    ConfigError { message: String },

    /// An unrecognized event name appeared in an `events =` list.
    #[error("unknown event name in config: {name}")]
    UnknownEventName { name: String },

    /// `apps =` is non-empty but neither APP_START nor APP_END is tracked,
    /// so the app filter could never match anything.
    #[error("apps configured but APP_START/APP_END not tracked")]
    AppsWithoutAppEvents,

    /// A linked-id acquire was attempted with an empty linked-id string.
    /// This is a programming error at the call site, not a runtime condition.
    #[error("attempted to acquire an empty linkedid")]
    EmptyLinkedId,

    /// A retirement check found no tracked entry for `linkedid`. "Weird",
    /// per `spec.md` §7 — logged and tolerated, never surfaced as an
    /// `Err` to a caller. Kept as a variant purely so the one log call
    /// site in `linkedid.rs` formats consistently with every other error.
    #[error("retirement check on untracked linkedid: {linkedid}")]
    MissingLinkedId { linkedid: String },

    /// A backend was registered under an empty name.
    #[error("backend name must not be empty")]
    BackendNameEmpty,

    /// A backend was registered under a name that is already in use.
    #[error("backend already registered: {name}")]
    DuplicateBackend { name: String },

    /// A backend name was targeted for unregistration but isn't registered.
    #[error("no such backend: {name}")]
    UnknownBackend { name: String },
}

impl CelError {
    /// Create a config error with a custom message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Whether the engine's prior state is left unchanged by this error.
    /// True for every config-load failure: the old `CelConfig` stays active.
    pub fn leaves_prior_state_intact(&self) -> bool {
        matches!(
            self,
            CelError::ConfigError { .. }
                | CelError::UnknownEventName { .. }
                | CelError::AppsWithoutAppEvents
        )
    }
}
