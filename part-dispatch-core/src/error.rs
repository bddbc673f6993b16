//! Error types for component definition and dispatch

use thiserror::Error;

/// Boxed error raised by user-supplied setup, part, or scope functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced while defining, registering, or dispatching components.
#[derive(Error, Debug)]
pub enum Error {
    /// Component name was empty or whitespace.
    #[error("component name must not be empty")]
    EmptyName,

    /// Component name is not usable as a directive name.
    #[error("component name `{0}` is not a valid identifier")]
    InvalidName(String),

    /// A declared part key normalizes to nothing.
    #[error("component `{component}` declares a part with an empty key")]
    EmptyPartKey {
        /// Owning component.
        component: String,
    },

    /// Two declared part keys normalize to the same name.
    #[error("component `{component}` declares part `{part}` more than once")]
    DuplicatePart {
        /// Owning component.
        component: String,
        /// Normalized part key.
        part: String,
    },

    /// A declared part is not a member of the closed part-key set.
    #[error("component `{component}` declares part `{part}` outside its part-key set")]
    UndeclaredPart {
        /// Owning component.
        component: String,
        /// Normalized part key.
        part: String,
    },

    /// A member of the closed part-key set has no handler.
    #[error("component `{component}` has no handler for part `{part}`")]
    MissingPart {
        /// Owning component.
        component: String,
        /// Normalized part key.
        part: String,
    },

    /// A part element was evaluated before its root built the Api.
    #[error("part `{part}` of component `{component}` has no constructed api; the root must be processed first")]
    MissingApi {
        /// Owning component.
        component: String,
        /// Raw part name from the directive.
        part: String,
    },

    /// The host's reactive wrapper did not preserve the wrapped value's type.
    #[error("host reactive wrapper changed the type of `{0}`")]
    ReactiveMismatch(String),

    /// The host was dropped while a directive evaluation was still pending.
    #[error("host framework was dropped before directive evaluation completed")]
    HostDropped,

    /// Configuration could not be parsed.
    #[error("invalid dispatch configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Error raised by user code; passed through unmodified.
    #[error("{0}")]
    Handler(#[source] BoxError),
}

impl Error {
    /// Wrap an error raised inside a setup, part, or scope function.
    pub fn handler(err: impl Into<BoxError>) -> Self {
        Error::Handler(err.into())
    }
}

/// Result type for part-dispatch operations.
pub type Result<T> = std::result::Result<T, Error>;
