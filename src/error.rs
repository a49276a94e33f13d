use thiserror::Error;

/// Errors from the exposition server path.
///
/// Check execution failures never appear here: the engine absorbs them into
/// [`Status::Down`](crate::Status::Down) and reports them as data through
/// the health and metrics endpoints.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind health server to {address}: {source}")]
    BindFailed {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Health server terminated: {source}")]
    Terminated {
        #[source]
        source: std::io::Error,
    },

    #[error("Health server misconfigured: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, ServerError>;
