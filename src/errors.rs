use std::error::Error;
use std::fmt::{self, Display, Formatter};

pub const CODE_FAILED: i32 = 1;

/// Custom error type for early exit.
#[derive(Debug)]
pub struct SilentExit {
    pub code: u8,
}

impl Display for SilentExit {
    fn fmt(&self, _: &mut Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}

impl Error for SilentExit {}

/// Failures the user can act on. They travel inside [`anyhow::Error`] and are
/// recovered with `downcast_ref` where the kind matters.
#[derive(Debug)]
pub enum TravaError {
    /// The argument is not a Travis CI project, build or job reference.
    InvalidReference(String),

    /// The owner/repo of the current directory could not be inferred.
    NoRemoteFound(String),

    /// The request never got an HTTP response.
    Network {
        url: String,
        source: reqwest::Error,
    },

    /// The API answered with a non-2xx status.
    Api { status: u16, body: String },
}

impl Display for TravaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidReference(msg) => write!(f, "invalid reference: {msg}"),
            Self::NoRemoteFound(msg) => write!(f, "no GitHub remote found: {msg}"),
            Self::Network { url, .. } => write!(f, "request {url} failed"),
            Self::Api { status, body } => {
                let body = body.trim().replace(['\r', '\n'], " ");
                if body.is_empty() {
                    write!(f, "Travis API error: HTTP {status}")
                } else {
                    write!(f, "Travis API error: HTTP {status}: {body}")
                }
            }
        }
    }
}

impl Error for TravaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Network { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// The process exit code for a failed run.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<SilentExit>() {
        Some(SilentExit { code }) => *code as i32,
        None => CODE_FAILED,
    }
}
