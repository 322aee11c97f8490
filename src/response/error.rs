use std::io;

use super::WriterState;

/// An error that can occur while writing a response.
#[derive(Debug)]
pub enum WriteError {
    /// The operation is not allowed in the current writer state, nothing is written.
    OrderViolation {
        operation: &'static str,
        state: WriterState,
    },
    /// Trailer field not named by the `trailer` header.
    UndeclaredTrailer(String),
    /// The transport failed, the writer is closed.
    Transport(io::Error),
}

impl WriteError {
    /// Returns `true` if the error is caused by the transport.
    #[inline]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::OrderViolation { operation, state } => {
                write!(f, "cannot {operation} while {state}")
            }
            Self::UndeclaredTrailer(name) => write!(f, "undeclared trailer: {name}"),
            Self::Transport(err) => write!(f, "transport error: {err}"),
        }
    }
}

impl From<io::Error> for WriteError {
    #[inline]
    fn from(value: io::Error) -> Self {
        Self::Transport(value)
    }
}
