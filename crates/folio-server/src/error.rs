//! Server error types.
//!
//! Two families, matching how far a failure reaches:
//! - [`ServerError`]: process-level. Startup failures end the process,
//!   a shutdown timeout is only logged.
//! - [`SessionError`]: one connection. Logged by the connection task and
//!   never propagated past it.

use std::{io, path::PathBuf, time::Duration};

use thiserror::Error;

/// Errors that affect the whole server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration is missing or invalid (empty `PORT`, bad port, etc.).
    ///
    /// Fatal. Fix the environment and restart.
    #[error("configuration error: {0}")]
    Config(String),

    /// Host identity key could not be loaded or generated.
    ///
    /// Fatal. The key file is unreadable, malformed, or its directory is not
    /// writable.
    #[error("host key {}: {reason}", path.display())]
    HostKey {
        /// Key file location
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Listener could not be bound.
    ///
    /// Fatal. Usually the address is in use or not local to this host.
    #[error("failed to bind {address}: {source}")]
    Bind {
        /// Address the listener was asked to bind
        address: String,
        /// Underlying socket error
        source: io::Error,
    },

    /// Sessions were still open when the shutdown deadline passed.
    ///
    /// Not fatal: the process exits anyway and the remaining connections are
    /// torn down with it.
    #[error("shutdown timed out after {deadline:?} with {open_sessions} session(s) still open")]
    ShutdownTimeout {
        /// Connection tasks still running at the deadline
        open_sessions: usize,
        /// Deadline that elapsed
        deadline: Duration,
    },
}

/// Errors that end a single session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// SSH protocol failure (handshake, key exchange, malformed packet).
    #[error("ssh protocol error: {0}")]
    Protocol(#[from] russh::Error),

    /// Terminal output could not be produced.
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),

    /// The SSH channel went away before the session finished with it.
    #[error("session channel closed")]
    ChannelClosed,

    /// A session was started without a pseudo-terminal.
    #[error("session has no pseudo-terminal")]
    NoPty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_display() {
        let err = ServerError::Config("PORT is not set".to_string());
        assert_eq!(err.to_string(), "configuration error: PORT is not set");

        let err = ServerError::HostKey {
            path: PathBuf::from(".ssh/id_ed25519"),
            reason: "permission denied".to_string(),
        };
        assert_eq!(err.to_string(), "host key .ssh/id_ed25519: permission denied");

        let err =
            ServerError::ShutdownTimeout { open_sessions: 3, deadline: Duration::from_secs(30) };
        assert_eq!(err.to_string(), "shutdown timed out after 30s with 3 session(s) still open");
    }

    #[test]
    fn session_error_display() {
        assert_eq!(SessionError::ChannelClosed.to_string(), "session channel closed");
        assert_eq!(SessionError::NoPty.to_string(), "session has no pseudo-terminal");
    }
}
