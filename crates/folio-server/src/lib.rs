//! Folio SSH server.
//!
//! Serves the portfolio view to every visitor over SSH, using russh for the
//! protocol and Tokio for the async runtime.
//!
//! # Architecture
//!
//! Each accepted TCP connection gets its own task. russh drives the protocol
//! and calls into [`ConnectionHandler`], which forwards the relevant events
//! to the session side. There the session passes the middleware
//! [`Pipeline`], is built by [`create_session`] and runs the generic
//! [`folio_app::Runtime`] over an [`SshTerminal`] driver.
//!
//! # Components
//!
//! - [`Server`]: listener, host key and per-connection tasks
//! - [`ServerHandle`]: graceful shutdown with a deadline
//! - [`Pipeline`]: ordered middleware stages ([`Logging`], [`ActiveTerm`])
//! - [`SshTerminal`]: [`folio_app::Driver`] over a [`SessionChannel`]

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod channel;
pub mod config;
mod error;
mod handler;
pub mod host_key;
mod middleware;
mod session;
mod terminal;

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

pub use channel::{RusshChannel, SessionChannel};
pub use config::{AppEnv, Args, ServerConfig};
pub use error::{ServerError, SessionError};
pub use handler::{ConnectionEvent, ConnectionHandler};
pub use middleware::{ActiveTerm, Admission, Flow, Logging, Middleware, NO_PTY_MESSAGE, Pipeline};
use russh::Disconnect;
pub use session::{
    LoopOptions, PtySize, REJECTED_EXIT_STATUS, SessionContext, SessionInfo, create_session, serve,
};
pub use terminal::{ChannelBackend, ChannelWriter, SshTerminal};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::mpsc,
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

/// Deadline the process gives open sessions on shutdown.
pub const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(30);

/// Delay before answering a failed authentication attempt.
const AUTH_REJECTION_TIME: Duration = Duration::from_secs(1);

/// Set of running connection tasks that can be shut down together.
#[derive(Debug, Clone, Default)]
pub struct Sessions {
    shutdown: CancellationToken,
    tracker: TaskTracker,
}

impl Sessions {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Token cancelled when shutdown begins.
    pub fn token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run `task` as part of the set.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        drop(self.tracker.spawn(task));
    }

    /// Number of tasks still running.
    pub fn open(&self) -> usize {
        self.tracker.len()
    }

    /// Ask every task to finish and wait for them, up to `deadline`.
    ///
    /// # Errors
    ///
    /// [`ServerError::ShutdownTimeout`] if tasks are still running at the
    /// deadline. They are left to be torn down with the process.
    pub async fn shutdown(&self, deadline: Duration) -> Result<(), ServerError> {
        self.shutdown.cancel();
        self.tracker.close();

        match tokio::time::timeout(deadline, self.tracker.wait()).await {
            Ok(()) => Ok(()),
            Err(_) => Err(ServerError::ShutdownTimeout { open_sessions: self.open(), deadline }),
        }
    }
}

/// Cloneable handle to stop a running [`Server`].
#[derive(Debug, Clone)]
pub struct ServerHandle {
    sessions: Sessions,
}

impl ServerHandle {
    /// Stop accepting connections and close every session.
    ///
    /// Sessions see a server shutdown and restore their visitor's terminal;
    /// connections still negotiating are dropped.
    ///
    /// # Errors
    ///
    /// [`ServerError::ShutdownTimeout`] if sessions remain open past
    /// `deadline`.
    pub async fn shutdown(&self, deadline: Duration) -> Result<(), ServerError> {
        tracing::info!(open_sessions = self.sessions.open(), "shutting down sessions");
        self.sessions.shutdown(deadline).await
    }

    /// Number of connections currently open.
    pub fn open_sessions(&self) -> usize {
        self.sessions.open()
    }
}

/// Production folio server.
pub struct Server {
    listener: TcpListener,
    ssh: Arc<russh::server::Config>,
    context: Arc<SessionContext>,
    sessions: Sessions,
}

impl Server {
    /// Load the host key and bind the listener.
    ///
    /// # Errors
    ///
    /// [`ServerError::HostKey`] or [`ServerError::Bind`]; both are startup
    /// failures.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        let key = host_key::load_or_generate(&config.host_key_path)?;
        let ssh = russh::server::Config {
            keys: vec![key],
            inactivity_timeout: Some(config.idle_timeout),
            auth_rejection_time: AUTH_REJECTION_TIME,
            auth_rejection_time_initial: Some(Duration::ZERO),
            ..Default::default()
        };

        let address = config.address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind { address, source })?;

        let context = SessionContext::default();
        tracing::debug!(stages = ?context.pipeline.names().collect::<Vec<_>>(), "session pipeline");

        Ok(Self {
            listener,
            ssh: Arc::new(ssh),
            context: Arc::new(context),
            sessions: Sessions::new(),
        })
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle for shutting the server down.
    pub fn handle(&self) -> ServerHandle {
        ServerHandle { sessions: self.sessions.clone() }
    }

    /// Accept connections until shutdown begins.
    ///
    /// Accept errors are logged and the loop continues.
    pub async fn listen_and_serve(self) {
        let shutdown = self.sessions.token();

        loop {
            let accepted = tokio::select! {
                biased;

                () = shutdown.cancelled() => break,
                accepted = self.listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer)) => {
                    tracing::debug!(%peer, "accepted connection");
                    let ssh = Arc::clone(&self.ssh);
                    let context = Arc::clone(&self.context);
                    let token = self.sessions.token();

                    self.sessions.spawn(async move {
                        match handle_connection(ssh, stream, peer, &context, token).await {
                            Ok(()) => {},
                            Err(SessionError::ChannelClosed) => {
                                tracing::debug!(%peer, "session channel closed early");
                            },
                            Err(e) => tracing::warn!(%peer, "connection error: {}", e),
                        }
                    });
                },
                Err(e) => {
                    tracing::error!("accept error: {}", e);
                },
            }
        }

        tracing::info!("stopped accepting connections");
    }
}

/// Run one SSH connection to completion.
async fn handle_connection(
    ssh: Arc<russh::server::Config>,
    stream: TcpStream,
    peer: SocketAddr,
    context: &SessionContext,
    shutdown: CancellationToken,
) -> Result<(), SessionError> {
    let (events, inbox) = mpsc::unbounded_channel();
    let handler = ConnectionHandler::new(events);

    let running = tokio::select! {
        running = russh::server::run_stream(ssh, stream, handler) => running?,
        () = shutdown.cancelled() => return Ok(()),
    };
    let connection = running.handle();

    let session = async {
        let outcome = serve(inbox, Some(peer), context, shutdown).await;
        // Queued after the session's final output, so nothing is cut off.
        let _ = connection
            .disconnect(Disconnect::ByApplication, String::new(), "en".to_string())
            .await;
        outcome
    };

    let (protocol, outcome) = tokio::join!(running, session);
    if let Some(end) = outcome? {
        tracing::debug!(%peer, ?end, "session ended");
    }
    if let Err(e) = protocol {
        tracing::debug!(%peer, "ssh connection ended with error: {}", e);
    }
    Ok(())
}
