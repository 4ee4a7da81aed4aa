//! Session channel seam.
//!
//! [`SessionChannel`] is everything the session lifecycle needs from an SSH
//! channel. [`RusshChannel`] implements it over a live connection; tests
//! implement it over a recording buffer.

use std::future::Future;

use russh::{ChannelId, CryptoVec, server::Handle};

use crate::SessionError;

/// Output side of one interactive SSH session channel.
pub trait SessionChannel: Clone + Send + Sync + 'static {
    /// Write terminal output to the visitor.
    fn send(&self, data: Vec<u8>) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Report the session's exit status to the visitor's client.
    fn exit(&self, status: u32) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Signal end of output and close the channel.
    fn close(&self) -> impl Future<Output = Result<(), SessionError>> + Send;
}

/// A session channel on a russh server connection.
#[derive(Clone)]
pub struct RusshChannel {
    handle: Handle,
    id: ChannelId,
}

impl RusshChannel {
    /// Wrap channel `id` of the connection behind `handle`.
    pub fn new(handle: Handle, id: ChannelId) -> Self {
        Self { handle, id }
    }
}

impl SessionChannel for RusshChannel {
    async fn send(&self, data: Vec<u8>) -> Result<(), SessionError> {
        self.handle
            .data(self.id, CryptoVec::from(data))
            .await
            .map_err(|_| SessionError::ChannelClosed)
    }

    async fn exit(&self, status: u32) -> Result<(), SessionError> {
        self.handle
            .exit_status_request(self.id, status)
            .await
            .map_err(|()| SessionError::ChannelClosed)
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.handle.eof(self.id).await.map_err(|()| SessionError::ChannelClosed)?;
        self.handle.close(self.id).await.map_err(|()| SessionError::ChannelClosed)
    }
}
