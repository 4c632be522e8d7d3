//! Framed TLV writer.

use ndn_traceroute_core::TracerouteError;
use ndn_traceroute_tlv::Block;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

/// Writes TLV elements to a byte stream.
pub struct FrameSink {
    inner: Box<dyn AsyncWrite + Send + Unpin>,
}

impl FrameSink {
    pub fn new(inner: Box<dyn AsyncWrite + Send + Unpin>) -> Self {
        Self { inner }
    }

    /// Writes one block and flushes it.
    pub async fn write_block(&mut self, block: &Block) -> Result<(), TracerouteError> {
        let wire = block.to_wire();
        trace!(typ = block.typ(), len = wire.len(), "Sending frame");
        self.inner.write_all(&wire).await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Shuts down the write side of the stream.
    pub async fn close(&mut self) -> Result<(), TracerouteError> {
        self.inner.shutdown().await?;
        Ok(())
    }
}
