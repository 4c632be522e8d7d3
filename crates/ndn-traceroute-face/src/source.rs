//! Framed TLV reader.

use ndn_traceroute_core::TracerouteError;
use ndn_traceroute_tlv::{Block, MAX_NDN_PACKET_SIZE};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

/// Reads whole top-level TLV elements from a byte stream.
///
/// [`read_frame`](Self::read_frame) is cancel-safe: bytes already received
/// stay buffered when the future is dropped.
pub struct FrameSource {
    inner: Box<dyn AsyncRead + Send + Unpin>,
    buf: Vec<u8>,
    scratch: Vec<u8>,
}

impl FrameSource {
    pub fn new(inner: Box<dyn AsyncRead + Send + Unpin>) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(MAX_NDN_PACKET_SIZE),
            scratch: vec![0; MAX_NDN_PACKET_SIZE],
        }
    }

    /// Reads the next frame.
    ///
    /// Fails with [`TracerouteError::FaceClosed`] at end of stream, and with a
    /// TLV error if the stream carries a frame that cannot be delimited.
    pub async fn read_frame(&mut self) -> Result<Block, TracerouteError> {
        loop {
            if let Some((block, used)) = Block::try_decode_frame(&self.buf)? {
                self.buf.drain(..used);
                trace!(typ = block.typ(), len = used, "Received frame");
                return Ok(block);
            }

            let n = self.inner.read(&mut self.scratch).await?;
            if n == 0 {
                return Err(TracerouteError::FaceClosed);
            }
            self.buf.extend_from_slice(&self.scratch[..n]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_frames_split_across_reads() {
        let (mut tx, rx) = tokio::io::duplex(64);
        let mut source = FrameSource::new(Box::new(rx));

        let first = Block::new(0x06, vec![1, 2, 3]).to_wire();
        let second = Block::new(0x05, vec![4; 10]).to_wire();
        let mut wire = first.clone();
        wire.extend_from_slice(&second);

        let writer = tokio::spawn(async move {
            for chunk in wire.chunks(3) {
                tx.write_all(chunk).await.unwrap();
                tx.flush().await.unwrap();
                tokio::task::yield_now().await;
            }
        });

        assert_eq!(source.read_frame().await.unwrap().to_wire(), first);
        assert_eq!(source.read_frame().await.unwrap().to_wire(), second);
        writer.await.unwrap();

        assert!(matches!(
            source.read_frame().await,
            Err(TracerouteError::FaceClosed)
        ));
    }

    #[tokio::test]
    async fn test_oversized_frame_is_fatal() {
        let (mut tx, rx) = tokio::io::duplex(64);
        let mut source = FrameSource::new(Box::new(rx));

        // Type 0x06 with a four-byte length far beyond the packet size limit.
        tx.write_all(&[0x06, 0xFE, 0x00, 0x01, 0x00, 0x00]).await.unwrap();
        assert!(matches!(
            source.read_frame().await,
            Err(TracerouteError::Tlv(_))
        ));
    }

    #[tokio::test]
    async fn test_maximum_length_field_is_fatal() {
        let (mut tx, rx) = tokio::io::duplex(64);
        let mut source = FrameSource::new(Box::new(rx));

        let mut frame = vec![0x06, 0xFF];
        frame.extend_from_slice(&u64::MAX.to_be_bytes());
        tx.write_all(&frame).await.unwrap();
        assert!(matches!(
            source.read_frame().await,
            Err(TracerouteError::Tlv(_))
        ));
    }
}
