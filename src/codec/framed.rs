use bytes::{Buf, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::{Config, Limits};
use crate::error::{Error, Result};
use crate::protocol::HEADER_LEN;
use crate::protocol::package::body_len;

/// Splits a byte stream into whole raw packages (header and body).
///
/// A package whose header announces a body above the configured limit is
/// yielded as its bare 4-byte header and its body is skipped on the wire
/// without being buffered. The consumer sees the announced length and
/// applies its own decode failure policy.
pub struct PackageReader<R> {
    io: R,
    read_buf: BytesMut,
    read_buffer_size: usize,
    limits: Limits,
    // body bytes of an oversized package still to be skipped
    discard: usize,
}

impl<R> PackageReader<R> {
    #[must_use]
    pub fn new(io: R, config: &Config) -> Self {
        Self {
            io,
            read_buf: BytesMut::with_capacity(config.read_buffer_size),
            read_buffer_size: config.read_buffer_size.max(HEADER_LEN),
            limits: config.limits.clone(),
            discard: 0,
        }
    }

    #[must_use]
    pub fn into_inner(self) -> R {
        self.io
    }

    /// Bytes still missing for the package at the front of the buffer.
    fn missing(&self) -> usize {
        let have = self.read_buf.len();
        if have < HEADER_LEN {
            HEADER_LEN - have
        } else {
            HEADER_LEN + body_len(&self.read_buf) - have
        }
    }
}

impl<R: AsyncRead + Unpin> PackageReader<R> {
    /// Read the next package.
    ///
    /// Returns `Ok(None)` on a clean end of stream between packages.
    /// Oversized packages come back header-only.
    ///
    /// The buffer grows by at most `read_buffer_size` per read, so memory
    /// tracks the bytes actually received rather than the announced length.
    ///
    /// ## Errors
    ///
    /// - `Error::IncompletePackage` if the stream ends mid-package
    /// - I/O errors from the underlying stream
    pub async fn read_package(&mut self) -> Result<Option<Bytes>> {
        self.skip_discarded().await?;

        loop {
            if self.read_buf.len() >= HEADER_LEN {
                let len = body_len(&self.read_buf);
                if self.limits.check_body_size(len).is_err() {
                    let header = self.read_buf.split_to(HEADER_LEN).freeze();
                    self.discard = len;
                    return Ok(Some(header));
                }

                let total = HEADER_LEN + len;
                if self.read_buf.len() >= total {
                    return Ok(Some(self.read_buf.split_to(total).freeze()));
                }
            }

            if self.fill().await? == 0 {
                if self.read_buf.is_empty() {
                    return Ok(None);
                }
                return Err(Error::IncompletePackage {
                    needed: self.missing(),
                });
            }
        }
    }

    async fn skip_discarded(&mut self) -> Result<()> {
        while self.discard > 0 {
            if self.read_buf.is_empty() && self.fill().await? == 0 {
                return Err(Error::IncompletePackage {
                    needed: self.discard,
                });
            }
            let n = self.discard.min(self.read_buf.len());
            self.read_buf.advance(n);
            self.discard -= n;
        }
        Ok(())
    }

    async fn fill(&mut self) -> Result<usize> {
        self.read_buf.reserve(self.read_buffer_size);
        Ok(self.io.read_buf(&mut self.read_buf).await?)
    }
}

/// Writes pre-encoded packages to a byte stream.
pub struct PackageWriter<W> {
    io: W,
}

impl<W> PackageWriter<W> {
    #[must_use]
    pub fn new(io: W) -> Self {
        Self { io }
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.io
    }
}

impl<W: AsyncWrite + Unpin> PackageWriter<W> {
    pub async fn write_package(&mut self, data: &[u8]) -> Result<()> {
        self.io.write_all(data).await?;
        self.io.flush().await?;
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.io.shutdown().await?;
        Ok(())
    }
}
