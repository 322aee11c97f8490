use bytes::{Buf, BytesMut};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Default initial read buffer capacity.
pub const DEFAULT_BUFFER_CAP: usize = 1024;

const MIN_GROW: usize = 64;

/// Append only read buffer.
///
/// Bytes are appended at the end by reads and removed from the front by [`consume`]. When the
/// buffer is full, it grows geometrically, reclaiming the consumed prefix first when possible.
///
/// [`consume`]: ReadBuffer::consume
#[derive(Debug)]
pub struct ReadBuffer {
    bytes: BytesMut,
}

impl Default for ReadBuffer {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ReadBuffer {
    /// Create new [`ReadBuffer`] with the default capacity.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAP)
    }

    /// Create new [`ReadBuffer`] with at least the specified capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { bytes: BytesMut::with_capacity(capacity) }
    }

    /// Returns bytes that have not been consumed.
    #[inline]
    pub fn unconsumed(&self) -> &[u8] {
        &self.bytes
    }

    /// Remove `n` bytes from the front.
    ///
    /// # Panics
    ///
    /// Panics if `n` is larger than the unconsumed length.
    #[inline]
    pub fn consume(&mut self, n: usize) {
        self.bytes.advance(n);
    }

    /// Append bytes at the end.
    #[inline]
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Returns the unconsumed length.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if there is no unconsumed byte.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the number of bytes the buffer can hold without growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Removes all unconsumed bytes.
    #[inline]
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Read from `io` and append to the buffer.
    ///
    /// Returns the number of bytes read, `0` means the stream has ended.
    pub async fn read_from<IO>(&mut self, io: &mut IO) -> io::Result<usize>
    where
        IO: AsyncRead + Unpin,
    {
        if self.bytes.len() == self.bytes.capacity() {
            // `reserve` copies the unconsumed bytes to the front of the allocation when the
            // consumed prefix is large enough, otherwise it reallocates
            let additional = self.bytes.len().max(MIN_GROW);
            self.bytes.reserve(additional);
        }
        io.read_buf(&mut self.bytes).await
    }
}
