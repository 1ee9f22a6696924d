//! Owned output buffers
//!
//! Encoding hands the caller a [`WireBuffer`]: an exactly-sized, exclusively
//! owned byte buffer that shares nothing with converter state.

use std::fmt;
use std::ops::Deref;

/// Default buffer size for sink I/O (64KB)
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Small buffer size for memory-constrained scenarios (4KB)
pub const SMALL_BUFFER_SIZE: usize = 4 * 1024;

/// Encoded payload returned by [`ByteConverter::encode`](crate::ByteConverter::encode)
///
/// # Examples
/// ```
/// use embeddenator_codec::WireBuffer;
///
/// let buffer = WireBuffer::from(vec![1u8, 2, 3]);
/// assert_eq!(buffer.len(), 3);
/// assert_eq!(&buffer[..], &[1, 2, 3]);
///
/// let (ptr, len) = buffer.as_raw_parts();
/// assert!(!ptr.is_null());
/// assert_eq!(len, 3);
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct WireBuffer {
    bytes: Box<[u8]>,
}

impl WireBuffer {
    /// Freeze an encoder's output. The vector is shrunk to its length so
    /// the buffer never carries spare capacity.
    pub(crate) fn from_encoded(mut bytes: Vec<u8>) -> Self {
        bytes.shrink_to_fit();
        Self {
            bytes: bytes.into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Pointer/length view for handing the payload across an FFI boundary.
    pub fn as_raw_parts(&self) -> (*const u8, usize) {
        (self.bytes.as_ptr(), self.bytes.len())
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes.into_vec()
    }

    pub fn into_boxed_slice(self) -> Box<[u8]> {
        self.bytes
    }
}

impl Deref for WireBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for WireBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for WireBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_encoded(bytes)
    }
}

impl From<WireBuffer> for Vec<u8> {
    fn from(buffer: WireBuffer) -> Self {
        buffer.into_vec()
    }
}

impl fmt::Debug for WireBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireBuffer")
            .field("len", &self.bytes.len())
            .finish()
    }
}
