//! Fixed-size units of a square.

use crate::namespace::{Namespace, NAMESPACE_SIZE};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use thiserror::Error;

/// Length of a [Share] in bytes.
pub const SHARE_SIZE: usize = 256;

/// Bytes following the namespace of a compact share that locate the first unit starting in it.
pub const RESERVED_BYTES: usize = 1;

/// Bytes of payload carried by a compact (transaction or evidence) share.
pub const COMPACT_SHARE_DATA_SIZE: usize = SHARE_SIZE - NAMESPACE_SIZE - RESERVED_BYTES;

/// Bytes of payload carried by a message share.
pub const MESSAGE_SHARE_DATA_SIZE: usize = SHARE_SIZE - NAMESPACE_SIZE;

/// Errors that can occur when interpreting bytes as a [Share].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("invalid share length: {0}")]
    InvalidLength(usize),
}

/// A namespace followed by [SHARE_SIZE] - [NAMESPACE_SIZE] bytes of data.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Share(Bytes);

impl Share {
    /// Interprets `bytes` as a share.
    pub fn new(bytes: Bytes) -> Result<Self, Error> {
        if bytes.len() != SHARE_SIZE {
            return Err(Error::InvalidLength(bytes.len()));
        }
        Ok(Self(bytes))
    }

    /// Freezes a buffer that was filled to exactly [SHARE_SIZE] bytes.
    pub(crate) fn from_buf(buf: BytesMut) -> Self {
        assert_eq!(buf.len(), SHARE_SIZE, "share not filled");
        Self(buf.freeze())
    }

    /// Creates a share holding only `namespace` and zeroes.
    pub fn padding(namespace: Namespace) -> Self {
        let mut buf = BytesMut::with_capacity(SHARE_SIZE);
        buf.put_slice(namespace.as_ref());
        buf.resize(SHARE_SIZE, 0);
        Self::from_buf(buf)
    }

    /// Returns the namespace of the share.
    pub fn namespace(&self) -> Namespace {
        let mut namespace = [0u8; NAMESPACE_SIZE];
        namespace.copy_from_slice(&self.0[..NAMESPACE_SIZE]);
        Namespace::new(namespace)
    }

    /// Returns everything after the namespace.
    pub fn data(&self) -> &[u8] {
        &self.0[NAMESPACE_SIZE..]
    }

    /// Returns true if everything after the namespace is zero.
    pub fn is_padding(&self) -> bool {
        self.data().iter().all(|byte| *byte == 0)
    }
}

impl AsRef<[u8]> for Share {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Share> for Bytes {
    fn from(share: Share) -> Self {
        share.0
    }
}

impl fmt::Debug for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Share")
            .field("namespace", &self.namespace().to_string())
            .field("padding", &self.is_padding())
            .finish()
    }
}

/// Returns `count` padding shares under `namespace`.
pub fn padding(namespace: Namespace, count: usize) -> Vec<Share> {
    vec![Share::padding(namespace); count]
}
