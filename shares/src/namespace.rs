//! Namespace identifiers and the reserved namespaces of a square.

use std::fmt;

/// Length of a [Namespace] in bytes.
pub const NAMESPACE_SIZE: usize = 8;

/// Identifier prefixed to every share, ordering shares within a square.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Namespace([u8; NAMESPACE_SIZE]);

impl Namespace {
    /// Creates a namespace from its raw bytes.
    pub const fn new(bytes: [u8; NAMESPACE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes of the namespace.
    pub const fn as_bytes(&self) -> &[u8; NAMESPACE_SIZE] {
        &self.0
    }
}

impl From<[u8; NAMESPACE_SIZE]> for Namespace {
    fn from(bytes: [u8; NAMESPACE_SIZE]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Namespace {
    type Error = std::array::TryFromSliceError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        <[u8; NAMESPACE_SIZE]>::try_from(value).map(Self)
    }
}

impl AsRef<[u8]> for Namespace {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.as_bytes() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Namespace of transaction shares.
pub const TX: Namespace = Namespace([0, 0, 0, 0, 0, 0, 0, 1]);

/// Namespace of evidence shares.
pub const EVIDENCE: Namespace = Namespace([0, 0, 0, 0, 0, 0, 0, 3]);

/// Largest namespace reserved for block data other than messages.
pub const MAX_RESERVED: Namespace = Namespace([0, 0, 0, 0, 0, 0, 0, 255]);

/// Namespace of the padding that fills a square after all messages.
pub const TAIL_PADDING: Namespace = Namespace([255, 255, 255, 255, 255, 255, 255, 254]);

/// Namespace of parity shares produced by erasure coding.
pub const PARITY: Namespace = Namespace([255; NAMESPACE_SIZE]);

/// The reserved namespaces used when laying out a square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Namespaces {
    /// Namespace of transaction shares (and of alignment padding when a block has no evidence).
    pub tx: Namespace,
    /// Namespace of evidence shares.
    pub evidence: Namespace,
    /// Namespace of the tail padding, sorting after every message.
    pub tail_padding: Namespace,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self {
            tx: TX,
            evidence: EVIDENCE,
            tail_padding: TAIL_PADDING,
        }
    }
}

impl Namespaces {
    /// Returns true if the reserved namespaces are strictly increasing.
    pub fn is_valid(&self) -> bool {
        self.tx < self.evidence && self.evidence < self.tail_padding
    }

    /// Returns true if `namespace` may carry a message.
    ///
    /// Messages sort strictly between evidence and tail padding.
    pub fn is_message(&self, namespace: &Namespace) -> bool {
        *namespace > self.evidence && *namespace < self.tail_padding
    }
}
