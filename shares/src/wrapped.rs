//! Transactions that declare where their message begins.
//!
//! When a block proposer includes a message, it wraps the transaction paying for that
//! message together with the share index at which the message will start. Older blocks
//! wrap transactions without a share index (encoded as zero), in which case no index in the
//! block can be trusted.

use bytes::Bytes;
use prost::Message as _;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Length of the hash of an original transaction.
pub const HASH_SIZE: usize = 32;

/// A transaction wrapped with the share index of its message.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WrappedTx {
    /// SHA-256 hash of the transaction before it was modified by the proposer.
    #[prost(bytes = "bytes", tag = "1")]
    pub original_tx_hash: Bytes,
    /// The transaction included in the block.
    #[prost(bytes = "bytes", tag = "2")]
    pub tx: Bytes,
    /// Index of the first share of the message, or zero if unknown.
    #[prost(uint32, tag = "3")]
    pub share_index: u32,
}

impl WrappedTx {
    /// Wraps `tx`, derived from `original`, with the share index of its message.
    pub fn new(original: &[u8], tx: impl Into<Bytes>, share_index: u32) -> Self {
        Self {
            original_tx_hash: Bytes::copy_from_slice(&Sha256::digest(original)),
            tx: tx.into(),
            share_index,
        }
    }

    /// Returns the encoded wrapped transaction.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.encode_to_vec())
    }
}

/// Returns the wrapped transaction encoded in `tx`, if any.
///
/// A transaction is considered wrapped if it decodes and carries a hash of the expected size.
pub fn unwrap(tx: &[u8]) -> Option<WrappedTx> {
    let wrapped = WrappedTx::decode(tx).ok()?;
    (wrapped.original_tx_hash.len() == HASH_SIZE).then_some(wrapped)
}

/// Share indexes declared by the wrapped transactions of a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShareIndexes {
    /// The block does not declare where its messages start.
    Absent,
    /// The (non-empty) declared start of each message.
    Declared(Vec<u32>),
}

impl ShareIndexes {
    /// Sorts declared indexes in ascending order.
    pub fn sorted(self) -> Self {
        match self {
            Self::Absent => Self::Absent,
            Self::Declared(mut indexes) => {
                indexes.sort_unstable();
                Self::Declared(indexes)
            }
        }
    }

    /// Returns the declared indexes, if any.
    pub fn declared(&self) -> Option<&[u32]> {
        match self {
            Self::Absent => None,
            Self::Declared(indexes) => Some(indexes),
        }
    }
}

/// Extracts the share indexes declared by `txs`, in transaction order.
///
/// Returns [ShareIndexes::Absent] if no transaction is wrapped or if any wrapped
/// transaction declares index zero (a message is always preceded by at least the share
/// holding its transaction, so zero marks a block that predates share indexes).
pub fn extract<T: AsRef<[u8]>>(txs: &[T]) -> ShareIndexes {
    let mut indexes = Vec::new();
    for (position, tx) in txs.iter().enumerate() {
        let Some(wrapped) = unwrap(tx.as_ref()) else {
            continue;
        };
        if wrapped.share_index == 0 {
            debug!(tx = position, "wrapped transaction without share index");
            return ShareIndexes::Absent;
        }
        indexes.push(wrapped.share_index);
    }
    if indexes.is_empty() {
        return ShareIndexes::Absent;
    }
    ShareIndexes::Declared(indexes)
}
