//! Lay out the data of a block as a square of shares.
//!
//! # Layout
//!
//! A square of width `size` holds exactly `size * size` shares, in namespace order:
//!
//! 1. Transactions, packed contiguously under the transaction namespace.
//! 2. Evidence, packed contiguously under the evidence namespace.
//! 3. Alignment padding, continuing the namespace of the preceding region, so that the
//!    first message starts at its [non-interactive default](crate::alignment) position.
//! 4. Messages, each starting a fresh share. When the block declares share indexes
//!    (see [crate::wrapped]), padding under the namespace of the preceding message moves
//!    every subsequent message to its declared index.
//! 5. Tail padding, filling the rest of the square.
//!
//! Any node holding the same block data computes the same square, byte for byte.

use crate::{
    alignment::next_aligned_start,
    compact::CompactWriter,
    evidence::Evidence,
    message::{self, Message, MessageWriter},
    namespace::{Namespace, Namespaces},
    share::{self, Share},
    wrapped::{self, ShareIndexes},
};
use bytes::Bytes;
use std::ops::Range;
use thiserror::Error;
use tracing::debug;

/// Default upper bound on the width of a square.
pub const MAX_SQUARE_SIZE: u64 = 128;

/// Errors that can occur when laying out a square.
#[derive(Error, Debug)]
pub enum Error {
    #[error("square size is not a power of two: {0}")]
    InvalidSquareSize(u64),
    #[error("square size {size} exceeds maximum {max}")]
    SquareSizeTooLarge { size: u64, max: u64 },
    #[error("reserved namespaces are not strictly increasing")]
    InvalidNamespaces,
    #[error("message {index} has namespace {namespace} outside the message range")]
    InvalidMessageNamespace { index: usize, namespace: Namespace },
    #[error("message {0} is not sorted by namespace")]
    UnsortedMessages(usize),
    #[error("failed to encode evidence {index}: {source}")]
    EvidenceEncoding {
        index: usize,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("the first message started at an unexpected index: expected {expected}, found {found}")]
    UnexpectedFirstMessageIndex { expected: usize, found: u32 },
    #[error("number of share indexes ({indexes}) does not match number of messages ({messages})")]
    IndexCountMismatch { indexes: usize, messages: usize },
    #[error("message declared at share {index} would overlap share {cursor}")]
    UnexpectedMessageIndex { index: u32, cursor: usize },
    #[error("square overflow: {required} shares required, {capacity} available")]
    SquareOverflow { capacity: usize, required: usize },
    #[error("message writer: {0}")]
    Message(#[from] message::Error),
}

/// Configuration for laying out a square.
#[derive(Clone, Debug)]
pub struct Config {
    /// The reserved namespaces of the square.
    pub namespaces: Namespaces,
    /// The largest square width accepted.
    pub max_square_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespaces: Namespaces::default(),
            max_square_size: MAX_SQUARE_SIZE,
        }
    }
}

/// The data of a block.
#[derive(Clone, Debug)]
pub struct Data<E> {
    /// Width of the square (must be a power of two).
    pub square_size: u64,
    /// Transactions, some of which may be wrapped (see [crate::wrapped]).
    pub txs: Vec<Bytes>,
    /// Evidence of misbehavior.
    pub evidence: Vec<E>,
    /// Messages, sorted by namespace.
    pub messages: Vec<Message>,
}

/// A contiguous range of shares in a [Square].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    Transactions,
    Evidence,
    AlignmentPadding,
    Messages,
    TailPadding,
}

/// A block laid out as a square of shares.
#[derive(Clone, Debug)]
pub struct Square {
    size: usize,
    shares: Vec<Share>,
    regions: Vec<(Region, Range<usize>)>,
    message_starts: Vec<usize>,
}

impl Square {
    /// Returns the width of the square.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns all shares, row by row.
    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    /// Returns all shares, row by row.
    pub fn into_shares(self) -> Vec<Share> {
        self.shares
    }

    /// Returns the range of shares occupied by `region` (empty if the region holds no shares).
    pub fn region(&self, region: Region) -> Range<usize> {
        self.regions
            .iter()
            .find(|(r, _)| *r == region)
            .map(|(_, range)| range.clone())
            .unwrap_or_default()
    }

    /// Returns the index of the first share of message `index`.
    pub fn message_start(&self, index: usize) -> Option<usize> {
        self.message_starts.get(index).copied()
    }

    /// Returns the shares of row `row`.
    pub fn row(&self, row: usize) -> Option<&[Share]> {
        (row < self.size).then(|| &self.shares[row * self.size..(row + 1) * self.size])
    }
}

/// Accumulates the regions of a square in order.
struct Layout {
    shares: Vec<Share>,
    regions: Vec<(Region, Range<usize>)>,
}

impl Layout {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            shares: Vec::with_capacity(capacity),
            regions: Vec::with_capacity(5),
        }
    }

    /// Returns the index of the next share to be placed.
    fn cursor(&self) -> usize {
        self.shares.len()
    }

    fn push(&mut self, region: Region, shares: Vec<Share>) {
        let start = self.cursor();
        self.shares.extend(shares);
        let range = start..self.cursor();
        debug!(?region, start = range.start, end = range.end, "placed region");
        self.regions.push((region, range));
    }

    fn finish(self, size: usize, message_starts: Vec<usize>) -> Square {
        assert_eq!(self.shares.len(), size * size, "square not filled");
        Square {
            size,
            shares: self.shares,
            regions: self.regions,
            message_starts,
        }
    }
}

/// Splits `txs` into shares under `namespace`.
pub fn split_txs(namespace: Namespace, txs: &[Bytes]) -> Vec<Share> {
    let mut writer = CompactWriter::new(namespace);
    for tx in txs {
        writer.write(tx);
    }
    writer.export()
}

/// Splits `evidence` into shares under `namespace`.
pub fn split_evidence<E: Evidence>(
    namespace: Namespace,
    evidence: &[E],
) -> Result<Vec<Share>, Error> {
    let mut writer = CompactWriter::new(namespace);
    for (index, item) in evidence.iter().enumerate() {
        let encoded = item
            .encode_evidence()
            .map_err(|err| Error::EvidenceEncoding {
                index,
                source: Box::new(err),
            })?;
        writer.write(&encoded);
    }
    Ok(writer.export())
}

/// Splits `messages` into shares, the first starting at share `cursor`.
///
/// If `indexes` are declared, padding is inserted after each message so that the next one
/// starts at its declared index. Declared indexes at or beyond `capacity` are rejected
/// before any padding is written.
pub fn split_messages(
    cursor: usize,
    capacity: usize,
    indexes: &ShareIndexes,
    messages: &[Message],
) -> Result<Vec<Share>, Error> {
    write_messages(cursor, capacity, indexes, messages).map(|(shares, _)| shares)
}

/// Splits `messages` into shares, also returning the start of each message.
fn write_messages(
    cursor: usize,
    capacity: usize,
    indexes: &ShareIndexes,
    messages: &[Message],
) -> Result<(Vec<Share>, Vec<usize>), Error> {
    let declared = indexes.declared();
    if let Some(declared) = declared {
        if declared.len() != messages.len() {
            return Err(Error::IndexCountMismatch {
                indexes: declared.len(),
                messages: messages.len(),
            });
        }
    }

    let mut writer = MessageWriter::new();
    let mut starts = Vec::with_capacity(messages.len());
    for (i, message) in messages.iter().enumerate() {
        starts.push(cursor + writer.count());
        writer.write(message);

        let Some(&next) = declared.and_then(|declared| declared.get(i + 1)) else {
            continue;
        };
        let next_start = next as usize;
        if next_start >= capacity {
            return Err(Error::SquareOverflow {
                capacity,
                required: next_start + 1,
            });
        }
        let position = cursor + writer.count();
        let padding = next_start
            .checked_sub(position)
            .ok_or(Error::UnexpectedMessageIndex {
                index: next,
                cursor: position,
            })?;
        writer.write_padding(padding)?;
    }
    Ok((writer.export(), starts))
}

/// Checks that message namespaces are sorted and distinct from the reserved namespaces.
fn validate_messages(namespaces: &Namespaces, messages: &[Message]) -> Result<(), Error> {
    let mut previous: Option<Namespace> = None;
    for (index, message) in messages.iter().enumerate() {
        if !namespaces.is_message(&message.namespace) {
            return Err(Error::InvalidMessageNamespace {
                index,
                namespace: message.namespace,
            });
        }
        if previous.is_some_and(|previous| message.namespace < previous) {
            return Err(Error::UnsortedMessages(index));
        }
        previous = Some(message.namespace);
    }
    Ok(())
}

/// Lays out `data` as a [Square].
pub fn layout<E: Evidence>(cfg: &Config, data: &Data<E>) -> Result<Square, Error> {
    let size = data.square_size;
    if !size.is_power_of_two() {
        return Err(Error::InvalidSquareSize(size));
    }
    if size > cfg.max_square_size {
        return Err(Error::SquareSizeTooLarge {
            size,
            max: cfg.max_square_size,
        });
    }
    let capacity = size
        .checked_mul(size)
        .and_then(|capacity| usize::try_from(capacity).ok())
        .ok_or(Error::InvalidSquareSize(size))?;
    // The capacity fits in a usize, so its square root does too
    let size = size as usize;

    let namespaces = &cfg.namespaces;
    if !namespaces.is_valid() {
        return Err(Error::InvalidNamespaces);
    }
    validate_messages(namespaces, &data.messages)?;

    let mut layout = Layout::with_capacity(capacity);

    // Transactions and evidence
    let tx_shares = split_txs(namespaces.tx, &data.txs);
    layout.push(Region::Transactions, tx_shares);
    let evidence_shares = split_evidence(namespaces.evidence, &data.evidence)?;
    let has_evidence = !evidence_shares.is_empty();
    layout.push(Region::Evidence, evidence_shares);

    // The first declared index must be exactly where messages would naturally begin
    let indexes = wrapped::extract(&data.txs).sorted();
    if let Some(&first) = indexes.declared().and_then(|declared| declared.first()) {
        if first as usize != layout.cursor() {
            return Err(Error::UnexpectedFirstMessageIndex {
                expected: layout.cursor(),
                found: first,
            });
        }
    }

    // Align the first message, continuing the namespace of the preceding region
    if let Some(first) = data.messages.first() {
        let cursor = layout.cursor();
        let start = next_aligned_start(cursor, first.shares_used(), size).ok_or(
            Error::SquareOverflow {
                capacity,
                required: cursor,
            },
        )?;
        let namespace = if has_evidence {
            namespaces.evidence
        } else {
            namespaces.tx
        };
        layout.push(
            Region::AlignmentPadding,
            share::padding(namespace, start - cursor),
        );
    }

    // Messages
    let (message_shares, message_starts) =
        write_messages(layout.cursor(), capacity, &indexes, &data.messages)?;
    let required = layout.cursor() + message_shares.len();
    let tail = capacity
        .checked_sub(required)
        .ok_or(Error::SquareOverflow { capacity, required })?;
    layout.push(Region::Messages, message_shares);

    // Fill the rest of the square
    layout.push(
        Region::TailPadding,
        share::padding(namespaces.tail_padding, tail),
    );
    debug!(
        size,
        txs = data.txs.len(),
        evidence = data.evidence.len(),
        messages = data.messages.len(),
        tail,
        "laid out square"
    );
    Ok(layout.finish(size, message_starts))
}

/// Splits `data` into the shares of its square, row by row.
pub fn split<E: Evidence>(cfg: &Config, data: &Data<E>) -> Result<Vec<Share>, Error> {
    layout(cfg, data).map(Square::into_shares)
}
