//! Split messages into shares of their own namespace.
//!
//! Every message share has the layout:
//!
//! ```text
//! | namespace (8) | data (248) |
//! ```
//!
//! The first share of a message begins with the length of the message as an unsigned
//! varint. A message always starts a fresh share and its last share is zero-filled.

use crate::{
    namespace::Namespace,
    share::{self, Share, MESSAGE_SHARE_DATA_SIZE, SHARE_SIZE},
};
use bytes::{BufMut, Bytes, BytesMut};
use prost::encoding::{decode_varint, encode_varint, encoded_len_varint};
use thiserror::Error;

/// Errors that can occur when writing messages.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("no message written")]
    NoMessageWritten,
}

/// Errors that can occur when recovering messages from shares.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid length prefix in share {0}")]
    InvalidLength(usize),
    #[error("message at share {index} needs {needed} shares, found {found}")]
    Truncated {
        index: usize,
        needed: usize,
        found: usize,
    },
    #[error("share {index} has namespace {found}, expected {expected}")]
    MixedNamespaces {
        index: usize,
        expected: Namespace,
        found: Namespace,
    },
}

/// Data published under a namespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Message {
    pub namespace: Namespace,
    pub data: Bytes,
}

impl Message {
    /// Creates a new message.
    pub fn new(namespace: Namespace, data: impl Into<Bytes>) -> Self {
        Self {
            namespace,
            data: data.into(),
        }
    }

    /// Returns the number of shares the message occupies.
    pub fn shares_used(&self) -> usize {
        shares_used(self.data.len())
    }
}

/// Returns the number of shares occupied by a message of `len` bytes.
pub fn shares_used(len: usize) -> usize {
    (encoded_len_varint(len as u64) + len).div_ceil(MESSAGE_SHARE_DATA_SIZE)
}

/// Accumulates messages, each in its own namespace, and the padding between them.
#[derive(Default)]
pub struct MessageWriter {
    shares: Vec<Share>,
    last: Option<Namespace>,
}

impl MessageWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `message`, starting at a fresh share.
    pub fn write(&mut self, message: &Message) {
        let len = message.data.len();
        let mut delimited = BytesMut::with_capacity(encoded_len_varint(len as u64) + len);
        encode_varint(len as u64, &mut delimited);
        delimited.put_slice(&message.data);

        self.shares.reserve(shares_used(len));
        for chunk in delimited.chunks(MESSAGE_SHARE_DATA_SIZE) {
            let mut buf = BytesMut::with_capacity(SHARE_SIZE);
            buf.put_slice(message.namespace.as_ref());
            buf.put_slice(chunk);
            buf.resize(SHARE_SIZE, 0);
            self.shares.push(Share::from_buf(buf));
        }
        self.last = Some(message.namespace);
    }

    /// Appends `count` padding shares under the namespace of the last message written.
    pub fn write_padding(&mut self, count: usize) -> Result<(), Error> {
        if count == 0 {
            return Ok(());
        }
        let namespace = self.last.ok_or(Error::NoMessageWritten)?;
        self.shares.extend(share::padding(namespace, count));
        Ok(())
    }

    /// Returns the number of shares written so far.
    pub fn count(&self) -> usize {
        self.shares.len()
    }

    /// Returns all shares.
    pub fn export(self) -> Vec<Share> {
        self.shares
    }
}

/// Recovers the messages written to `shares`, skipping padding shares.
///
/// An empty message cannot be told apart from padding and is skipped as well.
pub fn parse(shares: &[Share]) -> Result<Vec<Message>, ParseError> {
    let mut messages = Vec::new();
    let mut index = 0;
    while index < shares.len() {
        let first = &shares[index];
        if first.is_padding() {
            index += 1;
            continue;
        }

        let mut data = first.data();
        let len = decode_varint(&mut data).map_err(|_| ParseError::InvalidLength(index))?;
        let len = usize::try_from(len).map_err(|_| ParseError::InvalidLength(index))?;
        let needed = shares_used(len);
        let found = shares.len() - index;
        if needed > found {
            return Err(ParseError::Truncated {
                index,
                needed,
                found,
            });
        }

        let expected = first.namespace();
        let mut buf = BytesMut::with_capacity(needed * MESSAGE_SHARE_DATA_SIZE);
        buf.put_slice(data);
        for (offset, share) in shares[index + 1..index + needed].iter().enumerate() {
            let found = share.namespace();
            if found != expected {
                return Err(ParseError::MixedNamespaces {
                    index: index + 1 + offset,
                    expected,
                    found,
                });
            }
            buf.put_slice(share.data());
        }
        buf.truncate(len);
        messages.push(Message::new(expected, buf.freeze()));
        index += needed;
    }
    Ok(messages)
}
