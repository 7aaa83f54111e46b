//! Pack length-delimited units (transactions or evidence) contiguously into shares.
//!
//! Every compact share has the layout:
//!
//! ```text
//! | namespace (8) | info (1) | data (247) |
//! ```
//!
//! Units are prefixed with their length as an unsigned varint and written back to back,
//! spilling over share boundaries without any padding between them. The info byte of a
//! share holds the offset (from the start of the share) of the first unit that begins in
//! it, or zero if the share only continues a unit started earlier.

use crate::{
    namespace::{Namespace, NAMESPACE_SIZE},
    share::{Share, RESERVED_BYTES, SHARE_SIZE},
};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use prost::encoding::{decode_varint, encode_varint, encoded_len_varint};
use thiserror::Error;

/// Errors that can occur when recovering units from compact shares.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("share {index} has namespace {found}, expected {expected}")]
    MixedNamespaces {
        index: usize,
        expected: Namespace,
        found: Namespace,
    },
    #[error("invalid length prefix")]
    InvalidLength,
    #[error("unit truncated: {missing} bytes missing")]
    Truncated { missing: usize },
}

/// Accumulates units under a single namespace.
pub struct CompactWriter {
    namespace: Namespace,
    shares: Vec<Share>,
    pending: BytesMut,
}

impl CompactWriter {
    /// Creates a writer for `namespace`.
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            shares: Vec::new(),
            pending: BytesMut::new(),
        }
    }

    /// Appends a length-delimited `unit`.
    pub fn write(&mut self, unit: &[u8]) {
        let len = unit.len() as u64;
        let mut delimited = BytesMut::with_capacity(encoded_len_varint(len) + unit.len());
        encode_varint(len, &mut delimited);
        delimited.put_slice(unit);

        // Record where this unit begins if nothing else began in the pending share
        if self.pending.is_empty() {
            self.open();
        }
        if self.pending[NAMESPACE_SIZE] == 0 {
            // Offsets are always within [NAMESPACE_SIZE + RESERVED_BYTES, SHARE_SIZE)
            self.pending[NAMESPACE_SIZE] = self.pending.len() as u8;
        }

        let mut rest = &delimited[..];
        while !rest.is_empty() {
            if self.pending.is_empty() {
                self.open();
            }
            let take = (SHARE_SIZE - self.pending.len()).min(rest.len());
            self.pending.put_slice(&rest[..take]);
            rest = &rest[take..];
            if self.pending.len() == SHARE_SIZE {
                self.stack();
            }
        }
    }

    /// Returns the number of shares written so far, including a partially filled one.
    pub fn count(&self) -> usize {
        self.shares.len() + usize::from(!self.pending.is_empty())
    }

    /// Zero-fills the pending share and returns all shares.
    pub fn export(mut self) -> Vec<Share> {
        if !self.pending.is_empty() {
            self.pending.resize(SHARE_SIZE, 0);
            self.stack();
        }
        self.shares
    }

    fn open(&mut self) {
        self.pending.reserve(SHARE_SIZE);
        self.pending.put_slice(self.namespace.as_ref());
        self.pending.put_bytes(0, RESERVED_BYTES);
    }

    fn stack(&mut self) {
        let share = self.pending.split();
        self.shares.push(Share::from_buf(share));
    }
}

/// Returns the offset of the first unit starting in `share`, if any.
pub fn first_unit_offset(share: &Share) -> Option<usize> {
    match share.data()[0] {
        0 => None,
        offset => Some(offset as usize),
    }
}

/// Recovers the units written to `shares`.
///
/// Reading stops once the data is exhausted or only zero bytes remain, so trailing
/// zero-filled and padding shares are ignored. Empty units followed by a non-empty unit
/// are recovered; empty units after the last non-empty unit cannot be told apart from
/// padding and are dropped.
pub fn parse(shares: &[Share]) -> Result<Vec<Bytes>, ParseError> {
    let Some(expected) = shares.first().map(Share::namespace) else {
        return Ok(Vec::new());
    };
    let mut data = BytesMut::with_capacity(shares.len() * (SHARE_SIZE - NAMESPACE_SIZE));
    for (index, share) in shares.iter().enumerate() {
        let found = share.namespace();
        if found != expected {
            return Err(ParseError::MixedNamespaces {
                index,
                expected,
                found,
            });
        }
        data.put_slice(&share.data()[RESERVED_BYTES..]);
    }

    let mut data = data.freeze();
    let mut units = Vec::new();
    while data.has_remaining() {
        if data.iter().all(|&byte| byte == 0) {
            break;
        }
        let len = decode_varint(&mut data).map_err(|_| ParseError::InvalidLength)?;
        let len = usize::try_from(len).map_err(|_| ParseError::InvalidLength)?;
        if len > data.remaining() {
            return Err(ParseError::Truncated {
                missing: len - data.remaining(),
            });
        }
        units.push(data.split_to(len));
    }
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        namespace::{EVIDENCE, TX},
        share::COMPACT_SHARE_DATA_SIZE,
    };

    const FIRST_OFFSET: usize = NAMESPACE_SIZE + RESERVED_BYTES;

    #[test]
    fn test_empty_writer() {
        let writer = CompactWriter::new(TX);
        assert_eq!(writer.count(), 0);
        assert!(writer.export().is_empty());
    }

    #[test]
    fn test_single_unit() {
        let mut writer = CompactWriter::new(TX);
        writer.write(b"hello");
        assert_eq!(writer.count(), 1);
        let shares = writer.export();
        assert_eq!(shares.len(), 1);

        let share = &shares[0];
        assert_eq!(share.namespace(), TX);
        assert_eq!(first_unit_offset(share), Some(FIRST_OFFSET));
        let raw = share.as_ref();
        assert_eq!(raw[FIRST_OFFSET], 5);
        assert_eq!(&raw[FIRST_OFFSET + 1..FIRST_OFFSET + 6], b"hello");
        assert!(raw[FIRST_OFFSET + 6..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_units_are_contiguous() {
        let mut writer = CompactWriter::new(TX);
        writer.write(&[1u8; 10]);
        writer.write(&[2u8; 10]);
        let shares = writer.export();
        assert_eq!(shares.len(), 1);

        // The second unit directly follows the first, without padding
        let raw = shares[0].as_ref();
        assert_eq!(raw[FIRST_OFFSET + 11], 10);
        assert_eq!(&raw[FIRST_OFFSET + 12..FIRST_OFFSET + 22], &[2u8; 10]);
    }

    #[test]
    fn test_unit_spanning_shares() {
        let mut writer = CompactWriter::new(EVIDENCE);
        writer.write(&[7u8; 300]);
        writer.write(&[8u8; 4]);
        let shares = writer.export();
        assert_eq!(shares.len(), 2);

        // 2 byte prefix + 300 bytes: the first share holds 247, the second 55
        assert_eq!(first_unit_offset(&shares[0]), Some(FIRST_OFFSET));
        assert_eq!(first_unit_offset(&shares[1]), Some(FIRST_OFFSET + 55));
    }

    #[test]
    fn test_continuation_without_start() {
        let mut writer = CompactWriter::new(TX);
        writer.write(&[7u8; 600]);
        let shares = writer.export();
        assert_eq!(shares.len(), 3);
        assert_eq!(first_unit_offset(&shares[0]), Some(FIRST_OFFSET));
        assert_eq!(first_unit_offset(&shares[1]), None);
        assert_eq!(first_unit_offset(&shares[2]), None);
    }

    #[test]
    fn test_exact_fill() {
        // 2 byte prefix + 245 bytes fills the data of exactly one share
        let mut writer = CompactWriter::new(TX);
        writer.write(&[3u8; COMPACT_SHARE_DATA_SIZE - 2]);
        assert_eq!(writer.count(), 1);
        writer.write(b"next");
        assert_eq!(writer.count(), 2);
        let shares = writer.export();
        assert_eq!(first_unit_offset(&shares[1]), Some(FIRST_OFFSET));
    }

    #[test]
    fn test_parse() {
        let units: Vec<Vec<u8>> = vec![
            b"a".to_vec(),
            vec![9u8; 500],
            vec![1u8; 245],
            b"z".to_vec(),
        ];
        let mut writer = CompactWriter::new(TX);
        for unit in &units {
            writer.write(unit);
        }
        let mut shares = writer.export();
        shares.push(Share::padding(TX));

        let parsed = parse(&shares).unwrap();
        assert_eq!(parsed, units);
    }

    #[test]
    fn test_parse_empty_units() {
        let units: Vec<&[u8]> = vec![b"", b"x", b"", b"", b"yz"];
        let mut writer = CompactWriter::new(TX);
        for unit in &units {
            writer.write(unit);
        }
        let mut shares = writer.export();
        shares.push(Share::padding(TX));
        assert_eq!(parse(&shares).unwrap(), units);

        // Trailing empty units read as padding
        let mut writer = CompactWriter::new(TX);
        writer.write(b"x");
        writer.write(b"");
        assert_eq!(parse(&writer.export()).unwrap(), vec![Bytes::from_static(b"x")]);
    }

    #[test]
    fn test_parse_mixed_namespaces() {
        let mut writer = CompactWriter::new(TX);
        writer.write(b"tx");
        let mut shares = writer.export();
        shares.push(Share::padding(EVIDENCE));
        assert_eq!(
            parse(&shares),
            Err(ParseError::MixedNamespaces {
                index: 1,
                expected: TX,
                found: EVIDENCE,
            })
        );
    }

    #[test]
    fn test_parse_truncated() {
        let mut writer = CompactWriter::new(TX);
        writer.write(&[5u8; 400]);
        let shares = writer.export();
        let result = parse(&shares[..1]);
        assert!(matches!(result, Err(ParseError::Truncated { .. })));
    }
}
