//! Evidence of misbehavior included in a block.

use bytes::Bytes;
use std::convert::Infallible;

/// An item of evidence that can be serialized into evidence shares.
pub trait Evidence {
    /// The error returned when the evidence cannot be serialized.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Serializes the evidence.
    fn encode_evidence(&self) -> Result<Bytes, Self::Error>;
}

impl Evidence for Bytes {
    type Error = Infallible;

    fn encode_evidence(&self) -> Result<Bytes, Self::Error> {
        Ok(self.clone())
    }
}

impl Evidence for Vec<u8> {
    type Error = Infallible;

    fn encode_evidence(&self) -> Result<Bytes, Self::Error> {
        Ok(Bytes::copy_from_slice(self))
    }
}
