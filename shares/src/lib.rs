//! Arrange block data into a square of namespaced shares.
//!
//! # Overview
//!
//! Before a block can be erasure coded, its transactions, evidence, and messages are split
//! into fixed-size [share::Share]s and laid out, sorted by [namespace::Namespace], as the
//! rows of a `size x size` square. Every message starts at a position derived only from its
//! length and the width of the square (the non-interactive default, see [alignment]), so a
//! node can locate a message without downloading the rest of the block, and any node
//! holding the same block data computes the same square byte for byte.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use commonware_shares::{
//!     message::Message,
//!     namespace::{Namespace, TAIL_PADDING, TX},
//!     square::{layout, Config, Data, Region},
//! };
//!
//! let namespace = Namespace::new([0, 0, 0, 0, 0, 0, 1, 0]);
//! let data = Data::<Bytes> {
//!     square_size: 4,
//!     txs: vec![Bytes::from_static(b"transfer")],
//!     evidence: Vec::new(),
//!     messages: vec![Message::new(namespace, vec![7u8; 300])],
//! };
//! let square = layout(&Config::default(), &data).unwrap();
//!
//! // One transaction share, one share of padding, then the (two share) message
//! assert_eq!(square.shares().len(), 16);
//! assert_eq!(square.shares()[0].namespace(), TX);
//! assert_eq!(square.message_start(0), Some(2));
//! assert_eq!(square.region(Region::TailPadding), 4..16);
//! assert_eq!(square.shares()[15].namespace(), TAIL_PADDING);
//! ```

#![doc(
    html_logo_url = "https://commonware.xyz/imgs/rustdoc_logo.svg",
    html_favicon_url = "https://commonware.xyz/favicon.ico"
)]

pub mod alignment;
pub mod compact;
pub mod evidence;
pub mod message;
pub mod namespace;
pub mod share;
pub mod square;
pub mod wrapped;

pub use evidence::Evidence;
pub use message::Message;
pub use namespace::{Namespace, Namespaces};
pub use share::Share;
pub use square::{layout, split, Config, Data, Error, Region, Square};
pub use wrapped::{ShareIndexes, WrappedTx};
