#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use bytes::Bytes;
use commonware_shares::{
    message::{self, Message},
    namespace::Namespace,
    square::{layout, split, Config, Data, Error, Region},
    wrapped::WrappedTx,
};
use libfuzzer_sys::fuzz_target;

const MAX_SQUARE_EXPONENT: u32 = 6;

#[derive(Debug)]
struct FuzzInput {
    data: Data<Bytes>,
}

impl<'a> Arbitrary<'a> for FuzzInput {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        // Occasionally use an invalid square size
        let square_size = if u.ratio(1, 16)? {
            u.int_in_range(0u64..=100)?
        } else {
            1u64 << u.int_in_range(0..=MAX_SQUARE_EXPONENT)?
        };

        let mut txs = Vec::new();
        for _ in 0..u.int_in_range(0u8..=8)? {
            let tx = Bytes::from(Vec::<u8>::arbitrary(u)?);
            if u.arbitrary()? {
                // Mostly plausible indexes, sometimes far outside any square
                let share_index = if u.ratio(1, 8)? {
                    u.arbitrary::<u32>()?
                } else {
                    u.int_in_range(0..=64)?
                };
                txs.push(WrappedTx::new(&tx, tx.clone(), share_index).to_bytes());
            } else {
                txs.push(tx);
            }
        }

        let mut evidence = Vec::new();
        for _ in 0..u.int_in_range(0u8..=4)? {
            evidence.push(Bytes::from(Vec::<u8>::arbitrary(u)?));
        }

        let mut messages = Vec::new();
        for _ in 0..u.int_in_range(0u8..=8)? {
            let mut namespace = <[u8; 8]>::arbitrary(u)?;
            namespace[0] = u.int_in_range(1..=254)?;
            messages.push(Message::new(
                Namespace::new(namespace),
                Vec::<u8>::arbitrary(u)?,
            ));
        }
        messages.sort_by_key(|message: &Message| message.namespace);

        Ok(Self {
            data: Data {
                square_size,
                txs,
                evidence,
                messages,
            },
        })
    }
}

fn fuzz(input: FuzzInput) {
    let cfg = Config::default();
    let square = match layout(&cfg, &input.data) {
        Ok(square) => square,
        Err(Error::InvalidSquareSize(size)) => {
            assert!(!size.is_power_of_two());
            return;
        }
        Err(Error::SquareOverflow { capacity, required }) => {
            assert!(required > capacity);
            return;
        }
        Err(_) => return,
    };

    let size = input.data.square_size as usize;
    let shares = square.shares();
    assert_eq!(shares.len(), size * size);
    assert!(shares
        .windows(2)
        .all(|pair| pair[0].namespace() <= pair[1].namespace()));

    // Non-empty messages can be recovered
    let recovered = message::parse(&shares[square.region(Region::Messages)]).unwrap();
    let expected: Vec<_> = input
        .data
        .messages
        .iter()
        .filter(|message| !message.data.is_empty())
        .cloned()
        .collect();
    assert_eq!(recovered, expected);

    assert_eq!(split(&cfg, &input.data).unwrap(), shares);
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
