use bytes::Bytes;
use commonware_shares::{
    compact,
    message::{self, Message},
    namespace::{Namespace, EVIDENCE, TAIL_PADDING, TX},
    share::{Share, SHARE_SIZE},
    square::{layout, split, Config, Data, Error, Region},
    wrapped::{self, ShareIndexes, WrappedTx},
};

const NS_A: Namespace = Namespace::new([0, 0, 0, 0, 0, 0, 1, 0]);
const NS_B: Namespace = Namespace::new([0, 0, 0, 0, 0, 0, 2, 0]);

fn block(first: u32, second: u32) -> Data<Bytes> {
    Data {
        square_size: 8,
        txs: vec![
            WrappedTx::new(b"pay for b", &b"b"[..], second).to_bytes(),
            Bytes::from_static(b"transfer"),
            WrappedTx::new(b"pay for a", &b"a"[..], first).to_bytes(),
        ],
        evidence: vec![Bytes::from_static(b"double sign")],
        messages: vec![
            Message::new(NS_A, vec![1u8; 300]),
            Message::new(NS_B, vec![2u8; 10]),
        ],
    }
}

#[test]
fn test_block_round_trip() {
    let data = block(2, 6);
    let square = layout(&Config::default(), &data).unwrap();
    let shares = square.shares();
    assert_eq!(shares.len(), 64);

    assert_eq!(square.region(Region::Transactions), 0..1);
    assert_eq!(square.region(Region::Evidence), 1..2);
    assert_eq!(square.region(Region::AlignmentPadding), 2..2);
    assert_eq!(square.region(Region::Messages), 2..7);
    assert_eq!(square.region(Region::TailPadding), 7..64);
    assert_eq!(square.message_start(0), Some(2));
    assert_eq!(square.message_start(1), Some(6));

    // Every region can be read back
    let txs = compact::parse(&shares[square.region(Region::Transactions)]).unwrap();
    assert_eq!(txs, data.txs);
    let evidence = compact::parse(&shares[square.region(Region::Evidence)]).unwrap();
    assert_eq!(evidence, data.evidence);
    let messages = message::parse(&shares[square.region(Region::Messages)]).unwrap();
    assert_eq!(messages, data.messages);

    // Declared indexes are recovered from the transactions
    assert_eq!(wrapped::extract(&txs), ShareIndexes::Declared(vec![6, 2]));

    // Padding between the messages trails the first message
    assert!(shares[4..6].iter().all(|s| s.namespace() == NS_A && s.is_padding()));
    assert!(shares[7..].iter().all(|s| s.namespace() == TAIL_PADDING));
    assert_eq!(shares[0].namespace(), TX);
    assert_eq!(shares[1].namespace(), EVIDENCE);

    // Shares survive conversion to raw bytes
    let raw: Vec<Bytes> = shares.iter().cloned().map(Bytes::from).collect();
    assert!(raw.iter().all(|share| share.len() == SHARE_SIZE));
    let decoded: Vec<Share> = raw.into_iter().map(|raw| Share::new(raw).unwrap()).collect();
    assert_eq!(decoded, shares);
}

#[test]
fn test_rows() {
    let square = layout(&Config::default(), &block(2, 6)).unwrap();
    let rows: Vec<_> = (0..square.size())
        .map(|row| square.row(row).unwrap())
        .collect();
    assert_eq!(rows.len(), 8);
    assert_eq!(rows.concat(), square.shares());
}

#[test]
fn test_deterministic() {
    let data = block(2, 4);
    let first = split(&Config::default(), &data).unwrap();
    let second = split(&Config::default(), &data).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_rejects_inconsistent_indexes() {
    let result = split(&Config::default(), &block(3, 6));
    assert!(matches!(
        result,
        Err(Error::UnexpectedFirstMessageIndex {
            expected: 2,
            found: 3
        })
    ));

    // The first message ends at share 4, so the second cannot start at 3
    let result = split(&Config::default(), &block(2, 3));
    assert!(matches!(
        result,
        Err(Error::UnexpectedMessageIndex {
            index: 3,
            cursor: 4
        })
    ));
}

#[test]
fn test_rejects_undersized_square() {
    let data = Data {
        square_size: 2,
        ..block(2, 6)
    };
    let result = split(&Config::default(), &data);
    assert!(matches!(result, Err(Error::SquareOverflow { capacity: 4, .. })));
}
