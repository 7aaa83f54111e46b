use bytes::Bytes;
use commonware_shares::{
    message::Message,
    namespace::Namespace,
    square::{split, Config, Data},
};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

/// Generates a block with `txs` transactions and `messages` messages that fits in a
/// square of width `size`.
fn generate(rng: &mut StdRng, size: u64, txs: usize, messages: usize) -> Data<Bytes> {
    let txs = (0..txs)
        .map(|_| {
            let mut tx = vec![0u8; rng.gen_range(100..300)];
            rng.fill_bytes(&mut tx);
            Bytes::from(tx)
        })
        .collect();
    let mut messages: Vec<Message> = (0..messages)
        .map(|_| {
            let mut namespace = [0u8; 8];
            namespace[0] = rng.gen_range(1..=254);
            rng.fill_bytes(&mut namespace[1..]);
            let mut data = vec![0u8; rng.gen_range(100..2_000)];
            rng.fill_bytes(&mut data);
            Message::new(Namespace::new(namespace), data)
        })
        .collect();
    messages.sort_by_key(|message| message.namespace);
    Data {
        square_size: size,
        txs,
        evidence: Vec::new(),
        messages,
    }
}

fn bench_split(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let cfg = Config::default();
    for (size, txs, messages) in [(16, 32, 16), (64, 512, 256), (128, 2_048, 1_024)] {
        c.bench_function(
            &format!(
                "{}/size={size} txs={txs} messages={messages}",
                module_path!()
            ),
            |b| {
                b.iter_batched(
                    || generate(&mut rng, size, txs, messages),
                    |data| split(&cfg, &data).unwrap(),
                    BatchSize::SmallInput,
                );
            },
        );
    }
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_split
}
criterion_main!(benches);
