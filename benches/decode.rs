use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use itch_lob::message::{itch41, itch50};
use itch_lob::types::{Mpid, OrderId, Side, Symbol, TradeRef};

fn sample_add_order_50(n: u64) -> itch50::Message {
    itch50::Message::AddOrder(itch50::AddOrder {
        header: itch50::Header {
            stock_locate: 1,
            tracking_number: 0,
            timestamp: 34_200_000_000_000 + n,
        },
        order_ref: OrderId(n),
        side: if n % 2 == 0 { Side::Bid } else { Side::Ask },
        shares: 100,
        stock: Symbol("AAPL".to_string()),
        price: 1_000_000 + (n % 500) as u32,
    })
}

fn sample_add_order_mpid_50(n: u64) -> itch50::Message {
    itch50::Message::AddOrderMpid(itch50::AddOrderMpid {
        header: itch50::Header {
            stock_locate: 1,
            tracking_number: 0,
            timestamp: 34_200_000_000_000 + n,
        },
        order_ref: OrderId(n),
        side: Side::Bid,
        shares: 100,
        stock: Symbol("AAPL".to_string()),
        price: 1_000_000,
        mpid: Mpid(*b"ABCD"),
    })
}

fn sample_order_executed_50(n: u64) -> itch50::Message {
    itch50::Message::OrderExecuted(itch50::OrderExecuted {
        header: itch50::Header {
            stock_locate: 1,
            tracking_number: 0,
            timestamp: 34_200_000_000_000 + n,
        },
        order_ref: OrderId(n),
        executed_shares: 50,
        match_number: TradeRef(n),
    })
}

fn sample_add_order_41(n: u64) -> itch41::Message {
    itch41::Message::AddOrder(itch41::AddOrder {
        header: itch41::Header {
            timestamp: (n % 1_000_000_000) as u32,
        },
        order_ref: OrderId(n),
        side: if n % 2 == 0 { Side::Bid } else { Side::Ask },
        shares: 100,
        stock: Symbol("AAPL".to_string()),
        price: 1_000_000 + (n % 500) as u32,
    })
}

/// Decode throughput per opcode: the dimension that matters for a replay
/// engine, since the hot loop is `FramedReader::next_message` not matching.
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode/itch50");

    let add_order = {
        let mut bytes = Vec::new();
        sample_add_order_50(1).encode(&mut bytes);
        bytes
    };
    group.bench_with_input(BenchmarkId::new("add_order", "A"), &add_order, |b, bytes| {
        b.iter(|| black_box(itch50::Message::decode(black_box(bytes)).unwrap()));
    });

    let add_order_mpid = {
        let mut bytes = Vec::new();
        sample_add_order_mpid_50(1).encode(&mut bytes);
        bytes
    };
    group.bench_with_input(
        BenchmarkId::new("add_order_mpid", "F"),
        &add_order_mpid,
        |b, bytes| {
            b.iter(|| black_box(itch50::Message::decode(black_box(bytes)).unwrap()));
        },
    );

    let order_executed = {
        let mut bytes = Vec::new();
        sample_order_executed_50(1).encode(&mut bytes);
        bytes
    };
    group.bench_with_input(
        BenchmarkId::new("order_executed", "E"),
        &order_executed,
        |b, bytes| {
            b.iter(|| black_box(itch50::Message::decode(black_box(bytes)).unwrap()));
        },
    );

    group.finish();

    let mut group = c.benchmark_group("decode/itch41");

    let add_order_41 = {
        let mut bytes = Vec::new();
        sample_add_order_41(1).encode(&mut bytes);
        bytes
    };
    group.bench_with_input(BenchmarkId::new("add_order", "A"), &add_order_41, |b, bytes| {
        b.iter(|| black_box(itch41::Message::decode(black_box(bytes)).unwrap()));
    });

    group.finish();
}

/// Decode throughput for a mixed batch of messages, approximating the
/// opcode distribution of a real equity feed (mostly adds and executes).
fn bench_decode_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode/batch");

    for &count in &[100usize, 1_000, 10_000] {
        let payloads: Vec<Vec<u8>> = (0..count as u64)
            .map(|n| {
                let msg = if n % 3 == 0 {
                    sample_order_executed_50(n)
                } else {
                    sample_add_order_50(n)
                };
                let mut bytes = Vec::new();
                msg.encode(&mut bytes);
                bytes
            })
            .collect();
        group.bench_with_input(BenchmarkId::new("itch50", count), &payloads, |b, payloads| {
            b.iter(|| {
                for bytes in payloads {
                    black_box(itch50::Message::decode(black_box(bytes)).unwrap());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_decode_batch);
criterion_main!(benches);
