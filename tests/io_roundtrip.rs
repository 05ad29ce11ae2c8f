//! `FramedReader`/`ItchWriter` against real files on disk, including a
//! compressed variant — the one thing the in-module unit tests (which use
//! in-memory cursors) don't cover.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};

use itch_lob::message::itch50;
use itch_lob::types::{OrderId, Side, Symbol};
use itch_lob::{AnyMessage, Format, FramedReader, ItchWriter};

fn frame(msg: &AnyMessage) -> Vec<u8> {
    let mut payload = Vec::new();
    match msg {
        AnyMessage::V50(m) => m.encode(&mut payload),
        AnyMessage::V41(m) => m.encode(&mut payload),
    }
    let mut out = vec![0x00, payload.len() as u8];
    out.extend_from_slice(&payload);
    out
}

fn sample_stream() -> Vec<u8> {
    let mut bytes = Vec::new();
    for (order_ref, price) in [(1u64, 10_000u32), (2, 10_001), (3, 10_002)] {
        let msg = AnyMessage::V50(itch50::Message::AddOrder(itch50::AddOrder {
            header: itch50::Header {
                stock_locate: 1,
                tracking_number: 0,
                timestamp: order_ref,
            },
            order_ref: OrderId(order_ref),
            side: Side::Bid,
            shares: 10,
            stock: Symbol("AAPL".to_string()),
            price,
        }));
        bytes.extend(frame(&msg));
    }
    bytes
}

#[test]
fn framed_reader_reads_a_real_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stream.itch50");
    std::fs::write(&path, sample_stream()).unwrap();

    let file = File::open(&path).unwrap();
    let mut reader = FramedReader::new(Box::new(file), Format::Itch50).unwrap();

    let mut count = 0;
    while let Some(msg) = reader.next_message().unwrap() {
        assert_eq!(msg.opcode(), b'A');
        count += 1;
    }
    assert_eq!(count, 3);
}

#[test]
fn framed_reader_transparently_decompresses_a_gzipped_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stream.itch50.gz");

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&sample_stream()).unwrap();
    let compressed = encoder.finish().unwrap();
    std::fs::write(&path, &compressed).unwrap();

    let file = File::open(&path).unwrap();
    let mut reader = FramedReader::new(Box::new(file), Format::Itch50).unwrap();

    let mut count = 0;
    while let Some(msg) = reader.next_message().unwrap() {
        assert_eq!(msg.opcode(), b'A');
        count += 1;
    }
    assert_eq!(count, 3);
}

#[test]
fn framed_reader_transparently_decompresses_a_bzip2_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stream.itch50.bz2");

    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(&sample_stream()).unwrap();
    let compressed = encoder.finish().unwrap();
    std::fs::write(&path, &compressed).unwrap();

    let file = File::open(&path).unwrap();
    let mut reader = FramedReader::new(Box::new(file), Format::Itch50).unwrap();

    let mut count = 0;
    while let Some(msg) = reader.next_message().unwrap() {
        assert_eq!(msg.opcode(), b'A');
        count += 1;
    }
    assert_eq!(count, 3);
}

#[test]
fn writer_output_round_trips_through_a_real_file_and_reader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filtered.itch50");

    let mut targets = HashSet::new();
    targets.insert(Symbol("AAPL".to_string()));

    {
        let out = File::create(&path).unwrap();
        let mut writer = ItchWriter::new(out, Format::Itch50, targets, 2);
        let mut reader =
            FramedReader::new(Box::new(std::io::Cursor::new(sample_stream())), Format::Itch50).unwrap();
        while let Some(msg) = reader.next_message().unwrap() {
            writer.process(&msg).unwrap();
        }
        // writer flushes on drop at end of scope
    }

    let mut contents = Vec::new();
    File::open(&path).unwrap().read_to_end(&mut contents).unwrap();
    let mut reader = FramedReader::new(Box::new(std::io::Cursor::new(contents)), Format::Itch50).unwrap();
    let mut count = 0;
    while let Some(msg) = reader.next_message().unwrap() {
        assert_eq!(msg.opcode(), b'A');
        count += 1;
    }
    assert_eq!(count, 3);
}

/// Re-compression is achieved by wrapping the sink the caller passes to
/// `ItchWriter::new` in a compressing `Write` (here `flate2::GzEncoder`)
/// rather than `ItchWriter` special-casing a compression format itself.
#[test]
fn writer_output_can_be_gzip_compressed_by_wrapping_the_sink() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filtered.itch50.gz");

    let mut targets = HashSet::new();
    targets.insert(Symbol("AAPL".to_string()));

    {
        let file = File::create(&path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut writer = ItchWriter::new(encoder, Format::Itch50, targets, 2);
        let mut reader =
            FramedReader::new(Box::new(std::io::Cursor::new(sample_stream())), Format::Itch50).unwrap();
        while let Some(msg) = reader.next_message().unwrap() {
            writer.process(&msg).unwrap();
        }
    }

    let file = File::open(&path).unwrap();
    let mut reader = FramedReader::new(Box::new(file), Format::Itch50).unwrap();
    let mut count = 0;
    while let Some(msg) = reader.next_message().unwrap() {
        assert_eq!(msg.opcode(), b'A');
        count += 1;
    }
    assert_eq!(count, 3);
}
