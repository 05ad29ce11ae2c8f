//! NASDAQ ITCH 4.1 / 5.0 limit order book reconstruction.
//!
//! A [`reader::FramedReader`] strips the wire framing (transparently
//! unwrapping gzip/bzip2/xz/zip input) and decodes each record into a
//! [`message::AnyMessage`]. A [`processor::MarketProcessor`] replays those
//! messages in order against a [`lob::LimitOrderBook`], deriving
//! [`trading_status::TradingStatus`] as it goes and notifying any registered
//! [`handler::MarketEventHandler`] subscribers. A [`writer::ItchWriter`]
//! goes the other way, selecting the subset of a stream needed to
//! reconstruct the book of a chosen symbol set.
//!
//! This crate never initializes a global `tracing` subscriber; that is left
//! to binaries (see `src/bin/itch_replay.rs`) and to test harnesses.

pub mod error;
pub mod handler;
pub mod level;
pub mod lob;
pub mod message;
pub mod processor;
pub mod reader;
pub mod timestamp;
pub mod trading_status;
pub mod types;
pub mod wire;
pub mod writer;

pub use error::Error;
pub use handler::{MarketEventHandler, SubscriberError};
pub use lob::LimitOrderBook;
pub use message::{AnyMessage, Event};
pub use processor::MarketProcessor;
pub use reader::{Format, FramedReader};
pub use timestamp::Timestamp;
pub use trading_status::TradingStatus;
pub use writer::ItchWriter;
