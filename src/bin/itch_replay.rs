//! CLI front end: replay a framed ITCH stream against one instrument's book,
//! or filter a stream down to the subset needed to reconstruct a chosen
//! symbol set.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use itch_lob::handler::MarketEventHandler;
use itch_lob::lob::BufferedViolation;
use itch_lob::types::{OrderId, Price, Side, Symbol, TradeRef, Volume};
use itch_lob::{Error, Format as WireFormat, FramedReader, ItchWriter, MarketProcessor, SubscriberError, Timestamp};

#[derive(Parser)]
#[command(name = "itch-replay", version, about = "Replay or filter NASDAQ ITCH 4.1/5.0 feeds")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a stream against one instrument's book, printing each mutation as it applies.
    Replay {
        /// Path to the framed (optionally gzip/bzip2/xz/zip-compressed) input stream.
        input: PathBuf,
        /// Wire format the stream is encoded in.
        #[arg(long, value_enum, default_value = "itch50")]
        format: FormatArg,
        /// Ticker symbol to track; all other instruments' activity is skipped.
        #[arg(long)]
        symbol: String,
        /// Trading date, as days since the proleptic-Gregorian CE epoch.
        #[arg(long, default_value_t = 0)]
        book_date: i32,
    },
    /// Write the subset of a stream sufficient to reconstruct the book of the given symbols.
    Filter {
        /// Path to the framed input stream.
        input: PathBuf,
        /// Path the filtered stream is written to.
        output: PathBuf,
        /// Wire format of both the input and the output stream.
        #[arg(long, value_enum, default_value = "itch50")]
        format: FormatArg,
        /// Symbol to retain; may be repeated.
        #[arg(long = "symbol", required = true)]
        symbols: Vec<String>,
        /// Flush the output once this many messages have been retained.
        #[arg(long, default_value_t = 256)]
        batch_size: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Itch41,
    Itch50,
}

impl From<FormatArg> for WireFormat {
    fn from(f: FormatArg) -> WireFormat {
        match f {
            FormatArg::Itch41 => WireFormat::Itch41,
            FormatArg::Itch50 => WireFormat::Itch50,
        }
    }
}

/// Prints every book mutation to stdout, one line per event.
struct PrintingHandler;

impl MarketEventHandler for PrintingHandler {
    fn enter_quote_event(
        &mut self,
        ts: Timestamp,
        price: Price,
        volume: Volume,
        order_id: OrderId,
        side: Side,
    ) -> Result<(), SubscriberError> {
        println!("{ts} ENTER  {side} {volume}@{price} order={order_id}");
        Ok(())
    }

    fn cancel_quote_event(
        &mut self,
        ts: Timestamp,
        volume: Volume,
        order_id: OrderId,
        side: Side,
    ) -> Result<(), SubscriberError> {
        println!("{ts} CANCEL {side} {volume} order={order_id}");
        Ok(())
    }

    fn delete_quote_event(&mut self, ts: Timestamp, order_id: OrderId, side: Side) -> Result<(), SubscriberError> {
        println!("{ts} DELETE {side} order={order_id}");
        Ok(())
    }

    fn replace_quote_event(
        &mut self,
        ts: Timestamp,
        orig_id: OrderId,
        new_id: OrderId,
        price: Price,
        volume: Volume,
        side: Side,
    ) -> Result<(), SubscriberError> {
        println!("{ts} REPLACE {side} {orig_id}->{new_id} {volume}@{price}");
        Ok(())
    }

    fn execute_trade_event(
        &mut self,
        ts: Timestamp,
        volume: Volume,
        order_id: OrderId,
        trade_ref: TradeRef,
        side: Side,
    ) -> Result<(), SubscriberError> {
        println!("{ts} EXECUTE {side} {volume} order={order_id} match={trade_ref}");
        Ok(())
    }

    fn execute_trade_price_event(
        &mut self,
        ts: Timestamp,
        volume: Volume,
        order_id: OrderId,
        trade_ref: TradeRef,
        price: Price,
        side: Side,
    ) -> Result<(), SubscriberError> {
        println!("{ts} EXECUTE@PX {side} {volume}@{price} order={order_id} match={trade_ref}");
        Ok(())
    }

    fn auction_trade_event(
        &mut self,
        ts: Timestamp,
        volume: Volume,
        price: Price,
        _bid_id: Option<OrderId>,
        _ask_id: Option<OrderId>,
    ) -> Result<(), SubscriberError> {
        println!("{ts} AUCTION {volume}@{price}");
        Ok(())
    }

    fn crossing_trade_event(
        &mut self,
        ts: Timestamp,
        volume: Volume,
        price: Price,
        _bid_id: Option<OrderId>,
        _ask_id: Option<OrderId>,
    ) -> Result<(), SubscriberError> {
        println!("{ts} CROSS {volume}@{price}");
        Ok(())
    }

    fn execution_priority_violation_event(
        &mut self,
        ts: Timestamp,
        violation: &BufferedViolation,
    ) -> Result<(), SubscriberError> {
        println!(
            "{ts} PRIORITY-VIOLATION order={} actual_head={}",
            violation.order_id, violation.actual_head_order_id
        );
        Ok(())
    }
}

fn run_replay(input: PathBuf, format: WireFormat, symbol: String, book_date: i32) -> Result<(), Error> {
    let file = File::open(&input)?;
    let mut reader = FramedReader::new(Box::new(file), format)?;
    let mut processor = MarketProcessor::new(Symbol(symbol), book_date);
    processor.register_subscriber(Box::new(PrintingHandler));

    while let Some(msg) = reader.next_message()? {
        processor.process_message(msg)?;
    }

    for violation in processor.processing_done() {
        tracing::warn!(?violation, "execution-priority violation never reconciled by end of day");
    }
    if let Some(status) = processor.trading_status() {
        println!("final trading status: {status}");
    }
    Ok(())
}

fn run_filter(
    input: PathBuf,
    output: PathBuf,
    format: WireFormat,
    symbols: Vec<String>,
    batch_size: usize,
) -> Result<(), Error> {
    let file = File::open(&input)?;
    let mut reader = FramedReader::new(Box::new(file), format)?;
    let out = BufWriter::new(File::create(&output)?);
    let targets: HashSet<Symbol> = symbols.into_iter().map(Symbol).collect();
    let mut writer = ItchWriter::new(out, format, targets, batch_size);

    while let Some(msg) = reader.next_message()? {
        writer.process(&msg)?;
    }
    writer.flush()?;
    tracing::info!(path = %output.display(), "wrote filtered stream");
    Ok(())
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Replay {
            input,
            format,
            symbol,
            book_date,
        } => run_replay(input, format.into(), symbol, book_date),
        Command::Filter {
            input,
            output,
            format,
            symbols,
            batch_size,
        } => run_filter(input, output, format.into(), symbols, batch_size),
    }
}
