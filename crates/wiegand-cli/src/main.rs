//! Wiegand CLI entry point.
//!
//! Wires a simulated reader into the capture engine, polls for frames and
//! prints each one, optionally journaling every event.

mod cli;
mod drain;

use anyhow::Context;
use clap::Parser;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use std::time::Instant;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wiegand_capture::channel;
use wiegand_core::{DecodedEvent, Dispatcher, Frame, WiegandConfig};
use wiegand_decoder::FieldDecoder;
use wiegand_hardware::mock::{DEFAULT_FRAME_GAP, MockReaderHandle, MockWiegandReader};
use wiegand_hardware::{EdgeSource, FrameConsumer};
use wiegand_storage::{AccessJournal, JournalDispatcher};

use cli::{CardInput, Cli};
use drain::{DrainStatus, DrainTracker};

/// How long to wait without a new frame once input has ended.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => WiegandConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => WiegandConfig::default(),
    };
    let decoder = FieldDecoder::from_specs(&config.formats)?;

    // resolve command-line cards up front so a typo fails before anything runs
    let queued = cli
        .cards
        .iter()
        .map(|card| card.to_bits(&decoder))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let pulse_interval = Duration::from_micros(cli.pulse_interval_us);
    if pulse_interval >= config.capture.idle_timeout() {
        warn!(
            ?pulse_interval,
            idle_timeout = ?config.capture.idle_timeout(),
            "Pulse interval reaches the idle threshold; every bit will end a frame"
        );
    }

    let (sink, reader) = channel(config.capture.clone())?;
    let (mock, cards) = MockWiegandReader::new();
    let frame_gap =
        DEFAULT_FRAME_GAP.max(2 * (config.capture.idle_timeout() + config.poll_interval()));
    let mut mock = mock
        .with_pulse_interval(pulse_interval)
        .with_frame_gap(frame_gap);
    mock.attach(sink)?;
    info!(source = %mock.info(), "Edge source attached");

    let mut journal = cli
        .journal
        .map(|root| JournalDispatcher::new(AccessJournal::new(root)));
    let dispatcher = move |event: &DecodedEvent| -> wiegand_core::Result<()> {
        match journal.as_mut() {
            Some(journal) => journal.dispatch(event),
            None => Ok(()),
        }
    };
    let mut consumer = FrameConsumer::new(reader, decoder.clone(), dispatcher)
        .with_poll_interval(config.poll_interval());

    let stall_timeout = DrainTracker::stall_timeout(
        DRAIN_TIMEOUT,
        pulse_interval,
        config.capture.capacity_bits(),
        frame_gap,
        config.capture.idle_timeout(),
    );
    let mut drain = DrainTracker::new(stall_timeout, Instant::now());

    let interactive = queued.is_empty();
    let mut feeder = tokio::spawn(feed(cards, decoder, queued, interactive));
    let mut input_open = true;

    let mut interval = tokio::time::interval(consumer.poll_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                while let Some((frame, event)) = consumer.poll_frame() {
                    print_event(&frame, &event);
                    drain.frame_delivered(frame.bit_count(), Instant::now());
                }
            }
            result = &mut feeder, if input_open => {
                let bits = result.context("card feeder stopped")??;
                drain.input_finished(bits, Instant::now());
                input_open = false;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }

        let dropped = consumer.reader_mut().stats().dropped_bits;
        match drain.status(dropped, Instant::now()) {
            DrainStatus::Pending => {}
            DrainStatus::Complete => break,
            DrainStatus::Stalled { presented, settled } => {
                warn!(presented, settled, "Gave up waiting for outstanding bits");
                break;
            }
        }
    }

    let stats = consumer.stats();
    info!(
        events = stats.events,
        dispatch_errors = stats.dispatch_errors,
        "Done"
    );
    Ok(())
}

/// Present every queued card, then stdin lines if interactive.
///
/// Returns how many bits were presented.
async fn feed(
    cards: MockReaderHandle,
    decoder: FieldDecoder,
    queued: Vec<Vec<bool>>,
    interactive: bool,
) -> anyhow::Result<usize> {
    let mut presented = 0;
    for bits in queued {
        presented += bits.len();
        cards.present_bits(bits).await?;
    }

    if interactive {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let bits = match line
                .parse::<CardInput>()
                .and_then(|card| card.to_bits(&decoder))
            {
                Ok(bits) => bits,
                Err(e) => {
                    eprintln!("ignored {line:?}: {e:#}");
                    continue;
                }
            };
            presented += bits.len();
            cards.present_bits(bits).await?;
        }
    }

    Ok(presented)
}

fn print_event(frame: &Frame, event: &DecodedEvent) {
    println!(
        "Read {} bits ({} bytes): {} : {}",
        frame.bit_count(),
        frame.byte_len(),
        frame.to_hex(),
        frame.to_binary()
    );
    println!("BITS={} VALUE={}", event.bit_count(), event.raw_value());
    if let (Some(facility), Some(card)) = (event.facility_code(), event.card_code()) {
        println!(
            "FACILITY={facility} CARD={card} VALUE={}",
            event.display_value()
        );
    }
}
