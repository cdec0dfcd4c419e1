//! Producer and consumer racing on real threads.
//!
//! The idle threshold is set very low so frames are cut at whatever points
//! the scheduler happens to pause the producer. Whatever the interleaving,
//! the delivered frames concatenated must equal the bits sent.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use wiegand_capture::{FrameReader, channel};
use wiegand_core::CaptureSettings;
use wiegand_core::constants::MAX_CONFIGURABLE_FRAME_BYTES;

const DEADLINE: Duration = Duration::from_secs(20);

fn settings() -> CaptureSettings {
    CaptureSettings::default()
        .with_idle_timeout(Duration::from_micros(50))
        .with_max_frame_bytes(MAX_CONFIGURABLE_FRAME_BYTES)
}

/// Deterministic pseudo-random bits and pauses.
fn xorshift(state: &mut u64) -> u64 {
    *state ^= *state << 13;
    *state ^= *state >> 7;
    *state ^= *state << 17;
    *state
}

/// Take frames until `expected` bits have been delivered.
fn drain(reader: &mut FrameReader, expected: usize, done: &AtomicBool) -> Vec<Vec<bool>> {
    let started = Instant::now();
    let mut frames = Vec::new();
    let mut received = 0;

    while received < expected {
        assert!(started.elapsed() < DEADLINE, "only {received}/{expected} bits delivered");
        if let Some(frame) = reader.next_frame() {
            received += frame.bit_count();
            frames.push(frame.bits().collect());
        } else if done.load(Ordering::Acquire) {
            thread::sleep(Duration::from_micros(100));
        } else {
            thread::yield_now();
        }
    }
    frames
}

#[test]
fn test_no_bit_lost_or_duplicated() {
    const TOTAL: usize = 20_000;

    let (sink, mut reader) = channel(settings()).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let producer = {
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut state = 0x9E37_79B9_7F4A_7C15;
            let mut sent = Vec::with_capacity(TOTAL);
            for _ in 0..TOTAL {
                let r = xorshift(&mut state);
                let bit = r & 1 == 1;
                sink.on_edge(bit.into());
                sent.push(bit);
                match (r >> 1) % 64 {
                    0 => thread::sleep(Duration::from_micros(200)),
                    1..=8 => thread::yield_now(),
                    _ => {}
                }
            }
            done.store(true, Ordering::Release);
            sent
        })
    };

    let frames = drain(&mut reader, TOTAL, &done);
    let sent = producer.join().unwrap();

    let delivered: Vec<bool> = frames.iter().flatten().copied().collect();
    assert_eq!(delivered.len(), TOTAL);
    assert_eq!(delivered, sent);
    assert!(frames.iter().all(|f| !f.is_empty()));

    let stats = reader.stats();
    assert_eq!(stats.edges, TOTAL as u64);
    assert_eq!(stats.dropped_bits, 0);
    assert_eq!(stats.frames_delivered, frames.len() as u64);
}

#[test]
fn test_cloned_sinks_share_one_frame() {
    const PER_THREAD: usize = 5_000;

    let (sink, mut reader) = channel(settings()).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let ones = sink.clone();
    let zeros = sink;
    let producers = [
        thread::spawn(move || (0..PER_THREAD).for_each(|_| ones.data1_pulse())),
        thread::spawn(move || (0..PER_THREAD).for_each(|_| zeros.data0_pulse())),
    ];

    let watcher = {
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for producer in producers {
                producer.join().unwrap();
            }
            done.store(true, Ordering::Release);
        })
    };

    let frames = drain(&mut reader, 2 * PER_THREAD, &done);
    watcher.join().unwrap();

    let delivered: Vec<bool> = frames.into_iter().flatten().collect();
    assert_eq!(delivered.iter().filter(|&&b| b).count(), PER_THREAD);
    assert_eq!(delivered.iter().filter(|&&b| !b).count(), PER_THREAD);
}

#[test]
fn test_stats_readable_while_producing() {
    let (sink, reader) = channel(CaptureSettings::default()).unwrap();

    let producer = thread::spawn(move || {
        for i in 0..1_000 {
            sink.on_edge((i % 3 == 0).into());
        }
    });

    let mut last = 0;
    while !producer.is_finished() {
        let edges = reader.stats().edges;
        assert!(edges >= last, "edge counter went backwards");
        last = edges;
        thread::yield_now();
    }
    producer.join().unwrap();
    assert_eq!(reader.stats().edges, 1_000);
}
