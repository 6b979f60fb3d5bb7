// crates/spine-broker/tests/sink_tests.rs
// ============================================================================
// Module: Telemetry Sink Tests
// Description: Tests for log, channel, and callback telemetry sinks.
// Purpose: Validate fire-and-forget delivery and drop accounting.
// Dependencies: spine-broker, spine-core, tokio
// ============================================================================
//! ## Overview
//! Exercises each reference telemetry sink: delivery, drop counting under
//! failure, and the guarantee that emit never blocks or propagates errors.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::io;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use spine_broker::CallbackTelemetrySink;
use spine_broker::ChannelTelemetrySink;
use spine_broker::LogTelemetrySink;
use spine_core::PolicySnapshotId;
use spine_core::TelemetryEvent;
use spine_core::TelemetrySink;
use spine_core::ThreadId;

/// Builds a representative telemetry event.
fn sample_event() -> TelemetryEvent {
    TelemetryEvent::SpineOpened {
        thread_id: ThreadId::new("thread-1"),
        policy_snapshot_id: PolicySnapshotId::new("ps-1"),
    }
}

/// Shared in-memory writer for log sink assertions.
#[derive(Clone, Default)]
struct SharedBuffer {
    /// Captured bytes.
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().map_err(|_| io::Error::other("poisoned"))?.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer that always fails, for drop accounting.
struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Log Sink
// ============================================================================

/// The log sink writes one parseable JSON line per event.
#[test]
fn log_sink_writes_json_lines() {
    let buffer = SharedBuffer::default();
    let sink = LogTelemetrySink::new(buffer.clone());

    sink.emit(&sample_event());
    sink.emit(&sample_event());

    let bytes = buffer.bytes.lock().unwrap().clone();
    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["event"], "spine_opened");
        assert_eq!(value["thread_id"], "thread-1");
        assert_eq!(value["policy_snapshot_id"], "ps-1");
    }
    assert_eq!(sink.dropped(), 0);
}

/// Write failures are counted, never propagated.
#[test]
fn log_sink_counts_drops_on_write_failure() {
    let sink = LogTelemetrySink::new(FailingWriter);

    sink.emit(&sample_event());
    sink.emit(&sample_event());

    assert_eq!(sink.dropped(), 2);
}

// ============================================================================
// SECTION: Channel Sink
// ============================================================================

/// Delivered events arrive on the channel in order.
#[test]
fn channel_sink_forwards_events() {
    let (sender, mut receiver) = tokio::sync::mpsc::channel(4);
    let sink = ChannelTelemetrySink::new(sender);

    sink.emit(&sample_event());

    let received = receiver.try_recv().unwrap();
    assert_eq!(received.as_str(), "spine_opened");
    assert_eq!(sink.dropped(), 0);
}

/// A full channel counts the drop without blocking.
#[test]
fn channel_sink_drops_on_backpressure() {
    let (sender, _receiver) = tokio::sync::mpsc::channel(1);
    let sink = ChannelTelemetrySink::new(sender);

    sink.emit(&sample_event());
    sink.emit(&sample_event());

    assert_eq!(sink.dropped(), 1);
}

/// A closed channel counts the drop without erroring.
#[test]
fn channel_sink_drops_on_closed_channel() {
    let (sender, receiver) = tokio::sync::mpsc::channel(1);
    drop(receiver);
    let sink = ChannelTelemetrySink::new(sender);

    sink.emit(&sample_event());

    assert_eq!(sink.dropped(), 1);
}

// ============================================================================
// SECTION: Callback Sink
// ============================================================================

/// The callback sink invokes the handler once per event.
#[test]
fn callback_sink_invokes_handler() {
    let calls = Arc::new(AtomicU64::new(0));
    let sink = {
        let calls = Arc::clone(&calls);
        CallbackTelemetrySink::new(move |event| {
            assert_eq!(event.as_str(), "spine_opened");
            calls.fetch_add(1, Ordering::SeqCst);
        })
    };

    sink.emit(&sample_event());
    sink.emit(&sample_event());

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
