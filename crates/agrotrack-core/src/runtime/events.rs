// crates/agrotrack-core/src/runtime/events.rs
// ============================================================================
// Module: AgroTrack Event Sinks
// Description: JSON-line, recording, and discarding event sink implementations.
// Purpose: Give hosts audit-grade observability records without hard deps.
// Dependencies: crate::{core, interfaces}, serde_json, std
// ============================================================================

//! ## Overview
//! `LogEventSink` writes one JSON record per event to any writer; hosts
//! point it at stderr, a file, or a shipping pipeline. `RecordingEventSink`
//! captures events for assertions; `NullEventSink` discards them. Sinks
//! are advisory and never fail the emitting operation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::Event;
use crate::interfaces::EventSink;

// ============================================================================
// SECTION: Log Sink
// ============================================================================

/// JSON-line event sink over any writer.
pub struct LogEventSink<W: Write + Send> {
    /// Output writer for event records.
    writer: Mutex<W>,
}

impl<W: Write + Send> LogEventSink<W> {
    /// Creates a log sink over `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the sink and returns the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> EventSink for LogEventSink<W> {
    fn emit(&self, event: &Event) {
        let Ok(mut guard) = self.writer.lock() else {
            return;
        };
        if serde_json::to_writer(&mut *guard, event).is_ok() {
            // A trailing-newline failure leaves a merged record; the next
            // write still lands.
            drop(guard.write_all(b"\n"));
        }
    }
}

// ============================================================================
// SECTION: Recording Sink
// ============================================================================

/// Event sink that records every event, for tests and demos.
#[derive(Debug, Default, Clone)]
pub struct RecordingEventSink {
    /// Recorded events protected by a mutex.
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingEventSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded events.
    #[must_use]
    pub fn recorded(&self) -> Vec<Event> {
        self.events.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: &Event) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}

// ============================================================================
// SECTION: Null Sink
// ============================================================================

/// Event sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: &Event) {}
}
