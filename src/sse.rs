//! Incremental decoder for `text/event-stream` bodies.
//!
//! Bytes arrive in whatever chunks the transport hands us; the decoder
//! buffers partial lines and emits complete events as blank lines dispatch
//! them.

use std::time::Duration;

/// Event type used when a message carries no `event:` field
pub const DEFAULT_EVENT: &str = "message";

/// Longest line kept in memory; anything past it is skipped to the next
/// line terminator
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// A dispatched server-sent event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
    /// Last event id seen on the stream at dispatch time
    pub id: Option<String>,
}

#[derive(Debug)]
pub struct EventDecoder {
    line: Vec<u8>,
    max_line: usize,
    /// Inside an oversized line, waiting for its terminator
    discarding: bool,
    after_cr: bool,
    bom_checked: bool,
    data: String,
    event_type: String,
    last_event_id: String,
    retry: Option<Duration>,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            line: Vec::new(),
            max_line,
            discarding: false,
            after_cr: false,
            bom_checked: false,
            data: String::new(),
            event_type: String::new(),
            last_event_id: String::new(),
            retry: None,
        }
    }

    /// Reset per-connection buffers before reading a fresh response body.
    /// The last event id and reconnection delay carry over.
    pub fn begin_stream(&mut self) {
        self.line.clear();
        self.discarding = false;
        self.after_cr = false;
        self.bom_checked = false;
        self.data.clear();
        self.event_type.clear();
    }

    /// Feed one chunk and collect every event it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        let mut events = Vec::new();
        for &b in chunk {
            match b {
                b'\n' if self.after_cr => self.after_cr = false,
                b'\n' => self.end_line(&mut events),
                b'\r' => {
                    self.after_cr = true;
                    self.end_line(&mut events);
                }
                _ => {
                    self.after_cr = false;
                    if self.discarding {
                        continue;
                    }
                    if self.line.len() >= self.max_line {
                        tracing::warn!(limit = self.max_line, "event stream line too long, dropping it");
                        self.line = Vec::new();
                        self.discarding = true;
                    } else {
                        self.line.push(b);
                    }
                }
            }
        }
        events
    }

    /// Last non-empty event id, sent back as `Last-Event-ID` on reconnect
    pub fn last_event_id(&self) -> Option<&str> {
        if self.last_event_id.is_empty() {
            None
        } else {
            Some(&self.last_event_id)
        }
    }

    /// Reconnection delay requested by the server since the last call
    pub fn take_retry(&mut self) -> Option<Duration> {
        self.retry.take()
    }

    fn end_line(&mut self, events: &mut Vec<SseEvent>) {
        if self.discarding {
            // The oversized line is ignored; it does not dispatch either.
            self.discarding = false;
            return;
        }
        let raw = std::mem::take(&mut self.line);
        let mut line = String::from_utf8_lossy(&raw).into_owned();
        if !self.bom_checked {
            self.bom_checked = true;
            if let Some(rest) = line.strip_prefix('\u{feff}') {
                line = rest.to_string();
            }
        }
        if let Some(event) = self.process_line(&line) {
            events.push(event);
        }
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
            }
            "event" => self.event_type = value.to_string(),
            "id" => {
                if !value.contains('\0') {
                    self.last_event_id = value.to_string();
                }
            }
            "retry" => {
                if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
                    if let Ok(ms) = value.parse::<u64>() {
                        self.retry = Some(Duration::from_millis(ms));
                    }
                }
            }
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event_type = std::mem::take(&mut self.event_type);
        if self.data.is_empty() {
            return None;
        }

        let mut data = std::mem::take(&mut self.data);
        if data.ends_with('\n') {
            data.pop();
        }

        Some(SseEvent {
            event: if event_type.is_empty() {
                DEFAULT_EVENT.to_string()
            } else {
                event_type
            },
            data,
            id: self.last_event_id().map(str::to_string),
        })
    }
}

impl Default for EventDecoder {
    fn default() -> Self {
        Self::new()
    }
}
