// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Line-delimited event-stream framing.
//!
//! Used in both directions: decoding the Anthropic response stream, and
//! encoding/decoding the commit progress stream this service exposes.
//! Chunks from the network may split a line anywhere, including inside a
//! multi-byte character, so raw bytes are buffered and only complete lines
//! are decoded.

use crate::models::{CommitBuckets, ProgressEvent};

const DATA_PREFIX: &str = "data:";
const EVENT_PREFIX: &str = "event:";
const PROGRESS_SUFFIX: &str = " repositories processed";

/// Render a progress line, e.g. `3 of 7 repositories processed`.
pub fn format_progress(processed: usize, total: usize) -> String {
    format!("{} of {} repositories processed", processed, total)
}

/// Parse a progress line produced by [`format_progress`].
pub fn parse_progress(line: &str) -> Option<(usize, usize)> {
    let counts = line.trim().strip_suffix(PROGRESS_SUFFIX)?;
    let (processed, total) = counts.split_once(" of ")?;
    Some((processed.trim().parse().ok()?, total.trim().parse().ok()?))
}

/// One event-stream frame: an optional event name plus its data lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub event: Option<String>,
    pub data: String,
}

/// Accumulates raw chunks and yields complete frames.
///
/// Frames are separated by a blank line. Only `event:` and `data:` fields are
/// interpreted; comments and unknown fields are ignored.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    pending: Vec<u8>,
    current: Frame,
    has_data: bool,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every frame it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.pending.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            if let Some(frame) = self.accept_line(line.trim_end_matches(['\n', '\r'])) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Flush whatever is left once the underlying stream has ended.
    pub fn finish(&mut self) -> Option<Frame> {
        let rest = std::mem::take(&mut self.pending);
        if !rest.is_empty() {
            let line = String::from_utf8_lossy(&rest);
            if let Some(frame) = self.accept_line(line.trim_end_matches('\r')) {
                return Some(frame);
            }
        }
        self.take_frame()
    }

    fn accept_line(&mut self, line: &str) -> Option<Frame> {
        if line.is_empty() {
            return self.take_frame();
        }
        if let Some(value) = line.strip_prefix(DATA_PREFIX) {
            let value = value.strip_prefix(' ').unwrap_or(value);
            if self.has_data {
                self.current.data.push('\n');
            }
            self.current.data.push_str(value);
            self.has_data = true;
        } else if let Some(value) = line.strip_prefix(EVENT_PREFIX) {
            self.current.event = Some(value.trim().to_string());
        }
        None
    }

    fn take_frame(&mut self) -> Option<Frame> {
        if !self.has_data && self.current.event.is_none() {
            return None;
        }
        self.has_data = false;
        Some(std::mem::take(&mut self.current))
    }
}

/// Decode a frame of the commit progress stream.
///
/// The progress pattern is tried first; anything else must be the terminal
/// JSON payload. Frames named `error` carry a failure message.
pub fn decode_progress_frame(frame: &Frame) -> Result<ProgressEvent, serde_json::Error> {
    if frame.event.as_deref() == Some("error") {
        return Ok(ProgressEvent::Failed(frame.data.clone()));
    }
    if let Some((processed, total)) = parse_progress(&frame.data) {
        return Ok(ProgressEvent::Progress { processed, total });
    }
    let buckets: CommitBuckets = serde_json::from_str(&frame.data)?;
    Ok(ProgressEvent::Complete(buckets))
}
