//! Length-delimited frame output
//!
//! [`FrameWriterSink`] writes every message as a frame:
//!
//! ```text
//! +----------------------+----------------------+
//! | length (u32, BE)     | payload (length B)   |
//! +----------------------+----------------------+
//! ```
//!
//! The frame stream is the hand-off format for an external broker producer.
//! [`split_frames`] reads it back for `logfwd inspect`.

use std::fs::File;
use std::io::{BufWriter, Stdout, Write};
use std::path::Path;

use logfwd_core::error::{LogfwdError, TransportError};
use logfwd_core::metrics as m;
use logfwd_core::transport::{MessageSink, OutboundMessage};
use tracing::trace;

use crate::error::CliError;

/// Size of the frame length prefix.
pub const FRAME_HEADER_LEN: usize = 4;

/// Sink writing length-delimited frames to any `Write`.
pub struct FrameWriterSink<W: Write + Send> {
    name: String,
    writer: W,
    frames_written: u64,
    bytes_written: u64,
}

impl FrameWriterSink<BufWriter<Stdout>> {
    /// Frames on standard output.
    pub fn stdout() -> Self {
        Self::with_name("stdout", BufWriter::new(std::io::stdout()))
    }
}

impl FrameWriterSink<BufWriter<File>> {
    /// Frames in a newly created (truncated) file.
    pub fn create(path: &Path) -> Result<Self, CliError> {
        let file = File::create(path)?;
        Ok(Self::with_name(
            format!("file:{}", path.display()),
            BufWriter::new(file),
        ))
    }
}

impl<W: Write + Send> FrameWriterSink<W> {
    /// Frames on an arbitrary writer.
    pub fn new(writer: W) -> Self {
        Self::with_name("writer", writer)
    }

    fn with_name(name: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            writer,
            frames_written: 0,
            bytes_written: 0,
        }
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Number of payload bytes written so far (excluding length prefixes).
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> MessageSink for FrameWriterSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&mut self, message: OutboundMessage) -> Result<(), LogfwdError> {
        let len = u32::try_from(message.payload.len()).map_err(|_| {
            TransportError::SendFailed(format!(
                "payload of {} bytes exceeds frame limit",
                message.payload.len()
            ))
        })?;

        self.writer.write_all(&len.to_be_bytes())?;
        self.writer.write_all(&message.payload)?;

        self.frames_written += 1;
        self.bytes_written += u64::from(len);
        metrics::counter!(m::TRANSPORT_MESSAGES_SENT_TOTAL).increment(1);
        metrics::counter!(m::TRANSPORT_BYTES_SENT_TOTAL).increment(u64::from(len));

        trace!(
            sink = %self.name,
            target = %message.target,
            key = message.key.as_deref().unwrap_or(""),
            kind = %message.kind,
            bytes = len,
            "frame written"
        );
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LogfwdError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Split a frame stream into payload slices.
///
/// # Errors
///
/// Returns `CliError::Frame` when the stream ends inside a length prefix
/// or a payload.
pub fn split_frames(mut bytes: &[u8]) -> Result<Vec<&[u8]>, CliError> {
    let mut frames = Vec::new();
    let mut offset = 0usize;

    while !bytes.is_empty() {
        let Some((header, rest)) = bytes.split_first_chunk::<FRAME_HEADER_LEN>() else {
            return Err(CliError::Frame(format!(
                "truncated length prefix at offset {offset}"
            )));
        };
        let len = u32::from_be_bytes(*header) as usize;
        if rest.len() < len {
            return Err(CliError::Frame(format!(
                "frame at offset {offset} declares {len} bytes, only {} left",
                rest.len()
            )));
        }

        let (payload, rest) = rest.split_at(len);
        frames.push(payload);
        offset += FRAME_HEADER_LEN + len;
        bytes = rest;
    }

    Ok(frames)
}
