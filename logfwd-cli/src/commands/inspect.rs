//! `logfwd inspect` command handler

use std::io::Write;

use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use logfwd_serializer::container::has_magic;
use logfwd_serializer::{ContainerDecoder, DecodedRecord};

use crate::cli::InspectArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};
use crate::sink::split_frames;

/// Execute the `inspect` command.
pub async fn execute(args: InspectArgs, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %args.path, "inspecting frame stream");

    let bytes = if args.path == "-" {
        let mut buf = Vec::new();
        tokio::io::stdin().read_to_end(&mut buf).await?;
        buf
    } else {
        tokio::fs::read(&args.path).await?
    };

    let report = inspect_frames(&args.path, &bytes)?;
    writer.render(&report)?;
    Ok(())
}

/// Decode every frame of a frame stream.
///
/// Frames that start with the container magic are decoded into records;
/// a container that fails to decode is reported as invalid rather than
/// aborting the whole report. Other frames are shown as text.
pub fn inspect_frames(source: &str, bytes: &[u8]) -> Result<InspectReport, CliError> {
    let decoder = ContainerDecoder::new();

    let frames = split_frames(bytes)?
        .into_iter()
        .enumerate()
        .map(|(index, payload)| inspect_frame(&decoder, index, payload))
        .collect::<Vec<_>>();

    debug!(frames = frames.len(), "frame stream inspected");

    Ok(InspectReport {
        source: source.to_owned(),
        total_bytes: bytes.len(),
        frames,
    })
}

fn inspect_frame(decoder: &ContainerDecoder, index: usize, payload: &[u8]) -> FrameEntry {
    let mut entry = FrameEntry {
        index,
        bytes: payload.len(),
        kind: FrameKind::Raw,
        schema: None,
        records: Vec::new(),
        text: None,
        error: None,
    };

    if !has_magic(payload) {
        entry.text = Some(String::from_utf8_lossy(payload).into_owned());
        return entry;
    }

    match decoder.decode(payload) {
        Ok(container) => {
            entry.kind = FrameKind::Container;
            entry.schema = Some(container.schema.name().to_owned());
            entry.records = container.records;
        }
        Err(e) => {
            entry.kind = FrameKind::Invalid;
            entry.error = Some(e.to_string());
        }
    }
    entry
}

/// Kind of a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    Container,
    Raw,
    Invalid,
}

/// One decoded frame.
#[derive(Debug, Serialize)]
pub struct FrameEntry {
    /// Position in the stream (0-based).
    pub index: usize,
    /// Payload size in bytes.
    pub bytes: usize,
    pub kind: FrameKind,
    /// Record schema name (containers only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<DecodedRecord>,
    /// Raw frame text (lossy UTF-8).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Decode failure reason (invalid containers only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Frame stream inspection report.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    /// Input path (`-` for stdin).
    pub source: String,
    /// Stream size in bytes.
    pub total_bytes: usize,
    pub frames: Vec<FrameEntry>,
}

impl InspectReport {
    /// Number of frames of the given kind.
    pub fn count(&self, kind: FrameKind) -> usize {
        self.frames.iter().filter(|f| f.kind == kind).count()
    }
}

impl Render for InspectReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            w,
            "Frames: {} ({} container, {} raw, {} invalid) from {} ({} bytes)",
            self.frames.len(),
            self.count(FrameKind::Container),
            self.count(FrameKind::Raw),
            self.count(FrameKind::Invalid),
            self.source,
            self.total_bytes
        )?;

        for frame in &self.frames {
            match frame.kind {
                FrameKind::Container => {
                    writeln!(
                        w,
                        "#{:<4} container {} ({} bytes)",
                        frame.index,
                        frame.schema.as_deref().unwrap_or("?"),
                        frame.bytes
                    )?;
                    for record in &frame.records {
                        let json = serde_json::to_string(record).map_err(std::io::Error::other)?;
                        writeln!(w, "      {json}")?;
                    }
                }
                FrameKind::Raw => {
                    writeln!(w, "#{:<4} raw ({} bytes)", frame.index, frame.bytes)?;
                    writeln!(w, "      {}", frame.text.as_deref().unwrap_or(""))?;
                }
                FrameKind::Invalid => {
                    writeln!(
                        w,
                        "#{:<4} invalid container ({} bytes): {}",
                        frame.index,
                        frame.bytes,
                        frame.error.as_deref().unwrap_or("unknown error")
                    )?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use logfwd_core::transport::{MessageSink, OutboundMessage, PayloadKind, TopicTarget};
    use logfwd_serializer::{FieldValue, SerializationEngine, SerializerConfig, Serialized};

    use crate::sink::FrameWriterSink;

    const ACCESS_DOC: &str = r#"pattern: (\d+) (\w+)
//--AVRO--
{"type":"record","name":"Access","fields":[
  {"name":"status","type":"int"},
  {"name":"method","type":"string"}
]}"#;

    fn frame_stream(lines: &[&str]) -> Vec<u8> {
        let mut engine = SerializationEngine::new(SerializerConfig::default());
        engine.configure_from_str(ACCESS_DOC);
        let mut sink = FrameWriterSink::new(Vec::new());
        let target = TopicTarget::parse("access").unwrap();

        for line in lines {
            let (payload, kind) = engine.serialize(line).unwrap().into_payload().unwrap();
            sink.send(OutboundMessage {
                target: target.clone(),
                key: None,
                payload,
                kind,
            })
            .unwrap();
        }
        sink.into_inner()
    }

    #[test]
    fn decodes_containers_and_shows_raw_frames() {
        let bytes = frame_stream(&["200 GET", "abc GET"]);
        let report = inspect_frames("frames.bin", &bytes).unwrap();

        assert_eq!(report.frames.len(), 2);
        assert_eq!(report.frames[0].kind, FrameKind::Container);
        assert_eq!(report.frames[0].schema.as_deref(), Some("Access"));
        assert_eq!(
            report.frames[0].records[0].get("status"),
            Some(&FieldValue::Int32(200))
        );
        assert_eq!(report.frames[1].kind, FrameKind::Raw);
        assert_eq!(report.frames[1].text.as_deref(), Some("abc GET"));
    }

    #[test]
    fn corrupted_container_is_reported_not_fatal() {
        let mut engine = SerializationEngine::new(SerializerConfig::default());
        engine.configure_from_str(ACCESS_DOC);
        let Serialized::Encoded(container) = engine.serialize("200 GET").unwrap() else {
            panic!("expected encoded container");
        };
        let truncated = Bytes::copy_from_slice(&container[..container.len() - 3]);

        let mut sink = FrameWriterSink::new(Vec::new());
        sink.send(OutboundMessage {
            target: TopicTarget::parse("access").unwrap(),
            key: None,
            payload: truncated,
            kind: PayloadKind::Container,
        })
        .unwrap();

        let report = inspect_frames("-", &sink.into_inner()).unwrap();
        assert_eq!(report.count(FrameKind::Invalid), 1);
        assert!(report.frames[0].error.is_some());
    }

    #[test]
    fn text_rendering_lists_frames() {
        let bytes = frame_stream(&["404 POST", "not a match"]);
        let report = inspect_frames("frames.bin", &bytes).unwrap();

        let mut out = Vec::new();
        report.render_text(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Frames: 2 (1 container, 1 raw, 0 invalid)"));
        assert!(text.contains(r#"{"status":404,"method":"POST"}"#));
        assert!(text.contains("not a match"));
    }

    #[test]
    fn json_report_omits_empty_fields() {
        let bytes = frame_stream(&["plain line"]);
        let report = inspect_frames("frames.bin", &bytes).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        let frame = &json["frames"][0];
        assert_eq!(frame["kind"], "raw");
        assert_eq!(frame["text"], "plain line");
        assert!(frame.get("records").is_none());
        assert!(frame.get("schema").is_none());
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let err = inspect_frames("frames.bin", &[0, 0, 0, 10, 1]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
