//! `logfwd send` command handler

use std::borrow::Cow;
use std::path::Path;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use logfwd_core::config::LogfwdConfig;
use logfwd_core::transport::{MessageSink, OutboundMessage, PayloadKind, TopicTarget};
use logfwd_serializer::{
    CoercionMode, EngineMode, MismatchPolicy, SerializationEngine, SerializerConfig,
};

use crate::cli::{MismatchArg, SendArgs};
use crate::error::CliError;
use crate::sink::FrameWriterSink;

/// Per-run delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SendStats {
    /// Lines read from the input.
    pub lines: u64,
    /// Messages delivered as encoded containers.
    pub encoded: u64,
    /// Messages delivered as raw lines.
    pub raw: u64,
    /// Empty lines dropped before serialization.
    pub dropped: u64,
    /// Lines rejected by the `fail` mismatch policy.
    pub rejected: u64,
}

impl SendStats {
    /// Total messages handed to the sink.
    pub fn sent(&self) -> u64 {
        self.encoded + self.raw
    }
}

/// Execute the `send` command.
pub async fn execute(args: SendArgs, config: &LogfwdConfig) -> Result<(), CliError> {
    let mut engine = SerializationEngine::new(engine_config(&args, config)?);

    let schema = args
        .schema
        .clone()
        .unwrap_or_else(|| config.serializer.schema.clone());
    if schema.trim().is_empty() {
        info!("no schema configured, forwarding raw lines");
    } else {
        let mode = engine.configure(&schema);
        info!(schema = %schema, mode = %mode, "serializer ready");
    }

    let topic = args
        .topic
        .clone()
        .unwrap_or_else(|| config.transport.topic.clone());
    let target = TopicTarget::parse(&topic).map_err(|e| CliError::Config(e.to_string()))?;

    let key = args
        .key
        .clone()
        .unwrap_or_else(|| config.transport.key.clone());
    let key = (!key.is_empty()).then_some(key);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.transport.output.clone());

    let stats = if output == "-" {
        let mut sink = FrameWriterSink::stdout();
        deliver(&args, &mut engine, &mut sink, &target, key.as_deref()).await?
    } else {
        let mut sink = FrameWriterSink::create(Path::new(&output))?;
        deliver(&args, &mut engine, &mut sink, &target, key.as_deref()).await?
    };

    info!(
        target = %target,
        lines = stats.lines,
        encoded = stats.encoded,
        raw = stats.raw,
        dropped = stats.dropped,
        rejected = stats.rejected,
        "send finished"
    );

    if stats.rejected > 0 {
        return Err(CliError::Command(format!(
            "{} line(s) rejected by mismatch policy",
            stats.rejected
        )));
    }
    Ok(())
}

/// Build the engine configuration: file section first, then CLI flags.
fn engine_config(args: &SendArgs, config: &LogfwdConfig) -> Result<SerializerConfig, CliError> {
    let mut engine_config = SerializerConfig::from_core(&config.serializer);
    if args.strict {
        engine_config.coercion = CoercionMode::Strict;
    }
    if let Some(policy) = args.on_mismatch {
        engine_config.on_mismatch = match policy {
            MismatchArg::Fallback => MismatchPolicy::Fallback,
            MismatchArg::Fail => MismatchPolicy::Fail,
        };
    }
    engine_config.validate()?;
    Ok(engine_config)
}

async fn deliver<S: MessageSink>(
    args: &SendArgs,
    engine: &mut SerializationEngine,
    sink: &mut S,
    target: &TopicTarget,
    key: Option<&str>,
) -> Result<SendStats, CliError> {
    match &args.message {
        Some(message) => forward_lines(message.as_bytes(), engine, sink, target, key).await,
        None => {
            let stdin = BufReader::new(tokio::io::stdin());
            forward_lines(stdin, engine, sink, target, key).await
        }
    }
}

/// Serialize every line of `input` and hand the result to `sink`.
///
/// Invalid UTF-8 is replaced with U+FFFD and the line is still delivered.
/// Empty lines are dropped with a warning. Lines rejected by the `fail`
/// policy are logged and counted; the remaining lines are still delivered.
/// The sink is flushed before returning.
pub async fn forward_lines<R, S>(
    mut input: R,
    engine: &mut SerializationEngine,
    sink: &mut S,
    target: &TopicTarget,
    key: Option<&str>,
) -> Result<SendStats, CliError>
where
    R: AsyncBufRead + Unpin,
    S: MessageSink,
{
    let mut stats = SendStats::default();
    let mut buf = Vec::new();

    if engine.mode() == EngineMode::Raw {
        warn!(
            reason = engine.degraded_reason().unwrap_or("unknown"),
            "schema unavailable, lines will be forwarded raw"
        );
    }

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        stats.lines += 1;

        let line = line_text(&buf);
        if let Cow::Owned(_) = line {
            warn!(line = stats.lines, "invalid UTF-8 replaced");
        }

        if line.is_empty() {
            warn!(line = stats.lines, "empty line dropped");
            stats.dropped += 1;
            continue;
        }

        let serialized = match engine.serialize(&line) {
            Ok(serialized) => serialized,
            Err(e) => {
                error!(line = stats.lines, error = %e, "line rejected");
                stats.rejected += 1;
                continue;
            }
        };

        let Some((payload, kind)) = serialized.into_payload() else {
            stats.dropped += 1;
            continue;
        };

        match kind {
            PayloadKind::Container => stats.encoded += 1,
            PayloadKind::Raw => stats.raw += 1,
        }

        sink.send(OutboundMessage {
            target: target.clone(),
            key: key.map(str::to_owned),
            payload,
            kind,
        })?;
    }

    sink.flush()?;
    Ok(stats)
}

/// Strip the `\n` / `\r\n` terminator and decode lossily.
fn line_text(raw: &[u8]) -> Cow<'_, str> {
    let raw = match raw.strip_suffix(b"\n") {
        Some(line) => line.strip_suffix(b"\r").unwrap_or(line),
        None => raw,
    };
    String::from_utf8_lossy(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::split_frames;

    const ACCESS_DOC: &str = r#"pattern: (\d+) (\w+)
//--AVRO--
{"type":"record","name":"Access","fields":[
  {"name":"status","type":"int"},
  {"name":"method","type":"string"}
]}"#;

    fn send_args() -> SendArgs {
        SendArgs {
            message: None,
            schema: None,
            topic: None,
            key: None,
            output: None,
            strict: false,
            on_mismatch: None,
        }
    }

    #[tokio::test]
    async fn forwards_raw_lines_without_schema() {
        let mut engine = SerializationEngine::new(SerializerConfig::default());
        let mut sink = FrameWriterSink::new(Vec::new());
        let target = TopicTarget::parse("logs").unwrap();

        let stats = forward_lines(&b"hello\n\nworld\n"[..], &mut engine, &mut sink, &target, None)
            .await
            .unwrap();

        assert_eq!(stats.lines, 3);
        assert_eq!(stats.raw, 2);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.sent(), 2);

        let bytes = sink.into_inner();
        assert_eq!(
            split_frames(&bytes).unwrap(),
            vec![&b"hello"[..], &b"world"[..]]
        );
    }

    #[tokio::test]
    async fn encodes_matching_lines_and_falls_back_on_others() {
        let mut engine = SerializationEngine::new(SerializerConfig::default());
        engine.configure_from_str(ACCESS_DOC);
        let mut sink = FrameWriterSink::new(Vec::new());
        let target = TopicTarget::parse("access:2").unwrap();

        let stats = forward_lines(
            &b"200 GET\r\nabc GET\n"[..],
            &mut engine,
            &mut sink,
            &target,
            Some("web-01"),
        )
        .await
        .unwrap();

        assert_eq!(stats.encoded, 1);
        assert_eq!(stats.raw, 1);

        let bytes = sink.into_inner();
        let frames = split_frames(&bytes).unwrap();
        assert!(frames[0].starts_with(b"Obj\x01"));
        assert_eq!(frames[1], b"abc GET");
    }

    #[tokio::test]
    async fn fail_policy_rejects_and_continues() {
        let config = SerializerConfig {
            on_mismatch: MismatchPolicy::Fail,
            ..Default::default()
        };
        let mut engine = SerializationEngine::new(config);
        engine.configure_from_str(ACCESS_DOC);
        let mut sink = FrameWriterSink::new(Vec::new());
        let target = TopicTarget::parse("access").unwrap();

        let stats = forward_lines(
            &b"abc GET\n404 POST\n"[..],
            &mut engine,
            &mut sink,
            &target,
            None,
        )
        .await
        .unwrap();

        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.encoded, 1);
        assert_eq!(sink.frames_written(), 1);
    }

    #[tokio::test]
    async fn invalid_utf8_line_does_not_stop_the_run() {
        let mut engine = SerializationEngine::new(SerializerConfig::default());
        let mut sink = FrameWriterSink::new(Vec::new());
        let target = TopicTarget::parse("logs").unwrap();

        let stats = forward_lines(
            &b"first\nbad \xff byte\nthird\n"[..],
            &mut engine,
            &mut sink,
            &target,
            None,
        )
        .await
        .unwrap();

        assert_eq!(stats.lines, 3);
        assert_eq!(stats.raw, 3);

        let bytes = sink.into_inner();
        let frames = split_frames(&bytes).unwrap();
        assert_eq!(frames[1], "bad \u{fffd} byte".as_bytes());
        assert_eq!(frames[2], b"third");
    }

    #[test]
    fn line_text_strips_terminators() {
        assert_eq!(line_text(b"a\r\n"), "a");
        assert_eq!(line_text(b"a\n"), "a");
        assert_eq!(line_text(b"a"), "a");
        assert_eq!(line_text(b"a\r"), "a\r");
    }

    #[test]
    fn cli_flags_override_config_section() {
        let mut config = LogfwdConfig::default();
        config.serializer.on_mismatch = "fallback".to_owned();

        let args = SendArgs {
            strict: true,
            on_mismatch: Some(MismatchArg::Fail),
            ..send_args()
        };
        let resolved = engine_config(&args, &config).unwrap();
        assert_eq!(resolved.coercion, CoercionMode::Strict);
        assert_eq!(resolved.on_mismatch, MismatchPolicy::Fail);

        let resolved = engine_config(&send_args(), &config).unwrap();
        assert_eq!(resolved.coercion, CoercionMode::Lenient);
        assert_eq!(resolved.on_mismatch, MismatchPolicy::Fallback);
    }

    #[test]
    fn relative_config_dir_is_rejected() {
        let mut config = LogfwdConfig::default();
        config.serializer.config_dir = "schemas".to_owned();
        let err = engine_config(&send_args(), &config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
