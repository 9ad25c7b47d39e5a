//! `logfwd check` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use logfwd_core::config::LogfwdConfig;
use logfwd_serializer::{
    ContainerDecoder, DecodedRecord, EngineMode, FieldDef, SerializationEngine, SerializerConfig,
    Serialized,
};

use crate::cli::CheckArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `check` command.
///
/// Renders the report, then fails with `CliError::Config` when the schema
/// configuration would leave the engine in raw mode.
pub fn execute(
    args: CheckArgs,
    config: &LogfwdConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %args.path, "checking schema configuration");

    let engine_config = SerializerConfig::from_core(&config.serializer);
    engine_config.validate()?;

    let report = check_schema(&args.path, args.sample.as_deref(), engine_config)?;
    writer.render(&report)?;

    if report.mode != EngineMode::Schema.as_str() {
        return Err(CliError::Config(format!(
            "schema configuration '{}' is not usable",
            args.path
        )));
    }
    Ok(())
}

/// Configure an engine from `path` and describe the outcome.
///
/// With a `sample` line, the line is serialized and the result decoded
/// back so the report shows exactly what would be sent.
pub fn check_schema(
    path: &str,
    sample: Option<&str>,
    engine_config: SerializerConfig,
) -> Result<CheckReport, CliError> {
    let mut engine = SerializationEngine::new(engine_config);
    let mode = engine.configure(path);

    let fields = engine
        .schema()
        .map(|s| s.fields().to_vec())
        .unwrap_or_default();
    let capture_groups = engine.capture_count();

    let mut report = CheckReport {
        path: path.to_owned(),
        mode: mode.as_str().to_owned(),
        schema: engine.schema().map(|s| s.name().to_owned()),
        pattern: engine.pattern().map(str::to_owned),
        arity_matches: capture_groups.map(|c| c == fields.len()),
        capture_groups,
        fields,
        reason: engine.degraded_reason().map(str::to_owned),
        sample: None,
    };

    if let Some(line) = sample {
        report.sample = Some(run_sample(&mut engine, line)?);
    }

    Ok(report)
}

fn run_sample(engine: &mut SerializationEngine, line: &str) -> Result<SampleResult, CliError> {
    let result = match engine.serialize(line) {
        Ok(Serialized::Encoded(bytes)) => {
            let container = ContainerDecoder::new().decode(&bytes)?;
            SampleResult {
                line: line.to_owned(),
                outcome: "encoded".to_owned(),
                bytes: bytes.len(),
                record: container.records.into_iter().next(),
                error: None,
            }
        }
        Ok(Serialized::Raw(bytes)) => SampleResult {
            line: line.to_owned(),
            outcome: "raw".to_owned(),
            bytes: bytes.len(),
            record: None,
            error: None,
        },
        Ok(Serialized::Discarded) => SampleResult {
            line: line.to_owned(),
            outcome: "discarded".to_owned(),
            bytes: 0,
            record: None,
            error: None,
        },
        Err(e) => SampleResult {
            line: line.to_owned(),
            outcome: "rejected".to_owned(),
            bytes: 0,
            record: None,
            error: Some(e.to_string()),
        },
    };
    Ok(result)
}

/// Schema configuration check report.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    /// Path as given on the command line.
    pub path: String,
    /// Resulting engine mode (`schema` or `raw`).
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub fields: Vec<FieldDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_groups: Option<usize>,
    /// Whether the pattern has one capture group per field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arity_matches: Option<bool>,
    /// Why the engine fell back to raw mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<SampleResult>,
}

/// Outcome of running a sample line through the engine.
#[derive(Debug, Serialize)]
pub struct SampleResult {
    pub line: String,
    /// `encoded`, `raw`, `discarded` or `rejected`.
    pub outcome: String,
    /// Size of the produced payload.
    pub bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<DecodedRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Render for CheckReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Schema config: {}", self.path)?;
        writeln!(w, "Mode:          {}", self.mode)?;

        if let Some(reason) = &self.reason {
            writeln!(w, "Reason:        {reason}")?;
        }
        if let Some(schema) = &self.schema {
            writeln!(w, "Record:        {schema}")?;
        }
        if let Some(pattern) = &self.pattern {
            writeln!(w, "Pattern:       {pattern}")?;
        }

        if !self.fields.is_empty() {
            writeln!(w)?;
            writeln!(w, "{:<4} {:<24} {:<8}", "#", "Field", "Type")?;
            writeln!(w, "{}", "-".repeat(38))?;
            for (i, field) in self.fields.iter().enumerate() {
                writeln!(w, "{:<4} {:<24} {:<8}", i + 1, field.name, field.kind)?;
            }
        }

        if let (Some(groups), Some(matches)) = (self.capture_groups, self.arity_matches) {
            writeln!(w)?;
            let status = if matches { "ok" } else { "MISMATCH" };
            writeln!(
                w,
                "Capture groups: {groups}, fields: {} ({status})",
                self.fields.len()
            )?;
        }

        if let Some(sample) = &self.sample {
            writeln!(w)?;
            writeln!(w, "Sample:  {}", sample.line)?;
            writeln!(w, "Outcome: {} ({} bytes)", sample.outcome, sample.bytes)?;
            if let Some(record) = &sample.record {
                let json = serde_json::to_string(record).map_err(std::io::Error::other)?;
                writeln!(w, "Record:  {json}")?;
            }
            if let Some(error) = &sample.error {
                writeln!(w, "Error:   {error}")?;
            }
        }

        Ok(())
    }
}
