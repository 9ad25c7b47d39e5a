//! 직렬화 엔진 -- 설정 로딩, 모드 전환, 라인 직렬화
//!
//! [`SerializationEngine`]은 스키마 설정 파일 하나로 구성됩니다.
//! 설정이 성공하면 schema 모드에서 라인마다 컨테이너 하나를 만들고,
//! 설정 단계의 어떤 실패든 경고 로그를 남긴 뒤 raw 모드로 전환되어
//! 라인을 그대로 전달합니다.
//!
//! # 상태 전이
//! ```text
//! Unconfigured --configure--> Schema   (스키마 + 패턴 컴파일 성공)
//!              \-configure--> Raw      (파일 없음, 컴파일 실패, 패턴 없음)
//! ```
//!
//! `configure`를 다시 호출하면 처음부터 다시 구성합니다.

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use logfwd_core::metrics as m;
use logfwd_core::transport::PayloadKind;
use rand::RngCore;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::config::{MismatchPolicy, SerializerConfig};
use crate::container::{ContainerEncoder, ContainerMetadata};
use crate::error::SerializerError;
use crate::loader::{SchemaDocument, read_document, resolve_config_path};
use crate::mapper::PatternMapper;
use crate::record::RecordInstance;
use crate::schema::{AvroSchemaSource, SchemaDefinition, SchemaSource};

/// 라인 하나의 직렬화 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Serialized {
    /// 스키마 인코딩된 컨테이너
    Encoded(Bytes),
    /// 원본 라인 바이트
    Raw(Bytes),
    /// 빈 입력 (전송하지 않음)
    Discarded,
}

impl Serialized {
    /// 전송할 바이트. `Discarded`면 `None`.
    pub fn bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Encoded(b) | Self::Raw(b) => Some(b),
            Self::Discarded => None,
        }
    }

    /// 전송 계층에 알릴 페이로드 종류
    pub fn payload_kind(&self) -> Option<PayloadKind> {
        match self {
            Self::Encoded(_) => Some(PayloadKind::Container),
            Self::Raw(_) => Some(PayloadKind::Raw),
            Self::Discarded => None,
        }
    }

    /// 바이트와 종류를 소유형으로 꺼냅니다.
    pub fn into_payload(self) -> Option<(Bytes, PayloadKind)> {
        match self {
            Self::Encoded(b) => Some((b, PayloadKind::Container)),
            Self::Raw(b) => Some((b, PayloadKind::Raw)),
            Self::Discarded => None,
        }
    }
}

/// 엔진 동작 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    /// 아직 설정되지 않음 (raw와 동일하게 동작)
    Unconfigured,
    /// 원본 라인 전달
    Raw,
    /// 스키마 인코딩
    Schema,
}

impl EngineMode {
    /// 모드 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unconfigured => "unconfigured",
            Self::Raw => "raw",
            Self::Schema => "schema",
        }
    }
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// schema 모드에서 보유하는 컴파일 결과
struct SchemaState {
    schema: SchemaDefinition,
    mapper: PatternMapper,
    metadata: ContainerMetadata,
}

enum EngineState {
    Unconfigured,
    Raw,
    Schema(Box<SchemaState>),
}

/// 라인 직렬화 엔진
pub struct SerializationEngine<R = StdRng> {
    config: SerializerConfig,
    source: Box<dyn SchemaSource>,
    encoder: ContainerEncoder<R>,
    state: EngineState,
    degraded_reason: Option<String>,
}

impl SerializationEngine<StdRng> {
    /// OS 엔트로피로 시드한 인코더를 사용하는 엔진을 생성합니다.
    pub fn new(config: SerializerConfig) -> Self {
        Self::with_rng(config, ContainerEncoder::new())
    }
}

impl<R: RngCore> SerializationEngine<R> {
    /// 지정한 인코더로 엔진을 생성합니다.
    pub fn with_rng(config: SerializerConfig, encoder: ContainerEncoder<R>) -> Self {
        Self {
            config,
            source: Box::new(AvroSchemaSource),
            encoder,
            state: EngineState::Unconfigured,
            degraded_reason: None,
        }
    }

    /// 스키마 컴파일러를 교체합니다.
    pub fn with_schema_source(mut self, source: Box<dyn SchemaSource>) -> Self {
        self.source = source;
        self
    }

    /// 엔진 설정을 반환합니다.
    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// 현재 모드를 반환합니다.
    pub fn mode(&self) -> EngineMode {
        match self.state {
            EngineState::Unconfigured => EngineMode::Unconfigured,
            EngineState::Raw => EngineMode::Raw,
            EngineState::Schema(_) => EngineMode::Schema,
        }
    }

    /// schema 모드의 스키마
    pub fn schema(&self) -> Option<&SchemaDefinition> {
        match &self.state {
            EngineState::Schema(s) => Some(&s.schema),
            _ => None,
        }
    }

    /// schema 모드의 매핑 패턴
    pub fn pattern(&self) -> Option<&str> {
        match &self.state {
            EngineState::Schema(s) => Some(s.mapper.pattern()),
            _ => None,
        }
    }

    /// schema 모드의 패턴 캡처 그룹 수
    pub fn capture_count(&self) -> Option<usize> {
        match &self.state {
            EngineState::Schema(s) => Some(s.mapper.capture_count()),
            _ => None,
        }
    }

    /// schema 모드의 컨테이너 메타데이터
    pub fn metadata(&self) -> Option<&ContainerMetadata> {
        match &self.state {
            EngineState::Schema(s) => Some(&s.metadata),
            _ => None,
        }
    }

    /// 마지막 설정이 raw 모드로 끝난 사유
    pub fn degraded_reason(&self) -> Option<&str> {
        self.degraded_reason.as_deref()
    }

    /// 스키마 설정 파일로 엔진을 구성합니다.
    ///
    /// 경로 앞뒤 공백은 제거되고, 상대 경로는 `config_dir` 기준으로
    /// 해석됩니다. 실패는 에러가 아니라 raw 모드 전환으로 보고됩니다.
    pub fn configure(&mut self, path: &str) -> EngineMode {
        let Some(resolved) = resolve_config_path(path, &self.config.config_dir) else {
            self.degrade("no schema config path given".to_owned());
            return self.mode();
        };

        match read_document(&resolved) {
            Ok(doc) => self.apply_document(&doc, Some(&resolved)),
            Err(e) => self.degrade(e.to_string()),
        }
        self.mode()
    }

    /// 메모리상의 설정 문서로 엔진을 구성합니다.
    pub fn configure_from_str(&mut self, text: &str) -> EngineMode {
        self.apply_document(&SchemaDocument::parse(text), None);
        self.mode()
    }

    fn apply_document(&mut self, doc: &SchemaDocument, path: Option<&Path>) {
        match self.compile_document(doc) {
            Ok(state) => {
                info!(
                    path = ?path,
                    schema = state.schema.name(),
                    fields = state.schema.field_count(),
                    pattern = state.mapper.pattern(),
                    "serializer configured in schema mode"
                );
                self.state = EngineState::Schema(Box::new(state));
                self.degraded_reason = None;
            }
            Err(e) => self.degrade(e.to_string()),
        }
    }

    fn compile_document(&self, doc: &SchemaDocument) -> Result<SchemaState, SerializerError> {
        if !doc.marker_found {
            debug!("schema marker not found, schema body is empty");
        }

        let schema = self.source.compile(&doc.schema_text)?;

        let pattern = match doc.pattern.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => return Err(SerializerError::NoPatternLoaded),
        };
        let mapper = PatternMapper::compile(pattern)?.with_coercion(self.config.coercion);

        if mapper.capture_count() != schema.field_count() {
            warn!(
                pattern = mapper.pattern(),
                captures = mapper.capture_count(),
                fields = schema.field_count(),
                "capture group count does not match schema field count"
            );
        }

        let metadata = ContainerMetadata::for_schema(&schema);
        Ok(SchemaState {
            schema,
            mapper,
            metadata,
        })
    }

    fn degrade(&mut self, reason: String) {
        warn!(
            source = self.source.name(),
            reason = %reason,
            "serializer falling back to raw mode"
        );
        self.state = EngineState::Raw;
        self.degraded_reason = Some(reason);
    }

    /// 라인 하나를 직렬화합니다.
    ///
    /// - 빈 라인은 모든 모드에서 `Discarded`
    /// - raw / unconfigured 모드는 원본 바이트
    /// - schema 모드는 컨테이너, 라인 단위 실패는 [`MismatchPolicy`]를 따름
    ///
    /// # Errors
    /// `MismatchPolicy::Fail`일 때 매칭/변환/인코딩 실패
    pub fn serialize(&mut self, entry: &str) -> Result<Serialized, SerializerError> {
        if entry.is_empty() {
            metrics::counter!(m::SERIALIZER_LINES_DISCARDED_TOTAL).increment(1);
            debug!("empty entry discarded");
            return Ok(Serialized::Discarded);
        }

        let EngineState::Schema(state) = &self.state else {
            metrics::counter!(m::SERIALIZER_LINES_RAW_TOTAL).increment(1);
            return Ok(Serialized::Raw(raw_bytes(entry)));
        };

        match encode_line(state, &mut self.encoder, entry) {
            Ok(bytes) => {
                metrics::counter!(m::SERIALIZER_LINES_ENCODED_TOTAL).increment(1);
                Ok(Serialized::Encoded(Bytes::from(bytes)))
            }
            Err(e) if e.is_line_error() => match self.config.on_mismatch {
                MismatchPolicy::Fallback => {
                    warn!(error = %e, "line not encoded, sending raw");
                    metrics::counter!(m::SERIALIZER_FALLBACKS_TOTAL, m::LABEL_REASON => e.reason_label())
                        .increment(1);
                    metrics::counter!(m::SERIALIZER_LINES_RAW_TOTAL).increment(1);
                    Ok(Serialized::Raw(raw_bytes(entry)))
                }
                MismatchPolicy::Fail => Err(e),
            },
            Err(e) => Err(e),
        }
    }
}

fn encode_line<R: RngCore>(
    state: &SchemaState,
    encoder: &mut ContainerEncoder<R>,
    entry: &str,
) -> Result<Vec<u8>, SerializerError> {
    let mut record = RecordInstance::new(&state.schema);
    state.mapper.map(&mut record, entry)?;
    encoder.encode(&record, &state.metadata)
}

fn raw_bytes(entry: &str) -> Bytes {
    Bytes::copy_from_slice(entry.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::{CoercionMode, FieldValue};
    use crate::config::SerializerConfigBuilder;
    use crate::container::ContainerDecoder;
    use rand::SeedableRng;

    const ACCESS_DOC: &str = r#"pattern: (\d+) (\w+)
//--AVRO--
{"type":"record","name":"Access","fields":[
    {"name":"status","type":"int"},
    {"name":"method","type":"string"}
]}
"#;

    fn engine(config: SerializerConfig) -> SerializationEngine<StdRng> {
        SerializationEngine::with_rng(
            config,
            ContainerEncoder::with_rng(StdRng::seed_from_u64(11)),
        )
    }

    #[test]
    fn new_engine_is_unconfigured_and_passes_through() {
        let mut engine = engine(SerializerConfig::default());
        assert_eq!(engine.mode(), EngineMode::Unconfigured);
        assert_eq!(
            engine.serialize("hello").unwrap(),
            Serialized::Raw(Bytes::from_static(b"hello"))
        );
    }

    #[test]
    fn schema_mode_encodes_matching_line() {
        let mut engine = engine(SerializerConfig::default());
        assert_eq!(engine.configure_from_str(ACCESS_DOC), EngineMode::Schema);
        assert_eq!(engine.pattern(), Some(r"(\d+) (\w+)"));
        assert_eq!(engine.capture_count(), Some(2));

        let Serialized::Encoded(bytes) = engine.serialize("200 GET").unwrap() else {
            panic!("expected encoded container");
        };
        let container = ContainerDecoder::new().decode(&bytes).unwrap();
        assert_eq!(container.records[0].get("status"), Some(&FieldValue::Int32(200)));
        assert_eq!(
            container.records[0].get("method"),
            Some(&FieldValue::String("GET".to_owned()))
        );
    }

    #[test]
    fn mismatch_falls_back_to_raw() {
        let mut engine = engine(SerializerConfig::default());
        engine.configure_from_str(ACCESS_DOC);
        assert_eq!(
            engine.serialize("abc GET").unwrap(),
            Serialized::Raw(Bytes::from_static(b"abc GET"))
        );
    }

    #[test]
    fn fail_policy_returns_line_error() {
        let config = SerializerConfigBuilder::new()
            .on_mismatch(MismatchPolicy::Fail)
            .build()
            .unwrap();
        let mut engine = engine(config);
        engine.configure_from_str(ACCESS_DOC);

        let err = engine.serialize("abc GET").unwrap_err();
        assert!(matches!(err, SerializerError::LineMismatch { .. }));
    }

    #[test]
    fn strict_coercion_failure_follows_fallback() {
        let config = SerializerConfigBuilder::new()
            .coercion(CoercionMode::Strict)
            .build()
            .unwrap();
        let mut engine = engine(config);
        engine.configure_from_str(
            "pattern: (\\S+) (\\w+)\n//--AVRO--\n\
             {\"type\":\"record\",\"name\":\"A\",\"fields\":[\
             {\"name\":\"status\",\"type\":\"int\"},{\"name\":\"method\",\"type\":\"string\"}]}",
        );
        assert_eq!(engine.mode(), EngineMode::Schema);
        assert!(matches!(engine.serialize("abc GET").unwrap(), Serialized::Raw(_)));
        assert!(matches!(engine.serialize("200 GET").unwrap(), Serialized::Encoded(_)));
    }

    #[test]
    fn empty_entry_is_discarded_in_every_mode() {
        let mut engine = engine(SerializerConfig::default());
        assert_eq!(engine.serialize("").unwrap(), Serialized::Discarded);

        engine.configure_from_str(ACCESS_DOC);
        assert_eq!(engine.serialize("").unwrap(), Serialized::Discarded);

        engine.configure_from_str("garbage");
        assert_eq!(engine.mode(), EngineMode::Raw);
        assert_eq!(engine.serialize("").unwrap(), Serialized::Discarded);
    }

    #[test]
    fn malformed_schema_degrades_to_raw() {
        let mut engine = engine(SerializerConfig::default());
        let mode = engine.configure_from_str("pattern: (.*)\n//--AVRO--\n{ not json");
        assert_eq!(mode, EngineMode::Raw);
        assert!(engine.degraded_reason().is_some());
        assert_eq!(
            engine.serialize("hello").unwrap(),
            Serialized::Raw(Bytes::from_static(b"hello"))
        );
    }

    #[test]
    fn missing_pattern_degrades_to_raw() {
        let mut engine = engine(SerializerConfig::default());
        let doc = ACCESS_DOC.replacen(r"pattern: (\d+) (\w+)", "# no pattern", 1);
        assert_eq!(engine.configure_from_str(&doc), EngineMode::Raw);
        assert!(
            engine
                .degraded_reason()
                .is_some_and(|r| r.contains("no mapping pattern"))
        );
    }

    #[test]
    fn invalid_pattern_degrades_to_raw() {
        let mut engine = engine(SerializerConfig::default());
        let doc = ACCESS_DOC.replacen(r"(\d+) (\w+)", "(unclosed", 1);
        assert_eq!(engine.configure_from_str(&doc), EngineMode::Raw);
    }

    #[test]
    fn empty_path_degrades_to_raw() {
        let mut engine = engine(SerializerConfig::default());
        assert_eq!(engine.configure("   "), EngineMode::Raw);
        assert_eq!(engine.schema().map(|s| s.name()), None);
    }

    #[test]
    fn reconfigure_starts_over() {
        let mut engine = engine(SerializerConfig::default());
        engine.configure_from_str("no marker here");
        assert_eq!(engine.mode(), EngineMode::Raw);

        engine.configure_from_str(ACCESS_DOC);
        assert_eq!(engine.mode(), EngineMode::Schema);
        assert!(engine.degraded_reason().is_none());
        assert!(engine.metadata().is_some());
    }

    #[test]
    fn serialized_helpers() {
        let encoded = Serialized::Encoded(Bytes::from_static(b"x"));
        assert_eq!(encoded.payload_kind(), Some(PayloadKind::Container));
        assert_eq!(Serialized::Discarded.bytes(), None);
        let (bytes, kind) = Serialized::Raw(Bytes::from_static(b"y")).into_payload().unwrap();
        assert_eq!(bytes, Bytes::from_static(b"y"));
        assert_eq!(kind, PayloadKind::Raw);
        assert_eq!(EngineMode::Schema.to_string(), "schema");
    }
}
