//! logfwd 직렬화 엔진
//!
//! 텍스트 로그 라인을 정규식으로 필드에 매핑하고, 스키마에 따라
//! 바이너리 레코드로 인코딩한 뒤 자기 기술적(self-describing) 컨테이너로
//! 감쌉니다. 설정이 없거나 잘못되면 라인을 그대로 전달합니다.
//!
//! # 모듈 구성
//!
//! - [`engine`]: 설정 로딩, 모드 전환, 라인 직렬화 ([`SerializationEngine`])
//! - [`loader`]: 스키마 설정 파일 (헤더 + 마커 + 스키마 JSON) 파싱
//! - [`schema`]: 스키마 컴파일 ([`SchemaSource`] trait)
//! - [`mapper`]: 정규식 캡처 그룹 -> 레코드 필드 매핑
//! - [`coerce`]: 캡처 텍스트 -> 원시 타입 값 변환
//! - [`record`]: 스키마에 묶인 레코드 인스턴스
//! - [`container`]: 컨테이너 인코딩/디코딩
//! - [`varint`]: zig-zag 가변 길이 정수
//! - [`config`]: 엔진 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! line -> PatternMapper -> RecordInstance -> ContainerEncoder -> Serialized::Encoded
//!   |          | mismatch (fallback)
//!   |          v
//!   +----> Serialized::Raw  <- raw / unconfigured mode
//! ```

pub mod coerce;
pub mod config;
pub mod container;
pub mod engine;
pub mod error;
pub mod loader;
pub mod mapper;
pub mod record;
pub mod schema;
pub mod varint;

// --- 주요 타입 re-export ---

// 엔진
pub use engine::{EngineMode, SerializationEngine, Serialized};

// 설정
pub use config::{MismatchPolicy, SerializerConfig, SerializerConfigBuilder};

// 에러
pub use error::SerializerError;

// 스키마 / 레코드
pub use coerce::{CoercionMode, FieldCoercer, FieldValue};
pub use record::{DecodedRecord, RecordInstance};
pub use schema::{AvroSchemaSource, FieldDef, FieldKind, SchemaDefinition, SchemaSource};

// 매핑
pub use mapper::PatternMapper;

// 컨테이너
pub use container::{ContainerDecoder, ContainerEncoder, ContainerMetadata, DecodedContainer};

// 로더
pub use loader::{SCHEMA_MARKER, SchemaDocument};
