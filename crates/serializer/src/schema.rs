//! 스키마 정의 -- 이름과 타입이 있는 필드의 순서 목록
//!
//! [`SchemaDefinition`]은 JSON 스키마를 컴파일한 불변 결과입니다.
//! 컴파일 자체는 [`SchemaSource`] trait 뒤에 있으며, 기본 구현
//! [`AvroSchemaSource`]는 `apache-avro` 크레이트에 위임합니다.
//!
//! 최상위 스키마는 레코드여야 합니다. 필드 타입은 다섯 가지 원시 타입
//! (boolean, int, long, float, double) 외에는 모두 문자열로 취급됩니다.

use std::fmt;

use apache_avro::Schema;
use apache_avro::schema::RecordSchema;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::SerializerError;

/// 필드 타입 태그
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldKind {
    /// boolean
    #[serde(rename = "boolean")]
    Bool,
    /// int (32비트)
    #[serde(rename = "int")]
    Int32,
    /// long (64비트)
    #[serde(rename = "long")]
    Int64,
    /// float (32비트)
    #[serde(rename = "float")]
    Float32,
    /// double (64비트)
    #[serde(rename = "double")]
    Float64,
    /// string (그 밖의 모든 타입의 기본값)
    #[serde(rename = "string")]
    String,
}

impl FieldKind {
    /// Avro 스키마 노드를 필드 타입으로 변환합니다.
    ///
    /// 원시 타입이 아니면 `None`을 반환합니다.
    pub fn from_avro(schema: &Schema) -> Option<Self> {
        match schema {
            Schema::Boolean => Some(Self::Bool),
            Schema::Int => Some(Self::Int32),
            Schema::Long => Some(Self::Int64),
            Schema::Float => Some(Self::Float32),
            Schema::Double => Some(Self::Float64),
            Schema::String => Some(Self::String),
            _ => None,
        }
    }

    /// Avro 타입 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Int32 => "int",
            Self::Int64 => "long",
            Self::Float32 => "float",
            Self::Float64 => "double",
            Self::String => "string",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 스키마 필드 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDef {
    /// 필드 이름
    pub name: String,
    /// 필드 타입
    pub kind: FieldKind,
}

/// 컴파일된 스키마 정의
///
/// 한 번 컴파일되면 변경되지 않습니다. 엔진은 설정 하나의 수명 동안
/// 읽기 전용으로 보유합니다.
#[derive(Debug, Clone)]
pub struct SchemaDefinition {
    /// 레코드 이름
    name: String,
    /// 순서가 있는 필드 목록
    fields: Vec<FieldDef>,
    /// 정규 형식 JSON 텍스트 (컨테이너 메타데이터에 기록)
    canonical_json: String,
    /// 레코드 인코딩에 사용하는 Avro 스키마
    avro: Schema,
}

impl SchemaDefinition {
    /// 컴파일된 Avro 스키마에서 정의를 생성합니다.
    ///
    /// 최상위가 레코드가 아니면 에러를 반환합니다.
    pub fn from_avro(avro: Schema) -> Result<Self, SerializerError> {
        let Schema::Record(RecordSchema { name, fields, .. }) = &avro else {
            return Err(SerializerError::SchemaCompile(
                "top-level schema must be a record".to_owned(),
            ));
        };

        let fields = fields
            .iter()
            .map(|field| {
                let kind = FieldKind::from_avro(&field.schema).unwrap_or_else(|| {
                    warn!(
                        field = %field.name,
                        "non-primitive field type, captured text will be kept as string"
                    );
                    FieldKind::String
                });
                FieldDef {
                    name: field.name.clone(),
                    kind,
                }
            })
            .collect();

        Ok(Self {
            name: name.name.clone(),
            fields,
            canonical_json: avro.canonical_form(),
            avro,
        })
    }

    /// 레코드 이름을 반환합니다.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 필드 목록을 반환합니다.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// 필드 수를 반환합니다.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// 이름으로 필드 위치를 찾습니다.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// 정규 형식 JSON 텍스트를 반환합니다.
    pub fn canonical_json(&self) -> &str {
        &self.canonical_json
    }

    /// Avro 스키마를 반환합니다.
    pub fn avro(&self) -> &Schema {
        &self.avro
    }
}

/// 스키마 컴파일러 trait
///
/// 다른 스키마 라이브러리를 사용하려면 이 trait을 구현합니다.
pub trait SchemaSource: Send + Sync {
    /// 스키마 소스 이름
    fn name(&self) -> &str;

    /// JSON 스키마 텍스트를 컴파일합니다.
    fn compile(&self, text: &str) -> Result<SchemaDefinition, SerializerError>;
}

/// `apache-avro` 기반 스키마 컴파일러
#[derive(Debug, Default, Clone, Copy)]
pub struct AvroSchemaSource;

impl SchemaSource for AvroSchemaSource {
    fn name(&self) -> &str {
        "avro"
    }

    fn compile(&self, text: &str) -> Result<SchemaDefinition, SerializerError> {
        let avro =
            Schema::parse_str(text).map_err(|e| SerializerError::SchemaCompile(e.to_string()))?;
        let definition = SchemaDefinition::from_avro(avro)?;

        debug!(
            name = definition.name(),
            fields = definition.field_count(),
            schema = definition.canonical_json(),
            "schema compiled"
        );

        Ok(definition)
    }
}
