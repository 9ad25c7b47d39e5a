//! 필드 변환 -- 캡처된 텍스트를 선언된 원시 타입 값으로 변환
//!
//! 타입마다 변환 함수가 하나씩 있고, [`coerce`]가 [`FieldKind`]로 분기합니다.
//! 변환할 수 없는 텍스트는 [`CoercionMode`]에 따라 처리됩니다.
//!
//! - `Lenient` (기본값): 숫자 타입은 앞쪽의 숫자 부분만 읽고 (`"200abc"` → 200),
//!   그것도 없으면 해당 타입의 0 값 (`false`, `0`, `0.0`)
//! - `Strict`: [`SerializerError::Coercion`] 에러
//!
//! # 변환 규칙
//! - boolean: `"1"`/`"true"` → true, `"0"`/`"false"` → false (대소문자 구분)
//! - 정수/실수: 앞뒤 공백을 허용하는 10진수 리터럴, 유한한 값만 허용
//! - string: 캡처된 원본 그대로

use apache_avro::types::Value;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SerializerError;
use crate::schema::{FieldDef, FieldKind};

/// 변환된 필드 값
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
}

impl FieldValue {
    /// 타입의 0 값을 반환합니다.
    pub fn zero(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Bool => Self::Bool(false),
            FieldKind::Int32 => Self::Int32(0),
            FieldKind::Int64 => Self::Int64(0),
            FieldKind::Float32 => Self::Float32(0.0),
            FieldKind::Float64 => Self::Float64(0.0),
            FieldKind::String => Self::String(String::new()),
        }
    }

    /// 값의 타입 태그를 반환합니다.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Bool(_) => FieldKind::Bool,
            Self::Int32(_) => FieldKind::Int32,
            Self::Int64(_) => FieldKind::Int64,
            Self::Float32(_) => FieldKind::Float32,
            Self::Float64(_) => FieldKind::Float64,
            Self::String(_) => FieldKind::String,
        }
    }

    /// Avro 값으로 변환합니다.
    pub fn to_avro(&self) -> Value {
        match self {
            Self::Bool(v) => Value::Boolean(*v),
            Self::Int32(v) => Value::Int(*v),
            Self::Int64(v) => Value::Long(*v),
            Self::Float32(v) => Value::Float(*v),
            Self::Float64(v) => Value::Double(*v),
            Self::String(v) => Value::String(v.clone()),
        }
    }

    /// Avro 값에서 변환합니다. 원시 타입이 아니면 `None`을 반환합니다.
    pub fn from_avro(value: Value) -> Option<Self> {
        match value {
            Value::Boolean(v) => Some(Self::Bool(v)),
            Value::Int(v) => Some(Self::Int32(v)),
            Value::Long(v) => Some(Self::Int64(v)),
            Value::Float(v) => Some(Self::Float32(v)),
            Value::Double(v) => Some(Self::Float64(v)),
            Value::String(v) => Some(Self::String(v)),
            _ => None,
        }
    }
}

/// 변환 실패 처리 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionMode {
    /// 0 값으로 대체 (기본값)
    #[default]
    Lenient,
    /// 에러 반환
    Strict,
}

/// boolean 변환
pub fn coerce_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// int 변환
pub fn coerce_i32(text: &str) -> Option<i32> {
    text.trim().parse().ok()
}

/// long 변환
pub fn coerce_i64(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

/// float 변환
pub fn coerce_f32(text: &str) -> Option<f32> {
    text.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}

/// double 변환
pub fn coerce_f64(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 텍스트 앞쪽의 10진수 부분 (앞 공백 제외)
///
/// `fraction`이면 소수점과 지수부까지 포함합니다. 숫자가 없으면 빈 문자열.
fn numeric_prefix(text: &str, fraction: bool) -> &str {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let mut end = digits_from(sign);
    let mut has_digits = end > sign;

    if fraction {
        if bytes.get(end) == Some(&b'.') {
            let after = digits_from(end + 1);
            if has_digits || after > end + 1 {
                has_digits = true;
                end = after;
            }
        }
        if has_digits && matches!(bytes.get(end), Some(b'e' | b'E')) {
            let exp_sign = end + 1 + usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
            let exp_end = digits_from(exp_sign);
            if exp_end > exp_sign {
                end = exp_end;
            }
        }
    }

    if has_digits { &text[..end] } else { "" }
}

/// 앞쪽 숫자 부분만으로 변환합니다 (lenient 모드 전용).
pub fn coerce_prefix(kind: FieldKind, text: &str) -> Option<FieldValue> {
    match kind {
        FieldKind::Int32 => coerce_i32(numeric_prefix(text, false)).map(FieldValue::Int32),
        FieldKind::Int64 => coerce_i64(numeric_prefix(text, false)).map(FieldValue::Int64),
        FieldKind::Float32 => coerce_f32(numeric_prefix(text, true)).map(FieldValue::Float32),
        FieldKind::Float64 => coerce_f64(numeric_prefix(text, true)).map(FieldValue::Float64),
        FieldKind::Bool | FieldKind::String => None,
    }
}

/// 선언된 타입으로 텍스트를 변환합니다. 변환할 수 없으면 `None`.
pub fn coerce(kind: FieldKind, text: &str) -> Option<FieldValue> {
    match kind {
        FieldKind::Bool => coerce_bool(text).map(FieldValue::Bool),
        FieldKind::Int32 => coerce_i32(text).map(FieldValue::Int32),
        FieldKind::Int64 => coerce_i64(text).map(FieldValue::Int64),
        FieldKind::Float32 => coerce_f32(text).map(FieldValue::Float32),
        FieldKind::Float64 => coerce_f64(text).map(FieldValue::Float64),
        FieldKind::String => Some(FieldValue::String(text.to_owned())),
    }
}

/// 필드 변환기 -- 실패 처리 방식을 보유합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldCoercer {
    mode: CoercionMode,
}

impl FieldCoercer {
    /// 새 변환기를 생성합니다.
    pub fn new(mode: CoercionMode) -> Self {
        Self { mode }
    }

    /// 실패 처리 방식을 반환합니다.
    pub fn mode(&self) -> CoercionMode {
        self.mode
    }

    /// 필드 하나를 변환합니다.
    pub fn coerce_field(&self, field: &FieldDef, text: &str) -> Result<FieldValue, SerializerError> {
        if let Some(value) = coerce(field.kind, text) {
            return Ok(value);
        }

        match self.mode {
            CoercionMode::Lenient => {
                if let Some(value) = coerce_prefix(field.kind, text) {
                    return Ok(value);
                }
                debug!(
                    field = %field.name,
                    kind = %field.kind,
                    value = text,
                    "unparseable field value, using zero value"
                );
                Ok(FieldValue::zero(field.kind))
            }
            CoercionMode::Strict => Err(SerializerError::Coercion {
                field: field.name.clone(),
                kind: field.kind,
                value: text.to_owned(),
            }),
        }
    }
}
