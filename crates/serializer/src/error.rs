//! 직렬화 엔진 에러 타입
//!
//! [`SerializerError`]는 설정 로딩, 라인 매핑, 컨테이너 인코딩/디코딩에서
//! 발생하는 모든 에러를 표현합니다. 설정 단계 에러는 엔진 내부에서 잡혀
//! raw 모드 전환으로 처리되고, 라인 단위 에러는 폴백 정책에 따라
//! 처리되거나 호출자에게 반환됩니다.
//!
//! `From<SerializerError> for LogfwdError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use logfwd_core::error::{LogfwdError, SerializationError};

use crate::schema::FieldKind;

/// 직렬화 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum SerializerError {
    /// 설정 파일을 열거나 읽을 수 없음
    #[error("config unavailable: {path}: {reason}")]
    ConfigUnavailable {
        /// 해석된 설정 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 엔진 설정값 오류
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 스키마 JSON 컴파일 실패
    #[error("schema compile error: {0}")]
    SchemaCompile(String),

    /// 매핑 정규식 컴파일 실패
    #[error("pattern compile error: '{pattern}': {reason}")]
    PatternCompile {
        /// 원본 패턴 문자열
        pattern: String,
        /// 실패 사유
        reason: String,
    },

    /// 스키마 모드 직렬화에 필요한 패턴이 없음
    #[error("no mapping pattern loaded")]
    NoPatternLoaded,

    /// 입력 라인이 패턴 전체와 일치하지 않음
    #[error("line does not match pattern '{pattern}'")]
    LineMismatch {
        /// 매핑 패턴
        pattern: String,
    },

    /// 캡처 값을 선언된 타입으로 변환할 수 없음 (strict 모드 전용)
    #[error("cannot coerce field '{field}' ({kind}) from '{value}'")]
    Coercion {
        /// 스키마 필드 이름
        field: String,
        /// 선언된 타입
        kind: FieldKind,
        /// 캡처된 원본 텍스트
        value: String,
    },

    /// 레코드 인코딩 실패 (스키마 검증 실패 등)
    #[error("encode error: {0}")]
    Encode(String),

    /// 컨테이너 디코딩 실패
    #[error("decode error at offset {offset}: {reason}")]
    Decode {
        /// 실패 위치 (바이트 오프셋)
        offset: usize,
        /// 실패 사유
        reason: String,
    },
}

impl SerializerError {
    /// 라인 단위로 복구 가능한 에러인지 여부
    ///
    /// 폴백 정책이 적용되는 에러는 `true`를 반환합니다.
    pub fn is_line_error(&self) -> bool {
        matches!(
            self,
            Self::LineMismatch { .. } | Self::Coercion { .. } | Self::Encode(_)
        )
    }

    /// 메트릭 레이블용 짧은 사유 이름
    pub fn reason_label(&self) -> &'static str {
        match self {
            Self::ConfigUnavailable { .. } | Self::Config { .. } => "config",
            Self::SchemaCompile(_) => "schema",
            Self::PatternCompile { .. } => "pattern",
            Self::NoPatternLoaded => "no_pattern",
            Self::LineMismatch { .. } => "mismatch",
            Self::Coercion { .. } => "coercion",
            Self::Encode(_) => "encode",
            Self::Decode { .. } => "decode",
        }
    }
}

impl From<SerializerError> for LogfwdError {
    fn from(err: SerializerError) -> Self {
        let inner = match &err {
            SerializerError::Decode { .. } => SerializationError::Decode(err.to_string()),
            e if e.is_line_error() => SerializationError::Line(err.to_string()),
            _ => SerializationError::Configure(err.to_string()),
        };
        LogfwdError::Serialization(inner)
    }
}
