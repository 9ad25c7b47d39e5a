//! 에러 타입 — 도메인별 에러 정의

/// logfwd 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogfwdError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 직렬화 엔진 에러
    #[error("serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// 전송 계층 에러
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 직렬화 엔진 에러 (상위 레이어 전파용 요약)
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// 스키마/패턴 설정 단계 실패
    #[error("configure failed: {0}")]
    Configure(String),

    /// 단일 라인 처리 실패
    #[error("line rejected: {0}")]
    Line(String),

    /// 컨테이너 디코딩 실패
    #[error("decode failed: {0}")]
    Decode(String),
}

/// 전송 계층 에러
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// 토픽 지정이 유효하지 않음
    #[error("invalid topic: {0}")]
    InvalidTopic(String),

    /// 메시지 전달 실패
    #[error("send failed: {0}")]
    SendFailed(String),
}
