//! logfwd 공통 크레이트
//!
//! 로그 라인 포워더를 구성하는 크레이트들이 공유하는 에러, 설정,
//! 전송(transport) 경계 타입과 메트릭 이름을 정의합니다.
//!
//! - [`config`]: `logfwd.toml` 파싱 및 환경변수 오버라이드
//! - [`error`]: 최상위 에러 타입
//! - [`transport`]: 직렬화 결과를 넘겨받는 전송 계층 trait
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod error;
pub mod metrics;
pub mod transport;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, LogfwdError, SerializationError, TransportError};

// 설정
pub use config::LogfwdConfig;

// 전송
pub use transport::{MessageSink, OutboundMessage, PayloadKind, TopicTarget};
