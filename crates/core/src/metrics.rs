//! 메트릭 상수
//!
//! 모든 메트릭의 이름을 중앙에서 정의합니다. 각 크레이트는 이 상수를
//! 사용하여 `metrics::counter!()` 매크로를 호출합니다. 레코더가 설치되지
//! 않은 프로세스에서는 호출이 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logfwd_`
//! - 모듈명: `serializer_`, `transport_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(logfwd_core::metrics::SERIALIZER_LINES_ENCODED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 폴백 사유 레이블 키 (mismatch, coercion, encode)
pub const LABEL_REASON: &str = "reason";

// ─── Serializer 메트릭 ─────────────────────────────────────────────

/// Serializer: 컨테이너로 인코딩된 라인 수 (counter)
pub const SERIALIZER_LINES_ENCODED_TOTAL: &str = "logfwd_serializer_lines_encoded_total";

/// Serializer: raw 그대로 전달된 라인 수 (counter)
pub const SERIALIZER_LINES_RAW_TOTAL: &str = "logfwd_serializer_lines_raw_total";

/// Serializer: 빈 입력으로 버려진 라인 수 (counter)
pub const SERIALIZER_LINES_DISCARDED_TOTAL: &str = "logfwd_serializer_lines_discarded_total";

/// Serializer: 스키마 모드에서 raw로 폴백한 라인 수 (counter, label: reason)
pub const SERIALIZER_FALLBACKS_TOTAL: &str = "logfwd_serializer_fallbacks_total";

// ─── Transport 메트릭 ──────────────────────────────────────────────

/// Transport: 전달된 메시지 수 (counter)
pub const TRANSPORT_MESSAGES_SENT_TOTAL: &str = "logfwd_transport_messages_sent_total";

/// Transport: 전달된 바이트 수 (counter)
pub const TRANSPORT_BYTES_SENT_TOTAL: &str = "logfwd_transport_bytes_sent_total";
