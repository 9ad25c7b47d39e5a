//! 전송 경계 — 직렬화 결과를 메시지 브로커 쪽으로 넘기는 trait 정의
//!
//! 브로커 와이어 프로토콜은 이 워크스페이스의 범위 밖입니다.
//! 엔진이 만든 바이트는 [`OutboundMessage`]로 포장되어 [`MessageSink`]
//! 구현체로 전달되고, 실제 전달 방식은 구현체가 결정합니다.

use std::fmt;

use bytes::Bytes;
use tracing::warn;

use crate::error::{LogfwdError, TransportError};

/// 페이로드 인코딩 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// 스키마 기반 컨테이너 인코딩
    Container,
    /// 원본 라인 그대로 (raw 모드 또는 폴백)
    Raw,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container => write!(f, "container"),
            Self::Raw => write!(f, "raw"),
        }
    }
}

/// 메시지 대상 토픽과 파티션
///
/// `topic[:partition]` 형식에서 파싱합니다. 파티션이 없거나 숫자가 아니면
/// 미지정(`None`)으로 두고 파티션 선택은 전송 계층에 맡깁니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicTarget {
    /// 토픽 이름
    pub topic: String,
    /// 파티션 번호 (미지정 시 `None`)
    pub partition: Option<i32>,
}

impl TopicTarget {
    /// `topic[:partition]` 문자열을 파싱합니다.
    ///
    /// 토픽 이름이 비어 있으면 에러를 반환합니다. 잘못된 파티션 값은
    /// 경고 로그를 남기고 무시합니다.
    pub fn parse(spec: &str) -> Result<Self, TransportError> {
        let mut parts = spec.splitn(2, ':');
        let topic = parts.next().unwrap_or_default().trim();

        if topic.is_empty() {
            return Err(TransportError::InvalidTopic(spec.to_owned()));
        }

        let partition = match parts.next().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<i32>() {
                Ok(p) if p >= 0 => Some(p),
                _ => {
                    warn!(
                        partition = raw,
                        "invalid partition value, leaving partition unassigned"
                    );
                    None
                }
            },
        };

        Ok(Self {
            topic: topic.to_owned(),
            partition,
        })
    }
}

impl fmt::Display for TopicTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.partition {
            Some(p) => write!(f, "{}:{}", self.topic, p),
            None => write!(f, "{}", self.topic),
        }
    }
}

/// 전송 계층으로 넘겨지는 단일 메시지
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    /// 대상 토픽/파티션
    pub target: TopicTarget,
    /// 메시지 키
    pub key: Option<String>,
    /// 페이로드 바이트
    pub payload: Bytes,
    /// 페이로드 인코딩 종류
    pub kind: PayloadKind,
}

/// 메시지 전달 trait
///
/// 브로커 클라이언트나 파일 기록기 등 새 전송 방식을 지원하려면
/// 이 trait을 구현합니다.
pub trait MessageSink: Send {
    /// 전송 방식 이름
    fn name(&self) -> &str;

    /// 메시지 하나를 전달합니다.
    fn send(&mut self, message: OutboundMessage) -> Result<(), LogfwdError>;

    /// 버퍼에 남은 메시지를 모두 내보냅니다.
    fn flush(&mut self) -> Result<(), LogfwdError>;
}
