//! 직렬화 엔진 설정
//!
//! [`SerializerConfig`]는 core의 [`SerializerSection`]을 기반으로 엔진이
//! 사용하는 타입이 지정된 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use logfwd_core::config::LogfwdConfig;
//! use logfwd_serializer::config::SerializerConfig;
//!
//! let core_config = LogfwdConfig::default();
//! let config = SerializerConfig::from_core(&core_config.serializer);
//! ```

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use logfwd_core::config::{DEFAULT_CONFIG_DIR, SerializerSection};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::coerce::CoercionMode;
use crate::error::SerializerError;

/// 라인 매핑/인코딩 실패 시 처리 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// 원본 라인을 raw로 전달 (기본값)
    #[default]
    Fallback,
    /// 호출자에게 에러 반환
    Fail,
}

impl MismatchPolicy {
    /// 설정 문자열 표현
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fallback => "fallback",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for MismatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MismatchPolicy {
    type Err = SerializerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fallback" => Ok(Self::Fallback),
            "fail" => Ok(Self::Fail),
            other => Err(SerializerError::Config {
                field: "on_mismatch".to_owned(),
                reason: format!("unknown policy '{other}' (expected fallback or fail)"),
            }),
        }
    }
}

/// 직렬화 엔진 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializerConfig {
    /// 상대 경로 스키마 설정 파일의 기준 디렉토리
    pub config_dir: PathBuf,
    /// 라인 단위 실패 처리 정책
    pub on_mismatch: MismatchPolicy,
    /// 필드 변환 실패 처리 방식
    pub coercion: CoercionMode,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            on_mismatch: MismatchPolicy::Fallback,
            coercion: CoercionMode::Lenient,
        }
    }
}

impl SerializerConfig {
    /// 빌더를 생성합니다.
    pub fn builder() -> SerializerConfigBuilder {
        SerializerConfigBuilder::new()
    }

    /// core의 `SerializerSection`에서 엔진 설정을 생성합니다.
    ///
    /// 알 수 없는 정책 문자열은 경고 로그를 남기고 기본값을 사용합니다.
    pub fn from_core(core: &SerializerSection) -> Self {
        let on_mismatch = core.on_mismatch.parse().unwrap_or_else(|e| {
            warn!(error = %e, "invalid on_mismatch, using fallback");
            MismatchPolicy::default()
        });

        let config_dir = if core.config_dir.trim().is_empty() {
            PathBuf::from(DEFAULT_CONFIG_DIR)
        } else {
            PathBuf::from(core.config_dir.trim())
        };

        Self {
            config_dir,
            on_mismatch,
            coercion: if core.strict_coercion {
                CoercionMode::Strict
            } else {
                CoercionMode::Lenient
            },
        }
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 기준 디렉토리는 `..`을 포함하지 않는 절대 경로여야 합니다.
    pub fn validate(&self) -> Result<(), SerializerError> {
        let dir: &Path = &self.config_dir;

        if dir.as_os_str().is_empty() {
            return Err(SerializerError::Config {
                field: "config_dir".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if !dir.is_absolute() {
            return Err(SerializerError::Config {
                field: "config_dir".to_owned(),
                reason: format!("'{}' must be an absolute path", dir.display()),
            });
        }

        if dir.components().any(|c| c == Component::ParentDir) {
            return Err(SerializerError::Config {
                field: "config_dir".to_owned(),
                reason: format!("'{}' contains path traversal pattern '..'", dir.display()),
            });
        }

        Ok(())
    }
}

/// 엔진 설정 빌더
#[derive(Default)]
pub struct SerializerConfigBuilder {
    config: SerializerConfig,
}

impl SerializerConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 기준 디렉토리를 설정합니다.
    pub fn config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.config_dir = dir.into();
        self
    }

    /// 실패 처리 정책을 설정합니다.
    pub fn on_mismatch(mut self, policy: MismatchPolicy) -> Self {
        self.config.on_mismatch = policy;
        self
    }

    /// 필드 변환 방식을 설정합니다.
    pub fn coercion(mut self, mode: CoercionMode) -> Self {
        self.config.coercion = mode;
        self
    }

    /// 설정을 검증하고 `SerializerConfig`를 생성합니다.
    pub fn build(self) -> Result<SerializerConfig, SerializerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
