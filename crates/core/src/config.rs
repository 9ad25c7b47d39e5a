//! 설정 관리 — logfwd.toml 파싱 및 런타임 설정
//!
//! [`LogfwdConfig`]는 포워더 전체 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGFWD_TRANSPORT_TOPIC=access` 형식)
//! 3. 설정 파일 (`logfwd.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logfwd_core::error::LogfwdError> {
//! use logfwd_core::config::LogfwdConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogfwdConfig::load("logfwd.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogfwdConfig::parse("[transport]\ntopic = \"access\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogfwdError};
use crate::transport::TopicTarget;

/// 스키마 설정 파일의 상대 경로를 해석할 기본 디렉토리
pub const DEFAULT_CONFIG_DIR: &str = "/etc/logfwd";

/// logfwd 통합 설정
///
/// `logfwd.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogfwdConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 직렬화 엔진 설정
    #[serde(default)]
    pub serializer: SerializerSection,
    /// 전송 설정
    #[serde(default)]
    pub transport: TransportConfig,
}

impl LogfwdConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogfwdError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogfwdError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogfwdError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogfwdError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogfwdError> {
        toml::from_str(toml_str).map_err(|e| {
            LogfwdError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGFWD_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGFWD_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGFWD_GENERAL_LOG_FORMAT");

        // Serializer
        override_string(&mut self.serializer.schema, "LOGFWD_SERIALIZER_SCHEMA");
        override_string(
            &mut self.serializer.config_dir,
            "LOGFWD_SERIALIZER_CONFIG_DIR",
        );
        override_string(
            &mut self.serializer.on_mismatch,
            "LOGFWD_SERIALIZER_ON_MISMATCH",
        );
        override_bool(
            &mut self.serializer.strict_coercion,
            "LOGFWD_SERIALIZER_STRICT_COERCION",
        );

        // Transport
        override_string(&mut self.transport.topic, "LOGFWD_TRANSPORT_TOPIC");
        override_string(&mut self.transport.key, "LOGFWD_TRANSPORT_KEY");
        override_string(&mut self.transport.output, "LOGFWD_TRANSPORT_OUTPUT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogfwdError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        let valid_policies = ["fallback", "fail"];
        if !valid_policies.contains(&self.serializer.on_mismatch.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "serializer.on_mismatch".to_owned(),
                reason: format!("must be one of: {}", valid_policies.join(", ")),
            }
            .into());
        }

        if self.serializer.config_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "serializer.config_dir".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        TopicTarget::parse(&self.transport.topic).map_err(|e| ConfigError::InvalidValue {
            field: "transport.topic".to_owned(),
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 직렬화 엔진 설정 섹션
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerSection {
    /// 스키마 설정 파일 경로 (비어 있으면 raw 모드)
    pub schema: String,
    /// 상대 경로 해석 기준 디렉토리
    pub config_dir: String,
    /// 라인 매칭 실패 정책 (fallback, fail)
    pub on_mismatch: String,
    /// 필드 변환 실패를 에러로 취급할지 여부
    pub strict_coercion: bool,
}

impl Default for SerializerSection {
    fn default() -> Self {
        Self {
            schema: String::new(),
            config_dir: DEFAULT_CONFIG_DIR.to_owned(),
            on_mismatch: "fallback".to_owned(),
            strict_coercion: false,
        }
    }
}

/// 전송 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// 대상 토픽 (`topic[:partition]`)
    pub topic: String,
    /// 메시지 키 (비어 있으면 키 없음)
    pub key: String,
    /// 프레임 출력 경로 (`-`는 표준 출력)
    pub output: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            topic: "logfwd".to_owned(),
            key: String::new(),
            output: "-".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}
