//! 설정 관리 — gcplog.toml 파싱 및 런타임 설정
//!
//! [`GcpLogConfig`]는 호스트 에이전트가 포매터를 구성할 때 필요한 설정을 담는
//! 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`GCPLOG_TARGET_USE_FULL_LINE=true` 형식)
//! 3. 설정 파일 (`gcplog.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), gcplog_core::error::GcpLogError> {
//! use gcplog_core::config::GcpLogConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = GcpLogConfig::load("gcplog.toml").await?;
//! let rules = config.target.compile_relabel_rules()?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = GcpLogConfig::parse("[target]\nuse_full_line = true")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, GcpLogError};
use crate::labels::RecordLabels;
use crate::relabel::{RelabelConfig, RelabelRules};

/// gcplog 통합 설정
///
/// `gcplog.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GcpLogConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 수집 대상(target) 설정
    #[serde(default)]
    pub target: TargetConfig,
}

impl GcpLogConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, GcpLogError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, GcpLogError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GcpLogError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                GcpLogError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    ///
    /// 정적 레이블 이름 검증은 역직렬화 단계에서 수행되므로
    /// 잘못된 이름은 `ParseFailed`로 보고됩니다.
    pub fn parse(toml_str: &str) -> Result<Self, GcpLogError> {
        toml::from_str(toml_str).map_err(|e| {
            GcpLogError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `GCPLOG_{SECTION}_{FIELD}`
    /// 예: `GCPLOG_TARGET_USE_INCOMING_TIMESTAMP=true`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "GCPLOG_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "GCPLOG_GENERAL_LOG_FORMAT");

        // Target
        override_bool(
            &mut self.target.use_incoming_timestamp,
            "GCPLOG_TARGET_USE_INCOMING_TIMESTAMP",
        );
        override_bool(&mut self.target.use_full_line, "GCPLOG_TARGET_USE_FULL_LINE");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), GcpLogError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // relabel 규칙은 컴파일까지 해 봐야 유효성을 알 수 있음
        RelabelRules::compile(&self.target.relabel_configs).map_err(|e| {
            ConfigError::InvalidValue {
                field: "target.relabel_configs".to_owned(),
                reason: e.to_string(),
            }
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
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 수집 대상 설정
///
/// 포매터의 동작을 결정하는 정적 레이블, relabel 규칙, 두 가지 정책 플래그를 담습니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// 원본 로그의 타임스탬프를 레코드 타임스탬프로 사용할지 여부
    pub use_incoming_timestamp: bool,
    /// textPayload 대신 항상 원본 JSON 전체를 로그 라인으로 사용할지 여부
    pub use_full_line: bool,
    /// 모든 레코드에 덧붙일 정적 레이블 (파이프라인 레이블보다 우선)
    pub labels: RecordLabels,
    /// 내부 레이블에 적용할 relabel 규칙
    pub relabel_configs: Vec<RelabelConfig>,
}

impl TargetConfig {
    /// relabel 규칙을 컴파일합니다.
    pub fn compile_relabel_rules(&self) -> Result<RelabelRules, GcpLogError> {
        Ok(RelabelRules::compile(&self.relabel_configs)?)
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
