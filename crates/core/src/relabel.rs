//! Relabel 엔진 — 정규식 기반 레이블 재작성 규칙
//!
//! Prometheus `relabel_configs`와 같은 의미를 가지는 규칙 엔진입니다.
//! 규칙은 [`RelabelConfig`]로 역직렬화된 뒤 [`RelabelRules::compile`]로 한 번만
//! 컴파일되고, 이후 [`Relabeler`] trait을 통해 레코드마다 적용됩니다.
//!
//! # 지원 action
//!
//! | action | 동작 |
//! |---|---|
//! | `replace` | 소스 값이 매칭되면 `target_label`에 `replacement`를 기록 |
//! | `keep` / `drop` | 소스 값이 매칭되지 않으면 / 매칭되면 레코드 전체를 버림 |
//! | `keepequal` / `dropequal` | 소스 값이 `target_label` 값과 다르면 / 같으면 레코드를 버림 |
//! | `hashmod` | 소스 값의 MD5 해시를 `modulus`로 나눈 나머지를 기록 |
//! | `labelmap` | 이름이 매칭되는 레이블을 `replacement` 이름으로 복사 |
//! | `labeldrop` / `labelkeep` | 이름이 매칭되는 / 매칭되지 않는 레이블 제거 |
//! | `lowercase` / `uppercase` | 소스 값을 소문자 / 대문자로 변환해 기록 |
//!
//! # 사용 예시
//! ```
//! use gcplog_core::labels::LabelSet;
//! use gcplog_core::relabel::{RelabelConfig, RelabelRules, Relabeler};
//!
//! let config = RelabelConfig {
//!     source_labels: vec!["__gcp_resource_type".to_owned()],
//!     target_label: "resource_type".to_owned(),
//!     ..RelabelConfig::default()
//! };
//! let rules = RelabelRules::compile(&[config]).unwrap();
//!
//! let mut labels = LabelSet::new();
//! labels.set("__gcp_resource_type", "gce_instance");
//! let relabeled = rules.relabel(labels).unwrap();
//! assert_eq!(relabeled.get("resource_type"), Some("gce_instance"));
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use md5::{Digest, Md5};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::RelabelError;
use crate::labels::{LabelSet, is_valid_label_name};

/// 기본 구분자
pub const DEFAULT_SEPARATOR: &str = ";";
/// 기본 정규식 (모든 값에 매칭)
pub const DEFAULT_REGEX: &str = "(.*)";
/// 기본 치환 문자열 (첫 번째 캡처 그룹)
pub const DEFAULT_REPLACEMENT: &str = "$1";

/// 레이블 집합에 규칙을 적용하는 trait
///
/// 포매터는 구체적인 규칙 엔진 대신 이 trait에만 의존합니다.
/// 테스트에서는 항등 함수나 항상 버리는 구현으로 대체할 수 있습니다.
pub trait Relabeler: Send + Sync {
    /// 규칙을 적용한 레이블 집합을 반환합니다.
    ///
    /// `None`은 레코드 전체를 버려야 한다는 신호입니다.
    fn relabel(&self, labels: LabelSet) -> Option<LabelSet>;
}

/// relabel action 종류
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RelabelAction {
    /// 매칭 시 target_label에 치환 결과를 기록 (기본값)
    #[default]
    Replace,
    /// 매칭되지 않으면 레코드를 버림
    Keep,
    /// 매칭되면 레코드를 버림
    Drop,
    /// 소스 값이 target_label 값과 다르면 레코드를 버림
    KeepEqual,
    /// 소스 값이 target_label 값과 같으면 레코드를 버림
    DropEqual,
    /// 해시 모듈러 값을 기록
    HashMod,
    /// 이름이 매칭되는 레이블을 복사
    LabelMap,
    /// 이름이 매칭되는 레이블 제거
    LabelDrop,
    /// 이름이 매칭되지 않는 레이블 제거
    LabelKeep,
    /// 소문자 변환
    Lowercase,
    /// 대문자 변환
    Uppercase,
}

impl RelabelAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Keep => "keep",
            Self::Drop => "drop",
            Self::KeepEqual => "keepequal",
            Self::DropEqual => "dropequal",
            Self::HashMod => "hashmod",
            Self::LabelMap => "labelmap",
            Self::LabelDrop => "labeldrop",
            Self::LabelKeep => "labelkeep",
            Self::Lowercase => "lowercase",
            Self::Uppercase => "uppercase",
        }
    }

    /// target_label이 반드시 필요한 action인지 여부
    fn requires_target(&self) -> bool {
        matches!(
            self,
            Self::Replace
                | Self::HashMod
                | Self::Lowercase
                | Self::Uppercase
                | Self::KeepEqual
                | Self::DropEqual
        )
    }
}

impl fmt::Display for RelabelAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelabelAction {
    type Err = RelabelError;

    /// 대소문자를 구분하지 않습니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "keep" => Ok(Self::Keep),
            "drop" => Ok(Self::Drop),
            "keepequal" => Ok(Self::KeepEqual),
            "dropequal" => Ok(Self::DropEqual),
            "hashmod" => Ok(Self::HashMod),
            "labelmap" => Ok(Self::LabelMap),
            "labeldrop" => Ok(Self::LabelDrop),
            "labelkeep" => Ok(Self::LabelKeep),
            "lowercase" => Ok(Self::Lowercase),
            "uppercase" => Ok(Self::Uppercase),
            _ => Err(RelabelError::UnknownAction(s.to_owned())),
        }
    }
}

impl TryFrom<String> for RelabelAction {
    type Error = RelabelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RelabelAction> for String {
    fn from(action: RelabelAction) -> Self {
        action.as_str().to_owned()
    }
}

/// relabel 규칙 설정 -- YAML/TOML의 `relabel_configs` 항목 하나에 대응합니다.
///
/// # YAML 스키마
/// ```yaml
/// - source_labels: [__gcp_resource_labels_zone]
///   separator: ";"
///   regex: "(.*)"
///   target_label: zone
///   replacement: "$1"
///   action: replace
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelabelConfig {
    /// 값을 이어 붙일 소스 레이블 목록
    pub source_labels: Vec<String>,
    /// 소스 값 구분자
    pub separator: String,
    /// 매칭 정규식 (양끝 고정)
    pub regex: String,
    /// hashmod 모듈러
    pub modulus: u64,
    /// 결과를 기록할 레이블 이름 (캡처 그룹 참조 가능)
    pub target_label: String,
    /// 치환 문자열 (캡처 그룹 참조 가능)
    pub replacement: String,
    /// 수행할 action
    pub action: RelabelAction,
}

impl Default for RelabelConfig {
    fn default() -> Self {
        Self {
            source_labels: Vec::new(),
            separator: DEFAULT_SEPARATOR.to_owned(),
            regex: DEFAULT_REGEX.to_owned(),
            modulus: 0,
            target_label: String::new(),
            replacement: DEFAULT_REPLACEMENT.to_owned(),
            action: RelabelAction::default(),
        }
    }
}

/// 컴파일된 relabel 규칙
#[derive(Debug, Clone)]
pub struct RelabelRule {
    config: RelabelConfig,
    regex: Regex,
}

impl RelabelRule {
    /// 설정을 검증하고 정규식을 컴파일합니다.
    ///
    /// `index`는 에러 메시지에 표시할 규칙 위치입니다.
    pub fn compile(index: usize, config: &RelabelConfig) -> Result<Self, RelabelError> {
        validate(index, config)?;

        let anchored = format!("^(?:{})$", config.regex);
        let regex = Regex::new(&anchored).map_err(|e| RelabelError::InvalidRegex {
            index,
            pattern: config.regex.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            config: config.clone(),
            regex,
        })
    }

    pub fn config(&self) -> &RelabelConfig {
        &self.config
    }

    /// 규칙을 적용합니다. 레코드를 버려야 하면 `false`를 반환합니다.
    fn apply(&self, labels: &mut LabelSet) -> bool {
        let cfg = &self.config;
        let value = self.source_value(labels);

        match cfg.action {
            RelabelAction::Drop => {
                if self.regex.is_match(&value) {
                    return false;
                }
            }
            RelabelAction::Keep => {
                if !self.regex.is_match(&value) {
                    return false;
                }
            }
            RelabelAction::DropEqual => {
                if labels.get(&cfg.target_label).unwrap_or("") == value {
                    return false;
                }
            }
            RelabelAction::KeepEqual => {
                if labels.get(&cfg.target_label).unwrap_or("") != value {
                    return false;
                }
            }
            RelabelAction::Replace => {
                let Some(caps) = self.regex.captures(&value) else {
                    return true;
                };
                let mut target = String::new();
                caps.expand(&cfg.target_label, &mut target);
                if !is_valid_label_name(&target) {
                    trace!(label = %target, "relabel target is not a valid label name, skipping");
                    return true;
                }
                let mut replaced = String::new();
                caps.expand(&cfg.replacement, &mut replaced);
                if replaced.is_empty() {
                    labels.remove(&target);
                } else {
                    labels.set(target, replaced);
                }
            }
            RelabelAction::Lowercase => {
                labels.set(cfg.target_label.as_str(), value.to_lowercase());
            }
            RelabelAction::Uppercase => {
                labels.set(cfg.target_label.as_str(), value.to_uppercase());
            }
            RelabelAction::HashMod => {
                labels.set(cfg.target_label.as_str(), hash_mod(&value, cfg.modulus).to_string());
            }
            RelabelAction::LabelMap => {
                let snapshot: Vec<(String, String)> = labels
                    .iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                for (name, label_value) in snapshot {
                    if self.regex.is_match(&name) {
                        let mapped = self.regex.replace_all(&name, cfg.replacement.as_str());
                        labels.set(mapped.into_owned(), label_value);
                    }
                }
            }
            RelabelAction::LabelDrop => {
                labels.retain(|name, _| !self.regex.is_match(name));
            }
            RelabelAction::LabelKeep => {
                labels.retain(|name, _| self.regex.is_match(name));
            }
        }

        true
    }

    /// 소스 레이블 값을 구분자로 이어 붙입니다. 없는 레이블은 빈 문자열로 취급합니다.
    fn source_value(&self, labels: &LabelSet) -> String {
        self.config
            .source_labels
            .iter()
            .map(|name| labels.get(name).unwrap_or(""))
            .collect::<Vec<_>>()
            .join(&self.config.separator)
    }
}

/// MD5 다이제스트의 하위 8바이트(big-endian)를 모듈러 연산합니다.
fn hash_mod(value: &str, modulus: u64) -> u64 {
    let digest = Md5::digest(value.as_bytes());
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&digest[8..16]);
    u64::from_be_bytes(tail) % modulus
}

/// 규칙 설정의 유효성을 검증합니다.
fn validate(index: usize, cfg: &RelabelConfig) -> Result<(), RelabelError> {
    let invalid = |reason: &str| RelabelError::InvalidRule {
        index,
        action: cfg.action.to_string(),
        reason: reason.to_owned(),
    };

    if cfg.action.requires_target() && cfg.target_label.is_empty() {
        return Err(invalid("requires 'target_label' value"));
    }

    match cfg.action {
        RelabelAction::Replace => {
            let templated = cfg.target_label.contains('$');
            if templated && !is_valid_target_template(&cfg.target_label) {
                return Err(invalid("has invalid templated 'target_label'"));
            }
            if !templated && !is_valid_label_name(&cfg.target_label) {
                return Err(invalid("has invalid 'target_label' value"));
            }
        }
        RelabelAction::Lowercase
        | RelabelAction::Uppercase
        | RelabelAction::KeepEqual
        | RelabelAction::DropEqual => {
            if !is_valid_label_name(&cfg.target_label) {
                return Err(invalid("has invalid 'target_label' value"));
            }
        }
        _ => {}
    }

    if matches!(
        cfg.action,
        RelabelAction::KeepEqual | RelabelAction::DropEqual
    ) && (cfg.regex != DEFAULT_REGEX
        || cfg.modulus != 0
        || cfg.separator != DEFAULT_SEPARATOR
        || cfg.replacement != DEFAULT_REPLACEMENT)
    {
        return Err(invalid(
            "requires only 'source_labels' and 'target_label', and no other fields",
        ));
    }

    if cfg.action == RelabelAction::HashMod && cfg.modulus == 0 {
        return Err(invalid("requires non-zero 'modulus'"));
    }

    if cfg.action == RelabelAction::LabelMap && !is_valid_target_template(&cfg.replacement) {
        return Err(invalid("has invalid 'replacement' value"));
    }

    if matches!(
        cfg.action,
        RelabelAction::LabelDrop | RelabelAction::LabelKeep
    ) && (!cfg.source_labels.is_empty()
        || !cfg.target_label.is_empty()
        || cfg.modulus != 0
        || cfg.separator != DEFAULT_SEPARATOR
        || cfg.replacement != DEFAULT_REPLACEMENT)
    {
        return Err(invalid("requires only 'regex', and no other fields"));
    }

    Ok(())
}

/// 캡처 그룹 참조(`$1`, `$name`, `${name}`)를 포함할 수 있는 레이블 이름 템플릿
///
/// `\w`는 ASCII 단어 문자로 한정합니다.
static TARGET_TEMPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)^(?:(?:[a-zA-Z_]|\$(?:\{\w+\}|\w+))+\w*)+$")
        .expect("target template pattern is a valid regex")
});

fn is_valid_target_template(template: &str) -> bool {
    TARGET_TEMPLATE.is_match(template)
}

/// 컴파일된 규칙 목록
///
/// 규칙은 순서대로 적용되며, 하나라도 레코드를 버리면 이후 규칙은 평가하지 않습니다.
/// 비어 있는 목록은 입력을 그대로 통과시킵니다.
#[derive(Debug, Clone, Default)]
pub struct RelabelRules {
    rules: Vec<RelabelRule>,
}

impl RelabelRules {
    /// 규칙이 없는 (항등) 목록을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 설정 목록 전체를 컴파일합니다. 첫 번째 에러에서 중단합니다.
    pub fn compile(configs: &[RelabelConfig]) -> Result<Self, RelabelError> {
        let rules = configs
            .iter()
            .enumerate()
            .map(|(index, config)| RelabelRule::compile(index, config))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[RelabelRule] {
        &self.rules
    }
}

impl Relabeler for RelabelRules {
    fn relabel(&self, mut labels: LabelSet) -> Option<LabelSet> {
        for rule in &self.rules {
            if !rule.apply(&mut labels) {
                return None;
            }
        }
        Some(labels)
    }
}
