//! 레이블 모델 — 내부 레이블 집합과 외부로 내보내는 레이블 집합
//!
//! 두 종류의 레이블 집합을 타입으로 구분합니다.
//!
//! - [`LabelSet`]: 파이프라인 내부에서 조립되고 relabel 규칙의 입력이 되는 집합.
//!   `__` 접두어가 붙은 내부 전용 레이블을 자유롭게 담을 수 있습니다.
//! - [`RecordLabels`]: 최종 레코드에 실려 백엔드로 전달되는 집합.
//!   검증을 통과한 이름만 들어갈 수 있으므로 내부 레이블이 섞일 수 없습니다.
//!
//! 두 타입 모두 이름 순으로 정렬된 `BTreeMap`을 사용하며, JSON으로는 평탄한
//! `{"name": "value"}` 맵으로 직렬화됩니다.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LabelError;

/// 내부 전용 레이블을 표시하는 예약 접두어
pub const INTERNAL_PREFIX: &str = "__";

/// 레이블 이름이 내부 전용 접두어로 시작하는지 확인합니다.
pub fn is_internal(name: &str) -> bool {
    name.starts_with(INTERNAL_PREFIX)
}

/// 레이블 이름 문법(`^[a-zA-Z_][a-zA-Z0-9_]*$`)을 검사합니다.
pub fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// 임의의 문자열을 레이블 이름 조각으로 변환합니다.
///
/// `[A-Za-z0-9_]` 밖의 문자는 모두 `_` 하나로 치환합니다 (멀티바이트 문자도 한 글자 단위).
/// 빈 문자열은 `_`로 매핑되어 결과가 비는 일은 없습니다.
///
/// 하위 소비자가 변환된 이름에 의존하므로 이 규칙은 공개 계약입니다.
///
/// # 사용 예시
/// ```
/// use gcplog_core::labels::sanitize_label_name;
///
/// assert_eq!(sanitize_label_name("zone/a"), "zone_a");
/// assert_eq!(sanitize_label_name("k8s-pod.name"), "k8s_pod_name");
/// ```
pub fn sanitize_label_name(name: &str) -> String {
    if name.is_empty() {
        return "_".to_owned();
    }
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// 내부 레이블 집합
///
/// relabel 생태계의 label builder와 같은 규칙을 따릅니다.
/// 빈 값으로 [`set`](LabelSet::set)하면 해당 레이블이 제거됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeMap<String, String>);

impl LabelSet {
    /// 빈 집합을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 레이블을 설정합니다. 값이 비어 있으면 레이블을 제거합니다.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if value.is_empty() {
            self.0.remove(&name);
        } else {
            self.0.insert(name, value);
        }
    }

    /// 레이블 값을 조회합니다.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// 레이블을 제거하고 이전 값을 반환합니다.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 이름 순으로 레이블을 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 조건을 만족하는 레이블만 남깁니다.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        self.0.retain(|k, v| keep(k, v));
    }
}

impl IntoIterator for LabelSet {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.set(name, value);
        }
        set
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_label_map(f, &self.0)
    }
}

/// 최종 레코드 레이블 집합
///
/// 모든 이름이 레이블 문법을 만족하고 `__`로 시작하지 않음이 보장됩니다.
/// 값은 Rust `String`이므로 항상 유효한 UTF-8입니다.
///
/// 설정 파일에서 정적 레이블을 읽을 때도 같은 검증을 거치도록
/// `BTreeMap<String, String>`을 통해 역직렬화합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct RecordLabels(BTreeMap<String, String>);

impl RecordLabels {
    /// 빈 집합을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 이름을 검증한 뒤 레이블을 추가합니다.
    ///
    /// 같은 이름이 이미 있으면 값을 덮어쓰고 이전 값을 반환합니다.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>, LabelError> {
        let name = name.into();
        check_record_label_name(&name)?;
        Ok(self.0.insert(name, value.into()))
    }

    /// 레이블 값을 조회합니다.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 이름 순으로 레이블을 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 다른 집합을 위에 덮어씁니다.
    ///
    /// 양쪽에 같은 이름이 있으면 `other`의 값이 이깁니다.
    /// `other`도 검증된 집합이므로 불변 조건이 깨지지 않습니다.
    pub fn merge(&mut self, other: &RecordLabels) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), value.clone());
        }
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl TryFrom<BTreeMap<String, String>> for RecordLabels {
    type Error = LabelError;

    fn try_from(map: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        for name in map.keys() {
            check_record_label_name(name)?;
        }
        Ok(Self(map))
    }
}

impl From<RecordLabels> for BTreeMap<String, String> {
    fn from(labels: RecordLabels) -> Self {
        labels.0
    }
}

impl fmt::Display for RecordLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_label_map(f, &self.0)
    }
}

fn check_record_label_name(name: &str) -> Result<(), LabelError> {
    if is_internal(name) {
        return Err(LabelError::Reserved(name.to_owned()));
    }
    if !is_valid_label_name(name) {
        return Err(LabelError::InvalidName(name.to_owned()));
    }
    Ok(())
}

/// `{name="value", ...}` 형식으로 출력합니다.
fn write_label_map(f: &mut fmt::Formatter<'_>, map: &BTreeMap<String, String>) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (name, value)) in map.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{name}={value:?}")?;
    }
    write!(f, "}}")
}
