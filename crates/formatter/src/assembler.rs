//! 레이블 조립기 -- 엔트리 메타데이터로 내부 레이블 집합 생성
//!
//! 조립기가 만드는 모든 레이블은 `__gcp_` 접두어가 붙은 내부 전용 레이블입니다.
//! relabel 규칙이 명시적으로 승격하지 않는 한 최종 레코드에는 나타나지 않습니다.
//!
//! 적용 순서 (같은 이름이면 나중 값이 이깁니다):
//!
//! ```text
//! base labels
//!   -> __gcp_logname, __gcp_resource_type, __gcp_severity
//!   -> __gcp_resource_labels_<sanitized key>
//!   -> __gcp_labels_<sanitized key>
//! ```

use gcplog_core::labels::LabelSet;

use crate::entry::GcpLogEntry;

/// 레이블 이름 조각 변환 함수
///
/// 결정적이어야 하며 결과는 `[A-Za-z0-9_]`만으로 구성되고 비어 있지 않아야 합니다.
pub type Sanitizer = fn(&str) -> String;

pub const LABEL_LOG_NAME: &str = "__gcp_logname";
pub const LABEL_RESOURCE_TYPE: &str = "__gcp_resource_type";
pub const LABEL_SEVERITY: &str = "__gcp_severity";
pub const RESOURCE_LABELS_PREFIX: &str = "__gcp_resource_labels_";
pub const ENTRY_LABELS_PREFIX: &str = "__gcp_labels_";

/// 엔트리와 기본 레이블로 내부 레이블 집합을 조립합니다.
///
/// 원본 맵은 키 순서로 순회하므로, 두 키가 같은 조각으로 변환되면
/// 사전순으로 더 뒤에 오는 원본 키의 값이 남습니다.
pub fn assemble(entry: &GcpLogEntry, base: &LabelSet, sanitize: Sanitizer) -> LabelSet {
    let mut labels = base.clone();

    labels.set(LABEL_LOG_NAME, entry.log_name.as_str());
    labels.set(LABEL_RESOURCE_TYPE, entry.resource.resource_type.as_str());
    labels.set(LABEL_SEVERITY, entry.severity.as_str());

    for (key, value) in &entry.resource.labels {
        labels.set(
            format!("{RESOURCE_LABELS_PREFIX}{}", sanitize(key)),
            value.as_str(),
        );
    }

    for (key, value) in &entry.labels {
        labels.set(
            format!("{ENTRY_LABELS_PREFIX}{}", sanitize(key)),
            value.as_str(),
        );
    }

    labels
}
