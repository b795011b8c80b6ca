//! 레이블 마무리 -- 내부 레이블 제거와 정적 레이블 병합

use gcplog_core::labels::{LabelSet, RecordLabels, is_internal};
use tracing::trace;

/// relabel을 거친 내부 레이블 집합을 최종 레코드 레이블로 변환합니다.
///
/// 1. `__` 접두어 레이블은 건너뜁니다.
/// 2. 이름 문법에 맞지 않는 레이블은 조용히 버립니다.
/// 3. 남은 레이블 위에 `static_labels`를 덮어씁니다 (정적 레이블 우선).
pub fn finalize(labels: LabelSet, static_labels: &RecordLabels) -> RecordLabels {
    let mut out = RecordLabels::new();

    for (name, value) in labels {
        if is_internal(&name) {
            continue;
        }
        if let Err(e) = out.insert(name, value) {
            trace!(error = %e, "discarding invalid label");
        }
    }

    out.merge(static_labels);
    out
}
