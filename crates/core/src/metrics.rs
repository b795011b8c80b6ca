//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 포매터 자체는 메트릭을 기록하지 않으며, 포매터를 호출하는 호스트
//! (`gcplog` CLI 등)가 이 상수를 사용하여 `metrics::counter!()`를 호출합니다.
//! 레코더는 설치하지 않습니다. 전역 레코더가 없으면 모든 기록은 무시되며,
//! 내보내기는 레코더(예: `metrics-exporter-prometheus`)를 설치한 호스트의 몫입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `gcplog_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(gcplog_core::metrics::ENTRIES_TOTAL).increment(1);
//! counter!(gcplog_core::metrics::FORMAT_ERRORS_TOTAL, gcplog_core::metrics::LABEL_REASON => "decode")
//!     .increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 실패 사유 레이블 키 (decode, timestamp_parse, missing_timestamp, ...)
pub const LABEL_REASON: &str = "reason";

// ─── 포매터 메트릭 ─────────────────────────────────────────────────

/// 포매터에 입력된 전체 원시 레코드 수 (counter)
pub const ENTRIES_TOTAL: &str = "gcplog_entries_total";

/// 정규화 레코드로 변환된 수 (counter)
pub const ENTRIES_FORMATTED_TOTAL: &str = "gcplog_entries_formatted_total";

/// relabel 규칙에 의해 버려진 수 (counter)
pub const ENTRIES_DROPPED_TOTAL: &str = "gcplog_entries_dropped_total";

/// 변환 실패 수 (counter, label: reason)
pub const FORMAT_ERRORS_TOTAL: &str = "gcplog_format_errors_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다. 레코더가 없으면 아무 일도 하지 않습니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        ENTRIES_TOTAL,
        "Total number of raw log entries handed to the formatter"
    );
    describe_counter!(
        ENTRIES_FORMATTED_TOTAL,
        "Total number of entries converted into normalized records"
    );
    describe_counter!(
        ENTRIES_DROPPED_TOTAL,
        "Total number of entries dropped by relabel rules"
    );
    describe_counter!(
        FORMAT_ERRORS_TOTAL,
        "Total number of entries that failed to format, by reason"
    );
}
