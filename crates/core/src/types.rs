//! 도메인 타입 — 포매터가 만들어 내는 정규화 레코드
//!
//! 하나의 원시 로그 레코드는 [`LogRecord`] 하나(또는 relabel 규칙에 의해 버려짐)로
//! 변환되어 전송 계층에 전달됩니다.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::labels::RecordLabels;

/// 정규화된 로그 레코드
///
/// 레이블 집합, 타임스탬프, 로그 라인 세 가지로 구성됩니다.
/// JSON으로는 `{"labels": {...}, "timestamp": "<RFC3339>", "line": "..."}` 형태입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// 백엔드 레이블 (내부 레이블 제외, 검증 완료)
    pub labels: RecordLabels,
    /// 레코드 타임스탬프 (UTC)
    pub timestamp: DateTime<Utc>,
    /// 로그 라인
    pub line: String,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            self.labels,
            self.line,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_record() -> LogRecord {
        let mut labels = RecordLabels::new();
        labels.insert("job", "gcplog").unwrap();
        LogRecord {
            labels,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            line: "hello".to_owned(),
        }
    }

    #[test]
    fn record_serializes_with_rfc3339_timestamp() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["labels"]["job"], "gcplog");
        assert_eq!(json["timestamp"], "2024-01-01T00:00:00Z");
        assert_eq!(json["line"], "hello");
    }

    #[test]
    fn record_display() {
        assert_eq!(
            sample_record().to_string(),
            r#"2024-01-01T00:00:00Z {job="gcplog"} hello"#
        );
    }
}
