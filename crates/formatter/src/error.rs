//! 포매터 에러 타입
//!
//! [`FormatError`]는 레코드 하나를 변환하는 도중 발생하는 실패를 표현합니다.
//! 모든 실패는 해당 레코드에 국한되며 재시도 대상이 아닙니다.
//! relabel 규칙에 의한 드롭은 에러가 아니라 `Ok(None)`으로 표현됩니다.

use gcplog_core::error::GcpLogError;

/// 레코드 변환 실패
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// 입력 바이트가 올바른 LogEntry JSON이 아님
    #[error("failed to decode log entry: {reason}")]
    Decode {
        /// 실패 사유
        reason: String,
    },

    /// 타임스탬프가 RFC3339 형식이 아님
    #[error("invalid timestamp '{value}': {reason}")]
    TimestampParse {
        /// 파싱에 실패한 원본 문자열
        value: String,
        /// 실패 사유
        reason: String,
    },

    /// 사용할 수 있는 타임스탬프가 없음 (빈 값 또는 zero instant)
    #[error("no usable timestamp found in log entry")]
    MissingTimestamp,

    /// push 메시지 봉투가 필수 필드를 갖추지 못함
    #[error("invalid push message: {reason}")]
    InvalidPushMessage {
        /// 실패 사유
        reason: String,
    },

    /// push 메시지의 data 필드가 올바른 base64가 아님
    #[error("failed to decode push message data: {0}")]
    PushDataDecode(#[from] base64::DecodeError),
}

impl FormatError {
    /// 메트릭 레이블 등에 쓰는 고정 문자열을 반환합니다.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "decode",
            Self::TimestampParse { .. } => "timestamp_parse",
            Self::MissingTimestamp => "missing_timestamp",
            Self::InvalidPushMessage { .. } => "invalid_push_message",
            Self::PushDataDecode(_) => "push_data_decode",
        }
    }
}

impl From<FormatError> for GcpLogError {
    fn from(err: FormatError) -> Self {
        GcpLogError::Entry(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display() {
        let err = FormatError::Decode {
            reason: "expected value at line 1 column 1".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("decode"));
        assert!(msg.contains("line 1"));
    }

    #[test]
    fn timestamp_parse_error_carries_value() {
        let err = FormatError::TimestampParse {
            value: "yesterday".to_owned(),
            reason: "too short for RFC3339 layout".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'yesterday'"));
        assert!(msg.contains("too short"));
        assert_eq!(err.kind(), "timestamp_parse");
    }

    #[test]
    fn kinds_are_distinct() {
        let errors = [
            FormatError::Decode {
                reason: String::new(),
            },
            FormatError::MissingTimestamp,
            FormatError::InvalidPushMessage {
                reason: String::new(),
            },
        ];
        let kinds: Vec<_> = errors.iter().map(FormatError::kind).collect();
        assert_eq!(kinds, ["decode", "missing_timestamp", "invalid_push_message"]);
    }

    #[test]
    fn converts_to_top_level_entry_error() {
        let err: GcpLogError = FormatError::MissingTimestamp.into();
        assert!(matches!(err, GcpLogError::Entry(_)));
        assert!(err.to_string().contains("no usable timestamp"));
    }
}
