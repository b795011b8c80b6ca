//! 디코더 -- 원시 바이트를 [`GcpLogEntry`]로 변환
//!
//! Google Cloud Logging `LogEntry` JSON에서 포매터가 사용하는 필드만 추출합니다.
//! 알려지지 않은 필드는 무시하며, 알려진 필드의 JSON `null`은 빈 값으로 취급합니다.
//!
//! # 사용 예시
//! ```
//! use gcplog_formatter::entry::GcpLogEntry;
//!
//! let raw = br#"{"logName":"projects/p/logs/syslog","severity":"INFO","textPayload":"hi"}"#;
//! let entry = GcpLogEntry::decode(raw).unwrap();
//! assert_eq!(entry.severity, "INFO");
//! assert_eq!(entry.text_payload, "hi");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::error::FormatError;

/// 디코딩된 GCP 로그 엔트리
///
/// 호출 하나가 독점적으로 소유하며 변환이 끝나면 버려집니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcpLogEntry {
    #[serde(default, deserialize_with = "nullable")]
    pub log_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub resource: MonitoredResource,
    /// RFC3339 문자열 또는 빈 값
    #[serde(default, deserialize_with = "nullable")]
    pub timestamp: String,
    /// RFC3339 문자열 또는 빈 값
    #[serde(default, deserialize_with = "nullable")]
    pub receive_timestamp: String,
    #[serde(default, deserialize_with = "nullable")]
    pub severity: String,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "nullable")]
    pub text_payload: String,
}

/// 로그를 만든 리소스 (`resource.type`, `resource.labels`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MonitoredResource {
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub resource_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: BTreeMap<String, String>,
}

impl GcpLogEntry {
    /// 원시 바이트를 디코딩합니다.
    ///
    /// 잘못된 JSON, 최상위가 객체가 아닌 입력, 알려진 필드의 타입 불일치는
    /// 모두 [`FormatError::Decode`]로 보고됩니다.
    /// 단, 최상위 `null`은 필드가 모두 비어 있는 엔트리로 디코딩됩니다.
    pub fn decode(raw: &[u8]) -> Result<Self, FormatError> {
        let value: serde_json::Value =
            serde_json::from_slice(raw).map_err(|e| FormatError::Decode {
                reason: e.to_string(),
            })?;

        // 최상위 null은 빈 엔트리, 그 밖의 비객체는 거부
        if value.is_null() {
            return Ok(Self::default());
        }
        if !value.is_object() {
            return Err(FormatError::Decode {
                reason: "top-level value is not a JSON object".to_owned(),
            });
        }

        serde_json::from_value(value).map_err(|e| FormatError::Decode {
            reason: e.to_string(),
        })
    }
}

/// `null`을 기본값으로 바꿔 역직렬화합니다.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
