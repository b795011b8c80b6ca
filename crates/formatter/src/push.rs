//! Pub/Sub push 메시지 변환
//!
//! push 구독은 LogEntry를 base64로 인코딩하여 봉투에 담아 전달합니다.
//!
//! ```json
//! {
//!   "message": {
//!     "attributes": {"logging.googleapis.com/timestamp": "..."},
//!     "data": "<base64 LogEntry>",
//!     "message_id": "1234",
//!     "publish_time": "2024-01-01T00:00:00Z"
//!   },
//!   "subscription": "projects/p/subscriptions/s"
//! }
//! ```
//!
//! `messageId`, `publishTime` 표기도 허용합니다.

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use gcplog_core::labels::LabelSet;
use serde::Deserialize;

use crate::assembler::Sanitizer;
use crate::error::FormatError;

pub const LABEL_MESSAGE_ID: &str = "__gcp_message_id";
pub const LABEL_SUBSCRIPTION_NAME: &str = "__gcp_subscription_name";
pub const ATTRIBUTES_PREFIX: &str = "__gcp_attributes_";

/// push 요청 본문
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PushMessage {
    #[serde(default)]
    pub message: PubSubMessage,
    #[serde(default)]
    pub subscription: String,
}

/// 봉투 안의 Pub/Sub 메시지
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PubSubMessage {
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// base64 인코딩된 LogEntry
    #[serde(default)]
    pub data: String,
    #[serde(default, alias = "messageId")]
    pub message_id: String,
    #[serde(default, alias = "publishTime")]
    pub publish_time: String,
}

impl PushMessage {
    /// 요청 본문을 디코딩하고 필수 필드를 검증합니다.
    pub fn decode(body: &[u8]) -> Result<Self, FormatError> {
        let message: Self =
            serde_json::from_slice(body).map_err(|e| FormatError::InvalidPushMessage {
                reason: e.to_string(),
            })?;
        message.validate()?;
        Ok(message)
    }

    /// `data`와 `message_id`는 비어 있으면 안 됩니다.
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.message.data.is_empty() {
            return Err(FormatError::InvalidPushMessage {
                reason: "push message has no data".to_owned(),
            });
        }
        if self.message.message_id.is_empty() {
            return Err(FormatError::InvalidPushMessage {
                reason: "push message has no ID".to_owned(),
            });
        }
        Ok(())
    }

    /// 봉투 메타데이터로 기본 내부 레이블을 만듭니다.
    pub fn base_labels(&self, sanitize: Sanitizer) -> LabelSet {
        let mut labels = LabelSet::new();
        labels.set(LABEL_MESSAGE_ID, self.message.message_id.as_str());
        labels.set(LABEL_SUBSCRIPTION_NAME, self.subscription.as_str());
        for (key, value) in &self.message.attributes {
            labels.set(
                format!("{ATTRIBUTES_PREFIX}{}", sanitize(key)),
                value.as_str(),
            );
        }
        labels
    }

    /// `data` 필드를 표준 base64로 디코딩합니다.
    pub fn decode_data(&self) -> Result<Vec<u8>, FormatError> {
        Ok(STANDARD.decode(&self.message.data)?)
    }
}
