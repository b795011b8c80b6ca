//! GCP 로그 포매터 -- 다섯 단계 오케스트레이션
//!
//! [`GcpLogFormatter`]는 원시 레코드 하나를 [`LogRecord`] 하나로 변환합니다.
//!
//! # 단계
//!
//! ```text
//! raw bytes -> decode -> assemble -> relabel -> finalize ---+
//!                 |                     |                    +--> LogRecord
//!                 +-> resolve timestamp / line -------------+
//!                                       |
//!                                  drop -> Ok(None)
//! ```
//!
//! relabel 규칙이 레코드를 버리면 타임스탬프 단계는 실행되지 않습니다.
//!
//! # 사용 예시
//! ```
//! use gcplog_formatter::GcpLogFormatter;
//!
//! let formatter = GcpLogFormatter::builder().build();
//! let record = formatter
//!     .format(br#"{"severity":"INFO","textPayload":"hello"}"#)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(record.line, "hello");
//! ```

use std::fmt;
use std::sync::Arc;

use gcplog_core::config::TargetConfig;
use gcplog_core::error::GcpLogError;
use gcplog_core::labels::{LabelSet, RecordLabels, sanitize_label_name};
use gcplog_core::relabel::{RelabelRules, Relabeler};
use gcplog_core::types::LogRecord;
use tracing::debug;

use crate::assembler::{Sanitizer, assemble};
use crate::entry::GcpLogEntry;
use crate::error::FormatError;
use crate::finalizer::finalize;
use crate::push::PushMessage;
use crate::resolver::{resolve_line, resolve_timestamp};

/// GCP 로그 포매터
///
/// 상태를 갖지 않으며 `Send + Sync`이므로 여러 워커 스레드에서 공유할 수 있습니다.
#[derive(Clone)]
pub struct GcpLogFormatter {
    static_labels: RecordLabels,
    relabeler: Arc<dyn Relabeler>,
    use_incoming_timestamp: bool,
    use_full_line: bool,
    sanitize: Sanitizer,
}

impl GcpLogFormatter {
    /// 새 빌더를 생성합니다.
    pub fn builder() -> GcpLogFormatterBuilder {
        GcpLogFormatterBuilder::new()
    }

    /// target 설정에서 포매터를 생성합니다. relabel 규칙을 컴파일합니다.
    pub fn from_target_config(config: &TargetConfig) -> Result<Self, GcpLogError> {
        let rules = config.compile_relabel_rules()?;
        Ok(Self::builder()
            .static_labels(config.labels.clone())
            .relabeler(rules)
            .use_incoming_timestamp(config.use_incoming_timestamp)
            .use_full_line(config.use_full_line)
            .build())
    }

    /// 원시 LogEntry 하나를 변환합니다.
    ///
    /// - `Ok(Some(record))`: 변환 성공
    /// - `Ok(None)`: relabel 규칙이 레코드를 버림
    /// - `Err(_)`: 디코딩 또는 타임스탬프 실패
    pub fn format(&self, raw: &[u8]) -> Result<Option<LogRecord>, FormatError> {
        self.format_with_base(raw, &LabelSet::new())
    }

    /// 외부 문맥에서 전달된 기본 내부 레이블과 함께 변환합니다.
    pub fn format_with_base(
        &self,
        raw: &[u8],
        base: &LabelSet,
    ) -> Result<Option<LogRecord>, FormatError> {
        let entry = GcpLogEntry::decode(raw)?;
        let labels = assemble(&entry, base, self.sanitize);

        let Some(labels) = self.relabel(labels) else {
            debug!(
                log_name = entry.log_name.as_str(),
                "log entry dropped by relabel rules"
            );
            return Ok(None);
        };

        let labels = finalize(labels, &self.static_labels);
        let timestamp = resolve_timestamp(&entry, self.use_incoming_timestamp)?;
        let line = resolve_line(&entry, raw, self.use_full_line);

        Ok(Some(LogRecord {
            labels,
            timestamp,
            line,
        }))
    }

    /// Pub/Sub push 요청 본문 하나를 변환합니다.
    ///
    /// 봉투의 메타데이터는 `__gcp_message_id`, `__gcp_subscription_name`,
    /// `__gcp_attributes_*` 내부 레이블이 되며, `data`를 디코딩한 LogEntry가
    /// 일반 변환 경로를 거칩니다.
    pub fn format_push(&self, body: &[u8]) -> Result<Option<LogRecord>, FormatError> {
        let message = PushMessage::decode(body)?;
        let base = message.base_labels(self.sanitize);
        let data = message.decode_data()?;
        self.format_with_base(&data, &base)
    }

    pub fn static_labels(&self) -> &RecordLabels {
        &self.static_labels
    }

    pub fn use_incoming_timestamp(&self) -> bool {
        self.use_incoming_timestamp
    }

    pub fn use_full_line(&self) -> bool {
        self.use_full_line
    }

    fn relabel(&self, labels: LabelSet) -> Option<LabelSet> {
        self.relabeler.relabel(labels)
    }
}

impl fmt::Debug for GcpLogFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcpLogFormatter")
            .field("static_labels", &self.static_labels)
            .field("use_incoming_timestamp", &self.use_incoming_timestamp)
            .field("use_full_line", &self.use_full_line)
            .finish_non_exhaustive()
    }
}

/// [`GcpLogFormatter`] 빌더
///
/// 기본값: 정적 레이블 없음, 빈 relabel 규칙, 두 정책 플래그 모두 꺼짐,
/// sanitizer는 [`sanitize_label_name`].
pub struct GcpLogFormatterBuilder {
    static_labels: RecordLabels,
    relabeler: Arc<dyn Relabeler>,
    use_incoming_timestamp: bool,
    use_full_line: bool,
    sanitize: Sanitizer,
}

impl GcpLogFormatterBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 정적 레이블을 설정합니다.
    pub fn static_labels(mut self, labels: RecordLabels) -> Self {
        self.static_labels = labels;
        self
    }

    /// relabel 엔진을 설정합니다.
    pub fn relabeler(mut self, relabeler: impl Relabeler + 'static) -> Self {
        self.relabeler = Arc::new(relabeler);
        self
    }

    /// 이미 공유 중인 relabel 엔진을 설정합니다.
    pub fn shared_relabeler(mut self, relabeler: Arc<dyn Relabeler>) -> Self {
        self.relabeler = relabeler;
        self
    }

    /// 원본 타임스탬프 사용 여부를 설정합니다.
    pub fn use_incoming_timestamp(mut self, enabled: bool) -> Self {
        self.use_incoming_timestamp = enabled;
        self
    }

    /// 전체 라인 사용 여부를 설정합니다.
    pub fn use_full_line(mut self, enabled: bool) -> Self {
        self.use_full_line = enabled;
        self
    }

    /// 레이블 이름 sanitizer를 설정합니다.
    pub fn sanitizer(mut self, sanitize: Sanitizer) -> Self {
        self.sanitize = sanitize;
        self
    }

    /// 포매터를 생성합니다.
    pub fn build(self) -> GcpLogFormatter {
        GcpLogFormatter {
            static_labels: self.static_labels,
            relabeler: self.relabeler,
            use_incoming_timestamp: self.use_incoming_timestamp,
            use_full_line: self.use_full_line,
            sanitize: self.sanitize,
        }
    }
}

impl Default for GcpLogFormatterBuilder {
    fn default() -> Self {
        Self {
            static_labels: RecordLabels::new(),
            relabeler: Arc::new(RelabelRules::new()),
            use_incoming_timestamp: false,
            use_full_line: false,
            sanitize: sanitize_label_name,
        }
    }
}
