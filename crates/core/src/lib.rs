#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod labels;
pub mod metrics;
pub mod relabel;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, GcpLogError, LabelError, RelabelError};

// 설정
pub use config::{GcpLogConfig, GeneralConfig, TargetConfig};

// 레이블
pub use labels::{LabelSet, RecordLabels, is_valid_label_name, sanitize_label_name};

// relabel
pub use relabel::{RelabelAction, RelabelConfig, RelabelRules, Relabeler};

// 도메인 타입
pub use types::LogRecord;
