#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`entry`]: 원시 바이트를 `GcpLogEntry`로 디코딩
//! - [`assembler`]: 엔트리 메타데이터로 `__gcp_*` 내부 레이블 조립
//! - [`finalizer`]: 내부/무효 레이블 제거, 정적 레이블 병합
//! - [`resolver`]: 타임스탬프와 로그 라인 결정
//! - [`formatter`]: 전체 단계 오케스트레이션 (`GcpLogFormatter`)
//! - [`push`]: Pub/Sub push 봉투 변환
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! Decoder -> LabelAssembler -> Relabeler -> LabelFinalizer --+--> LogRecord
//!    |                                                       |
//!    +-------------> Timestamp/Line Resolver ----------------+
//! ```

pub mod assembler;
pub mod entry;
pub mod error;
pub mod finalizer;
pub mod formatter;
pub mod push;
pub mod resolver;

// --- 주요 타입 re-export ---

// 포매터
pub use formatter::{GcpLogFormatter, GcpLogFormatterBuilder};

// 에러
pub use error::FormatError;

// 입력 타입
pub use entry::{GcpLogEntry, MonitoredResource};
pub use push::{PubSubMessage, PushMessage};

// sanitizer
pub use assembler::Sanitizer;
