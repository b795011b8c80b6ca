//! 에러 타입 — 도메인별 에러 정의

/// gcplog 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum GcpLogError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// relabel 규칙 에러
    #[error("relabel error: {0}")]
    Relabel(#[from] RelabelError),

    /// 레이블 에러
    #[error("label error: {0}")]
    Label(#[from] LabelError),

    /// 로그 엔트리 변환 에러
    #[error("entry error: {0}")]
    Entry(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// relabel 규칙 컴파일 에러
#[derive(Debug, thiserror::Error)]
pub enum RelabelError {
    /// 정규식 컴파일 실패
    #[error("rule[{index}]: invalid regex '{pattern}': {reason}")]
    InvalidRegex {
        index: usize,
        pattern: String,
        reason: String,
    },

    /// 알 수 없는 action 이름
    #[error("unknown relabel action: {0}")]
    UnknownAction(String),

    /// action에 필요한 필드가 없거나 허용되지 않는 필드가 설정됨
    #[error("rule[{index}]: {action} action {reason}")]
    InvalidRule {
        index: usize,
        action: String,
        reason: String,
    },
}

/// 레이블 유효성 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LabelError {
    /// 레이블 이름이 문법에 맞지 않음
    #[error("invalid label name: '{0}'")]
    InvalidName(String),

    /// 내부 전용(`__` 접두어) 레이블 이름
    #[error("reserved internal label name: '{0}'")]
    Reserved(String),
}
