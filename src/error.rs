use thiserror::Error;

/// 生成失败时展示给用户的统一提示
pub const GENERATION_FAILURE_MESSAGE: &str =
    "There seems to be a problem on our side. Please try again.";

/// 本地前置校验错误
///
/// 在任何外部调用之前返回，不修改任何状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 没有任何主题
    #[error("no topics")]
    NoTopics,
    /// 总学时不大于 0
    #[error("non-positive hours")]
    NonPositiveHours,
    /// 没有文档或文档不可读
    #[error("missing document")]
    MissingDocument,
}

impl ValidationError {
    /// 面向用户的提示
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::NoTopics => "There must be at least 1 topic",
            ValidationError::NonPositiveHours => "Hours cannot be equal or less than 0",
            ValidationError::MissingDocument => "Please attach a readable source document (PDF)",
        }
    }
}

/// 外部生成服务错误
///
/// 所有变体对用户都显示同一条提示；内部细节只用于日志
#[derive(Debug, Error)]
pub enum GenerationError {
    /// 网络请求失败
    #[error("service failure: request to {endpoint} failed: {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 请求超时
    #[error("service failure: request timed out after {secs}s")]
    Timeout { secs: u64 },
    /// 服务返回非成功状态码
    #[error("service failure: HTTP {status}: {body}")]
    BadStatus { status: u16, body: String },
    /// 服务没有返回任何文本
    #[error("service failure: empty response ({reason})")]
    EmptyResponse { reason: String },
    /// 返回内容不符合 schema
    #[error("service failure: malformed response: {source}")]
    MalformedResponse {
        #[source]
        source: serde_json::Error,
    },
    /// 某道题的答案标记不合法（仅在开启答案校验时出现）
    #[error("service failure: item {index} must have exactly one correct answer, found {correct}")]
    InvalidAnswerKey { index: usize, correct: usize },
}

impl GenerationError {
    pub fn user_message(&self) -> &'static str {
        GENERATION_FAILURE_MESSAGE
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::MalformedResponse { source: err }
    }
}

/// 一次提交的错误：校验错误或生成错误，二者互斥
#[derive(Debug, Error)]
pub enum QuizError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl QuizError {
    /// 面向用户的提示
    pub fn user_message(&self) -> &'static str {
        match self {
            QuizError::Validation(e) => e.user_message(),
            QuizError::Generation(e) => e.user_message(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, QuizError::Validation(_))
    }
}

/// 提交结果类型
pub type QuizResult<T> = Result<T, QuizError>;
