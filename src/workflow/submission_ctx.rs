//! 提交上下文
//!
//! 封装"这是第几次提交、提交了什么"这一信息，只用于日志

use std::fmt::Display;

/// 提交上下文
#[derive(Debug, Clone)]
pub struct SubmissionCtx {
    /// 会话内的提交序号（从1开始）
    pub submission_no: usize,

    /// 主题数
    pub topic_count: usize,

    /// 目标总题数
    pub total_items: u32,

    /// 文档名称
    pub document_name: Option<String>,
}

impl SubmissionCtx {
    /// 创建新的提交上下文
    pub fn new(
        submission_no: usize,
        topic_count: usize,
        total_items: u32,
        document_name: Option<String>,
    ) -> Self {
        Self {
            submission_no,
            topic_count,
            total_items,
            document_name,
        }
    }
}

impl Display for SubmissionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[提交 #{} 文档#{}]",
            self.submission_no,
            self.document_name.as_deref().unwrap_or("-")
        )
    }
}
