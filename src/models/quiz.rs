use serde::{Deserialize, Serialize};

use super::cognitive_level::CognitiveLevel;

/// 选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub is_correct: bool,
}

/// 模型生成的一道选择题
///
/// 字段名与结构化输出 schema 一致；`topic` 在 schema 中不是必填项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub question: String,
    /// 认知层级标签（自由文本）
    pub specification: String,
    pub answers: Vec<Answer>,
}

impl QuizItem {
    /// 将 specification 映射回认知层级（无法识别时为 None）
    pub fn cognitive_level(&self) -> Option<CognitiveLevel> {
        CognitiveLevel::from_label(&self.specification)
    }

    /// 第一个正确选项
    pub fn correct_answer(&self) -> Option<&Answer> {
        self.answers.iter().find(|a| a.is_correct)
    }

    /// 正确选项个数
    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }
}
