//! 结构化输出 schema 与响应解析
//!
//! schema 与任何可替换的生成服务保持逐位兼容；解析不做任何修补

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::GenerationError;
use crate::models::QuizItem;

/// 结构化输出 schema
///
/// 顶层为数组；每项必填 `question` / `answers` / `specification`，`topic` 可选；
/// 每个选项必填 `answer` / `is_correct`
pub fn response_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "topic": { "type": "string" },
                "question": { "type": "string" },
                "specification": { "type": "string" },
                "answers": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "answer": { "type": "string" },
                            "is_correct": { "type": "boolean" }
                        },
                        "required": ["answer", "is_correct"]
                    }
                }
            },
            "required": ["question", "answers", "specification"]
        }
    })
}

/// 把服务返回的文本解析为题目列表
///
/// - 任何解析失败或结构不符都返回 [`GenerationError::MalformedResponse`]
/// - `validate_answer_key` 为真时，每道题必须恰有一个正确选项
pub fn parse_quiz_response(
    text: &str,
    validate_answer_key: bool,
) -> Result<Vec<QuizItem>, GenerationError> {
    let items: Vec<QuizItem> = serde_json::from_str(text.trim()).map_err(|e| {
        warn!("模型返回内容不符合 schema: {}", e);
        GenerationError::from(e)
    })?;

    debug!("解析得到 {} 道题", items.len());

    if validate_answer_key {
        check_answer_key(&items)?;
    }

    Ok(items)
}

fn check_answer_key(items: &[QuizItem]) -> Result<(), GenerationError> {
    for (index, item) in items.iter().enumerate() {
        let correct = item.correct_count();
        if item.answers.is_empty() || correct != 1 {
            warn!(
                "第 {} 道题答案标记不合法: {} 个选项, {} 个正确",
                index + 1,
                item.answers.len(),
                correct
            );
            return Err(GenerationError::InvalidAnswerKey { index, correct });
        }
    }
    Ok(())
}
