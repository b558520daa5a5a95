//! 提示词构建 - 业务能力层
//!
//! 把分配表序列化成一段自然语言说明，并提供固定的系统指令

use crate::models::{CognitiveLevel, TopicRow, Totals};

/// 固定系统指令
pub const SYSTEM_INSTRUCTION: &str = "Create a quiz where the questions falls under the Bloom's Taxonomy Cognitive Domain. \
The structure of the quiz will be based on the specifications per topics given in the prompt. \
Ensure that all of the contents in the quiz are present in the document provided. \
For each questions, provide 4 multiple choices with only one correct answer. \
Include the specification according to the Bloom's Taxonomy Cognitive Domain, and the topic which the question came from.";

/// 构建分配说明
///
/// 格式：`The total number of questions are N. The Topics are: Topic no. 1. <topic> with ...`
/// 主题从 1 开始编号，六个层级按固定顺序列出
pub fn build_specification(rows: &[TopicRow], totals: &Totals) -> String {
    let mut spec = format!(
        "The total number of questions are {}. The Topics are: ",
        totals.items
    );

    for (index, row) in rows.iter().enumerate() {
        spec.push_str(&format!("Topic no. {}. {} with ", index + 1, row.topic));

        let last = CognitiveLevel::ALL.len() - 1;
        for (i, level) in CognitiveLevel::ALL.iter().enumerate() {
            if i == last {
                spec.push_str("and ");
            }
            spec.push_str(&format!(
                "{} question on {}",
                row.level_count(*level),
                level.label()
            ));
            spec.push_str(if i == last { ". " } else { ", " });
        }
    }

    spec
}
