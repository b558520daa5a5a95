use serde::Serialize;

use super::cognitive_level::{CognitiveLevel, LevelCounts};

/// 分配表中的一行（一个主题）
///
/// `topic` 与 `hours` 由教师录入；其余字段只能由分配引擎推导写入
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopicRow {
    /// 主题名称
    pub topic: String,
    /// 授课学时（权重）
    pub hours: u32,
    pub(crate) percentage: u32,
    pub(crate) levels: LevelCounts,
    pub(crate) total_items: u32,
}

impl TopicRow {
    /// 创建空行（主题为空，所有数值为 0）
    pub fn empty() -> Self {
        Self::default()
    }

    /// 创建带主题和学时的行，推导字段为 0
    pub fn new(topic: impl Into<String>, hours: u32) -> Self {
        Self {
            topic: topic.into(),
            hours,
            ..Self::default()
        }
    }

    /// 学时占比（取整百分比）
    pub fn percentage(&self) -> u32 {
        self.percentage
    }

    /// 各认知层级题数
    pub fn levels(&self) -> &LevelCounts {
        &self.levels
    }

    pub fn level_count(&self, level: CognitiveLevel) -> u32 {
        self.levels.get(level)
    }

    /// 本主题题数
    pub fn total_items(&self) -> u32 {
        self.total_items
    }
}

/// 合计行
///
/// `items` 是教师设定的总题数；其余字段为各行对应字段之和。
/// `total_items` 与 `items` 可能因逐项取整而不一致
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// 目标总题数
    pub items: u32,
    pub hours: u32,
    pub percentage: u32,
    pub levels: LevelCounts,
    pub total_items: u32,
}

impl Totals {
    /// 仅设置目标总题数，其余为 0
    pub fn with_items(items: u32) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }
}
