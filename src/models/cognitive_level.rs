use serde::{Deserialize, Serialize};

/// 布鲁姆认知领域层级
///
/// 声明顺序即表格列顺序，也是提示词中的枚举顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CognitiveLevel {
    /// 记忆
    Remembering,
    /// 理解
    Understanding,
    /// 应用
    Applying,
    /// 分析
    Analyzing,
    /// 创造
    Creating,
    /// 评价
    Evaluating,
}

impl CognitiveLevel {
    /// 全部层级（固定顺序）
    pub const ALL: [CognitiveLevel; 6] = [
        CognitiveLevel::Remembering,
        CognitiveLevel::Understanding,
        CognitiveLevel::Applying,
        CognitiveLevel::Analyzing,
        CognitiveLevel::Creating,
        CognitiveLevel::Evaluating,
    ];

    /// 题量分配权重，六项之和为 1.0
    pub fn weight(self) -> f64 {
        match self {
            CognitiveLevel::Remembering => 0.1,
            CognitiveLevel::Understanding => 0.2,
            CognitiveLevel::Applying => 0.3,
            CognitiveLevel::Analyzing => 0.15,
            CognitiveLevel::Creating => 0.1,
            CognitiveLevel::Evaluating => 0.15,
        }
    }

    /// 英文标签（用于提示词和表头）
    pub fn label(self) -> &'static str {
        match self {
            CognitiveLevel::Remembering => "Remembering",
            CognitiveLevel::Understanding => "Understanding",
            CognitiveLevel::Applying => "Applying",
            CognitiveLevel::Analyzing => "Analyzing",
            CognitiveLevel::Creating => "Creating",
            CognitiveLevel::Evaluating => "Evaluating",
        }
    }

    /// 所属难度档
    pub fn difficulty(self) -> Difficulty {
        match self {
            CognitiveLevel::Remembering | CognitiveLevel::Understanding => Difficulty::Easy,
            CognitiveLevel::Applying | CognitiveLevel::Analyzing => Difficulty::Medium,
            CognitiveLevel::Creating | CognitiveLevel::Evaluating => Difficulty::Hard,
        }
    }

    /// 从模型返回的 specification 文本解析层级
    ///
    /// 忽略大小写；允许 "Remember" / "Understand" 这类动词形式，
    /// 也允许标签嵌在更长的文本中（如 "Bloom's: Applying"）
    pub fn from_label(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }

        Self::ALL.into_iter().find(|level| {
            let label = level.label().to_lowercase();
            let stem = label.trim_end_matches("ing");
            lower == label || lower.contains(&label) || lower.contains(stem)
        })
    }
}

impl std::fmt::Display for CognitiveLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 难度档（表头分组）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }

    /// 该档包含的层级
    pub fn levels(self) -> impl Iterator<Item = CognitiveLevel> {
        CognitiveLevel::ALL
            .into_iter()
            .filter(move |level| level.difficulty() == self)
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 六个层级的题数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    pub remembering: u32,
    pub understanding: u32,
    pub applying: u32,
    pub analyzing: u32,
    pub creating: u32,
    pub evaluating: u32,
}

impl LevelCounts {
    pub fn get(&self, level: CognitiveLevel) -> u32 {
        match level {
            CognitiveLevel::Remembering => self.remembering,
            CognitiveLevel::Understanding => self.understanding,
            CognitiveLevel::Applying => self.applying,
            CognitiveLevel::Analyzing => self.analyzing,
            CognitiveLevel::Creating => self.creating,
            CognitiveLevel::Evaluating => self.evaluating,
        }
    }

    fn slot(&mut self, level: CognitiveLevel) -> &mut u32 {
        match level {
            CognitiveLevel::Remembering => &mut self.remembering,
            CognitiveLevel::Understanding => &mut self.understanding,
            CognitiveLevel::Applying => &mut self.applying,
            CognitiveLevel::Analyzing => &mut self.analyzing,
            CognitiveLevel::Creating => &mut self.creating,
            CognitiveLevel::Evaluating => &mut self.evaluating,
        }
    }

    /// 按层级顺序构建
    pub fn from_fn(mut f: impl FnMut(CognitiveLevel) -> u32) -> Self {
        let mut counts = Self::default();
        for level in CognitiveLevel::ALL {
            *counts.slot(level) = f(level);
        }
        counts
    }

    /// 六项之和
    pub fn sum(&self) -> u32 {
        CognitiveLevel::ALL
            .into_iter()
            .map(|level| self.get(level))
            .fold(0u32, u32::saturating_add)
    }

    /// 某一难度档的题数
    pub fn difficulty_sum(&self, difficulty: Difficulty) -> u32 {
        difficulty
            .levels()
            .map(|level| self.get(level))
            .fold(0u32, u32::saturating_add)
    }

    /// 逐项累加
    pub fn accumulate(&mut self, other: &LevelCounts) {
        for level in CognitiveLevel::ALL {
            let slot = self.slot(level);
            *slot = slot.saturating_add(other.get(level));
        }
    }
}

/// 按 (层级, 题数) 对构建，未出现的层级为 0
impl FromIterator<(CognitiveLevel, u32)> for LevelCounts {
    fn from_iter<I: IntoIterator<Item = (CognitiveLevel, u32)>>(iter: I) -> Self {
        let mut counts = Self::default();
        for (level, count) in iter {
            *counts.slot(level) = count;
        }
        counts
    }
}
