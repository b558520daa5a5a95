use crate::models::topic_row::TopicRow;
use crate::services::allocation::coerce_count;
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use tokio::fs;

/// TOML 分配表
///
/// ```toml
/// total_items = 20
/// document = "lecture.pdf"
///
/// [[topics]]
/// topic = "Cell Structure"
/// hours = 10
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllocationSheet {
    /// 目标总题数
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_items: u32,
    /// 源文档路径（相对路径以表格文件所在目录为基准）
    #[serde(default)]
    pub document: Option<PathBuf>,
    #[serde(default)]
    pub topics: Vec<SheetTopic>,
}

/// 表格中的主题
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetTopic {
    #[serde(default)]
    pub topic: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub hours: u32,
}

impl AllocationSheet {
    /// 转换为未推导的行
    pub fn rows(&self) -> Vec<TopicRow> {
        self.topics
            .iter()
            .map(|t| TopicRow::new(t.topic.clone(), t.hours))
            .collect()
    }
}

/// 表格里的数值可能写成整数、小数或字符串，一律宽松转换，无法识别时为 0
fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCount {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let count = match RawCount::deserialize(deserializer)? {
        RawCount::Int(n) => u32::try_from(n.max(0)).unwrap_or(u32::MAX),
        RawCount::Float(f) if f.is_finite() && f > 0.0 => f.trunc().min(u32::MAX as f64) as u32,
        RawCount::Float(_) => 0,
        RawCount::Text(s) => coerce_count(&s),
    };
    Ok(count)
}

/// 解析 TOML 文本
pub fn parse_allocation_sheet(content: &str) -> Result<AllocationSheet> {
    let sheet: AllocationSheet = toml::from_str(content).context("无法解析分配表")?;
    Ok(sheet)
}

/// 从 TOML 文件加载分配表
pub async fn load_allocation_sheet(sheet_path: &Path) -> Result<AllocationSheet> {
    let content = fs::read_to_string(sheet_path)
        .await
        .with_context(|| format!("无法读取分配表文件: {}", sheet_path.display()))?;

    let mut sheet: AllocationSheet = toml::from_str(&content)
        .with_context(|| format!("无法解析分配表文件: {}", sheet_path.display()))?;

    // 文档路径相对于表格文件
    if let Some(doc) = sheet.document.take() {
        let resolved = if doc.is_relative() {
            sheet_path
                .parent()
                .map(|dir| dir.join(&doc))
                .unwrap_or(doc)
        } else {
            doc
        };
        sheet.document = Some(resolved);
    }

    tracing::info!(
        "✓ 已加载分配表: {} 个主题, 目标 {} 题",
        sheet.topics.len(),
        sheet.total_items
    );

    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_sheet_with_lenient_numbers() {
        let sheet = parse_allocation_sheet(
            r#"
            total_items = "20"

            [[topics]]
            topic = "Cells"
            hours = 10

            [[topics]]
            topic = "Genetics"
            hours = "30 hrs"

            [[topics]]
            topic = "Ecology"
            hours = -4

            [[topics]]
            topic = "Evolution"
            "#,
        )
        .unwrap();

        assert_eq!(sheet.total_items, 20);
        assert_eq!(sheet.document, None);
        let hours: Vec<u32> = sheet.topics.iter().map(|t| t.hours).collect();
        assert_eq!(hours, vec![10, 30, 0, 0]);

        let rows = sheet.rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].topic, "Genetics");
        assert_eq!(rows[1].percentage(), 0);
    }

    #[test]
    fn test_parse_sheet_rejects_broken_toml() {
        assert!(parse_allocation_sheet("total_items = [").is_err());
    }

    #[tokio::test]
    async fn test_load_sheet_resolves_document_relative_to_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let sheet_path = dir.path().join("tos.toml");
        let mut file = std::fs::File::create(&sheet_path).unwrap();
        writeln!(
            file,
            "total_items = 10\ndocument = \"lecture.pdf\"\n[[topics]]\ntopic = \"A\"\nhours = 2"
        )
        .unwrap();

        let sheet = load_allocation_sheet(&sheet_path).await.unwrap();

        assert_eq!(sheet.document, Some(dir.path().join("lecture.pdf")));
        assert_eq!(sheet.topics[0].hours, 2);
    }
}
