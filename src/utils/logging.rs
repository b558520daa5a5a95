//! 日志工具模块
//!
//! 提供日志格式化和输出的辅助函数

use tracing::info;

use crate::config::Config;
use crate::models::{TopicRow, Totals};

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🤖 模型: {}", config.llm_model_name);
    info!("📐 取整策略: {:?}", config.rounding_policy);
    info!("{}", "=".repeat(60));
}

/// 记录分配结果
///
/// # 参数
/// - `rows`: 推导后的行
/// - `totals`: 合计
pub fn log_allocation(rows: &[TopicRow], totals: &Totals) {
    info!(
        "📊 {} 个主题, 总学时 {}, 目标 {} 题, 分配 {} 题",
        rows.len(),
        totals.hours,
        totals.items,
        totals.total_items
    );

    for (index, row) in rows.iter().enumerate() {
        info!(
            "  {}. {} | {} 学时 | {}% | {} 题",
            index + 1,
            truncate_text(&row.topic, 40),
            row.hours,
            row.percentage(),
            row.total_items()
        );
    }

    if totals.hours > 0 && totals.total_items != totals.items {
        info!(
            "💡 逐项取整导致分配题数 ({}) 与目标 ({}) 不一致",
            totals.total_items, totals.items
        );
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `generated`: 实际生成题数
/// - `requested`: 目标题数
/// - `config`: 配置
pub fn print_final_stats(generated: usize, requested: u32, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 出题完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 生成: {} 题 / 目标 {} 题", generated, requested);
    info!("📄 分配表: {}", config.sheet_path);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
