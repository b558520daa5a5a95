//! 文本展示
//!
//! 只负责把会话状态渲染为文本，不做任何计算

use crate::models::{CognitiveLevel, Difficulty, QuizItem, TopicRow, Totals};
use crate::orchestrator::QuizState;

/// 渲染规格表
///
/// 两行表头：难度档（EASY / MEDIUM / HARD）及其下的认知层级与权重，最后一行为合计
pub fn render_table(rows: &[TopicRow], totals: &Totals) -> String {
    let topic_width = rows
        .iter()
        .map(|r| r.topic.chars().count())
        .chain(["Topic".len(), "Total".len()])
        .max()
        .unwrap_or(5);
    let level_widths: Vec<usize> = CognitiveLevel::ALL
        .iter()
        .map(|l| level_header(*l).chars().count())
        .collect();

    let mut out = String::new();

    // 第一行表头：难度档跨两列
    let mut band_line = format!(
        "{:<tw$} | {:>5} | {:>10} |",
        "",
        "",
        "",
        tw = topic_width
    );
    for difficulty in Difficulty::ALL {
        let span: usize = CognitiveLevel::ALL
            .iter()
            .zip(&level_widths)
            .filter(|(l, _)| l.difficulty() == difficulty)
            .map(|(_, w)| w + 3)
            .sum::<usize>()
            - 3;
        band_line.push_str(&format!(" {:^span$} |", difficulty.label(), span = span));
    }
    out.push_str(band_line.trim_end());
    out.push('\n');

    let mut header = format!(
        "{:<tw$} | {:>5} | {:>10} |",
        "Topic",
        "Hours",
        "Percentage",
        tw = topic_width
    );
    for level in CognitiveLevel::ALL {
        header.push_str(&format!(" {} |", level_header(level)));
    }
    header.push_str(" Total Items");
    let rule = "-".repeat(header.chars().count());
    out.push_str(&header);
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for row in rows {
        out.push_str(&render_line(
            &row.topic,
            row.hours,
            row.percentage(),
            |l| row.level_count(l),
            row.total_items(),
            topic_width,
            &level_widths,
        ));
        out.push('\n');
    }

    out.push_str(&rule);
    out.push('\n');
    out.push_str(&render_line(
        "Total",
        totals.hours,
        totals.percentage,
        |l| totals.levels.get(l),
        totals.total_items,
        topic_width,
        &level_widths,
    ));
    out.push('\n');
    out.push_str(&format!("Target items: {}", totals.items));

    out
}

fn level_header(level: CognitiveLevel) -> String {
    format!("{} ({}%)", level.label(), (level.weight() * 100.0).round() as u32)
}

fn render_line(
    topic: &str,
    hours: u32,
    percentage: u32,
    level: impl Fn(CognitiveLevel) -> u32,
    total_items: u32,
    topic_width: usize,
    level_widths: &[usize],
) -> String {
    let mut line = format!(
        "{:<tw$} | {:>5} | {:>8} % |",
        topic,
        hours,
        percentage,
        tw = topic_width
    );
    for (l, width) in CognitiveLevel::ALL.iter().zip(level_widths) {
        line.push_str(&format!(" {:>w$} |", level(*l), w = width));
    }
    line.push_str(&format!(" {:>w$}", total_items, w = "Total Items".len()));
    line
}

/// 渲染出题结果；没有题目时输出状态文字
pub fn render_quiz(state: &QuizState) -> String {
    let items = state.items();
    if items.is_empty() {
        return state.status_text().to_string();
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| render_item(index + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_item(number: usize, item: &QuizItem) -> String {
    let mut out = format!("Question {}\n  {}\nChoices:\n", number, item.question);
    for answer in &item.answers {
        if answer.is_correct {
            out.push_str(&format!("  - {}  ✔\n", answer.answer));
        } else {
            out.push_str(&format!("  - {}\n", answer.answer));
        }
    }
    match item.cognitive_level() {
        Some(level) => out.push_str(&format!(
            "Specification: {} ({})\n",
            item.specification,
            level.difficulty()
        )),
        None => out.push_str(&format!("Specification: {}\n", item.specification)),
    }
    out.push_str(&format!(
        "Topic: {}\n",
        item.topic.as_deref().unwrap_or("-")
    ));
    out
}
