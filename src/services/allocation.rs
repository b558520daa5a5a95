//! 题量分配引擎 - 业务能力层
//!
//! 按学时占比把总题数分配到各主题，再按固定权重分配到六个认知层级。
//! 所有函数都是纯函数：输入行和合计，返回新的行和合计。
//!
//! ## 取整规则
//!
//! 默认 [`RoundingPolicy::Independent`]：每个推导值单独四舍五入（正数域上 .5 进位）。
//! 因此六个层级之和不一定等于本行题数，各行题数之和也不一定等于目标总题数，
//! 这个偏差被保留，不做修正。
//!
//! [`RoundingPolicy::LargestRemainder`] 是可选的守恒分配：
//! 各行题数之和恰好等于目标总题数，各层级之和恰好等于本行题数。

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::models::{CognitiveLevel, LevelCounts, TopicRow, Totals};

/// 取整策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoundingPolicy {
    /// 逐项独立取整（允许偏差）
    #[default]
    Independent,
    /// 最大余数法（总数守恒）
    LargestRemainder,
}

impl RoundingPolicy {
    /// 从配置字符串解析
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "independent" => Some(RoundingPolicy::Independent),
            "largest-remainder" | "hamilton" => Some(RoundingPolicy::LargestRemainder),
            _ => None,
        }
    }
}

/// 宽松解析表单里的整数
///
/// 取开头的整数部分（`"12.7"`、`"12abc"` → 12）；空白、非数字、负数 → 0；溢出取 `u32::MAX`
pub fn coerce_count(raw: &str) -> u32 {
    static LEADING_INT: OnceLock<Regex> = OnceLock::new();
    let re = LEADING_INT.get_or_init(|| Regex::new(r"^\s*([+-]?)(\d+)").expect("静态正则表达式"));

    let Some(caps) = re.captures(raw) else {
        return 0;
    };

    let negative = &caps[1] == "-";
    let digits = &caps[2];
    if negative {
        return 0;
    }

    digits.parse::<u32>().unwrap_or(u32::MAX)
}

/// 正数域上的 .5 进位取整
fn round_half_up(x: f64) -> u32 {
    if !x.is_finite() || x <= 0.0 {
        return 0;
    }
    x.round().min(u32::MAX as f64) as u32
}

/// 计算合计行
///
/// 各数值字段逐行求和，`items` 原样保留
pub fn recompute_totals(rows: &[TopicRow], items: u32) -> Totals {
    let mut totals = Totals::with_items(items);

    for row in rows {
        totals.hours = totals.hours.saturating_add(row.hours);
        totals.percentage = totals.percentage.saturating_add(row.percentage);
        totals.levels.accumulate(&row.levels);
        totals.total_items = totals.total_items.saturating_add(row.total_items);
    }

    totals
}

/// 按默认（逐项独立取整）策略重新分配
pub fn redistribute(rows: &[TopicRow], totals: &Totals) -> Vec<TopicRow> {
    redistribute_with(rows, totals, RoundingPolicy::Independent)
}

/// 按指定策略重新分配
///
/// `totals.hours == 0` 时原样返回（避免除零，推导字段保持原值）
pub fn redistribute_with(
    rows: &[TopicRow],
    totals: &Totals,
    policy: RoundingPolicy,
) -> Vec<TopicRow> {
    if totals.hours == 0 {
        debug!("总学时为 0，跳过重新分配");
        return rows.to_vec();
    }

    match policy {
        RoundingPolicy::Independent => rows
            .iter()
            .map(|row| distribute_independent(row, totals))
            .collect(),
        RoundingPolicy::LargestRemainder => distribute_largest_remainder(rows, totals),
    }
}

fn percentage_of(row: &TopicRow, totals: &Totals) -> u32 {
    round_half_up(row.hours as f64 / totals.hours as f64 * 100.0)
}

fn distribute_independent(row: &TopicRow, totals: &Totals) -> TopicRow {
    let percentage = percentage_of(row, totals);
    let items_per_row = round_half_up(totals.items as f64 * percentage as f64 / 100.0);
    let levels =
        LevelCounts::from_fn(|level| round_half_up(items_per_row as f64 * level.weight()));

    TopicRow {
        topic: row.topic.clone(),
        hours: row.hours,
        percentage,
        levels,
        total_items: items_per_row,
    }
}

fn distribute_largest_remainder(rows: &[TopicRow], totals: &Totals) -> Vec<TopicRow> {
    let hour_weights: Vec<f64> = rows.iter().map(|r| r.hours as f64).collect();
    let row_items = apportion(totals.items, &hour_weights);
    let level_weights: Vec<f64> = CognitiveLevel::ALL.iter().map(|l| l.weight()).collect();

    rows.iter()
        .zip(row_items)
        .map(|(row, items_per_row)| {
            let levels: LevelCounts = CognitiveLevel::ALL
                .into_iter()
                .zip(apportion(items_per_row, &level_weights))
                .collect();

            TopicRow {
                topic: row.topic.clone(),
                hours: row.hours,
                percentage: percentage_of(row, totals),
                levels,
                total_items: items_per_row,
            }
        })
        .collect()
}

/// 最大余数法：把 `total` 按 `weights` 分成整数份，份数之和恰为 `total`
///
/// 余数相同时索引小的优先
pub fn apportion(total: u32, weights: &[f64]) -> Vec<u32> {
    let weight_sum: f64 = weights.iter().filter(|w| w.is_finite() && **w > 0.0).sum();
    if total == 0 || weight_sum <= 0.0 {
        return vec![0; weights.len()];
    }

    let quotas: Vec<f64> = weights
        .iter()
        .map(|w| {
            if w.is_finite() && *w > 0.0 {
                w / weight_sum * total as f64
            } else {
                0.0
            }
        })
        .collect();

    let mut shares: Vec<u32> = quotas.iter().map(|q| q.floor() as u32).collect();
    let assigned: u32 = shares.iter().fold(0u32, |acc, s| acc.saturating_add(*s));
    let mut remaining = total.saturating_sub(assigned);

    let mut order: Vec<usize> = (0..quotas.len()).filter(|&i| quotas[i] > 0.0).collect();
    order.sort_by(|&a, &b| {
        let fa = quotas[a] - quotas[a].floor();
        let fb = quotas[b] - quotas[b].floor();
        fb.total_cmp(&fa).then(a.cmp(&b))
    });

    for idx in order.into_iter().cycle() {
        if remaining == 0 {
            break;
        }
        shares[idx] += 1;
        remaining -= 1;
    }

    shares
}

/// 重新推导全部派生状态
///
/// 每次修改行或总题数后调用：先求合计，再按合计重新分配，最后用分配后的行再求一次合计
pub fn derive(rows: &[TopicRow], items: u32, policy: RoundingPolicy) -> (Vec<TopicRow>, Totals) {
    let totals = recompute_totals(rows, items);
    let rows = redistribute_with(rows, &totals, policy);
    let totals = recompute_totals(&rows, items);
    (rows, totals)
}

/// 追加一个空行
pub fn add_row(rows: &[TopicRow]) -> Vec<TopicRow> {
    let mut updated = rows.to_vec();
    updated.push(TopicRow::empty());
    updated
}

/// 删除最后一行；已经为空时不做任何事
pub fn remove_row(rows: &[TopicRow]) -> Vec<TopicRow> {
    let mut updated = rows.to_vec();
    updated.pop();
    updated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_with_hours(hours: &[u32]) -> Vec<TopicRow> {
        hours
            .iter()
            .enumerate()
            .map(|(i, h)| TopicRow::new(format!("Topic {}", i + 1), *h))
            .collect()
    }

    fn level_vec(row: &TopicRow) -> Vec<u32> {
        CognitiveLevel::ALL
            .iter()
            .map(|l| row.level_count(*l))
            .collect()
    }

    #[test]
    fn test_coerce_count() {
        assert_eq!(coerce_count("12"), 12);
        assert_eq!(coerce_count("  12 "), 12);
        assert_eq!(coerce_count("12.7"), 12);
        assert_eq!(coerce_count("12abc"), 12);
        assert_eq!(coerce_count("+3"), 3);
        assert_eq!(coerce_count(""), 0);
        assert_eq!(coerce_count("abc"), 0);
        assert_eq!(coerce_count("-5"), 0);
        assert_eq!(coerce_count("99999999999"), u32::MAX);
    }

    #[test]
    fn test_rounding_policy_parse() {
        assert_eq!(
            RoundingPolicy::parse("independent"),
            Some(RoundingPolicy::Independent)
        );
        assert_eq!(
            RoundingPolicy::parse("Largest_Remainder"),
            Some(RoundingPolicy::LargestRemainder)
        );
        assert_eq!(RoundingPolicy::parse("banker"), None);
    }

    #[test]
    fn test_two_topic_scenario() {
        let rows = rows_with_hours(&[10, 30]);
        let totals = recompute_totals(&rows, 20);
        assert_eq!(totals.hours, 40);

        let rows = redistribute(&rows, &totals);

        assert_eq!(rows[0].percentage(), 25);
        assert_eq!(rows[0].total_items(), 5);
        assert_eq!(rows[0].level_count(CognitiveLevel::Remembering), 1);
        assert_eq!(level_vec(&rows[0]), vec![1, 1, 2, 1, 1, 1]);

        assert_eq!(rows[1].percentage(), 75);
        assert_eq!(rows[1].total_items(), 15);
    }

    #[test]
    fn test_independent_rounding_drift_is_preserved() {
        let (rows, totals) = derive(&rows_with_hours(&[10, 30]), 20, RoundingPolicy::Independent);

        // 5 题被拆成 1+1+2+1+1+1 = 7
        assert_eq!(rows[0].levels().sum(), 7);
        assert_ne!(rows[0].levels().sum(), rows[0].total_items());
        assert_eq!(totals.total_items, 20);
        assert_eq!(totals.percentage, 100);
        assert_eq!(totals.levels.sum(), rows[0].levels().sum() + rows[1].levels().sum());
    }

    #[test]
    fn test_row_totals_can_drift_from_target() {
        // 三等分：33% × 10 题 → 每行 3 题，总计 9 ≠ 10
        let (rows, totals) = derive(&rows_with_hours(&[1, 1, 1]), 10, RoundingPolicy::Independent);

        assert!(rows.iter().all(|r| r.percentage() == 33));
        assert!(rows.iter().all(|r| r.total_items() == 3));
        assert_eq!(totals.total_items, 9);
        assert_eq!(totals.items, 10);
    }

    #[test]
    fn test_zero_hours_is_noop() {
        let mut rows = rows_with_hours(&[0, 0]);
        rows[0].percentage = 40;
        rows[0].total_items = 7;
        let totals = recompute_totals(&rows, 50);
        assert_eq!(totals.hours, 0);

        let redistributed = redistribute(&rows, &totals);
        assert_eq!(redistributed, rows);

        let again = redistribute(&redistributed, &totals);
        assert_eq!(again, rows);
    }

    #[test]
    fn test_single_row_takes_everything() {
        for n in 0..=100u32 {
            let (rows, _) = derive(&rows_with_hours(&[7]), n, RoundingPolicy::Independent);
            let row = &rows[0];

            assert_eq!(row.percentage(), 100);
            assert_eq!(row.total_items(), n);
            for level in CognitiveLevel::ALL {
                let expected = (n as f64 * level.weight()).round() as u32;
                assert_eq!(row.level_count(level), expected, "n={} level={}", n, level);
            }
        }
    }

    #[test]
    fn test_percentage_sum_within_tolerance() {
        let cases: &[&[u32]] = &[
            &[1, 1],
            &[1, 1, 1],
            &[1, 2, 3, 4],
            &[5, 5, 5, 5, 5, 5, 5],
            &[3, 7, 11, 13, 17],
            &[1, 0, 0, 99],
        ];

        for hours in cases {
            let (rows, totals) = derive(&rows_with_hours(hours), 40, RoundingPolicy::Independent);
            let tolerance = rows.len() as i64 - 1;
            let deviation = (totals.percentage as i64 - 100).abs();
            assert!(
                deviation <= tolerance,
                "hours={:?} sum={}",
                hours,
                totals.percentage
            );
        }
    }

    #[test]
    fn test_recompute_totals_sums_every_field() {
        let (rows, _) = derive(&rows_with_hours(&[10, 30]), 20, RoundingPolicy::Independent);
        let totals = recompute_totals(&rows, 20);

        assert_eq!(totals.items, 20);
        assert_eq!(totals.hours, 40);
        assert_eq!(
            totals.levels.remembering,
            rows[0].levels().remembering + rows[1].levels().remembering
        );
        assert_eq!(recompute_totals(&[], 5), Totals::with_items(5));
    }

    #[test]
    fn test_add_then_remove_restores_rows() {
        let (rows, _) = derive(&rows_with_hours(&[2, 4]), 12, RoundingPolicy::Independent);

        let added = add_row(&rows);
        assert_eq!(added.len(), 3);
        assert_eq!(added[2], TopicRow::empty());

        assert_eq!(remove_row(&added), rows);
        assert!(remove_row(&[]).is_empty());
    }

    #[test]
    fn test_rows_keep_insertion_order() {
        let rows = rows_with_hours(&[30, 10, 20]);
        let (derived, _) = derive(&rows, 60, RoundingPolicy::Independent);
        let topics: Vec<_> = derived.iter().map(|r| r.topic.as_str()).collect();
        assert_eq!(topics, vec!["Topic 1", "Topic 2", "Topic 3"]);
        assert_eq!(derived[0].percentage(), 50);
    }

    #[test]
    fn test_apportion_conserves_total() {
        assert_eq!(apportion(10, &[1.0, 1.0, 1.0]), vec![4, 3, 3]);
        assert_eq!(apportion(0, &[1.0, 2.0]), vec![0, 0]);
        assert_eq!(apportion(5, &[0.0, 0.0]), vec![0, 0]);
        assert_eq!(apportion(7, &[0.0, 1.0]), vec![0, 7]);

        let shares = apportion(23, &[0.1, 0.2, 0.3, 0.15, 0.1, 0.15]);
        assert_eq!(shares.iter().sum::<u32>(), 23);
    }

    #[test]
    fn test_largest_remainder_policy_conserves_counts() {
        let (rows, totals) = derive(
            &rows_with_hours(&[1, 1, 1]),
            10,
            RoundingPolicy::LargestRemainder,
        );

        assert_eq!(totals.total_items, 10);
        assert_eq!(
            rows.iter().map(|r| r.total_items()).collect::<Vec<_>>(),
            vec![4, 3, 3]
        );
        for row in &rows {
            assert_eq!(row.levels().sum(), row.total_items());
            assert_eq!(row.percentage(), 33);
        }
    }

    #[test]
    fn test_largest_remainder_levels_follow_level_order() {
        let (rows, _) = derive(
            &rows_with_hours(&[1]),
            23,
            RoundingPolicy::LargestRemainder,
        );
        let weights: Vec<f64> = CognitiveLevel::ALL.iter().map(|l| l.weight()).collect();

        for (level, expected) in CognitiveLevel::ALL.into_iter().zip(apportion(23, &weights)) {
            assert_eq!(rows[0].level_count(level), expected, "{:?}", level);
        }
    }
}
