//! 出题会话 - 编排层
//!
//! 行数据、合计、文档和出题结果的唯一数据源。
//! 只能通过这里的操作修改，每次修改后立即重新推导派生字段；
//! 显示层只通过只读访问器读取。

use tracing::{debug, info, warn};

use crate::error::QuizResult;
use crate::models::{QuizItem, SourceDocument, TopicRow, Totals};
use crate::services::allocation::{self, coerce_count, RoundingPolicy};
use crate::workflow::{QuizFlow, SubmissionCtx};

/// 生成中的状态提示
pub const PENDING_MESSAGE: &str = "Generating...";

/// 出题结果状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QuizState {
    /// 尚未提交
    #[default]
    Idle,
    /// 等待生成服务返回
    Pending,
    /// 生成成功
    Ready(Vec<QuizItem>),
    /// 生成失败（面向用户的提示）
    Failed(String),
}

impl QuizState {
    /// 当前题目（非 Ready 时为空）
    pub fn items(&self) -> &[QuizItem] {
        match self {
            QuizState::Ready(items) => items,
            _ => &[],
        }
    }

    /// 没有题目时显示的状态文字
    pub fn status_text(&self) -> &str {
        match self {
            QuizState::Idle | QuizState::Ready(_) => "",
            QuizState::Pending => PENDING_MESSAGE,
            QuizState::Failed(message) => message,
        }
    }
}

/// 出题会话
pub struct QuizSession {
    flow: QuizFlow,
    rows: Vec<TopicRow>,
    totals: Totals,
    rounding: RoundingPolicy,
    document: Option<SourceDocument>,
    quiz: QuizState,
    submissions: usize,
}

impl QuizSession {
    /// 新会话：一行空主题，合计为 0
    pub fn new(flow: QuizFlow) -> Self {
        Self::with_rows(flow, vec![TopicRow::empty()], 0, RoundingPolicy::Independent)
    }

    /// 用已有的行和总题数创建会话
    pub fn with_rows(
        flow: QuizFlow,
        rows: Vec<TopicRow>,
        items: u32,
        rounding: RoundingPolicy,
    ) -> Self {
        let (rows, totals) = allocation::derive(&rows, items, rounding);
        Self {
            flow,
            rows,
            totals,
            rounding,
            document: None,
            quiz: QuizState::Idle,
            submissions: 0,
        }
    }

    // ========== 只读访问 ==========

    pub fn rows(&self) -> &[TopicRow] {
        &self.rows
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    pub fn quiz_state(&self) -> &QuizState {
        &self.quiz
    }

    pub fn document(&self) -> Option<&SourceDocument> {
        self.document.as_ref()
    }

    pub fn rounding_policy(&self) -> RoundingPolicy {
        self.rounding
    }

    /// 是否允许提交（生成中不允许）
    pub fn can_submit(&self) -> bool {
        !matches!(self.quiz, QuizState::Pending)
    }

    // ========== 修改操作 ==========

    /// 追加一个空主题
    pub fn add_row(&mut self) {
        let rows = allocation::add_row(&self.rows);
        self.apply(rows, self.totals.items);
    }

    /// 删除最后一个主题；没有主题时不做任何事
    pub fn remove_row(&mut self) {
        if self.rows.is_empty() {
            debug!("没有可删除的主题");
            return;
        }
        let rows = allocation::remove_row(&self.rows);
        self.apply(rows, self.totals.items);
    }

    /// 修改主题名称；下标越界时忽略
    pub fn set_topic(&mut self, index: usize, topic: impl Into<String>) {
        let mut rows = self.rows.clone();
        let Some(row) = rows.get_mut(index) else {
            warn!("主题下标 {} 超出范围 (共 {} 行)", index, self.rows.len());
            return;
        };
        row.topic = topic.into();
        self.apply(rows, self.totals.items);
    }

    /// 修改学时（原始输入，无法解析时按 0 处理）；下标越界时忽略
    pub fn set_hours(&mut self, index: usize, raw: &str) {
        let mut rows = self.rows.clone();
        let Some(row) = rows.get_mut(index) else {
            warn!("主题下标 {} 超出范围 (共 {} 行)", index, self.rows.len());
            return;
        };
        row.hours = coerce_count(raw);
        self.apply(rows, self.totals.items);
    }

    /// 修改目标总题数（原始输入，无法解析时按 0 处理）
    pub fn set_total_items(&mut self, raw: &str) {
        let items = coerce_count(raw);
        let rows = self.rows.clone();
        self.apply(rows, items);
    }

    /// 切换取整策略
    pub fn set_rounding_policy(&mut self, rounding: RoundingPolicy) {
        self.rounding = rounding;
        let rows = self.rows.clone();
        self.apply(rows, self.totals.items);
    }

    pub fn attach_document(&mut self, document: SourceDocument) {
        debug!("已选择文档: {}", document.name());
        self.document = Some(document);
    }

    pub fn clear_document(&mut self) {
        self.document = None;
    }

    fn apply(&mut self, rows: Vec<TopicRow>, items: u32) {
        let (rows, totals) = allocation::derive(&rows, items, self.rounding);
        self.rows = rows;
        self.totals = totals;
    }

    // ========== 提交 ==========

    /// 提交当前分配表
    ///
    /// - 校验失败（含文档不可读）：不修改任何状态，直接返回错误
    /// - 否则清空上一次结果并进入 Pending，结束后进入 Ready 或 Failed
    ///
    /// `&mut self` 保证同一会话不会有两个并发提交
    pub async fn submit(&mut self) -> QuizResult<&[QuizItem]> {
        let request = match self
            .flow
            .prepare(&self.rows, &self.totals, self.document.as_ref())
            .await
        {
            Ok(request) => request,
            Err(e) => {
                warn!("⚠️ 提交被拒绝: {}", e);
                return Err(e.into());
            }
        };

        self.submissions += 1;
        let ctx = SubmissionCtx::new(
            self.submissions,
            self.rows.len(),
            self.totals.items,
            self.document.as_ref().map(|d| d.name()),
        );

        self.quiz = QuizState::Pending;
        info!("{} {}", ctx, PENDING_MESSAGE);

        match self.flow.send(&ctx, &request).await {
            Ok(items) => {
                self.quiz = QuizState::Ready(items);
                Ok(self.quiz.items())
            }
            Err(e) => {
                self.quiz = QuizState::Failed(e.user_message().to_string());
                Err(e.into())
            }
        }
    }
}
