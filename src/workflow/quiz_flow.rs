//! 出题流程 - 流程层
//!
//! 核心职责：定义"一次提交"的完整处理流程
//!
//! 流程顺序：
//! 1. 前置校验（主题、学时、文档），失败则不发起任何外部调用
//! 2. 序列化分配表 → 提示词
//! 3. 读取文档 → base64
//! 4. 调用生成服务（只尝试一次）
//! 5. 按 schema 解析响应
//!
//! 1-3 由 `prepare` 完成，只可能返回校验错误；4-5 由 `send` 完成

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{GenerationError, QuizResult, ValidationError};
use crate::models::{QuizItem, SourceDocument, TopicRow, Totals};
use crate::services::generation_service::{
    GeminiService, GenerationRequest, GenerationService, SamplingConfig,
};
use crate::services::prompt_builder::{build_specification, SYSTEM_INSTRUCTION};
use crate::services::quiz_schema::{parse_quiz_response, response_schema};
use crate::workflow::submission_ctx::SubmissionCtx;

/// 出题流程
///
/// - 编排一次提交的完整流程
/// - 不持有行数据，只读取调用方传入的快照
/// - 只依赖业务能力（services）
pub struct QuizFlow {
    service: Arc<dyn GenerationService>,
    sampling: SamplingConfig,
    validate_answer_key: bool,
}

impl QuizFlow {
    /// 使用 Gemini 服务创建流程
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let service = GeminiService::new(config)?;
        Ok(Self::with_service(Arc::new(service), config))
    }

    /// 使用自定义生成服务创建流程
    pub fn with_service(service: Arc<dyn GenerationService>, config: &Config) -> Self {
        Self {
            service,
            sampling: config.sampling(),
            validate_answer_key: config.validate_answer_key,
        }
    }

    /// 前置校验
    ///
    /// 顺序：主题 → 学时 → 文档
    pub fn validate<'d>(
        rows: &[TopicRow],
        totals: &Totals,
        document: Option<&'d SourceDocument>,
    ) -> Result<&'d SourceDocument, ValidationError> {
        if rows.is_empty() {
            return Err(ValidationError::NoTopics);
        }
        if totals.hours == 0 {
            return Err(ValidationError::NonPositiveHours);
        }
        document.ok_or(ValidationError::MissingDocument)
    }

    /// 生成题目（不带上下文）
    pub async fn generate_quiz(
        &self,
        rows: &[TopicRow],
        totals: &Totals,
        document: Option<&SourceDocument>,
    ) -> QuizResult<Vec<QuizItem>> {
        let ctx = SubmissionCtx::new(
            1,
            rows.len(),
            totals.items,
            document.map(|d| d.name()),
        );
        self.run(&ctx, rows, totals, document).await
    }

    /// 执行一次提交：准备请求 → 调用服务
    pub async fn run(
        &self,
        ctx: &SubmissionCtx,
        rows: &[TopicRow],
        totals: &Totals,
        document: Option<&SourceDocument>,
    ) -> QuizResult<Vec<QuizItem>> {
        let request = self.prepare(rows, totals, document).await?;
        Ok(self.send(ctx, &request).await?)
    }

    /// 准备生成请求
    ///
    /// 完成全部本地前置条件（校验 + 读取文档），失败时只返回 [`ValidationError`]，
    /// 不发起外部调用
    pub async fn prepare(
        &self,
        rows: &[TopicRow],
        totals: &Totals,
        document: Option<&SourceDocument>,
    ) -> Result<GenerationRequest, ValidationError> {
        // ========== 1. 前置校验 ==========
        let document = Self::validate(rows, totals, document).map_err(|e| {
            warn!("⚠️ 校验未通过: {}", e);
            e
        })?;

        // ========== 2. 构建提示词 ==========
        let prompt = build_specification(rows, totals);
        debug!("分配说明: {}", prompt);

        // ========== 3. 读取文档 ==========
        info!("📄 正在读取文档: {}", document.name());
        let encoded = document.read_encoded().await.map_err(|e| {
            warn!("⚠️ 文档不可读: {}", e);
            ValidationError::MissingDocument
        })?;

        Ok(GenerationRequest {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            prompt,
            document: encoded,
            response_schema: response_schema(),
            sampling: self.sampling.clone(),
        })
    }

    /// 发送已准备好的请求并解析结果（只尝试一次）
    pub async fn send(
        &self,
        ctx: &SubmissionCtx,
        request: &GenerationRequest,
    ) -> Result<Vec<QuizItem>, GenerationError> {
        // ========== 4. 调用生成服务 ==========
        info!(
            "{} 🤖 正在生成试题: {} 个主题, 目标 {} 题",
            ctx, ctx.topic_count, ctx.total_items
        );

        let text = self.service.generate(request).await.map_err(|e| {
            error!("{} ❌ 生成服务调用失败: {}", ctx, e);
            e
        })?;

        // ========== 5. 解析响应 ==========
        let items = parse_quiz_response(&text, self.validate_answer_key).map_err(|e| {
            error!("{} ❌ 响应解析失败: {}", ctx, e);
            e
        })?;

        info!("{} ✓ 生成完成，共 {} 道题", ctx, items.len());

        Ok(items)
    }
}
