//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：加载分配表、创建生成服务和出题会话
//! 2. **展示分配结果**：输出规格表
//! 3. **单次提交**：提交一次，输出试题或失败提示
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理推导和解析细节
//! - **资源所有者**：唯一持有会话（以及其中的 HTTP 客户端）的模块
//! - **向下委托**：推导交给 allocation，提交交给 QuizFlow

use crate::config::Config;
use crate::display;
use crate::models::{load_allocation_sheet, SourceDocument};
use crate::orchestrator::session::QuizSession;
use crate::utils::logging::{log_allocation, log_startup, print_final_stats};
use crate::workflow::QuizFlow;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    session: QuizSession,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        if config.llm_api_key.is_empty() {
            warn!("⚠️ 未设置 GEMINI_API_KEY，生成服务可能拒绝请求");
        }

        let flow = QuizFlow::new(&config)?;
        let session = load_session(&config, flow).await?;

        Ok(Self { config, session })
    }

    /// 运行应用主逻辑
    ///
    /// 输出规格表 → 提交一次 → 输出试题；校验或生成失败时返回错误
    pub async fn run(&mut self) -> Result<()> {
        log_allocation(self.session.rows(), self.session.totals());
        println!(
            "{}",
            display::render_table(self.session.rows(), self.session.totals())
        );

        let outcome = self.session.submit().await.map(|items| items.len());
        println!("{}", display::render_quiz(self.session.quiz_state()));

        match outcome {
            Ok(count) => {
                print_final_stats(count, self.session.totals().items, &self.config);
                Ok(())
            }
            Err(e) => {
                error!("❌ 本次提交失败: {}", e);
                // 校验失败不会写入会话状态，这里单独输出提示
                if self.session.quiz_state().status_text().is_empty() {
                    println!("{}", e.user_message());
                }
                Err(anyhow::Error::new(e).context("出题失败"))
            }
        }
    }
}

/// 从分配表构建会话
async fn load_session(config: &Config, flow: QuizFlow) -> Result<QuizSession> {
    info!("\n📁 正在加载分配表: {}", config.sheet_path);
    let sheet = load_allocation_sheet(Path::new(&config.sheet_path))
        .await
        .with_context(|| format!("无法加载分配表: {}", config.sheet_path))?;

    let mut session =
        QuizSession::with_rows(flow, sheet.rows(), sheet.total_items, config.rounding_policy);

    // 环境变量中的文档优先于分配表
    let document = config
        .document_path
        .as_ref()
        .map(SourceDocument::pdf)
        .or_else(|| sheet.document.clone().map(SourceDocument::pdf));

    match document {
        Some(doc) => session.attach_document(doc),
        None => warn!("⚠️ 未指定源文档"),
    }

    Ok(session)
}
