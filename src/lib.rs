//! # Tosifier
//!
//! 根据授课学时自动生成"双向细目表"（Table of Specification），
//! 并请求语言模型基于上传的文档生成选择题。
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 行、合计、认知层级、试题、源文档
//! - `models/loaders` - TOML 分配表加载
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，全部无状态
//! - `allocation` - 按学时和权重分配题数
//! - `prompt_builder` - 分配表 → 提示词
//! - `quiz_schema` - 结构化输出 schema 与解析
//! - `GenerationService` - 调用语言模型
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次提交"的完整流程
//! - `QuizFlow` - 校验 → 读文档 → 调用服务 → 解析
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/session` - 唯一数据源，修改后立即重新推导
//! - `orchestrator/app` - 应用入口
//!
//! ## 模块结构

pub mod config;
pub mod display;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{GenerationError, QuizError, QuizResult, ValidationError};
pub use models::{Answer, CognitiveLevel, QuizItem, SourceDocument, TopicRow, Totals};
pub use orchestrator::{App, QuizSession, QuizState};
pub use services::{GenerationService, RoundingPolicy};
pub use workflow::{QuizFlow, SubmissionCtx};
