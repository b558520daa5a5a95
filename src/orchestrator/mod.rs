//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层持有会话状态并驱动提交，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `session` - 出题会话
//! - 行、合计、文档、出题结果的唯一数据源
//! - 所有修改都经过这里，修改后立即重新推导
//! - 串行化提交（`&mut self`）
//!
//! ### `app` - 应用入口
//! - 加载分配表，创建会话
//! - 输出规格表和试题
//!
//! ## 层次关系
//!
//! ```text
//! app (加载 / 展示)
//!     ↓
//! session (状态 + 推导)
//!     ↓
//! workflow::QuizFlow (一次提交)
//!     ↓
//! services (能力层：allocation / prompt / schema / generation)
//! ```

pub mod app;
pub mod session;

pub use app::App;
pub use session::{QuizSession, QuizState, PENDING_MESSAGE};
