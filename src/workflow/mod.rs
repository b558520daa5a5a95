pub mod quiz_flow;
pub mod submission_ctx;

pub use quiz_flow::QuizFlow;
pub use submission_ctx::SubmissionCtx;
