pub mod cognitive_level;
pub mod document;
pub mod loaders;
pub mod quiz;
pub mod topic_row;

pub use cognitive_level::{CognitiveLevel, Difficulty, LevelCounts};
pub use document::{EncodedDocument, SourceDocument, PDF_MIME_TYPE};
pub use loaders::{load_allocation_sheet, parse_allocation_sheet, AllocationSheet, SheetTopic};
pub use quiz::{Answer, QuizItem};
pub use topic_row::{TopicRow, Totals};
