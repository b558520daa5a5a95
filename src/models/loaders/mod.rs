pub mod sheet_loader;

pub use sheet_loader::{load_allocation_sheet, parse_allocation_sheet, AllocationSheet, SheetTopic};
