pub mod core;
pub mod report;
pub mod table;
pub mod utils;

// Re-exports
pub use core::config::ExportConfig;
pub use report::{Fact, Report, Taxonomy};
pub use table::{LabelledGrid, TableExport};
