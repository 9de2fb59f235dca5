pub mod types;
pub mod report;
pub mod service;

pub use types::EventReportFile;
pub use service::{ExportService, ExportServiceImpl};
