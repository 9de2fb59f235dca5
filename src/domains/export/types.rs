use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A generated report ready to hand to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventReportFile {
    pub filename: String,
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl EventReportFile {
    /// `event_<code>_activities_<timestamp>.xlsx`, with '/' in the code made file-safe.
    pub fn filename_for(code: &str, generated_at: NaiveDateTime) -> String {
        format!(
            "event_{}_activities_{}.xlsx",
            code.replace('/', "_"),
            generated_at.format("%Y%m%d_%H%M%S")
        )
    }

    /// The file as a `data:` URL.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}
