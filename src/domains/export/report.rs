use crate::domains::event::types::{Event, EventCounts};
use crate::domains::module::types::Module;
use crate::domains::participant::types::Participant;
use crate::domains::session::types::Session;
use crate::errors::{DomainError, DomainResult};
use chrono::NaiveDate;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

/// A session row with the names the sheet shows beside it.
#[derive(Debug, Clone)]
pub struct SessionLine {
    pub module_name: String,
    pub session: Session,
    pub trainer_names: Vec<String>,
}

/// Everything written to the event workbook, already sorted.
#[derive(Debug, Clone)]
pub struct EventReport {
    pub event: Event,
    pub counts: EventCounts,
    /// Modules by sequence then name, each with its session count.
    pub modules: Vec<(Module, i64)>,
    /// Sessions by start then sequence.
    pub sessions: Vec<SessionLine>,
    /// Participants by name.
    pub participants: Vec<Participant>,
}

pub const INFO_SHEET: &str = "Info";
pub const MODULES_SHEET: &str = "Modules";
pub const SESSIONS_SHEET: &str = "Sessions";
pub const PARTICIPANTS_SHEET: &str = "Participants";

/// Cell formats shared by every sheet of one workbook.
struct Styles {
    header: Format,
    wrap: Format,
    date: Format,
    datetime: Format,
}

impl Styles {
    fn new() -> Self {
        Styles {
            header: Format::new()
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(0x4F81BD))
                .set_border(FormatBorder::Thin),
            wrap: Format::new().set_text_wrap().set_align(FormatAlign::Top),
            date: Format::new().set_num_format("dd/mm/yyyy"),
            datetime: Format::new().set_num_format("dd/mm/yyyy hh:mm"),
        }
    }
}

enum InfoValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

fn write_header(sheet: &mut Worksheet, titles: &[&str], styles: &Styles) -> Result<(), XlsxError> {
    for (col, title) in titles.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &styles.header)?;
    }
    Ok(())
}

fn set_widths(sheet: &mut Worksheet, widths: &[f64]) -> Result<(), XlsxError> {
    for (col, width) in widths.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }
    Ok(())
}

impl EventReport {
    /// Render the four sheets (Info, Modules, Sessions, Participants) as xlsx bytes.
    pub fn to_xlsx(&self) -> DomainResult<Vec<u8>> {
        self.render()
            .map_err(|e| DomainError::Report(format!("Failed to write workbook: {}", e)))
    }

    fn render(&self) -> Result<Vec<u8>, XlsxError> {
        let styles = Styles::new();
        let mut workbook = Workbook::new();
        self.fill_info(workbook.add_worksheet(), &styles)?;
        self.fill_modules(workbook.add_worksheet(), &styles)?;
        self.fill_sessions(workbook.add_worksheet(), &styles)?;
        self.fill_participants(workbook.add_worksheet(), &styles)?;
        workbook.save_to_buffer()
    }

    fn fill_info(&self, sheet: &mut Worksheet, styles: &Styles) -> Result<(), XlsxError> {
        let event = &self.event;
        sheet.set_name(INFO_SHEET)?;

        let rows = [
            ("Code", InfoValue::Text(event.code.clone())),
            ("Title", InfoValue::Text(event.name.clone())),
            ("Type", InfoValue::Text(event.event_type.label().to_string())),
            ("Start Date", InfoValue::Date(event.date_start)),
            ("End Date", InfoValue::Date(event.date_end)),
            ("Duration (days)", InfoValue::Number(event.duration_days as f64)),
            ("State", InfoValue::Text(event.state.label().to_string())),
            ("Modules", InfoValue::Number(self.counts.module_count as f64)),
            ("Sessions", InfoValue::Number(self.counts.session_count as f64)),
            ("Participants", InfoValue::Number(self.counts.participant_count as f64)),
        ];
        for (row, (label, value)) in rows.iter().enumerate() {
            let row = row as u32;
            sheet.write_string_with_format(row, 0, *label, &styles.header)?;
            match value {
                InfoValue::Text(text) => sheet.write_string_with_format(row, 1, text, &styles.wrap)?,
                InfoValue::Number(number) => sheet.write_number(row, 1, *number)?,
                InfoValue::Date(date) => sheet.write_datetime_with_format(row, 1, date, &styles.date)?,
            };
        }

        set_widths(sheet, &[20.0, 50.0])
    }

    fn fill_modules(&self, sheet: &mut Worksheet, styles: &Styles) -> Result<(), XlsxError> {
        let code = &self.event.code;
        sheet.set_name(MODULES_SHEET)?;
        write_header(
            sheet,
            &["Event Code", "Sequence", "Module Title", "Description", "Sessions"],
            styles,
        )?;

        for (idx, (module, session_count)) in self.modules.iter().enumerate() {
            let row = idx as u32 + 1;
            sheet.write_string(row, 0, code)?;
            sheet.write_number(row, 1, module.sequence as f64)?;
            sheet.write_string(row, 2, &module.name)?;
            sheet.write_string_with_format(row, 3, module.description.as_deref().unwrap_or(""), &styles.wrap)?;
            sheet.write_number(row, 4, *session_count as f64)?;
        }

        set_widths(sheet, &[18.0, 12.0, 40.0, 50.0, 15.0])
    }

    fn fill_sessions(&self, sheet: &mut Worksheet, styles: &Styles) -> Result<(), XlsxError> {
        let code = &self.event.code;
        sheet.set_name(SESSIONS_SHEET)?;
        write_header(
            sheet,
            &[
                "Event Code",
                "Module",
                "Session Title",
                "Start",
                "End",
                "Duration (hours)",
                "Trainers",
                "State",
                "Materials",
                "Notes",
            ],
            styles,
        )?;

        for (idx, line) in self.sessions.iter().enumerate() {
            let row = idx as u32 + 1;
            let session = &line.session;
            sheet.write_string(row, 0, code)?;
            sheet.write_string(row, 1, &line.module_name)?;
            sheet.write_string(row, 2, &session.name)?;
            sheet.write_datetime_with_format(row, 3, &session.date_start, &styles.datetime)?;
            sheet.write_datetime_with_format(row, 4, &session.date_end, &styles.datetime)?;
            sheet.write_number(row, 5, session.duration_hours)?;
            sheet.write_string_with_format(row, 6, line.trainer_names.join(", "), &styles.wrap)?;
            sheet.write_string(row, 7, session.state.label())?;
            sheet.write_string_with_format(row, 8, session.materials.as_deref().unwrap_or(""), &styles.wrap)?;
            sheet.write_string_with_format(row, 9, session.notes.as_deref().unwrap_or(""), &styles.wrap)?;
        }

        set_widths(sheet, &[18.0, 30.0, 40.0, 22.0, 22.0, 15.0, 40.0, 15.0, 40.0, 40.0])
    }

    fn fill_participants(&self, sheet: &mut Worksheet, styles: &Styles) -> Result<(), XlsxError> {
        let code = &self.event.code;
        sheet.set_name(PARTICIPANTS_SHEET)?;
        write_header(sheet, &["Event Code", "Name", "Email", "Phone", "Role"], styles)?;

        for (idx, participant) in self.participants.iter().enumerate() {
            let row = idx as u32 + 1;
            sheet.write_string(row, 0, code)?;
            sheet.write_string(row, 1, &participant.name)?;
            sheet.write_string(row, 2, participant.email.as_deref().unwrap_or(""))?;
            sheet.write_string(row, 3, participant.phone.as_deref().unwrap_or(""))?;
            sheet.write_string(row, 4, participant.role.label())?;
        }

        set_widths(sheet, &[18.0, 35.0, 40.0, 20.0, 15.0])
    }
}
