//! Report rendering: CSV and printable HTML.
//!
//! Records are flattened into ordered `(column, value)` cells. The header of
//! a report is the union of the columns of every record, in first-seen order,
//! so heterogeneous inputs still line up. Rendering never fails on empty
//! input: a header-only CSV is produced when the columns are known, otherwise
//! a `No records available` placeholder.

use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::{
    Complaint, Event, LeaveRequest, MessAttendance, MessFeedback, choice_enum,
};

/// Text emitted in place of a table when there is nothing to show.
pub const EMPTY_REPORT_PLACEHOLDER: &str = "No records available";

choice_enum! {
    /// Output format of a report.
    pub enum ReportFormat {
        /// RFC 4180 comma-separated values.
        Csv => "csv",
        /// Standalone printable HTML document.
        Html => "html",
    }
}

impl ReportFormat {
    /// MIME type for the rendered body.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Html => "text/html; charset=utf-8",
        }
    }
}

choice_enum! {
    /// Record kinds that can be exported.
    pub enum ReportEntity {
        /// Events, dated by start.
        Events => "events",
        /// Complaints, dated by filing.
        Complaints => "complaints",
        /// Leave requests, dated by start.
        LeaveRequests => "leave-requests",
        /// Mess attendance, dated by meal day.
        MessAttendance => "mess-attendance",
        /// Mess feedback, dated by meal day.
        MessFeedback => "mess-feedback",
    }
}

impl ReportEntity {
    /// Human-readable title used in HTML output.
    pub fn title(self) -> &'static str {
        match self {
            Self::Events => "Events",
            Self::Complaints => "Complaints",
            Self::LeaveRequests => "Leave requests",
            Self::MessAttendance => "Mess attendance",
            Self::MessFeedback => "Mess feedback",
        }
    }
}

/// Calendar window a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportPeriod {
    /// No restriction.
    #[default]
    All,
    /// One calendar year.
    Year(i32),
    /// One calendar month.
    Month {
        /// Year.
        year: i32,
        /// Month, `1..=12`.
        month: u32,
    },
}

/// Error raised for malformed period strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("period must be 'all', 'YYYY' or 'YYYY-MM'; got {input}")]
pub struct ParsePeriodError {
    /// The rejected input.
    pub input: String,
}

impl ReportPeriod {
    /// Label used in filenames: `all`, `YYYY` or `YYYY-MM`.
    pub fn label(self) -> String {
        match self {
            Self::All => "all".to_owned(),
            Self::Year(year) => format!("{year:04}"),
            Self::Month { year, month } => format!("{year:04}-{month:02}"),
        }
    }

    /// Whether `day` falls inside the period.
    pub fn contains(self, day: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Year(year) => day.year() == year,
            Self::Month { year, month } => day.year() == year && day.month() == month,
        }
    }
}

impl FromStr for ReportPeriod {
    type Err = ParsePeriodError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ParsePeriodError {
            input: raw.to_owned(),
        };
        if raw == "all" {
            return Ok(Self::All);
        }
        let mut parts = raw.splitn(2, '-');
        let year_part = parts.next().ok_or_else(invalid)?;
        if year_part.len() != 4 {
            return Err(invalid());
        }
        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        match parts.next() {
            None => Ok(Self::Year(year)),
            Some(month_part) if month_part.len() == 2 => {
                let month: u32 = month_part.parse().map_err(|_| invalid())?;
                if (1..=12).contains(&month) {
                    Ok(Self::Month { year, month })
                } else {
                    Err(invalid())
                }
            }
            Some(_) => Err(invalid()),
        }
    }
}

/// A primitive cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Missing value; rendered as an empty field.
    Empty,
    /// Free text.
    Text(String),
    /// Whole number.
    Integer(i64),
    /// Flag.
    Bool(bool),
    /// Instant, rendered as RFC 3339.
    Timestamp(DateTime<Utc>),
    /// Calendar day, rendered as `YYYY-MM-DD`.
    Date(NaiveDate),
}

impl CellValue {
    fn render(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(text) => text.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
            Self::Timestamp(ts) => ts.to_rfc3339(),
            Self::Date(day) => day.format("%Y-%m-%d").to_string(),
        }
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// One flat record: ordered column names with values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRecord {
    cells: Vec<(String, CellValue)>,
}

impl FlatRecord {
    /// Empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cell, builder style.
    #[must_use]
    pub fn cell(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.cells.push((column.into(), value.into()));
        self
    }

    fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find_map(|(name, value)| (name == column).then_some(value))
    }
}

/// Records that know how to flatten themselves for reports.
pub trait Exportable {
    /// Column names in output order.
    const COLUMNS: &'static [&'static str];

    /// Flatten into cells keyed by [`Self::COLUMNS`].
    fn to_record(&self) -> FlatRecord;

    /// Day used for period filtering.
    fn reference_day(&self) -> NaiveDate;
}

/// A rendered report ready to be served as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    /// Suggested download name: `<entity>-<period>.<ext>`.
    pub filename: String,
    /// MIME type.
    pub content_type: &'static str,
    /// Body bytes.
    pub body: Vec<u8>,
}

/// Failure while writing CSV.
#[derive(Debug, thiserror::Error)]
#[error("failed to render csv: {0}")]
pub struct RenderError(#[from] csv::Error);

/// Union of the columns of `records`, in first-seen order, falling back to
/// `known` when there are no records.
pub fn header_for(records: &[FlatRecord], known: &[&str]) -> Vec<String> {
    if records.is_empty() {
        return known.iter().map(|c| (*c).to_owned()).collect();
    }
    let mut header: Vec<String> = Vec::new();
    for (column, _) in records.iter().flat_map(|record| record.cells.iter()) {
        if !header.iter().any(|seen| seen == column) {
            header.push(column.clone());
        }
    }
    header
}

/// Render records as CSV with CRLF line endings.
///
/// # Examples
/// ```
/// use hostel_backend::domain::{FlatRecord, render_csv};
///
/// let rows = [FlatRecord::new().cell("name", "Asha, B.").cell("room", "12")];
/// let csv = render_csv(&rows, &[]).expect("render");
/// assert_eq!(String::from_utf8(csv).expect("utf8"), "name,room\r\n\"Asha, B.\",12\r\n");
/// ```
pub fn render_csv(records: &[FlatRecord], known: &[&str]) -> Result<Vec<u8>, RenderError> {
    let header = header_for(records, known);
    if header.is_empty() {
        return Ok(format!("{EMPTY_REPORT_PLACEHOLDER}\r\n").into_bytes());
    }

    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());
    writer.write_record(&header)?;
    for record in records {
        writer.write_record(header.iter().map(|column| {
            record.get(column).map(CellValue::render).unwrap_or_default()
        }))?;
    }
    writer
        .into_inner()
        .map_err(|err| RenderError(csv::Error::from(err.into_error())))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Render records as a standalone printable HTML document.
pub fn render_html(title: &str, records: &[FlatRecord]) -> String {
    let title = escape_html(title);
    let mut html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>\n\
         body {{ font-family: sans-serif; margin: 2rem; }}\n\
         table {{ border-collapse: collapse; width: 100%; }}\n\
         th, td {{ border: 1px solid #999; padding: 4px 8px; text-align: left; }}\n\
         th {{ background: #eee; }}\n\
         @media print {{ body {{ margin: 0; }} }}\n\
         </style>\n</head>\n<body>\n<h1>{title}</h1>\n"
    );

    if records.is_empty() {
        html.push_str(&format!("<p>{EMPTY_REPORT_PLACEHOLDER}</p>\n"));
    } else {
        let header = header_for(records, &[]);
        html.push_str("<table>\n<thead>\n<tr>");
        for column in &header {
            html.push_str(&format!("<th>{}</th>", escape_html(column)));
        }
        html.push_str("</tr>\n</thead>\n<tbody>\n");
        for record in records {
            html.push_str("<tr>");
            for column in &header {
                let value = record.get(column).map(CellValue::render).unwrap_or_default();
                html.push_str(&format!("<td>{}</td>", escape_html(&value)));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>\n");
    }
    html.push_str("</body>\n</html>\n");
    html
}

/// Render `rows` for `entity` in `format`, restricted to `period`.
pub fn render_report<T: Exportable>(
    entity: ReportEntity,
    format: ReportFormat,
    period: ReportPeriod,
    rows: &[T],
) -> Result<RenderedReport, RenderError> {
    let records: Vec<FlatRecord> = rows
        .iter()
        .filter(|row| period.contains(row.reference_day()))
        .map(Exportable::to_record)
        .collect();
    let body = match format {
        ReportFormat::Csv => render_csv(&records, T::COLUMNS)?,
        ReportFormat::Html => {
            let title = format!("{} report ({})", entity.title(), period.label());
            render_html(&title, &records).into_bytes()
        }
    };
    Ok(RenderedReport {
        filename: format!("{}-{}.{}", entity.as_str(), period.label(), format.as_str()),
        content_type: format.content_type(),
        body,
    })
}

fn id_cell(id: impl ToString) -> CellValue {
    CellValue::Text(id.to_string())
}

fn opt_id_cell<T: ToString>(id: Option<&T>) -> CellValue {
    id.map_or(CellValue::Empty, |value| CellValue::Text(value.to_string()))
}

impl Exportable for Event {
    const COLUMNS: &'static [&'static str] = &[
        "id", "title", "description", "type", "startDate", "endDate", "location", "hostelId",
        "createdBy", "createdAt",
    ];

    fn to_record(&self) -> FlatRecord {
        FlatRecord::new()
            .cell("id", id_cell(self.id))
            .cell("title", self.title.as_str())
            .cell("description", self.description.clone())
            .cell("type", self.event_type.as_str())
            .cell("startDate", self.start_date)
            .cell("endDate", self.end_date)
            .cell("location", self.location.clone())
            .cell("hostelId", opt_id_cell(self.hostel_id.as_ref()))
            .cell("createdBy", id_cell(self.created_by))
            .cell("createdAt", self.created_at)
    }

    fn reference_day(&self) -> NaiveDate {
        self.start_date.date_naive()
    }
}

impl Exportable for Complaint {
    const COLUMNS: &'static [&'static str] = &[
        "id", "title", "description", "category", "priority", "status", "hostelId", "roomNumber",
        "createdBy", "assignedTo", "resolution", "resolvedAt", "createdAt",
    ];

    fn to_record(&self) -> FlatRecord {
        FlatRecord::new()
            .cell("id", id_cell(self.id))
            .cell("title", self.title.as_str())
            .cell("description", self.description.as_str())
            .cell("category", self.category.as_str())
            .cell("priority", self.priority.as_str())
            .cell("status", self.status.as_str())
            .cell("hostelId", id_cell(self.hostel_id))
            .cell("roomNumber", self.room_number.clone())
            .cell("createdBy", id_cell(self.created_by))
            .cell("assignedTo", opt_id_cell(self.assigned_to.as_ref()))
            .cell("resolution", self.resolution.clone())
            .cell("resolvedAt", self.resolved_at)
            .cell("createdAt", self.created_at)
    }

    fn reference_day(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

impl Exportable for LeaveRequest {
    const COLUMNS: &'static [&'static str] = &[
        "id", "studentId", "hostelId", "type", "reason", "startDate", "endDate", "destination",
        "status", "approvedBy", "remarks", "decidedAt", "createdAt",
    ];

    fn to_record(&self) -> FlatRecord {
        FlatRecord::new()
            .cell("id", id_cell(self.id))
            .cell("studentId", id_cell(self.student_id))
            .cell("hostelId", opt_id_cell(self.hostel_id.as_ref()))
            .cell("type", self.leave_type.as_str())
            .cell("reason", self.reason.as_str())
            .cell("startDate", self.start_date)
            .cell("endDate", self.end_date)
            .cell("destination", self.destination.clone())
            .cell("status", self.status.as_str())
            .cell("approvedBy", opt_id_cell(self.approved_by.as_ref()))
            .cell("remarks", self.remarks.clone())
            .cell("decidedAt", self.decided_at)
            .cell("createdAt", self.created_at)
    }

    fn reference_day(&self) -> NaiveDate {
        self.start_date.date_naive()
    }
}

impl Exportable for MessAttendance {
    const COLUMNS: &'static [&'static str] = &[
        "id", "studentId", "hostelId", "date", "meal", "present", "recordedBy", "createdAt",
    ];

    fn to_record(&self) -> FlatRecord {
        FlatRecord::new()
            .cell("id", id_cell(self.id))
            .cell("studentId", id_cell(self.student_id))
            .cell("hostelId", opt_id_cell(self.hostel_id.as_ref()))
            .cell("date", self.date)
            .cell("meal", self.meal.as_str())
            .cell("present", self.present)
            .cell("recordedBy", id_cell(self.recorded_by))
            .cell("createdAt", self.created_at)
    }

    fn reference_day(&self) -> NaiveDate {
        self.date
    }
}

impl Exportable for MessFeedback {
    const COLUMNS: &'static [&'static str] = &[
        "id", "studentId", "hostelId", "date", "meal", "rating", "comment", "createdAt",
    ];

    fn to_record(&self) -> FlatRecord {
        FlatRecord::new()
            .cell("id", id_cell(self.id))
            .cell("studentId", id_cell(self.student_id))
            .cell("hostelId", opt_id_cell(self.hostel_id.as_ref()))
            .cell("date", self.date)
            .cell("meal", self.meal.map(|meal| meal.as_str()))
            .cell("rating", i64::from(self.rating.get()))
            .cell("comment", self.comment.clone())
            .cell("createdAt", self.created_at)
    }

    fn reference_day(&self) -> NaiveDate {
        self.date
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the report formatter.
    use super::*;
    use rstest::rstest;

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).expect("utf8 output")
    }

    #[rstest]
    fn header_is_union_in_first_seen_order() {
        let records = [
            FlatRecord::new().cell("a", "1").cell("b", "2"),
            FlatRecord::new().cell("c", "3").cell("a", "4"),
        ];
        assert_eq!(header_for(&records, &[]), ["a", "b", "c"]);

        let csv = text(render_csv(&records, &[]).expect("render"));
        assert_eq!(csv, "a,b,c\r\n1,2,\r\n4,,3\r\n");
    }

    #[rstest]
    fn special_characters_are_quoted() {
        let records = [FlatRecord::new()
            .cell("note", "said \"hi\", left")
            .cell("multi", "line one\nline two")];
        let csv = text(render_csv(&records, &[]).expect("render"));
        assert_eq!(
            csv,
            "note,multi\r\n\"said \"\"hi\"\", left\",\"line one\nline two\"\r\n"
        );
    }

    fn awkward_value(row: usize, column: usize) -> String {
        match (row + column) % 5 {
            0 => format!("plain {row}-{column}"),
            1 => format!("comma, {row}"),
            2 => format!("quote \"{column}\" inside"),
            3 => format!("line one\nline {row}"),
            _ => format!("crlf\r\nand, \"all\" {column}"),
        }
    }

    #[rstest]
    #[case(1, 1)]
    #[case(7, 4)]
    #[case(25, 9)]
    fn csv_output_parses_back_to_the_same_values(#[case] rows: usize, #[case] columns: usize) {
        let names: Vec<String> = (0..columns).map(|column| format!("col{column}")).collect();
        let records: Vec<FlatRecord> = (0..rows)
            .map(|row| {
                names
                    .iter()
                    .enumerate()
                    .fold(FlatRecord::new(), |record, (column, name)| {
                        record.cell(name.as_str(), awkward_value(row, column))
                    })
            })
            .collect();

        let bytes = render_csv(&records, &[]).expect("render");
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes.as_slice());
        let header: Vec<String> = reader
            .headers()
            .expect("header row")
            .iter()
            .map(str::to_owned)
            .collect();
        assert_eq!(header, names);

        let parsed: Vec<csv::StringRecord> = reader
            .records()
            .collect::<Result<_, _>>()
            .expect("well-formed rows");
        assert_eq!(parsed.len(), rows);
        for (row, record) in parsed.iter().enumerate() {
            assert_eq!(record.len(), columns);
            for (column, value) in record.iter().enumerate() {
                assert_eq!(value, awkward_value(row, column), "row {row} column {column}");
            }
        }
    }

    #[rstest]
    fn empty_input_with_known_columns_is_header_only() {
        let csv = text(render_csv(&[], &["id", "title"]).expect("render"));
        assert_eq!(csv, "id,title\r\n");
    }

    #[rstest]
    fn empty_input_without_columns_is_placeholder() {
        let csv = text(render_csv(&[], &[]).expect("render"));
        assert_eq!(csv, "No records available\r\n");
        let html = render_html("Events", &[]);
        assert!(html.contains("<p>No records available</p>"));
        assert!(!html.contains("<table>"));
    }

    #[rstest]
    fn html_escapes_values() {
        let records = [FlatRecord::new().cell("title", "<b>Tom & Jerry's \"show\"</b>")];
        let html = render_html("Events & more", &records);
        assert!(html.contains("<td>&lt;b&gt;Tom &amp; Jerry&#39;s &quot;show&quot;&lt;/b&gt;</td>"));
        assert!(html.contains("<title>Events &amp; more</title>"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[rstest]
    #[case("all", ReportPeriod::All)]
    #[case("2024", ReportPeriod::Year(2024))]
    #[case("2024-03", ReportPeriod::Month { year: 2024, month: 3 })]
    fn periods_parse_and_label(#[case] raw: &str, #[case] expected: ReportPeriod) {
        let period: ReportPeriod = raw.parse().expect("valid period");
        assert_eq!(period, expected);
        assert_eq!(period.label(), raw);
    }

    #[rstest]
    #[case("")]
    #[case("24")]
    #[case("2024-13")]
    #[case("2024-3")]
    #[case("2024-03-01")]
    #[case("last-month")]
    fn malformed_periods_are_rejected(#[case] raw: &str) {
        assert!(raw.parse::<ReportPeriod>().is_err());
    }

    #[rstest]
    fn periods_contain_their_days() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).expect("date");
        assert!(ReportPeriod::All.contains(day));
        assert!(ReportPeriod::Year(2024).contains(day));
        assert!(!ReportPeriod::Year(2023).contains(day));
        assert!(ReportPeriod::Month { year: 2024, month: 3 }.contains(day));
        assert!(!ReportPeriod::Month { year: 2024, month: 4 }.contains(day));
    }

    #[rstest]
    fn report_names_follow_entity_and_period() {
        let report = render_report::<Event>(
            ReportEntity::Events,
            ReportFormat::Csv,
            ReportPeriod::Month { year: 2024, month: 2 },
            &[],
        )
        .expect("render");
        assert_eq!(report.filename, "events-2024-02.csv");
        assert_eq!(report.content_type, "text/csv; charset=utf-8");
        assert!(text(report.body).starts_with("id,title,description,type,startDate"));
    }
}
