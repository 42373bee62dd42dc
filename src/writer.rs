use crate::Result;
use crate::error::ScrapeError;
use crate::models::{Column, JobRecord};
use crate::summary::Summary;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::fs;
use std::path::Path;

pub const JOBS_SHEET: &str = "Jobs";
pub const SUMMARY_SHEET: &str = "Summary";

const HEADER_FILL: u32 = 0x366092;
const DATA_ROW_HEIGHT: f64 = 60.0;
const MIN_COLUMN_WIDTH: usize = 15;
const MAX_COLUMN_WIDTH: usize = 80;

/// Writes the Jobs and Summary sheets to `file_path`, replacing any previous file.
///
/// The workbook is rendered in memory and moved into place with a rename, so a
/// failure never leaves a half-written report behind.
pub fn save_to_xlsx(jobs: &[JobRecord], summary: &Summary, file_path: &Path) -> Result<()> {
    let bytes = render_workbook(jobs, summary)?;

    let tmp_path = file_path.with_extension("xlsx.tmp");
    let io_err = |source| ScrapeError::Io {
        path: file_path.to_path_buf(),
        source,
    };

    fs::write(&tmp_path, bytes).map_err(io_err)?;
    fs::rename(&tmp_path, file_path).map_err(|source| {
        let _ = fs::remove_file(&tmp_path);
        io_err(source)
    })?;
    Ok(())
}

pub fn render_workbook(jobs: &[JobRecord], summary: &Summary) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let jobs_sheet = workbook.add_worksheet();
    jobs_sheet.set_name(JOBS_SHEET)?;
    write_jobs_sheet(jobs_sheet, jobs)?;

    let summary_sheet = workbook.add_worksheet();
    summary_sheet.set_name(SUMMARY_SHEET)?;
    write_summary_sheet(summary_sheet, summary)?;

    Ok(workbook.save_to_buffer()?)
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_font_size(12.0)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
}

fn write_jobs_sheet(sheet: &mut Worksheet, jobs: &[JobRecord]) -> Result<()> {
    let header = header_format();
    let cell = Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Top)
        .set_text_wrap();

    for (col, column) in Column::ALL.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, column.header(), &header)?;

        let longest = jobs
            .iter()
            .map(|job| job.value(*column).chars().count())
            .chain(std::iter::once(column.header().len()))
            .max()
            .unwrap_or(0);
        let width = (longest + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
        sheet.set_column_width(col, width as f64)?;
    }

    for (i, job) in jobs.iter().enumerate() {
        let row = i as u32 + 1;
        for (col, value) in job.row().into_iter().enumerate() {
            sheet.write_string_with_format(row, col as u16, value, &cell)?;
        }
        sheet.set_row_height(row, DATA_ROW_HEIGHT)?;
    }

    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

enum SummaryRow {
    Header(&'static str, &'static str),
    Text(String, String),
    Count(String, usize),
    Section(&'static str),
    Blank,
}

fn summary_rows(summary: &Summary) -> Vec<SummaryRow> {
    let mut rows = vec![
        SummaryRow::Header("Metric", "Value"),
        SummaryRow::Count("Total Jobs".to_string(), summary.total),
        SummaryRow::Text(
            "Scraping Date".to_string(),
            summary.scraped_on.format("%Y-%m-%d").to_string(),
        ),
        SummaryRow::Text("Source".to_string(), summary.source_name.clone()),
        SummaryRow::Text("Source URL".to_string(), summary.source_url.clone()),
        SummaryRow::Blank,
        SummaryRow::Section("Jobs by Category"),
    ];
    rows.extend(
        summary
            .by_category
            .iter()
            .map(|(label, n)| SummaryRow::Count(format!("  {label}"), *n)),
    );
    rows.push(SummaryRow::Blank);
    rows.push(SummaryRow::Section("Jobs by Location"));
    rows.extend(
        summary
            .by_location
            .iter()
            .map(|(label, n)| SummaryRow::Count(format!("  {label}"), *n)),
    );
    rows
}

fn write_summary_sheet(sheet: &mut Worksheet, summary: &Summary) -> Result<()> {
    let header = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL));
    let section = Format::new().set_bold();

    let mut widths = [0usize; 2];
    let mut track = |col: usize, text: &str| widths[col] = widths[col].max(text.chars().count());

    for (i, row) in summary_rows(summary).into_iter().enumerate() {
        let r = i as u32;
        match row {
            SummaryRow::Header(metric, value) => {
                sheet.write_string_with_format(r, 0, metric, &header)?;
                sheet.write_string_with_format(r, 1, value, &header)?;
                track(0, metric);
                track(1, value);
            }
            SummaryRow::Text(metric, value) => {
                sheet.write_string(r, 0, &metric)?;
                sheet.write_string(r, 1, &value)?;
                track(0, &metric);
                track(1, &value);
            }
            SummaryRow::Count(metric, n) => {
                sheet.write_string(r, 0, &metric)?;
                sheet.write_number(r, 1, n as f64)?;
                track(0, &metric);
                track(1, &n.to_string());
            }
            SummaryRow::Section(title) => {
                sheet.write_string_with_format(r, 0, title, &section)?;
                track(0, title);
            }
            SummaryRow::Blank => {}
        }
    }

    for (col, longest) in widths.iter().enumerate() {
        let width = (longest + 2).max(MIN_COLUMN_WIDTH);
        sheet.set_column_width(col as u16, width as f64)?;
    }
    Ok(())
}
