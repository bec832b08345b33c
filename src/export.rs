use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use crate::data::model::{Dataset, Row};

pub const REPORT_TITLE: &str = "Filtered Faults Report";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Printable HTML report.
    Html,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Html => "HTML report",
            ExportFormat::Csv => "CSV",
        }
    }
}

/// Default file name for an export made now, e.g. `filtered-faults-20240301-1015.html`.
pub fn suggested_file_name(format: ExportFormat) -> String {
    format!(
        "filtered-faults-{}.{}",
        Local::now().format("%Y%m%d-%H%M"),
        format.extension()
    )
}

/// Write the filtered dataset to `path`, one file per call.
pub fn export_to_path(path: &Path, filtered: &Dataset, format: ExportFormat) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut out = std::io::BufWriter::new(file);
    match format {
        ExportFormat::Html => out
            .write_all(render_html(filtered).as_bytes())
            .context("writing HTML report")?,
        ExportFormat::Csv => write_csv(filtered, &mut out)?,
    }
    out.flush().context("flushing export")?;
    log::info!(
        "Exported {} records as {} to {}",
        filtered.record_count(),
        format.label(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// HTML report
// ---------------------------------------------------------------------------

/// Render the header and matched rows as a self-contained printable page.
pub fn render_html(filtered: &Dataset) -> String {
    let width = filtered.column_count();
    let mut html = String::with_capacity(1024 + 64 * filtered.len() * width);

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{REPORT_TITLE}</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; }}\n\
         table {{ width: 100%; border-collapse: collapse; }}\n\
         th, td {{ border: 1px solid #444; padding: 4px; text-align: left; }}\n\
         </style>\n</head>\n<body>\n<h1>{REPORT_TITLE}</h1>\n<p>Generated {} &middot; {} records</p>\n",
        Local::now().format("%Y-%m-%d %H:%M"),
        filtered.record_count()
    );

    html.push_str("<table>\n<thead>\n");
    if let Some(header) = filtered.header() {
        push_row(&mut html, header, width, "th");
    }
    html.push_str("</thead>\n<tbody>\n");
    for row in filtered.data_rows() {
        push_row(&mut html, row, width, "td");
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

fn push_row(html: &mut String, row: &Row, width: usize, tag: &str) {
    html.push_str("<tr>");
    for idx in 0..width {
        let _ = write!(html, "<{tag}>{}</{tag}>", escape_html(row.cell(idx).unwrap_or("")));
    }
    html.push_str("</tr>\n");
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

pub fn write_csv<W: Write>(filtered: &Dataset, writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    for row in &filtered.rows {
        wtr.write_record(row.0.iter().map(|c| c.as_deref().unwrap_or("")))
            .context("writing CSV record")?;
    }
    wtr.flush().context("flushing CSV")?;
    Ok(())
}
