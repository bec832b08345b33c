use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Row – one line of the source sheet
// ---------------------------------------------------------------------------

/// One row of the sheet. Cells may be absent (JSON `null`, or a ragged row
/// shorter than the header).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row(pub Vec<Option<String>>);

impl Row {
    /// Cell text at `idx`, `None` when the cell is absent.
    pub fn cell(&self, idx: usize) -> Option<&str> {
        self.0.get(idx).and_then(|c| c.as_deref())
    }

    /// Number of cells physically present in the row.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Row(iter.into_iter().map(|s| Some(s.into())).collect())
    }
}

// ---------------------------------------------------------------------------
// Column roles
// ---------------------------------------------------------------------------

/// Header names accepted for each column role.
///
/// Names are compared after lower-casing and dropping everything that is not
/// alphanumeric, so `"Fault Date/Time"` matches `"faultdatetime"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub route: Vec<String>,
    pub fault_time: Vec<String>,
    pub status: Vec<String>,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            route: vec!["Route Name".into(), "Route".into()],
            fault_time: vec![
                "Fault Date/Time".into(),
                "Fault DateTime".into(),
                "Fault Date".into(),
                "Fault Time".into(),
            ],
            status: vec!["Status".into()],
        }
    }
}

/// Resolved cell positions of the columns the filters look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub route: usize,
    pub fault_time: usize,
    pub status: usize,
}

impl Default for ColumnLayout {
    /// Positional layout of the fault sheet:
    /// docket, route id, route name, fault time, handover, clearance,
    /// duration, status, ...
    fn default() -> Self {
        Self {
            route: 2,
            fault_time: 3,
            status: 7,
        }
    }
}

impl ColumnLayout {
    /// Map header names to positions, falling back to the positional default
    /// for each role whose name is missing from the header.
    pub fn resolve(header: Option<&Row>, names: &ColumnNames) -> Self {
        let fallback = Self::default();
        let Some(header) = header else {
            return fallback;
        };

        let keys: Vec<Option<String>> = header
            .0
            .iter()
            .map(|c| c.as_deref().map(normalize_name))
            .collect();

        let find = |aliases: &[String], default: usize| -> usize {
            aliases
                .iter()
                .map(|a| normalize_name(a))
                .find_map(|alias| keys.iter().position(|k| k.as_deref() == Some(alias.as_str())))
                .unwrap_or(default)
        };

        Self {
            route: find(&names.route, fallback.route),
            fault_time: find(&names.fault_time, fallback.fault_time),
            status: find(&names.status, fallback.status),
        }
    }
}

fn normalize_name(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// Dataset – header row plus data rows
// ---------------------------------------------------------------------------

/// The whole sheet as fetched: `rows[0]` is the header, the rest are fault
/// records. Carries the column layout resolved from the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub rows: Vec<Row>,
    pub layout: ColumnLayout,
}

impl Dataset {
    /// Build a dataset, resolving column roles from the header row.
    pub fn from_rows(rows: Vec<Row>, names: &ColumnNames) -> Self {
        let layout = ColumnLayout::resolve(rows.first(), names);
        Self { rows, layout }
    }

    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// All rows after the header.
    pub fn data_rows(&self) -> &[Row] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Total number of rows including the header.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of fault records (rows after the header).
    pub fn record_count(&self) -> usize {
        self.data_rows().len()
    }

    /// Display width: the widest row, so ragged rows still get every column.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Row::len).max().unwrap_or(0)
    }

    /// Header label for column `idx`, or a placeholder for unnamed columns.
    pub fn column_name(&self, idx: usize) -> String {
        self.header()
            .and_then(|h| h.cell(idx))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Column {}", idx + 1))
    }
}
