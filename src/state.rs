use chrono::{DateTime, Local, NaiveDate, NaiveTime};

use crate::color::StatusColors;
use crate::config::DateGranularity;
use crate::data::filter::{filtered_view, matching_rows, DateConstraint, FilterCriteria};
use crate::data::model::{Dataset, Row};
use crate::source::{FetchOutcome, Trigger};

// ---------------------------------------------------------------------------
// Date filter draft (what the date widgets edit)
// ---------------------------------------------------------------------------

/// Date picker state. Only turns into a [`DateConstraint`] when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateDraft {
    pub enabled: bool,
    pub granularity: DateGranularity,
    pub day: NaiveDate,
    pub hour: u32,
    pub minute: u32,
}

impl DateDraft {
    pub fn new(granularity: DateGranularity) -> Self {
        Self {
            enabled: false,
            granularity,
            day: Local::now().date_naive(),
            hour: 0,
            minute: 0,
        }
    }

    pub fn constraint(&self) -> Option<DateConstraint> {
        if !self.enabled {
            return None;
        }
        match self.granularity {
            DateGranularity::Day => Some(DateConstraint::Day(self.day)),
            DateGranularity::Minute => NaiveTime::from_hms_opt(self.hour, self.minute, 0)
                .map(|t| DateConstraint::Minute(self.day.and_time(t))),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// `filtered` is recomputed from `dataset` and `criteria` after every
/// successful fetch and every criterion change.
pub struct AppState {
    /// Last successfully fetched sheet (None until the first fetch lands).
    pub dataset: Option<Dataset>,

    pub criteria: FilterCriteria,

    /// Header + rows passing `criteria`.
    pub filtered: Dataset,

    /// Positions in `dataset.rows` of the rows in `filtered` after its header.
    pub visible_rows: Vec<usize>,

    pub date_draft: DateDraft,

    pub status_colors: StatusColors,

    /// Position in `dataset.rows` of the record shown in the detail window.
    /// Kept across filter changes while the record still matches.
    pub selected_record: Option<usize>,

    /// Fetch failure waiting to be acknowledged.
    pub alert: Option<String>,

    /// Status line message (exports, etc.).
    pub status_message: Option<String>,

    /// A manual refresh is outstanding.
    pub refreshing: bool,

    pub last_updated: Option<DateTime<Local>>,
}

impl AppState {
    pub fn new(granularity: DateGranularity) -> Self {
        Self {
            dataset: None,
            criteria: FilterCriteria::default(),
            filtered: Dataset::default(),
            visible_rows: Vec::new(),
            date_draft: DateDraft::new(granularity),
            status_colors: StatusColors::default(),
            selected_record: None,
            alert: None,
            status_message: None,
            refreshing: false,
            last_updated: None,
        }
    }

    /// Fold a finished fetch into the state.
    ///
    /// Success replaces the dataset wholesale; failure keeps the last good
    /// dataset and raises one alert.
    pub fn apply_outcome(&mut self, outcome: FetchOutcome) {
        if outcome.trigger == Trigger::Manual {
            self.refreshing = false;
        }
        match outcome.result {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                self.alert = Some(format!("Failed to fetch data: {e}"));
            }
        }
    }

    /// Ingest a newly fetched dataset and refilter with the current criteria.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.status_colors = StatusColors::from_dataset(&dataset);
        self.dataset = Some(dataset);
        self.selected_record = None;
        self.last_updated = Some(Local::now());
        self.refilter();
    }

    /// Recompute `filtered` from the current dataset and full criteria.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            self.filtered = Dataset::default();
            self.visible_rows.clear();
            self.selected_record = None;
            return;
        };
        self.visible_rows = matching_rows(ds, &self.criteria);
        self.filtered = filtered_view(ds, &self.visible_rows);
        if self
            .selected_record
            .is_some_and(|i| !self.visible_rows.contains(&i))
        {
            self.selected_record = None;
        }
    }

    /// Select the record shown at `filtered.rows[idx]`.
    pub fn select_filtered(&mut self, idx: usize) {
        if let Some(&record) = idx.checked_sub(1).and_then(|i| self.visible_rows.get(i)) {
            self.selected_record = Some(record);
        }
    }

    /// Whether `filtered.rows[idx]` is the selected record.
    pub fn is_selected(&self, idx: usize) -> bool {
        idx.checked_sub(1)
            .and_then(|i| self.visible_rows.get(i))
            .is_some_and(|&record| self.selected_record == Some(record))
    }

    /// The record shown in the detail window.
    pub fn selected_record(&self) -> Option<&Row> {
        let ds = self.dataset.as_ref()?;
        ds.rows.get(self.selected_record?)
    }

    pub fn set_route_text(&mut self, text: String) {
        self.criteria.route = text;
        self.refilter();
    }

    pub fn set_status_text(&mut self, text: String) {
        self.criteria.status = text;
        self.refilter();
    }

    pub fn set_date(&mut self, date: Option<DateConstraint>) {
        self.criteria.date = date;
        self.refilter();
    }

    /// Push the date widgets' current values into the criteria.
    pub fn set_date_draft(&mut self, draft: DateDraft) {
        self.date_draft = draft;
        self.set_date(draft.constraint());
    }

    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.date_draft.enabled = false;
        self.refilter();
    }

    /// Mark a manual refresh as outstanding.
    pub fn begin_refresh(&mut self) {
        self.refreshing = true;
    }

    /// The refresh request could not reach the data source; no outcome will
    /// clear `refreshing`, so clear it here.
    pub fn refresh_unavailable(&mut self) {
        self.refreshing = false;
        self.alert = Some("Failed to fetch data: the data source is not running".into());
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Number of fault records in the last fetch.
    pub fn total_records(&self) -> usize {
        self.dataset.as_ref().map_or(0, Dataset::record_count)
    }
}
