use chrono::{NaiveDate, NaiveDateTime};

use super::model::{Dataset, Row};

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// Fault date constraint. Matches rows whose fault date/time cell starts with
/// [`DateConstraint::prefix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateConstraint {
    /// Any time on this day: `YYYY-MM-DD`.
    Day(NaiveDate),
    /// This exact minute: `YYYY-MM-DD HH:MM`.
    Minute(NaiveDateTime),
}

impl DateConstraint {
    pub fn prefix(&self) -> String {
        match self {
            DateConstraint::Day(d) => d.format("%Y-%m-%d").to_string(),
            DateConstraint::Minute(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// User-supplied constraints. Empty text and `None` date mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the route name.
    pub route: String,
    /// Case-insensitive substring of the status.
    pub status: String,
    pub date: Option<DateConstraint>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.route.is_empty() && self.status.is_empty() && self.date.is_none()
    }
}

/// Criteria normalised once per filter pass.
struct Predicate {
    route: Option<String>,
    status: Option<String>,
    date_prefix: Option<String>,
}

impl Predicate {
    fn new(criteria: &FilterCriteria) -> Self {
        let text = |s: &str| (!s.is_empty()).then(|| s.to_lowercase());
        Self {
            route: text(criteria.route.as_str()),
            status: text(criteria.status.as_str()),
            date_prefix: criteria.date.as_ref().map(DateConstraint::prefix),
        }
    }

    fn matches(&self, dataset: &Dataset, row: &Row) -> bool {
        let layout = dataset.layout;
        contains_ci(row.cell(layout.route), self.route.as_deref())
            && contains_ci(row.cell(layout.status), self.status.as_deref())
            && match self.date_prefix.as_deref() {
                None => true,
                Some(prefix) => row
                    .cell(layout.fault_time)
                    .is_some_and(|cell| cell.starts_with(prefix)),
            }
    }
}

/// `needle` is already lower-cased. Absent cell never matches a present needle.
fn contains_ci(cell: Option<&str>, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => cell.is_some_and(|c| c.to_lowercase().contains(needle)),
    }
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// Indices (into `dataset.rows`) of data rows passing every present criterion,
/// in dataset order. The header (index 0) is never tested.
pub fn matching_rows(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    let predicate = Predicate::new(criteria);
    dataset
        .rows
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, row)| predicate.matches(dataset, row))
        .map(|(i, _)| i)
        .collect()
}

/// The filtered dataset: the header row followed by every matching data row.
///
/// An empty dataset yields an empty result. The input is left untouched so it
/// can be re-filtered as criteria change.
pub fn apply_filters(dataset: &Dataset, criteria: &FilterCriteria) -> Dataset {
    let Some(header) = dataset.header() else {
        return Dataset {
            rows: Vec::new(),
            layout: dataset.layout,
        };
    };

    select_rows(dataset, header, &matching_rows(dataset, criteria))
}

/// Header plus the rows at `indices` (as returned by [`matching_rows`]).
/// Indices past the end are skipped.
pub fn filtered_view(dataset: &Dataset, indices: &[usize]) -> Dataset {
    match dataset.header() {
        Some(header) => select_rows(dataset, header, indices),
        None => Dataset {
            rows: Vec::new(),
            layout: dataset.layout,
        },
    }
}

fn select_rows(dataset: &Dataset, header: &Row, indices: &[usize]) -> Dataset {
    let mut rows = Vec::with_capacity(indices.len() + 1);
    rows.push(header.clone());
    rows.extend(indices.iter().filter_map(|&i| dataset.rows.get(i).cloned()));

    Dataset {
        rows,
        layout: dataset.layout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ColumnNames;

    fn row(cells: &[&str]) -> Row {
        cells.iter().copied().collect()
    }

    fn dataset(rows: Vec<Row>) -> Dataset {
        Dataset::from_rows(rows, &ColumnNames::default())
    }

    fn routes() -> Dataset {
        dataset(vec![
            row(&["ID", "Route", "Status"]),
            row(&["1", "Alpha Line", "Restored"]),
            row(&["2", "Beta Line", "Carried Forward"]),
        ])
    }

    /// Sheet in its positional layout: route at 2, fault time at 3, status at 7.
    fn faults() -> Dataset {
        dataset(vec![
            row(&["a", "b", "c", "d", "e", "f", "g", "h"]),
            row(&["D-1", "R1", "North Ring", "2024-03-01 10:15", "", "", "1h", "Restored"]),
            row(&["D-2", "R2", "South Spur", "2024-03-01 18:40", "", "", "3h", "Carried Forward"]),
            row(&["D-3", "R1", "North Ring", "2024-03-02 07:05", "", "", "", "Restored"]),
        ])
    }

    fn ids(ds: &Dataset) -> Vec<&str> {
        ds.data_rows()
            .iter()
            .map(|r| r.cell(0).unwrap_or(""))
            .collect()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn route_text_selects_matching_rows() {
        let ds = routes();
        let criteria = FilterCriteria {
            route: "alpha".into(),
            ..Default::default()
        };
        let out = apply_filters(&ds, &criteria);
        assert_eq!(
            out.rows,
            vec![
                row(&["ID", "Route", "Status"]),
                row(&["1", "Alpha Line", "Restored"])
            ]
        );
    }

    #[test]
    fn status_text_selects_matching_rows() {
        let ds = routes();
        let criteria = FilterCriteria {
            status: "carried".into(),
            ..Default::default()
        };
        let out = apply_filters(&ds, &criteria);
        assert_eq!(out.header(), ds.header());
        assert_eq!(ids(&out), vec!["2"]);
    }

    #[test]
    fn date_constraint_matches_day_prefix() {
        let ds = dataset(vec![
            row(&["a", "b", "c", "d"]),
            row(&["1", "x", "Route", "2024-03-01 10:15"]),
        ]);
        let on = FilterCriteria {
            date: Some(DateConstraint::Day(day(2024, 3, 1))),
            ..Default::default()
        };
        let off = FilterCriteria {
            date: Some(DateConstraint::Day(day(2024, 3, 2))),
            ..Default::default()
        };
        assert_eq!(apply_filters(&ds, &on).record_count(), 1);
        assert_eq!(apply_filters(&ds, &off).record_count(), 0);
    }

    #[test]
    fn date_constraint_matches_minute_prefix() {
        let ds = faults();
        let at = |h, m| FilterCriteria {
            date: Some(DateConstraint::Minute(
                day(2024, 3, 1).and_hms_opt(h, m, 0).unwrap(),
            )),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&ds, &at(10, 15))), vec!["D-1"]);
        assert!(ids(&apply_filters(&ds, &at(10, 16))).is_empty());
        assert_eq!(
            DateConstraint::Minute(day(2024, 3, 1).and_hms_opt(9, 5, 0).unwrap()).prefix(),
            "2024-03-01 09:05"
        );
    }

    #[test]
    fn header_only_dataset_keeps_header() {
        let ds = dataset(vec![row(&["ID", "Route", "Status"])]);
        let criteria = FilterCriteria {
            route: "anything".into(),
            status: "x".into(),
            date: Some(DateConstraint::Day(day(2024, 1, 1))),
        };
        let out = apply_filters(&ds, &criteria);
        assert_eq!(out.rows, vec![row(&["ID", "Route", "Status"])]);
    }

    #[test]
    fn header_is_kept_when_nothing_matches() {
        let ds = routes();
        let criteria = FilterCriteria {
            route: "gamma".into(),
            ..Default::default()
        };
        let out = apply_filters(&ds, &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out.header(), ds.header());
    }

    #[test]
    fn empty_dataset_gives_empty_result() {
        let out = apply_filters(&Dataset::default(), &FilterCriteria::default());
        assert!(out.is_empty());
    }

    #[test]
    fn missing_status_cell_is_a_non_match() {
        let ds = dataset(vec![
            row(&["ID", "Route", "Status"]),
            Row(vec![Some("1".into()), Some("Alpha".into())]),
            Row(vec![Some("2".into()), Some("Beta".into()), None]),
            row(&["3", "Gamma", "xenon"]),
        ]);
        let criteria = FilterCriteria {
            status: "x".into(),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&ds, &criteria)), vec!["3"]);
    }

    #[test]
    fn missing_fault_time_is_a_non_match() {
        let ds = dataset(vec![row(&["a", "b", "c", "d"]), row(&["1", "x", "y"])]);
        let criteria = FilterCriteria {
            date: Some(DateConstraint::Day(day(2024, 3, 1))),
            ..Default::default()
        };
        assert_eq!(apply_filters(&ds, &criteria).record_count(), 0);
    }

    #[test]
    fn no_criteria_is_identity() {
        let ds = faults();
        let out = apply_filters(&ds, &FilterCriteria::default());
        assert_eq!(out, ds);
    }

    #[test]
    fn criteria_compose_with_and() {
        let ds = faults();
        let criteria = FilterCriteria {
            route: "north".into(),
            status: "restored".into(),
            date: Some(DateConstraint::Day(day(2024, 3, 2))),
        };
        assert_eq!(ids(&apply_filters(&ds, &criteria)), vec!["D-3"]);

        let route_only = FilterCriteria {
            route: "north".into(),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&ds, &route_only)), vec!["D-1", "D-3"]);
    }

    #[test]
    fn text_matching_ignores_case() {
        let ds = faults();
        for (lower, upper) in [("ring", "RING"), ("carried", "CaRrIeD")] {
            let a = FilterCriteria {
                route: lower.into(),
                status: lower.into(),
                ..Default::default()
            };
            let b = FilterCriteria {
                route: upper.into(),
                status: upper.into(),
                ..Default::default()
            };
            assert_eq!(apply_filters(&ds, &a), apply_filters(&ds, &b));
        }
    }

    #[test]
    fn filtering_twice_is_a_no_op() {
        let ds = faults();
        let criteria = FilterCriteria {
            status: "restored".into(),
            ..Default::default()
        };
        let once = apply_filters(&ds, &criteria);
        let twice = apply_filters(&once, &criteria);
        assert_eq!(once, twice);
    }

    #[test]
    fn narrower_route_text_never_grows_result() {
        let ds = faults();
        let mut previous = ds.len();
        for needle in ["", "n", "no", "nor", "north", "north ring", "north ringo"] {
            let criteria = FilterCriteria {
                route: needle.into(),
                ..Default::default()
            };
            let size = apply_filters(&ds, &criteria).len();
            assert!(size <= previous, "{needle:?} grew the result");
            previous = size;
        }
        assert_eq!(previous, 1);
    }

    #[test]
    fn input_is_not_mutated_and_order_is_preserved() {
        let ds = faults();
        let before = ds.clone();
        let criteria = FilterCriteria {
            route: "r".into(),
            ..Default::default()
        };
        let out = apply_filters(&ds, &criteria);
        assert_eq!(ds, before);
        assert_eq!(ids(&out), vec!["D-1", "D-2", "D-3"]);
        assert_eq!(matching_rows(&ds, &criteria), vec![1, 2, 3]);
    }

    #[test]
    fn filtered_view_matches_apply_filters() {
        let ds = faults();
        let criteria = FilterCriteria {
            route: "north".into(),
            ..Default::default()
        };
        let indices = matching_rows(&ds, &criteria);
        assert_eq!(filtered_view(&ds, &indices), apply_filters(&ds, &criteria));
        assert!(filtered_view(&Dataset::default(), &[1]).is_empty());
    }

    #[test]
    fn header_is_never_tested() {
        // header text would match, data rows do not
        let ds = dataset(vec![row(&["ID", "Route", "Status"]), row(&["1", "x", "y"])]);
        let criteria = FilterCriteria {
            route: "route".into(),
            ..Default::default()
        };
        assert_eq!(matching_rows(&ds, &criteria), Vec::<usize>::new());
        assert_eq!(apply_filters(&ds, &criteria).len(), 1);
    }
}
