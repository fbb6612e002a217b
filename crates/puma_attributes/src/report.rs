//! Reports computed by the engine for an initial shape during generation.
//!
//! [`ReportFilter`] narrows per-shape reports down by shape, key and value, and
//! [`format_reports`] renders one text block per shape.
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum ReportValue {
    Float(f64),
    Bool(bool),
    String(String),
}

/// A named report value of one initial shape.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub shape_index: usize,
    pub key: String,
    pub value: ReportValue,
}

impl Report {
    pub fn new(shape_index: usize, key: impl Into<String>, value: ReportValue) -> Self {
        Self {
            shape_index,
            key: key.into(),
            value,
        }
    }

    pub fn formatted_value(&self) -> String {
        match &self.value {
            ReportValue::Float(v) => v.to_string(),
            ReportValue::Bool(v) => v.to_string(),
            ReportValue::String(v) => v.clone(),
        }
    }

    /// Compact `key : value` line for listings.
    pub fn summary(&self) -> String {
        format!("  {} : {}", self.key, self.formatted_value())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ InitialShapeIndex: {}, Key: {}, Value: {} ]",
            self.shape_index,
            self.key,
            self.formatted_value()
        )
    }
}

/// Flat report buffers of one shape as written by the engine.
///
/// `keys` names the doubles first, then the booleans, then the strings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportBuffers {
    pub keys: Vec<String>,
    pub doubles: Vec<f64>,
    /// Native booleans, non-zero meaning `true`.
    pub bools: Vec<i32>,
    pub strings: Vec<String>,
}

impl ReportBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value_count(&self) -> usize {
        self.doubles.len() + self.bools.len() + self.strings.len()
    }

    /// Pairs keys with values; a key count that differs from the value count is rejected.
    pub fn into_reports(self, shape_index: usize) -> Result<Vec<Report>> {
        if self.keys.len() != self.value_count() {
            return Err(Error::InvalidBuffer(format!(
                "{} report keys for {} report values",
                self.keys.len(),
                self.value_count()
            )));
        }

        let values = self
            .doubles
            .into_iter()
            .map(ReportValue::Float)
            .chain(self.bools.into_iter().map(|b| ReportValue::Bool(b != 0)))
            .chain(self.strings.into_iter().map(ReportValue::String));

        Ok(self
            .keys
            .into_iter()
            .zip(values)
            .map(|(key, value)| Report::new(shape_index, key, value))
            .collect())
    }
}

/// Selection of reports by shape, key and value.
///
/// An empty shape list keeps every shape and an empty key list keeps every key. The value
/// list of the key at position `i` is `values[i]`; a missing or empty list keeps any value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportFilter {
    pub shapes: Vec<usize>,
    pub keys: Vec<String>,
    pub values: Vec<Vec<String>>,
}

impl ReportFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shapes(mut self, shapes: impl IntoIterator<Item = usize>) -> Self {
        self.shapes = shapes.into_iter().collect();
        self
    }

    /// Keys to keep. A single entry spanning several lines is split into one key per line.
    pub fn with_keys<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        let mut keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if let [single] = keys.as_slice() {
            if single.contains('\n') {
                keys = single
                    .split(['\n', '\r'])
                    .filter(|k| !k.is_empty())
                    .map(str::to_owned)
                    .collect();
            }
        }
        self.keys = keys;
        self
    }

    /// Formatted values to keep for the key at the same position.
    pub fn with_values(mut self, values: Vec<Vec<String>>) -> Self {
        self.values = values;
        self
    }

    fn keys_active(&self) -> bool {
        self.keys.first().is_some_and(|k| !k.is_empty())
    }

    fn accepts(&self, report: &Report) -> bool {
        if !self.keys_active() {
            return true;
        }
        let Some(position) = self.keys.iter().position(|k| *k == report.key) else {
            return false;
        };
        match self.values.get(position) {
            Some(values) if values.first().is_some_and(|v| !v.is_empty()) => {
                values.contains(&report.formatted_value())
            }
            _ => true,
        }
    }

    /// Applies the filter to per-shape reports, keyed by shape index.
    ///
    /// Shapes without reports count as empty. Unknown shape indices are left out. With an
    /// active key filter, a shape is kept only when one of its reports matches a key.
    pub fn apply(&self, reports: &[Option<Vec<Report>>]) -> BTreeMap<usize, Vec<Report>> {
        let shapes: Vec<usize> = if self.shapes.is_empty() {
            (0..reports.len()).collect()
        } else {
            self.shapes.iter().copied().filter(|&s| s < reports.len()).collect()
        };

        let mut filtered = BTreeMap::new();
        for shape in shapes {
            let shape_reports = reports[shape].as_deref().unwrap_or_default();
            if self.keys_active() && !shape_reports.iter().any(|r| self.keys.contains(&r.key)) {
                continue;
            }
            let kept = shape_reports.iter().filter(|r| self.accepts(r)).cloned().collect();
            filtered.insert(shape, kept);
        }
        filtered
    }
}

/// Renders one block per shape, padded with empty entries up to `shape_count`.
///
/// Each block starts with `Reports of shape N` followed by one [`Report::summary`] line per
/// report. Shapes missing from `reports` get an empty string.
pub fn format_reports(reports: &BTreeMap<usize, Vec<Report>>, shape_count: usize) -> Vec<String> {
    let len = reports
        .keys()
        .next_back()
        .map_or(shape_count, |&last| shape_count.max(last + 1));
    let mut out = vec![String::new(); len];
    for (&shape, shape_reports) in reports {
        let mut lines = Vec::with_capacity(shape_reports.len() + 1);
        lines.push(format!("Reports of shape {shape}"));
        lines.extend(shape_reports.iter().map(Report::summary));
        out[shape] = lines.join("\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_pair_with_values_in_category_order() {
        let buffers = ReportBuffers {
            keys: vec!["area".into(), "valid".into(), "zone".into()],
            doubles: vec![120.5],
            bools: vec![1],
            strings: vec!["R2".into()],
        };
        let reports = buffers.into_reports(3).unwrap();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].value, ReportValue::Float(120.5));
        assert_eq!(reports[1].value, ReportValue::Bool(true));
        assert_eq!(reports[2].key, "zone");
        assert!(reports.iter().all(|r| r.shape_index == 3));
    }

    #[test]
    fn mismatched_counts_are_rejected() {
        let buffers = ReportBuffers {
            keys: vec!["area".into()],
            doubles: vec![1.0, 2.0],
            ..ReportBuffers::default()
        };
        assert!(matches!(buffers.into_reports(0), Err(Error::InvalidBuffer(_))));
    }

    #[test]
    fn display_matches_listing_format() {
        let report = Report::new(0, "height", ReportValue::Float(12.0));
        assert_eq!(
            report.to_string(),
            "[ InitialShapeIndex: 0, Key: height, Value: 12 ]"
        );
        assert_eq!(report.summary(), "  height : 12");
    }

    fn shape_reports() -> Vec<Option<Vec<Report>>> {
        vec![
            Some(vec![
                Report::new(0, "area", ReportValue::Float(120.0)),
                Report::new(0, "zone", ReportValue::String("R2".into())),
            ]),
            None,
            Some(vec![
                Report::new(2, "area", ReportValue::Float(80.5)),
                Report::new(2, "zone", ReportValue::String("C1".into())),
                Report::new(2, "valid", ReportValue::Bool(false)),
            ]),
        ]
    }

    #[test]
    fn empty_filter_keeps_every_shape() {
        let filtered = ReportFilter::new().apply(&shape_reports());
        assert_eq!(filtered.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(filtered[&1].is_empty());
        assert_eq!(filtered[&2].len(), 3);
    }

    #[test]
    fn shape_list_selects_shapes() {
        let filtered = ReportFilter::new().with_shapes([2, 7]).apply(&shape_reports());
        assert_eq!(filtered.keys().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn key_filter_keeps_matching_reports_only() {
        let filtered = ReportFilter::new().with_keys(["zone"]).apply(&shape_reports());
        assert_eq!(filtered.keys().copied().collect::<Vec<_>>(), vec![0, 2]);
        assert!(filtered.values().flatten().all(|r| r.key == "zone"));
    }

    #[test]
    fn multiline_key_entry_is_split() {
        let filter = ReportFilter::new().with_keys(["area\r\nvalid\n"]);
        assert_eq!(filter.keys, vec!["area".to_string(), "valid".to_string()]);
        let filtered = filter.apply(&shape_reports());
        assert_eq!(filtered[&2].len(), 2);
        assert_eq!(filtered[&0].len(), 1);
    }

    #[test]
    fn value_filter_matches_formatted_value() {
        let filter = ReportFilter::new()
            .with_keys(["area", "zone"])
            .with_values(vec![vec!["80.5".into()], vec![]]);
        let filtered = filter.apply(&shape_reports());
        let keys_of = |shape: usize| filtered[&shape].iter().map(|r| r.key.as_str()).collect::<Vec<_>>();
        assert_eq!(keys_of(0), vec!["zone"]);
        assert_eq!(keys_of(2), vec!["area", "zone"]);
    }

    #[test]
    fn blank_first_key_disables_key_filter() {
        let filtered = ReportFilter::new().with_keys([""]).apply(&shape_reports());
        assert_eq!(filtered[&2].len(), 3);
    }

    #[test]
    fn formatted_blocks_are_padded_to_shape_count() {
        let filtered = ReportFilter::new()
            .with_shapes([1, 2])
            .with_keys(["valid"])
            .apply(&shape_reports());
        let blocks = format_reports(&filtered, 4);
        assert_eq!(
            blocks,
            vec![
                String::new(),
                String::new(),
                "Reports of shape 2\n  valid : false".to_string(),
                String::new(),
            ]
        );
    }
}
