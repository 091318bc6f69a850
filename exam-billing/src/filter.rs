use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{Classification, ExamRecord};
use crate::text::collate;

/// Display filters over computed records.
///
/// Each non-empty field restricts records to the listed values, compared
/// exactly against display names. An empty field places no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub clinics: Vec<String>,
    pub specialists: Vec<String>,
    pub exam_types: Vec<String>,
    pub categories: Vec<Classification>,
}

impl FilterCriteria {
    pub fn is_active(&self) -> bool {
        !(self.clinics.is_empty()
            && self.specialists.is_empty()
            && self.exam_types.is_empty()
            && self.categories.is_empty())
    }

    pub fn matches(&self, record: &ExamRecord) -> bool {
        allows(&self.clinics, &record.clinic)
            && allows(&self.specialists, &record.specialist)
            && allows(&self.exam_types, &record.exam_type)
            && (self.categories.is_empty() || self.categories.contains(&record.category))
    }
}

fn allows(selected: &[String], value: &str) -> bool {
    selected.is_empty() || selected.iter().any(|s| s == value)
}

/// Records matching every active dimension, in input order.
pub fn filter(records: &[ExamRecord], criteria: &FilterCriteria) -> Vec<ExamRecord> {
    records
        .iter()
        .filter(|record| criteria.matches(record))
        .cloned()
        .collect()
}

/// Values available for each filter dimension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub clinics: Vec<String>,
    pub specialists: Vec<String>,
    pub exam_types: Vec<String>,
    pub categories: Vec<Classification>,
}

impl FilterOptions {
    /// Distinct values present in `records`, sorted for display.
    pub fn from_records(records: &[ExamRecord]) -> Self {
        let mut categories: Vec<Classification> = records
            .iter()
            .map(|record| record.category)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        categories.sort_by(|a, b| collate(a.label(), b.label()));

        Self {
            clinics: distinct(records.iter().map(|r| r.clinic.as_str())),
            specialists: distinct(records.iter().map(|r| r.specialist.as_str())),
            exam_types: distinct(records.iter().map(|r| r.exam_type.as_str())),
            categories,
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut values: Vec<String> = values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    values.sort_by(|a, b| collate(a, b));
    values
}
