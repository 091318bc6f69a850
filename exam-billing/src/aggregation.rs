use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{ClinicTotal, ExamRecord, SpecialistTotal, TotalsReport};
use crate::text::collate;

#[derive(Default)]
struct Accumulator {
    total: Decimal,
    count: u64,
}

/// Groups records into the clinic→specialist totals tree.
///
/// Grouping uses display names as they appear on the records. Every record
/// contributes its value (zero for unpriced and not-chargeable exams) and its
/// quantity to the count. Both levels are sorted with [`collate`], so the
/// result does not depend on record order.
pub fn aggregate(records: &[ExamRecord]) -> TotalsReport {
    let mut clinics: HashMap<&str, HashMap<&str, Accumulator>> = HashMap::new();

    for record in records {
        let slot = clinics
            .entry(record.clinic.as_str())
            .or_default()
            .entry(record.specialist.as_str())
            .or_default();
        slot.total = slot.total.saturating_add(record.value);
        slot.count += u64::from(record.quantity);
    }

    let mut totals: Vec<ClinicTotal> = clinics
        .into_iter()
        .map(|(clinic, specialists)| {
            let mut specialists: Vec<SpecialistTotal> = specialists
                .into_iter()
                .map(|(specialist, acc)| SpecialistTotal {
                    specialist: specialist.to_string(),
                    total: acc.total,
                    count: acc.count,
                })
                .collect();
            specialists.sort_by(|a, b| collate(&a.specialist, &b.specialist));

            ClinicTotal {
                clinic: clinic.to_string(),
                total: saturating_sum(specialists.iter().map(|s| s.total)),
                specialists,
            }
        })
        .collect();
    totals.sort_by(|a, b| collate(&a.clinic, &b.clinic));

    let grand_total = saturating_sum(totals.iter().map(|c| c.total));

    TotalsReport {
        clinics: totals,
        grand_total,
    }
}

/// Sum clamped at the `Decimal` bounds.
fn saturating_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Clinics with at least one record lacking a price, in first-appearance order.
pub fn clinics_missing_prices(records: &[ExamRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| !record.has_price)
        .filter(|record| seen.insert(record.clinic.as_str()))
        .map(|record| record.clinic.clone())
        .collect()
}

/// Amount billed by one specialist at one clinic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicAmount {
    pub clinic: String,
    pub total: Decimal,
}

/// Invoice line: everything one specialist billed, across clinics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialistSummary {
    pub specialist: String,
    pub clinics: Vec<ClinicAmount>,
    pub total: Decimal,
}

/// Regroups a totals tree by specialist for invoicing.
///
/// Clinics keep the order of the tree; specialists are sorted with [`collate`].
pub fn specialist_summary(report: &TotalsReport) -> Vec<SpecialistSummary> {
    let mut groups: HashMap<&str, SpecialistSummary> = HashMap::new();

    for clinic in &report.clinics {
        for specialist in &clinic.specialists {
            let group = groups
                .entry(specialist.specialist.as_str())
                .or_insert_with(|| SpecialistSummary {
                    specialist: specialist.specialist.clone(),
                    clinics: Vec::new(),
                    total: Decimal::ZERO,
                });
            group.clinics.push(ClinicAmount {
                clinic: clinic.clinic.clone(),
                total: specialist.total,
            });
            group.total = group.total.saturating_add(specialist.total);
        }
    }

    let mut summary: Vec<SpecialistSummary> = groups.into_values().collect();
    summary.sort_by(|a, b| collate(&a.specialist, &b.specialist));
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classification, ExamCategory};

    fn record(clinic: &str, specialist: &str, value: i64, quantity: u32, has_price: bool) -> ExamRecord {
        ExamRecord {
            patient: "Paciente".to_string(),
            exam_type: "Laudo Ilustrado".to_string(),
            clinic: clinic.to_string(),
            category: Classification::Mapped(ExamCategory::Total2d),
            specialist: specialist.to_string(),
            quantity,
            value: Decimal::from(value),
            has_price,
            not_chargeable: false,
        }
    }

    #[test]
    fn test_totals_saturate() {
        let mut big = record("A", "Dr. Silva", 0, 1, true);
        big.value = Decimal::MAX;
        let mut other = big.clone();
        other.clinic = "B".to_string();

        let report = aggregate(&[big.clone(), big, other]);

        assert_eq!(report.clinics[0].total, Decimal::MAX);
        assert_eq!(report.clinics[0].specialists[0].count, 2);
        assert_eq!(report.grand_total, Decimal::MAX);
        assert_eq!(specialist_summary(&report)[0].total, Decimal::MAX);
    }

    #[test]
    fn test_single_record_tree() {
        let report = aggregate(&[record("Clínica A", "Dr. Silva", 100, 2, true)]);

        assert_eq!(report.grand_total, Decimal::from(100));
        assert_eq!(report.clinics.len(), 1);
        let clinic = &report.clinics[0];
        assert_eq!(clinic.clinic, "Clínica A");
        assert_eq!(clinic.total, Decimal::from(100));
        assert_eq!(
            clinic.specialists,
            vec![SpecialistTotal {
                specialist: "Dr. Silva".to_string(),
                total: Decimal::from(100),
                count: 2,
            }]
        );
    }

    #[test]
    fn test_grouping_and_ordering() {
        let records = vec![
            record("Clínica B", "Dra. Souza", 30, 1, true),
            record("Clínica A", "Dr. Silva", 50, 1, true),
            record("Clínica B", "Dr. Alves", 20, 2, true),
            record("Clínica A", "Dr. Silva", 25, 3, true),
            record("Clínica A", "Dr. Costa", 0, 1, false),
        ];
        let report = aggregate(&records);

        let clinics: Vec<&str> = report.clinics.iter().map(|c| c.clinic.as_str()).collect();
        assert_eq!(clinics, vec!["Clínica A", "Clínica B"]);

        let a = &report.clinics[0];
        assert_eq!(a.total, Decimal::from(75));
        let names: Vec<&str> = a.specialists.iter().map(|s| s.specialist.as_str()).collect();
        assert_eq!(names, vec!["Dr. Costa", "Dr. Silva"]);
        assert_eq!(a.specialists[0].count, 1);
        assert_eq!(a.specialists[1].count, 4);

        assert_eq!(report.clinics[1].total, Decimal::from(50));
        assert_eq!(report.grand_total, Decimal::from(125));
    }

    #[test]
    fn test_display_names_are_not_merged() {
        let report = aggregate(&[
            record("Clínica A", "Dr. Silva", 10, 1, true),
            record("clínica a", "Dr. Silva", 10, 1, true),
        ]);
        assert_eq!(report.clinics.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let report = aggregate(&[]);
        assert!(report.clinics.is_empty());
        assert_eq!(report.grand_total, Decimal::ZERO);
    }

    #[test]
    fn test_clinics_missing_prices() {
        let records = vec![
            record("B", "X", 0, 1, false),
            record("A", "X", 10, 1, true),
            record("C", "X", 0, 1, false),
            record("B", "Y", 0, 1, false),
        ];
        assert_eq!(clinics_missing_prices(&records), vec!["B", "C"]);
    }

    #[test]
    fn test_specialist_summary() {
        let report = aggregate(&[
            record("Clínica B", "Dr. Silva", 40, 1, true),
            record("Clínica A", "Dr. Silva", 60, 1, true),
            record("Clínica A", "Dra. Souza", 15, 1, true),
        ]);
        let summary = specialist_summary(&report);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].specialist, "Dr. Silva");
        assert_eq!(summary[0].total, Decimal::from(100));
        let clinics: Vec<&str> = summary[0].clinics.iter().map(|c| c.clinic.as_str()).collect();
        assert_eq!(clinics, vec!["Clínica A", "Clínica B"]);
        assert_eq!(summary[1].specialist, "Dra. Souza");
        assert_eq!(summary[1].total, Decimal::from(15));
    }
}
