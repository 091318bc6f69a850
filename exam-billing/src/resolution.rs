use std::collections::{BTreeMap, HashMap};

use config_engine::PendingUploadPolicy;
use tracing::{info, warn};

use crate::classifier::{classify, CustomMappings};
use crate::error::{BillingError, BillingResult};
use crate::models::{CustomMapping, ExamCategory, UnknownExamType, UploadedRow};
use crate::store::MappingStore;

/// Distinct exam types in `rows` that classify as uncategorized, with their
/// occurrence counts, in first-appearance order.
pub fn detect_unknown_types(rows: &[UploadedRow], overrides: &CustomMappings) -> Vec<UnknownExamType> {
    let mut unknown: Vec<UnknownExamType> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        if !classify(&row.exam_type, overrides).is_uncategorized() {
            continue;
        }
        let name = row.exam_type.trim();
        match positions.get(name) {
            Some(&index) => {
                if let Some(entry) = unknown.get_mut(index) {
                    entry.count += 1;
                }
            }
            None => {
                positions.insert(name, unknown.len());
                unknown.push(UnknownExamType {
                    name: name.to_string(),
                    count: 1,
                });
            }
        }
    }

    unknown
}

/// Upload held back until its unknown exam types are mapped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBatch {
    pub rows: Vec<UploadedRow>,
    pub unknown: Vec<UnknownExamType>,
}

impl PendingBatch {
    /// One choice per unknown type, all preset to `default`.
    pub fn suggested_choices(&self, default: ExamCategory) -> BTreeMap<String, ExamCategory> {
        self.unknown
            .iter()
            .map(|unknown| (unknown.name.clone(), default))
            .collect()
    }
}

/// Result of submitting an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Every row classified; the rows are ready for processing
    Accepted(Vec<UploadedRow>),
    /// The batch is held until these types are resolved
    NeedsResolution(Vec<UnknownExamType>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResolutionWorkflow {
    #[default]
    Idle,
    AwaitingResolution(PendingBatch),
    Resolved,
}

impl ResolutionWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self, ResolutionWorkflow::AwaitingResolution(_))
    }

    pub fn pending(&self) -> Option<&PendingBatch> {
        match self {
            ResolutionWorkflow::AwaitingResolution(batch) => Some(batch),
            _ => None,
        }
    }

    /// Unknown types of the pending batch; empty when nothing is pending.
    pub fn unknown_types(&self) -> &[UnknownExamType] {
        self.pending()
            .map(|batch| batch.unknown.as_slice())
            .unwrap_or_default()
    }

    /// Evaluates a new upload against the current overrides.
    ///
    /// With an upload already pending, `policy` decides between refusing the
    /// new one and dropping the pending one.
    pub fn submit(
        &mut self,
        rows: Vec<UploadedRow>,
        overrides: &CustomMappings,
        policy: PendingUploadPolicy,
    ) -> BillingResult<UploadOutcome> {
        if let ResolutionWorkflow::AwaitingResolution(batch) = self {
            match policy {
                PendingUploadPolicy::Reject => {
                    return Err(BillingError::ResolutionInProgress {
                        pending: batch.unknown.len(),
                    });
                }
                PendingUploadPolicy::Replace => {
                    warn!(
                        dropped_rows = batch.rows.len(),
                        unknown_types = batch.unknown.len(),
                        "Pending upload replaced by a new one"
                    );
                }
            }
        }

        let unknown = detect_unknown_types(&rows, overrides);
        if unknown.is_empty() {
            info!(rows = rows.len(), "Upload accepted");
            *self = ResolutionWorkflow::Resolved;
            return Ok(UploadOutcome::Accepted(rows));
        }

        info!(
            rows = rows.len(),
            unknown_types = unknown.len(),
            "Upload awaiting exam type resolution"
        );
        *self = ResolutionWorkflow::AwaitingResolution(PendingBatch {
            rows,
            unknown: unknown.clone(),
        });
        Ok(UploadOutcome::NeedsResolution(unknown))
    }

    /// Persists one category per unknown type and releases the held rows.
    ///
    /// `choices` must name exactly the pending unknown types. On any error the
    /// workflow stays as it was.
    pub fn resolve(
        &mut self,
        choices: &BTreeMap<String, ExamCategory>,
        store: &mut dyn MappingStore,
    ) -> BillingResult<Vec<UploadedRow>> {
        let batch = self.pending().ok_or(BillingError::NoPendingBatch)?;

        let missing: Vec<String> = batch
            .unknown
            .iter()
            .filter(|unknown| !choices.contains_key(&unknown.name))
            .map(|unknown| unknown.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(BillingError::MissingResolution(missing));
        }

        let unexpected: Vec<String> = choices
            .keys()
            .filter(|name| !batch.unknown.iter().any(|unknown| &unknown.name == *name))
            .cloned()
            .collect();
        if !unexpected.is_empty() {
            return Err(BillingError::UnexpectedResolution(unexpected));
        }

        let mappings: Vec<CustomMapping> = choices
            .iter()
            .map(|(name, category)| CustomMapping::new(name, *category))
            .collect();
        store.upsert_many(&mappings)?;

        match std::mem::replace(self, ResolutionWorkflow::Resolved) {
            ResolutionWorkflow::AwaitingResolution(batch) => {
                info!(
                    mappings = mappings.len(),
                    rows = batch.rows.len(),
                    "Exam types resolved, upload released"
                );
                Ok(batch.rows)
            }
            other => {
                *self = other;
                Err(BillingError::NoPendingBatch)
            }
        }
    }

    /// Discards the pending upload without persisting anything, returning
    /// the number of rows dropped.
    pub fn cancel(&mut self) -> BillingResult<usize> {
        if !self.is_awaiting() {
            return Err(BillingError::NoPendingBatch);
        }

        match std::mem::take(self) {
            ResolutionWorkflow::AwaitingResolution(batch) => {
                info!(rows = batch.rows.len(), "Pending upload cancelled");
                Ok(batch.rows.len())
            }
            other => {
                *self = other;
                Err(BillingError::NoPendingBatch)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryMappingStore;

    fn strange_batch() -> Vec<UploadedRow> {
        vec![
            UploadedRow::new("João", "Raio-X Estranho", "Clínica A")
                .with_specialist("Dr. Silva")
                .with_quantity(2),
            UploadedRow::new("Maria", "Laudo Ilustrado", "Clínica A"),
        ]
    }

    #[test]
    fn test_detect_unknown_types_counts_in_order() {
        let rows = vec![
            UploadedRow::new("A", "Exame Z", "C"),
            UploadedRow::new("B", "Laudo Ilustrado", "C"),
            UploadedRow::new("C", "Exame Y", "C"),
            UploadedRow::new("D", " Exame Z ", "C"),
        ];
        let unknown = detect_unknown_types(&rows, &CustomMappings::new());
        assert_eq!(
            unknown,
            vec![
                UnknownExamType { name: "Exame Z".to_string(), count: 2 },
                UnknownExamType { name: "Exame Y".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_known_batch_is_accepted() {
        let mut workflow = ResolutionWorkflow::new();
        let rows = vec![UploadedRow::new("Ana", "Laudo Ilustrado", "A")];

        let outcome = workflow
            .submit(rows.clone(), &CustomMappings::new(), PendingUploadPolicy::Reject)
            .unwrap();
        assert_eq!(outcome, UploadOutcome::Accepted(rows));
        assert_eq!(workflow, ResolutionWorkflow::Resolved);
    }

    #[test]
    fn test_unknown_type_awaits_resolution() {
        let mut workflow = ResolutionWorkflow::new();
        let outcome = workflow
            .submit(strange_batch(), &CustomMappings::new(), PendingUploadPolicy::Reject)
            .unwrap();

        assert_eq!(
            outcome,
            UploadOutcome::NeedsResolution(vec![UnknownExamType {
                name: "Raio-X Estranho".to_string(),
                count: 1,
            }])
        );
        assert!(workflow.is_awaiting());
        assert_eq!(workflow.unknown_types().len(), 1);
    }

    #[test]
    fn test_resolve_persists_and_releases_rows() {
        let mut workflow = ResolutionWorkflow::new();
        let mut store = InMemoryMappingStore::new();
        workflow
            .submit(strange_batch(), &CustomMappings::new(), PendingUploadPolicy::Reject)
            .unwrap();

        let choices = workflow
            .pending()
            .unwrap()
            .suggested_choices(ExamCategory::Total2d);
        let rows = workflow.resolve(&choices, &mut store).unwrap();

        assert_eq!(rows, strange_batch());
        assert_eq!(workflow, ResolutionWorkflow::Resolved);
        assert_eq!(
            store.load_mappings().unwrap(),
            vec![CustomMapping::new("Raio-X Estranho", ExamCategory::Total2d)]
        );
    }

    #[test]
    fn test_missing_and_extra_choices_leave_state_unchanged() {
        let mut workflow = ResolutionWorkflow::new();
        let mut store = InMemoryMappingStore::new();
        workflow
            .submit(strange_batch(), &CustomMappings::new(), PendingUploadPolicy::Reject)
            .unwrap();
        let before = workflow.clone();

        let err = workflow.resolve(&BTreeMap::new(), &mut store).unwrap_err();
        assert!(matches!(err, BillingError::MissingResolution(names) if names == vec!["Raio-X Estranho"]));
        assert_eq!(workflow, before);

        let choices = BTreeMap::from([
            ("Raio-X Estranho".to_string(), ExamCategory::Total2d),
            ("Outro".to_string(), ExamCategory::Partial2d),
        ]);
        let err = workflow.resolve(&choices, &mut store).unwrap_err();
        assert!(matches!(err, BillingError::UnexpectedResolution(names) if names == vec!["Outro"]));
        assert_eq!(workflow, before);
        assert!(store.is_empty());
    }

    #[test]
    fn test_cancel_discards_without_persisting() {
        let mut workflow = ResolutionWorkflow::new();
        workflow
            .submit(strange_batch(), &CustomMappings::new(), PendingUploadPolicy::Reject)
            .unwrap();

        assert_eq!(workflow.cancel().unwrap(), 2);
        assert_eq!(workflow, ResolutionWorkflow::Idle);
        assert!(workflow.unknown_types().is_empty());
    }

    #[test]
    fn test_nothing_pending() {
        let mut workflow = ResolutionWorkflow::new();
        let mut store = InMemoryMappingStore::new();
        assert!(matches!(workflow.cancel(), Err(BillingError::NoPendingBatch)));
        assert!(matches!(
            workflow.resolve(&BTreeMap::new(), &mut store),
            Err(BillingError::NoPendingBatch)
        ));
    }

    #[test]
    fn test_reject_policy_keeps_pending_batch() {
        let mut workflow = ResolutionWorkflow::new();
        workflow
            .submit(strange_batch(), &CustomMappings::new(), PendingUploadPolicy::Reject)
            .unwrap();
        let before = workflow.clone();

        let err = workflow
            .submit(
                vec![UploadedRow::new("Ana", "Laudo Ilustrado", "A")],
                &CustomMappings::new(),
                PendingUploadPolicy::Reject,
            )
            .unwrap_err();
        assert!(matches!(err, BillingError::ResolutionInProgress { pending: 1 }));
        assert_eq!(workflow, before);
    }

    #[test]
    fn test_replace_policy_evaluates_new_batch() {
        let mut workflow = ResolutionWorkflow::new();
        workflow
            .submit(strange_batch(), &CustomMappings::new(), PendingUploadPolicy::Replace)
            .unwrap();

        let rows = vec![UploadedRow::new("Ana", "Laudo Ilustrado", "A")];
        let outcome = workflow
            .submit(rows.clone(), &CustomMappings::new(), PendingUploadPolicy::Replace)
            .unwrap();
        assert_eq!(outcome, UploadOutcome::Accepted(rows));
        assert_eq!(workflow, ResolutionWorkflow::Resolved);
    }

    #[test]
    fn test_existing_override_prevents_resolution() {
        let overrides =
            CustomMappings::from_mappings(&[CustomMapping::new("Raio-X Estranho", ExamCategory::Partial2d)]);
        let mut workflow = ResolutionWorkflow::new();
        let outcome = workflow
            .submit(strange_batch(), &overrides, PendingUploadPolicy::Reject)
            .unwrap();
        assert!(matches!(outcome, UploadOutcome::Accepted(_)));
    }
}
