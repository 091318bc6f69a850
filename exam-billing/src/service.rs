use std::collections::BTreeMap;

use config_engine::{BillingSettings, PendingUploadPolicy};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregation::{aggregate, clinics_missing_prices};
use crate::classifier::CustomMappings;
use crate::error::BillingResult;
use crate::filter::{filter, FilterCriteria, FilterOptions};
use crate::models::*;
use crate::processor::RecordProcessor;
use crate::resolution::{ResolutionWorkflow, UploadOutcome};
use crate::store::MappingStore;

/// Everything the pipeline derives its outputs from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineInputs {
    pub rows: Vec<UploadedRow>,
    pub clinics: Vec<Clinic>,
    pub specialist_prices: Vec<SpecialistPrice>,
    pub custom_mappings: Vec<CustomMapping>,
    pub criteria: FilterCriteria,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOutputs {
    pub records: Vec<ExamRecord>,
    pub totals: TotalsReport,
    pub filtered_records: Vec<ExamRecord>,
    pub filtered_totals: TotalsReport,
    pub filter_active: bool,
    /// Clinics lacking a price among the displayed records
    pub missing_price_clinics: Vec<String>,
    pub filter_options: FilterOptions,
}

impl PipelineOutputs {
    /// Records to show: filtered when any filter is active.
    pub fn display_records(&self) -> &[ExamRecord] {
        if self.filter_active {
            &self.filtered_records
        } else {
            &self.records
        }
    }

    /// Totals to show: filtered when any filter is active.
    pub fn display_totals(&self) -> &TotalsReport {
        if self.filter_active {
            &self.filtered_totals
        } else {
            &self.totals
        }
    }
}

/// Recomputes every output from scratch.
pub fn recompute_all(processor: &RecordProcessor, inputs: &PipelineInputs) -> PipelineOutputs {
    let records = processor.process(
        &inputs.rows,
        &inputs.clinics,
        &inputs.specialist_prices,
        &inputs.custom_mappings,
    );
    let totals = aggregate(&records);
    let filtered_records = filter(&records, &inputs.criteria);
    let filtered_totals = aggregate(&filtered_records);
    let filter_active = inputs.criteria.is_active();
    let missing_price_clinics = if filter_active {
        clinics_missing_prices(&filtered_records)
    } else {
        clinics_missing_prices(&records)
    };

    PipelineOutputs {
        missing_price_clinics,
        filter_options: FilterOptions::from_records(&records),
        filter_active,
        records,
        totals,
        filtered_records,
        filtered_totals,
    }
}

/// Owns the billing session: inputs, resolution workflow and outputs.
///
/// Every mutation recomputes the outputs in full, except while an upload is
/// awaiting resolution, when the previous outputs stay in place.
pub struct BillingService<S: MappingStore> {
    processor: RecordProcessor,
    policy: PendingUploadPolicy,
    suggested_category: ExamCategory,
    store: S,
    workflow: ResolutionWorkflow,
    inputs: PipelineInputs,
    outputs: PipelineOutputs,
}

impl<S: MappingStore> BillingService<S> {
    /// Creates a service with default settings.
    pub fn new(store: S) -> BillingResult<Self> {
        Self::from_settings(&BillingSettings::default(), store)
    }

    pub fn from_settings(settings: &BillingSettings, store: S) -> BillingResult<Self> {
        settings.validate()?;
        let suggested_category: ExamCategory = settings.suggested_category.parse()?;
        let custom_mappings = store.load_mappings()?;
        info!(
            custom_mappings = custom_mappings.len(),
            policy = ?settings.pending_upload_policy,
            "Billing service ready"
        );

        Ok(Self {
            processor: RecordProcessor::new(&settings.unspecified_specialist),
            policy: settings.pending_upload_policy,
            suggested_category,
            store,
            workflow: ResolutionWorkflow::new(),
            inputs: PipelineInputs {
                custom_mappings,
                ..PipelineInputs::default()
            },
            outputs: PipelineOutputs::default(),
        })
    }

    /// Submits a new upload. Accepted rows replace the current rows; otherwise
    /// the upload waits for [`BillingService::save_mappings`] or
    /// [`BillingService::cancel_resolution`].
    pub fn upload(&mut self, rows: Vec<UploadedRow>) -> BillingResult<UploadOutcome> {
        let overrides = CustomMappings::from_mappings(&self.inputs.custom_mappings);
        let outcome = self.workflow.submit(rows, &overrides, self.policy)?;

        if let UploadOutcome::Accepted(rows) = &outcome {
            self.inputs.rows = rows.clone();
            self.recompute();
        }
        Ok(outcome)
    }

    /// Saves one category per pending unknown type and processes the held rows.
    pub fn save_mappings(&mut self, choices: &BTreeMap<String, ExamCategory>) -> BillingResult<()> {
        let rows = self.workflow.resolve(choices, &mut self.store)?;
        self.inputs.custom_mappings = self.store.load_mappings()?;
        self.inputs.rows = rows;
        self.recompute();
        Ok(())
    }

    /// Drops the pending upload; current rows and outputs are left untouched.
    pub fn cancel_resolution(&mut self) -> BillingResult<usize> {
        self.workflow.cancel()
    }

    /// Choices preset to the configured category for the pending unknown types.
    pub fn suggested_choices(&self) -> BTreeMap<String, ExamCategory> {
        self.workflow
            .pending()
            .map(|batch| batch.suggested_choices(self.suggested_category))
            .unwrap_or_default()
    }

    pub fn set_clinics(&mut self, clinics: Vec<Clinic>) {
        self.inputs.clinics = clinics;
        self.recompute();
    }

    pub fn set_specialist_prices(&mut self, specialist_prices: Vec<SpecialistPrice>) {
        self.inputs.specialist_prices = specialist_prices;
        self.recompute();
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.inputs.criteria = criteria;
        self.recompute();
    }

    pub fn outputs(&self) -> &PipelineOutputs {
        &self.outputs
    }

    pub fn inputs(&self) -> &PipelineInputs {
        &self.inputs
    }

    pub fn workflow(&self) -> &ResolutionWorkflow {
        &self.workflow
    }

    pub fn suggested_category(&self) -> ExamCategory {
        self.suggested_category
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn recompute(&mut self) {
        if self.workflow.is_awaiting() {
            debug!("Upload awaiting resolution, keeping previous outputs");
            return;
        }
        self.outputs = recompute_all(&self.processor, &self.inputs);
    }
}
