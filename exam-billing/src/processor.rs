use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use logger_redacted::patient_token;

use crate::classifier::{classify, CustomMappings};
use crate::models::{
    Classification, Clinic, CustomMapping, ExamCategory, ExamRecord, SpecialistPrice, UploadedRow,
    UNSPECIFIED_SPECIALIST,
};
use crate::pricing::{price_for, PriceBook};

/// Turns uploaded rows into priced exam records.
///
/// Processing is a pure function of its inputs and is always rerun in full;
/// records are never patched incrementally.
#[derive(Debug, Clone)]
pub struct RecordProcessor {
    unspecified_specialist: String,
}

impl RecordProcessor {
    /// Creates a processor that records `unspecified_specialist` for rows without a specialist.
    pub fn new(unspecified_specialist: &str) -> Self {
        Self {
            unspecified_specialist: unspecified_specialist.to_string(),
        }
    }

    pub fn process(
        &self,
        rows: &[UploadedRow],
        clinics: &[Clinic],
        specialist_prices: &[SpecialistPrice],
        custom_mappings: &[CustomMapping],
    ) -> Vec<ExamRecord> {
        let book = PriceBook::new(clinics, specialist_prices);
        let overrides = CustomMappings::from_mappings(custom_mappings);
        self.process_with(rows, &book, &overrides)
    }

    /// Same as [`RecordProcessor::process`] with prebuilt lookup structures.
    pub fn process_with(
        &self,
        rows: &[UploadedRow],
        book: &PriceBook,
        overrides: &CustomMappings,
    ) -> Vec<ExamRecord> {
        let records: Vec<ExamRecord> = rows
            .iter()
            .map(|row| self.price_row(row, book, overrides))
            .collect();

        let uncategorized = records.iter().filter(|r| r.category.is_uncategorized()).count();
        let missing_price = records.iter().filter(|r| !r.has_price).count();
        let total = records
            .iter()
            .fold(Decimal::ZERO, |total, r| total.saturating_add(r.value));

        if uncategorized > 0 {
            warn!(uncategorized, "Processed rows without a category");
        }
        info!(
            rows = records.len(),
            missing_price,
            total = %total,
            "Exam records computed"
        );

        records
    }

    fn price_row(&self, row: &UploadedRow, book: &PriceBook, overrides: &CustomMappings) -> ExamRecord {
        let specialist = row
            .specialist
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(self.unspecified_specialist.as_str());
        let quantity = row.effective_quantity();
        let category = classify(&row.exam_type, overrides);

        let (value, has_price) = match category {
            Classification::Mapped(ExamCategory::NotChargeable) => (Decimal::ZERO, true),
            Classification::Uncategorized => (Decimal::ZERO, false),
            Classification::Mapped(_) => match book.resolve(&row.clinic, specialist) {
                Some(source) => {
                    let unit_price = price_for(category, source.table());
                    (
                        unit_price.saturating_mul(Decimal::from(quantity)),
                        unit_price > Decimal::ZERO,
                    )
                }
                None => (Decimal::ZERO, false),
            },
        };

        debug!(
            patient = %patient_token(&row.patient),
            clinic = %row.clinic,
            category = %category,
            value = %value,
            has_price,
            "Row priced"
        );

        ExamRecord {
            patient: row.patient.clone(),
            exam_type: row.exam_type.clone(),
            clinic: row.clinic.clone(),
            category,
            specialist: specialist.to_string(),
            quantity,
            value,
            has_price,
            not_chargeable: category == Classification::Mapped(ExamCategory::NotChargeable),
        }
    }
}

impl Default for RecordProcessor {
    fn default() -> Self {
        Self::new(UNSPECIFIED_SPECIALIST)
    }
}
