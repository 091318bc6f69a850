use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{Classification, Clinic, ExamCategory, PriceTable, SpecialistPrice};
use crate::text::lookup_key;

/// Unit price of a classification under the given table.
///
/// Not-chargeable and uncategorized exams always cost zero.
pub fn price_for(classification: Classification, table: &PriceTable) -> Decimal {
    match classification {
        Classification::Mapped(ExamCategory::Total2d) => table.total_2d,
        Classification::Mapped(ExamCategory::Partial2d) => table.partial_2d,
        Classification::Mapped(ExamCategory::Partial3d) => table.partial_3d,
        Classification::Mapped(ExamCategory::Total3d) => table.total_3d,
        Classification::Mapped(ExamCategory::NotChargeable) | Classification::Uncategorized => {
            Decimal::ZERO
        }
    }
}

/// Where a resolved price table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource<'a> {
    Specialist(&'a PriceTable),
    Clinic(&'a PriceTable),
}

impl<'a> PriceSource<'a> {
    pub fn table(self) -> &'a PriceTable {
        match self {
            PriceSource::Specialist(table) | PriceSource::Clinic(table) => table,
        }
    }
}

/// Price tables indexed by normalized clinic and specialist names
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    clinics: HashMap<String, PriceTable>,
    specialists: HashMap<(String, String), PriceTable>,
}

impl PriceBook {
    pub fn new(clinics: &[Clinic], specialist_prices: &[SpecialistPrice]) -> Self {
        let mut book = Self::default();

        for clinic in clinics {
            if book.clinics.insert(lookup_key(&clinic.name), clinic.prices).is_some() {
                warn!(clinic = %clinic.name, "Duplicate clinic price table, keeping the last one");
            }
        }

        for price in specialist_prices {
            let key = (lookup_key(&price.clinic_name), lookup_key(&price.specialist_name));
            if book.specialists.insert(key, price.prices).is_some() {
                warn!(
                    clinic = %price.clinic_name,
                    specialist = %price.specialist_name,
                    "Duplicate specialist price table, keeping the last one"
                );
            }
        }

        book
    }

    /// Resolves the table for a clinic/specialist pair.
    ///
    /// A specialist override takes precedence over the clinic default; there is
    /// no further fallback.
    pub fn resolve(&self, clinic: &str, specialist: &str) -> Option<PriceSource<'_>> {
        let clinic_key = lookup_key(clinic);
        let specialist_key = lookup_key(specialist);

        if let Some(table) = self.specialists.get(&(clinic_key.clone(), specialist_key)) {
            return Some(PriceSource::Specialist(table));
        }

        self.clinics.get(&clinic_key).map(PriceSource::Clinic)
    }
}
