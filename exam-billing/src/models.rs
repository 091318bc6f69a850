use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BillingError;

/// Label of the transient "no category" classification result.
pub const UNCATEGORIZED_LABEL: &str = "Sem Categoria";

/// Specialist name used when an uploaded row carries none.
pub const UNSPECIFIED_SPECIALIST: &str = "Não especificado";

/// Billing category of an exam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExamCategory {
    #[serde(rename = "2D Total")]
    Total2d,
    #[serde(rename = "2D Parcial")]
    Partial2d,
    #[serde(rename = "3D Parcial")]
    Partial3d,
    #[serde(rename = "3D Total")]
    Total3d,
    #[serde(rename = "Não Cobrar")]
    NotChargeable,
}

impl ExamCategory {
    /// Every category, in the order offered when resolving unknown exam types.
    pub const ALL: [ExamCategory; 5] = [
        ExamCategory::Total2d,
        ExamCategory::Partial2d,
        ExamCategory::Total3d,
        ExamCategory::Partial3d,
        ExamCategory::NotChargeable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ExamCategory::Total2d => "2D Total",
            ExamCategory::Partial2d => "2D Parcial",
            ExamCategory::Partial3d => "3D Parcial",
            ExamCategory::Total3d => "3D Total",
            ExamCategory::NotChargeable => "Não Cobrar",
        }
    }

    /// Short hint shown next to the category when an operator maps an unknown exam type.
    pub fn description(self) -> &'static str {
        match self {
            ExamCategory::Total2d => "Panorâmica, Boca Toda, Ilustrado, Idade Óssea, Cefalometria",
            ExamCategory::Partial2d => "Periapical, Bite Wing",
            ExamCategory::Total3d => "Tomografia Maxila, Mandíbula",
            ExamCategory::Partial3d => "Tomografia até 2, 4 ou 6 dentes",
            ExamCategory::NotChargeable => {
                "Este tipo de exame não será incluído nos cálculos de valores"
            }
        }
    }
}

impl fmt::Display for ExamCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExamCategory {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ExamCategory::ALL
            .into_iter()
            .find(|category| category.label() == trimmed)
            .ok_or_else(|| BillingError::UnknownCategory(trimmed.to_string()))
    }
}

/// Outcome of classifying a raw exam type.
///
/// `Uncategorized` only ever exists as a transient result; persisted mappings
/// always carry an [`ExamCategory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Classification {
    Mapped(ExamCategory),
    Uncategorized,
}

impl Classification {
    pub fn category(self) -> Option<ExamCategory> {
        match self {
            Classification::Mapped(category) => Some(category),
            Classification::Uncategorized => None,
        }
    }

    pub fn is_uncategorized(self) -> bool {
        self == Classification::Uncategorized
    }

    pub fn label(self) -> &'static str {
        match self {
            Classification::Mapped(category) => category.label(),
            Classification::Uncategorized => UNCATEGORIZED_LABEL,
        }
    }
}

impl From<ExamCategory> for Classification {
    fn from(category: ExamCategory) -> Self {
        Classification::Mapped(category)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Classification {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == UNCATEGORIZED_LABEL {
            Ok(Classification::Uncategorized)
        } else {
            s.parse().map(Classification::Mapped)
        }
    }
}

impl TryFrom<String> for Classification {
    type Error = BillingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Classification> for String {
    fn from(value: Classification) -> Self {
        value.label().to_string()
    }
}

/// Row handed over by the upload parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedRow {
    pub patient: String,
    pub exam_type: String,
    pub clinic: String,
    #[serde(default)]
    pub specialist: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl UploadedRow {
    pub fn new(patient: &str, exam_type: &str, clinic: &str) -> Self {
        Self {
            patient: patient.to_string(),
            exam_type: exam_type.to_string(),
            clinic: clinic.to_string(),
            specialist: None,
            quantity: None,
        }
    }

    pub fn with_specialist(mut self, specialist: &str) -> Self {
        self.specialist = Some(specialist.to_string());
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Quantity billed for this row; absent or zero quantities count as one exam.
    pub fn effective_quantity(&self) -> u32 {
        self.quantity.filter(|quantity| *quantity > 0).unwrap_or(1)
    }
}

/// Unit prices for the four chargeable categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTable {
    #[serde(default, rename = "price_2d_total")]
    pub total_2d: Decimal,
    #[serde(default, rename = "price_2d_partial")]
    pub partial_2d: Decimal,
    #[serde(default, rename = "price_3d_total")]
    pub total_3d: Decimal,
    #[serde(default, rename = "price_3d_partial")]
    pub partial_3d: Decimal,
}

/// Clinic with its default price table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clinic {
    pub name: String,
    #[serde(flatten)]
    pub prices: PriceTable,
}

impl Clinic {
    pub fn new(name: &str, prices: PriceTable) -> Self {
        Self {
            name: name.to_string(),
            prices,
        }
    }
}

/// Price override for one specialist at one clinic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialistPrice {
    pub clinic_name: String,
    pub specialist_name: String,
    #[serde(flatten)]
    pub prices: PriceTable,
}

impl SpecialistPrice {
    pub fn new(clinic_name: &str, specialist_name: &str, prices: PriceTable) -> Self {
        Self {
            clinic_name: clinic_name.to_string(),
            specialist_name: specialist_name.to_string(),
            prices,
        }
    }
}

/// Operator-defined exam type to category mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomMapping {
    pub original_name: String,
    pub mapped_category: ExamCategory,
}

impl CustomMapping {
    pub fn new(original_name: &str, mapped_category: ExamCategory) -> Self {
        Self {
            original_name: original_name.to_string(),
            mapped_category,
        }
    }
}

/// Custom mapping as kept by a mapping store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMapping {
    pub id: Uuid,
    pub original_name: String,
    pub mapped_category: ExamCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredMapping {
    pub fn to_mapping(&self) -> CustomMapping {
        CustomMapping {
            original_name: self.original_name.clone(),
            mapped_category: self.mapped_category,
        }
    }
}

/// Priced exam derived from one uploaded row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamRecord {
    pub patient: String,
    pub exam_type: String,
    pub clinic: String,
    pub category: Classification,
    pub specialist: String,
    pub quantity: u32,
    pub value: Decimal,
    pub has_price: bool,
    pub not_chargeable: bool,
}

/// Totals for one specialist within a clinic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialistTotal {
    pub specialist: String,
    pub total: Decimal,
    pub count: u64,
}

/// Totals for one clinic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicTotal {
    pub clinic: String,
    pub total: Decimal,
    pub specialists: Vec<SpecialistTotal>,
}

/// Clinic→specialist totals tree with its grand total
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsReport {
    pub clinics: Vec<ClinicTotal>,
    pub grand_total: Decimal,
}

/// Exam type that matched neither a custom mapping nor a built-in list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownExamType {
    pub name: String,
    pub count: usize,
}
