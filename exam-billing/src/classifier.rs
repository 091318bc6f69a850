use std::collections::BTreeMap;

use tracing::warn;

use crate::models::{Classification, CustomMapping, ExamCategory};

/// Built-in 2D Total exam types: full mouth, panoramic, illustrated, bone age
pub const EXAM_TYPES_2D_TOTAL: &[&str] = &[
    "Diagnóstico de Panorâmica",
    "Laudo Ilustrado",
    "Análise Idade Óssea",
    "Diagnóstico de Boca Toda",
    "Cefalometria Lateral",
    "Diagnóstico (Outro)",
];

/// Built-in 2D Parcial exam types: periapical, bite wing
pub const EXAM_TYPES_2D_PARTIAL: &[&str] = &[
    "Diagnóstico de Periapical",
    "Diagnóstico de Interproximal (Bite Wing)",
];

pub const EXAM_TYPES_3D_PARTIAL: &[&str] = &[
    "Tomografia de até 2 dentes",
    "Tomografia de até 4 dentes",
    "Tomografia de até 6 dentes",
];

pub const EXAM_TYPES_3D_TOTAL: &[&str] = &[
    "Tomografia da Maxila",
    "Tomografia da Mandíbula",
    "Tomografia (Outro)",
];

/// Built-in lists in match order.
const BUILT_IN: [(ExamCategory, &[&str]); 4] = [
    (ExamCategory::Total2d, EXAM_TYPES_2D_TOTAL),
    (ExamCategory::Partial2d, EXAM_TYPES_2D_PARTIAL),
    (ExamCategory::Partial3d, EXAM_TYPES_3D_PARTIAL),
    (ExamCategory::Total3d, EXAM_TYPES_3D_TOTAL),
];

/// Built-in exam type names grouped by category.
pub fn built_in_exam_types() -> Vec<(ExamCategory, &'static [&'static str])> {
    BUILT_IN.to_vec()
}

/// Override set consulted before the built-in lists.
///
/// Keys are raw exam-type strings as stored, compared verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomMappings {
    entries: BTreeMap<String, ExamCategory>,
}

impl CustomMappings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the override set; a later mapping for the same name wins.
    pub fn from_mappings<'a, I>(mappings: I) -> Self
    where
        I: IntoIterator<Item = &'a CustomMapping>,
    {
        let mut set = Self::new();
        for mapping in mappings {
            if let Some(previous) = set.insert(&mapping.original_name, mapping.mapped_category) {
                if previous != mapping.mapped_category {
                    warn!(
                        exam_type = %mapping.original_name,
                        previous = %previous,
                        current = %mapping.mapped_category,
                        "Duplicate custom mapping, keeping the last one"
                    );
                }
            }
        }
        set
    }

    /// Inserts or overwrites a mapping, returning the category it replaced.
    pub fn insert(&mut self, original_name: &str, category: ExamCategory) -> Option<ExamCategory> {
        self.entries.insert(original_name.to_string(), category)
    }

    pub fn get(&self, exam_type: &str) -> Option<ExamCategory> {
        self.entries.get(exam_type).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Classifies a raw exam type.
///
/// The trimmed string is looked up verbatim in `overrides` first, then in the
/// built-in lists. Matching is exact and case-sensitive.
pub fn classify(raw_type: &str, overrides: &CustomMappings) -> Classification {
    let exam_type = raw_type.trim();

    if let Some(category) = overrides.get(exam_type) {
        return Classification::Mapped(category);
    }

    BUILT_IN
        .iter()
        .find(|(_, names)| names.iter().any(|name| *name == exam_type))
        .map_or(Classification::Uncategorized, |(category, _)| {
            Classification::Mapped(*category)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_in_types() {
        let none = CustomMappings::new();
        assert_eq!(
            classify("Diagnóstico de Panorâmica", &none),
            Classification::Mapped(ExamCategory::Total2d)
        );
        assert_eq!(
            classify("Diagnóstico de Interproximal (Bite Wing)", &none),
            Classification::Mapped(ExamCategory::Partial2d)
        );
        assert_eq!(
            classify("Tomografia de até 4 dentes", &none),
            Classification::Mapped(ExamCategory::Partial3d)
        );
        assert_eq!(
            classify("Tomografia da Mandíbula", &none),
            Classification::Mapped(ExamCategory::Total3d)
        );
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(
            classify("  Laudo Ilustrado\t", &CustomMappings::new()),
            Classification::Mapped(ExamCategory::Total2d)
        );
    }

    #[test]
    fn test_no_case_or_accent_folding() {
        let none = CustomMappings::new();
        assert_eq!(classify("laudo ilustrado", &none), Classification::Uncategorized);
        assert_eq!(classify("Diagnostico de Panoramica", &none), Classification::Uncategorized);
        assert_eq!(classify("Raio-X Estranho", &none), Classification::Uncategorized);
    }

    #[test]
    fn test_override_wins_over_built_in() {
        let overrides = CustomMappings::from_mappings(&[CustomMapping::new(
            "Laudo Ilustrado",
            ExamCategory::NotChargeable,
        )]);
        assert_eq!(
            classify("Laudo Ilustrado", &overrides),
            Classification::Mapped(ExamCategory::NotChargeable)
        );
    }

    #[test]
    fn test_last_mapping_wins() {
        let overrides = CustomMappings::from_mappings(&[
            CustomMapping::new("Raio-X Estranho", ExamCategory::Total2d),
            CustomMapping::new("Raio-X Estranho", ExamCategory::Partial3d),
        ]);
        assert_eq!(overrides.len(), 1);
        assert_eq!(
            classify("Raio-X Estranho", &overrides),
            Classification::Mapped(ExamCategory::Partial3d)
        );
    }
}
