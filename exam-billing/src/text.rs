//! Name normalization and ordering helpers.
//!
//! Two different normalizations live here and must not be confused:
//! [`lookup_key`] is the join key for clinic and specialist names, while
//! [`fold_diacritics`] is only ever applied to column headers and to sort keys.
//! Exam-type values are never folded.

use std::cmp::Ordering;

/// Join key for clinic and specialist names: trimmed and lowercased.
pub fn lookup_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Replaces accented Latin letters with their base letter.
pub fn fold_diacritics(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        other => other,
    }
}

/// Locale-aware ordering for display names.
///
/// Names compare first by their accent- and case-folded form, so "Clínica B"
/// sorts after "clinica a"; exact ties in the folded form fall back to the raw
/// strings, which keeps the ordering total.
pub fn collate(a: &str, b: &str) -> Ordering {
    let folded_a = fold_diacritics(a).to_lowercase();
    let folded_b = fold_diacritics(b).to_lowercase();
    folded_a.cmp(&folded_b).then_with(|| a.cmp(b))
}
