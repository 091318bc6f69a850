//! Upload parsing: CSV spreadsheets exported by the reporting system, or JSON
//! row arrays.
//!
//! CSV headers are matched case-insensitively with accents folded, against a
//! small alias list per column. Cell values are only trimmed; exam types in
//! particular keep their accents and casing.

use std::path::Path;

use exam_billing::text::fold_diacritics;
use exam_billing::UploadedRow;
use logger_redacted::scrub;
use tracing::{debug, warn};

use crate::error::{OpsError, OpsResult};

const PATIENT_ALIASES: &[&str] = &["paciente", "patient", "nome", "name"];
const EXAM_TYPE_ALIASES: &[&str] = &[
    "tipo de analise",
    "tipo_exame",
    "tipo exame",
    "exam_type",
    "exame",
];
const CLINIC_ALIASES: &[&str] = &["clinica", "unidade", "unit"];
const SPECIALIST_ALIASES: &[&str] = &[
    "especialista",
    "radiologista",
    "radiologist",
    "medico",
    "doctor",
];
const QUANTITY_ALIASES: &[&str] = &["quantidade", "qtd", "qty", "quantity"];

/// Reads upload rows from a `.csv` or `.json` file.
pub fn load_rows(path: &Path) -> OpsResult<Vec<UploadedRow>> {
    let content = std::fs::read_to_string(path).map_err(|source| OpsError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let rows = match extension(path).as_deref() {
        Some("csv") => parse_csv(&content).map_err(|err| match err {
            OpsError::EmptyFile(_) => OpsError::EmptyFile(path.to_path_buf()),
            other => other,
        })?,
        Some("json") => serde_json::from_str(&content).map_err(|e| OpsError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?,
        _ => return Err(OpsError::UnsupportedFormat(path.to_path_buf())),
    };

    debug!(path = %path.display(), rows = rows.len(), "Upload rows loaded");
    Ok(rows)
}

pub(crate) fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

fn normalize_header(header: &str) -> String {
    fold_diacritics(header.trim()).to_lowercase()
}

fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|header| aliases.iter().any(|alias| header == alias))
}

/// Parses CSV text with a header line.
///
/// Fields are split on every comma; quoting is not interpreted. Patient, exam
/// type and clinic columns are required. A missing or non-numeric quantity
/// leaves the quantity absent, which bills as one exam.
pub fn parse_csv(content: &str) -> OpsResult<Vec<UploadedRow>> {
    let mut lines = content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty());

    let header_line = lines
        .next()
        .ok_or_else(|| OpsError::EmptyFile("<csv>".into()))?;
    let headers: Vec<String> = header_line.split(',').map(normalize_header).collect();

    let patient = find_column(&headers, PATIENT_ALIASES);
    let exam_type = find_column(&headers, EXAM_TYPE_ALIASES);
    let clinic = find_column(&headers, CLINIC_ALIASES);
    let specialist = find_column(&headers, SPECIALIST_ALIASES);
    let quantity = find_column(&headers, QUANTITY_ALIASES);

    let (Some(patient), Some(exam_type), Some(clinic)) = (patient, exam_type, clinic) else {
        let missing = [
            (patient, "Paciente"),
            (exam_type, "Tipo de análise"),
            (clinic, "Clínica"),
        ]
        .into_iter()
        .filter(|(column, _)| column.is_none())
        .map(|(_, name)| name.to_string())
        .collect();
        return Err(OpsError::MissingColumns(missing));
    };

    let mut rows = Vec::new();
    for (index, line) in lines.enumerate() {
        let values: Vec<&str> = line.split(',').map(str::trim).collect();
        let cell = |column: usize| values.get(column).copied().unwrap_or_default();

        let row = UploadedRow {
            patient: cell(patient).to_string(),
            exam_type: cell(exam_type).to_string(),
            clinic: cell(clinic).to_string(),
            specialist: specialist
                .map(cell)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            quantity: quantity.and_then(|column| cell(column).parse().ok()),
        };

        if row.exam_type.is_empty() || row.clinic.is_empty() {
            warn!(
                line = index + 2,
                content = %scrub(line),
                "Row without exam type or clinic"
            );
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(OpsError::EmptyFile("<csv>".into()));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_portuguese_headers() {
        let csv = "Paciente,Tipo de análise,Clínica,Especialista,Quantidade\n\
                   João,Diagnóstico de Panorâmica,Clínica A,Dr. Silva,2\n";
        let rows = parse_csv(csv).unwrap();
        assert_eq!(
            rows,
            vec![UploadedRow::new("João", "Diagnóstico de Panorâmica", "Clínica A")
                .with_specialist("Dr. Silva")
                .with_quantity(2)]
        );
    }

    #[test]
    fn test_header_aliases_and_accents() {
        let csv = "NOME,exame,UNIDADE,Médico,qtd\r\nAna,Laudo Ilustrado,Centro,,abc\r\n";
        let rows = parse_csv(csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].patient, "Ana");
        assert_eq!(rows[0].clinic, "Centro");
        assert_eq!(rows[0].specialist, None);
        assert_eq!(rows[0].quantity, None);
        assert_eq!(rows[0].effective_quantity(), 1);
    }

    #[test]
    fn test_exam_type_values_are_not_folded() {
        let csv = "paciente,tipo de analise,clinica\nAna,  Tomografia da Mandíbula ,A\n";
        let rows = parse_csv(csv).unwrap();
        assert_eq!(rows[0].exam_type, "Tomografia da Mandíbula");
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let rows = parse_csv("Paciente,Tipo de análise,Clínica\nAna,Laudo Ilustrado,A\n").unwrap();
        assert_eq!(rows[0].specialist, None);
        assert_eq!(rows[0].quantity, None);
    }

    #[test]
    fn test_missing_required_columns() {
        let err = parse_csv("Paciente,Especialista\nAna,Dr. Silva\n").unwrap_err();
        match err {
            OpsError::MissingColumns(columns) => {
                assert_eq!(columns, vec!["Tipo de análise", "Clínica"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(matches!(
            parse_csv("Paciente,Tipo de análise,Clínica\n\n"),
            Err(OpsError::EmptyFile(_))
        ));
        assert!(matches!(parse_csv(""), Err(OpsError::EmptyFile(_))));
    }
}
