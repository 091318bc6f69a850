use std::io::{self, Write};

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::ExamRecord;

pub const EXPORT_HEADERS: [&str; 8] = [
    "Paciente",
    "Tipo de Análise",
    "Clínica",
    "Categoria",
    "Valor (R$)",
    "Especialista",
    "Quantidade",
    "Status",
];

const STATUS_PRICED: &str = "Com preço";
const STATUS_UNPRICED: &str = "Sem preço";

/// `laudos_calculados_<YYYY-MM-DD>.csv`
pub fn default_export_file_name(date: NaiveDate) -> String {
    format!("laudos_calculados_{}.csv", date.format("%Y-%m-%d"))
}

/// Writes `records` as comma-separated lines under [`EXPORT_HEADERS`].
///
/// Lines end with `\n`. Fields containing a comma or a double quote are
/// quoted, with inner quotes doubled.
pub fn write_records_csv<W: Write>(mut writer: W, records: &[ExamRecord]) -> io::Result<()> {
    writeln!(writer, "{}", EXPORT_HEADERS.join(","))?;

    for record in records {
        let status = if record.has_price {
            STATUS_PRICED
        } else {
            STATUS_UNPRICED
        };
        let fields = [
            escape_field(&record.patient),
            escape_field(&record.exam_type),
            escape_field(&record.clinic),
            escape_field(record.category.label()),
            format_value(record.value),
            escape_field(&record.specialist),
            record.quantity.to_string(),
            status.to_string(),
        ];
        writeln!(writer, "{}", fields.join(","))?;
    }

    writer.flush()
}

pub fn records_to_csv(records: &[ExamRecord]) -> String {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_records_csv(&mut buffer, records);
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Two decimal places, half away from zero.
fn format_value(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
