use colored::*;
use exam_billing::{
    built_in_exam_types, ExamCategory, SpecialistSummary, StoredMapping, TotalsReport,
    UnknownExamType,
};
use rust_decimal::{Decimal, RoundingStrategy};

/// Formats an amount as Brazilian reais: `R$ 1.234,56`.
pub fn format_brl(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", rounded.abs());
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}R$ {grouped},{fraction}")
}

pub fn print_totals(report: &TotalsReport, filtered: bool) {
    let title = if filtered {
        "Totais (filtrados)"
    } else {
        "Totais"
    };
    println!("{}", title.bright_cyan().bold());

    if report.clinics.is_empty() {
        println!("  {}", "Nenhum laudo a exibir".dimmed());
    }

    for clinic in &report.clinics {
        println!(
            "  {} {}",
            clinic.clinic.bold(),
            format_brl(clinic.total).green()
        );
        for specialist in &clinic.specialists {
            println!(
                "    {:<32} {:>6} laudo(s)  {}",
                specialist.specialist,
                specialist.count,
                format_brl(specialist.total)
            );
        }
    }

    println!(
        "{} {}",
        "Total geral:".bold(),
        format_brl(report.grand_total).green().bold()
    );
}

pub fn print_missing_prices(clinics: &[String]) {
    if clinics.is_empty() {
        return;
    }
    println!();
    println!("{}", "Atenção: clínicas sem preço configurado".yellow().bold());
    for clinic in clinics {
        println!("  - {}", clinic.yellow());
    }
}

pub fn print_invoice(summary: &[SpecialistSummary]) {
    println!();
    println!("{}", "Fatura por especialista".bright_cyan().bold());
    for specialist in summary {
        println!(
            "  {} {}",
            specialist.specialist.bold(),
            format_brl(specialist.total).green()
        );
        for clinic in &specialist.clinics {
            println!("    {:<32} {}", clinic.clinic, format_brl(clinic.total));
        }
    }
}

pub fn print_unknown_types(unknown: &[UnknownExamType]) {
    println!(
        "{}",
        format!("{} tipo(s) de exame não reconhecido(s)", unknown.len())
            .yellow()
            .bold()
    );
    for exam_type in unknown {
        println!("  - {} ({}x)", exam_type.name, exam_type.count);
    }
}

pub fn print_mappings(mappings: &[StoredMapping]) {
    if mappings.is_empty() {
        println!("{}", "Nenhum mapeamento personalizado".dimmed());
        return;
    }
    for mapping in mappings {
        println!(
            "{:<40} {:<12} {}",
            mapping.original_name,
            mapping.mapped_category.to_string().cyan(),
            mapping.updated_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
    }
}

pub fn print_exam_types() {
    for (category, names) in built_in_exam_types() {
        println!("{} {}", category.label().bold(), category.description().dimmed());
        for name in names {
            println!("  - {name}");
        }
    }
    println!(
        "{} {}",
        ExamCategory::NotChargeable.label().bold(),
        "(somente por mapeamento personalizado)".dimmed()
    );
}
