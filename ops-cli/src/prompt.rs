use std::collections::BTreeMap;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};
use exam_billing::{ExamCategory, UnknownExamType};

/// Asks the operator for a category per unknown exam type.
///
/// Returns `None` when the operator declines to save, in which case the
/// pending upload should be cancelled.
pub fn choose_categories(
    unknown: &[UnknownExamType],
    suggested: ExamCategory,
) -> Result<Option<BTreeMap<String, ExamCategory>>, dialoguer::Error> {
    let theme = ColorfulTheme::default();
    let items: Vec<String> = ExamCategory::ALL
        .iter()
        .map(|category| format!("{} ({})", category.label(), category.description()))
        .collect();
    let default = ExamCategory::ALL
        .iter()
        .position(|category| *category == suggested)
        .unwrap_or(0);

    let mut choices = BTreeMap::new();
    for exam_type in unknown {
        let selected = Select::with_theme(&theme)
            .with_prompt(format!("{} ({}x)", exam_type.name, exam_type.count))
            .items(&items)
            .default(default)
            .interact()?;
        let category = ExamCategory::ALL.get(selected).copied().unwrap_or(suggested);
        choices.insert(exam_type.name.clone(), category);
    }

    let save = Confirm::with_theme(&theme)
        .with_prompt("Salvar mapeamentos e processar o arquivo?")
        .default(true)
        .interact()?;

    Ok(save.then_some(choices))
}
