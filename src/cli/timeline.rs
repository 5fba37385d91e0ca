use super::ui;
use crate::core::ConversionService;
use crate::core::analytics::daily_series;
use crate::core::reconcile::reconcile;
use crate::core::transaction::Transaction;
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(
    transactions: &[Transaction],
    converter: &ConversionService,
    base_currency: &str,
) -> Result<()> {
    let spinner = ui::new_spinner("Resolving exchange rates...");
    let converted = reconcile(transactions, base_currency, converter).await;
    spinner.finish_and_clear();

    let series = daily_series(&converted);

    println!(
        "{}\n",
        ui::style_text(
            &format!("Daily income and expenses ({base_currency})"),
            ui::StyleType::Title
        )
    );

    if series.is_empty() {
        println!(
            "{}",
            ui::style_text("No transactions recorded yet.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Day"),
        ui::header_cell("Income"),
        ui::header_cell("Expenses"),
    ]);
    for point in &series {
        table.add_row(vec![
            Cell::new(&point.label),
            ui::money_cell(point.income, base_currency),
            ui::money_cell(point.expenses, base_currency),
        ]);
    }
    println!("{table}");
    Ok(())
}
