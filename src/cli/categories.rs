use super::ui;
use crate::core::ConversionService;
use crate::core::analytics::category_breakdown;
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

    let breakdown = category_breakdown(&converted);

    println!(
        "{}\n",
        ui::style_text(
            &format!("Spending by category ({base_currency})"),
            ui::StyleType::Title
        )
    );

    if breakdown.is_empty() {
        println!(
            "{}",
            ui::style_text("No expenses recorded yet.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("Spent"),
        ui::header_cell("Share"),
    ]);
    for category in &breakdown {
        table.add_row(vec![
            Cell::new(&category.category),
            ui::money_cell(category.total, base_currency),
            ui::percentage_cell(category.percentage),
        ]);
    }
    println!("{table}");
    Ok(())
}
