use super::ui;
use crate::core::ConversionService;
use crate::core::analytics::time_of_day_breakdown;
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

    let buckets = time_of_day_breakdown(&converted);

    println!(
        "{}\n",
        ui::style_text(
            &format!("Spending by time of day ({base_currency})"),
            ui::StyleType::Title
        )
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Window"), ui::header_cell("Spent")]);
    for (window, total) in &buckets {
        table.add_row(vec![
            Cell::new(window.to_string()),
            ui::money_cell(*total, base_currency),
        ]);
    }
    println!("{table}");
    Ok(())
}
