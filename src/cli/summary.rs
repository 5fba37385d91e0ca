use super::ui;
use crate::core::ConversionService;
use crate::core::analytics::financial_summary;
use crate::core::reconcile::reconcile;
use crate::core::registry::format_amount;
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

    let summary = financial_summary(&converted);

    println!(
        "{}\n",
        ui::style_text(&format!("Overview ({base_currency})"), ui::StyleType::Title)
    );
    println!(
        "Income:   {}",
        ui::style_text(
            &format_amount(summary.income, base_currency),
            ui::StyleType::TotalValue
        )
    );
    println!(
        "Expenses: {}",
        ui::style_text(
            &format_amount(-summary.expenses, base_currency),
            ui::StyleType::Error
        )
    );
    println!(
        "Balance:  {}",
        ui::style_text(
            &format_amount(summary.balance, base_currency),
            ui::StyleType::TotalLabel
        )
    );

    if converted.is_empty() {
        println!(
            "\n{}",
            ui::style_text("No transactions recorded yet.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Category"),
        ui::header_cell("Location"),
        ui::header_cell("Amount"),
        ui::header_cell(&format!("Amount ({base_currency})")),
    ]);

    for tx in &converted {
        let location = tx.location.as_deref().unwrap_or("—");
        table.add_row(vec![
            Cell::new(tx.date.format("%Y-%m-%d").to_string()),
            Cell::new(&tx.category),
            Cell::new(location),
            ui::amount_cell(tx.amount, &tx.currency),
            ui::amount_cell(tx.effective_amount(), base_currency),
        ]);
    }

    println!("\n{table}");
    Ok(())
}
