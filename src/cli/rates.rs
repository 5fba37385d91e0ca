use super::ui;
use crate::core::ConversionService;
use crate::core::registry::currency_info;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

pub async fn run(converter: &ConversionService, base_currency: &str) -> Result<()> {
    let spinner = ui::new_spinner("Fetching latest rates...");
    let table_data = converter.latest_rates(base_currency).await;
    spinner.finish_and_clear();

    let table_data = table_data?;

    let date = table_data
        .date
        .map_or("today".to_string(), |d| d.to_string());
    println!(
        "{}\n",
        ui::style_text(
            &format!("Exchange rates for 1 {base_currency} ({date})"),
            ui::StyleType::Title
        )
    );

    let mut codes: Vec<&String> = table_data.rates.keys().collect();
    codes.sort();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Name"),
        ui::header_cell("Rate"),
    ]);
    for code in codes {
        let name = currency_info(code).map_or("", |info| info.name);
        let rate = table_data.rates[code];
        table.add_row(vec![
            Cell::new(code),
            Cell::new(name),
            Cell::new(format!("{rate:.4}")).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
    Ok(())
}
