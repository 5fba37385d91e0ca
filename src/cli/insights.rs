use super::ui;
use crate::core::ConversionService;
use crate::core::analytics::{category_breakdown, financial_summary};
use crate::core::insights::{InsightError, InsightService};
use crate::core::reconcile::reconcile;
use crate::core::transaction::Transaction;
use anyhow::Result;

pub async fn run(
    transactions: &[Transaction],
    converter: &ConversionService,
    insight_service: &InsightService,
    base_currency: &str,
) -> Result<()> {
    let spinner = ui::new_spinner("Resolving exchange rates...");
    let converted = reconcile(transactions, base_currency, converter).await;
    spinner.finish_and_clear();

    let summary = financial_summary(&converted);
    let breakdown = category_breakdown(&converted);

    let spinner = ui::new_spinner("Generating insights...");
    let (set, notice) = insight_service
        .budgeting_insights(&summary, &breakdown, base_currency)
        .await;
    spinner.finish_and_clear();

    if let Some(InsightError::RateLimited) = notice {
        println!(
            "{}\n",
            ui::style_text(
                "AI provider is rate limiting requests; showing the most recent insights.",
                ui::StyleType::Error
            )
        );
    }

    println!("{}", ui::style_text("Budgeting insights", ui::StyleType::Title));
    for insight in &set.insights {
        println!(
            "\n{}",
            ui::style_text(&insight.title, ui::StyleType::TotalLabel)
        );
        if let Some(category) = &insight.category {
            println!("{}", ui::style_text(category, ui::StyleType::Subtle));
        }
        println!("{}", insight.body);
    }
    Ok(())
}
