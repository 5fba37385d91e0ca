//! AI budgeting insights: domain types, prompt assembly, and tolerant
//! parsing of model output.
//!
//! Generative models wrap JSON in prose, Markdown fences, smart quotes, and
//! trailing commas. The extraction here mirrors what the model actually
//! sends back rather than what it was asked for.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::analytics::{CategoryTotal, FinancialSummary};
use crate::store::insights::InsightStore;

/// Cached insights stay valid for a day.
pub const INSIGHT_TTL_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("AI provider rate limit exceeded")]
    RateLimited,
    #[error("AI request failed: {0}")]
    Request(String),
    #[error("AI response had no usable content")]
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetInsight {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSet {
    pub insights: Vec<BudgetInsight>,
    /// Epoch milliseconds of generation.
    pub last_updated: i64,
}

impl InsightSet {
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms - self.last_updated < INSIGHT_TTL_MS
    }

    /// The hardcoded stand-in used whenever a usable response cannot be
    /// obtained.
    pub fn fallback(now_ms: i64) -> Self {
        InsightSet {
            insights: vec![BudgetInsight {
                title: "Insights unavailable".to_string(),
                body: "We could not generate fresh insights right now. \
                       Try again later."
                    .to_string(),
                category: None,
            }],
            last_updated: now_ms,
        }
    }
}

#[async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Returns the model's raw text for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, InsightError>;
}

pub fn build_prompt(
    summary: &FinancialSummary,
    breakdown: &[CategoryTotal],
    base_currency: &str,
) -> String {
    let mut prompt = format!(
        "You are a budgeting assistant for a digital nomad. All figures are \
         in {base_currency}. Income: {:.2}. Expenses: {:.2}. Balance: {:.2}.\n",
        summary.income, summary.expenses, summary.balance
    );
    if !breakdown.is_empty() {
        prompt.push_str("Spending by category:\n");
        for category in breakdown {
            prompt.push_str(&format!(
                "- {}: {:.2} ({:.1}%)\n",
                category.category, category.total, category.percentage
            ));
        }
    }
    prompt.push_str(
        "Reply with a JSON array of at most 4 objects, each with \
         \"title\" and \"body\" string fields and an optional \"category\" \
         field. No other text.",
    );
    prompt
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InsightPayload {
    Wrapped { insights: Vec<BudgetInsight> },
    Bare(Vec<BudgetInsight>),
}

/// Parses model output into insights, tolerating prose wrapping, code
/// fences, smart quotes, and trailing commas.
pub fn parse_insights(text: &str) -> Option<Vec<BudgetInsight>> {
    let candidate = extract_json(text)?;
    let cleaned = clean_json(&candidate);
    match serde_json::from_str::<InsightPayload>(&cleaned) {
        Ok(InsightPayload::Wrapped { insights }) | Ok(InsightPayload::Bare(insights)) => {
            Some(insights)
        }
        Err(e) => {
            debug!("Rejected AI payload: {e}");
            None
        }
    }
}

/// The first code-fenced block if any, otherwise the widest bare JSON
/// object or array.
fn extract_json(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```") {
        let after_fence = &text[start + 3..];
        // Skip an optional language tag on the fence line.
        let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after_fence[body_start..];
        if let Some(end) = body.find("```") {
            return Some(body[..end].trim());
        }
    }

    let object_start = text.find('{');
    let array_start = text.find('[');
    let (open, close) = match (object_start, array_start) {
        (Some(o), Some(a)) if a < o => (a, ']'),
        (Some(o), _) => (o, '}'),
        (None, Some(a)) => (a, ']'),
        (None, None) => return None,
    };
    let end = text.rfind(close)?;
    if end < open {
        return None;
    }
    Some(text[open..=end].trim())
}

/// Normalizes smart quotes and removes trailing commas outside string
/// literals.
fn clean_json(raw: &str) -> String {
    let requoted: String = raw
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            other => other,
        })
        .collect();

    let mut out = String::with_capacity(requoted.len());
    let mut in_string = false;
    let mut escaped = false;
    let chars: Vec<char> = requoted.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next_significant = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next_significant, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Cache-first insight retrieval with graceful degradation.
///
/// The returned error, when present, is informational (a dismissable
/// notice); a usable insight set is always returned.
pub struct InsightService {
    generator: Arc<dyn InsightGenerator>,
    store: Option<InsightStore>,
}

impl InsightService {
    pub fn new(generator: Arc<dyn InsightGenerator>, store: Option<InsightStore>) -> Self {
        InsightService { generator, store }
    }

    pub async fn budgeting_insights(
        &self,
        summary: &FinancialSummary,
        breakdown: &[CategoryTotal],
        base_currency: &str,
    ) -> (InsightSet, Option<InsightError>) {
        let now_ms = Utc::now().timestamp_millis();
        let cached = self.store.as_ref().and_then(|store| store.load());

        if let Some(set) = &cached {
            if set.is_fresh(now_ms) {
                debug!("Serving insights from cache");
                return (set.clone(), None);
            }
        }

        let prompt = build_prompt(summary, breakdown, base_currency);
        match self.generator.generate(&prompt).await {
            Ok(text) => match parse_insights(&text) {
                Some(insights) => {
                    let set = InsightSet {
                        insights,
                        last_updated: now_ms,
                    };
                    if let Some(store) = &self.store {
                        if let Err(e) = store.save(&set) {
                            warn!("Failed to persist insights: {e}");
                        }
                    }
                    (set, None)
                }
                None => {
                    warn!("AI response did not contain usable insights");
                    (InsightSet::fallback(now_ms), None)
                }
            },
            Err(InsightError::RateLimited) => {
                warn!("AI provider rate limited; serving stale or fallback insights");
                let set = cached.unwrap_or_else(|| InsightSet::fallback(now_ms));
                (set, Some(InsightError::RateLimited))
            }
            Err(e) => {
                warn!("Insight generation failed: {e}");
                let set = cached.unwrap_or_else(|| InsightSet::fallback(now_ms));
                (set, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_parse_bare_array() {
        let text = r#"[{"title": "Cut food costs", "body": "Eat in more."}]"#;
        let insights = parse_insights(text).unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].title, "Cut food costs");
    }

    #[test]
    fn test_parse_fenced_payload() {
        let text = "Here you go:\n```json\n{\"insights\": [{\"title\": \"T\", \"body\": \"B\"}]}\n```\nHope that helps!";
        let insights = parse_insights(text).unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].title, "T");
    }

    #[test]
    fn test_parse_prose_wrapped_object() {
        let text = r#"Sure! {"insights": [{"title": "T", "body": "B"}]} Let me know."#;
        assert!(parse_insights(text).is_some());
    }

    #[test]
    fn test_parse_tolerates_trailing_commas_and_smart_quotes() {
        let text = "[{\u{201C}title\u{201D}: \u{201C}T\u{201D}, \u{201C}body\u{201D}: \u{201C}B\u{201D},},]";
        let insights = parse_insights(text).unwrap();
        assert_eq!(insights[0].title, "T");
        assert_eq!(insights[0].body, "B");
    }

    #[test]
    fn test_commas_inside_strings_survive_cleanup() {
        let text = r#"[{"title": "One, two", "body": "Keep commas, always."}]"#;
        let insights = parse_insights(text).unwrap();
        assert_eq!(insights[0].title, "One, two");
    }

    #[test]
    fn test_garbage_yields_none() {
        assert!(parse_insights("no json here").is_none());
        assert!(parse_insights("{not valid json}").is_none());
    }

    #[test]
    fn test_freshness_window() {
        let set = InsightSet {
            insights: vec![],
            last_updated: 1_000,
        };
        assert!(set.is_fresh(1_000 + INSIGHT_TTL_MS - 1));
        assert!(!set.is_fresh(1_000 + INSIGHT_TTL_MS));
    }

    struct ScriptedGenerator {
        response: Result<String, ()>,
        rate_limited: bool,
    }

    #[async_trait]
    impl InsightGenerator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, InsightError> {
            if self.rate_limited {
                return Err(InsightError::RateLimited);
            }
            self.response
                .clone()
                .map_err(|_| InsightError::Request("scripted failure".to_string()))
        }
    }

    fn summary() -> FinancialSummary {
        FinancialSummary {
            income: 2500.0,
            expenses: 1800.0,
            balance: 700.0,
        }
    }

    #[tokio::test]
    async fn test_service_returns_parsed_insights() {
        let generator = ScriptedGenerator {
            response: Ok(r#"[{"title": "T", "body": "B"}]"#.to_string()),
            rate_limited: false,
        };
        let service = InsightService::new(Arc::new(generator), None);
        let (set, notice) = service.budgeting_insights(&summary(), &[], "USD").await;
        assert_eq!(set.insights.len(), 1);
        assert!(notice.is_none());
    }

    #[tokio::test]
    async fn test_service_degrades_to_fallback_on_malformed_response() {
        let generator = ScriptedGenerator {
            response: Ok("I cannot produce JSON today.".to_string()),
            rate_limited: false,
        };
        let service = InsightService::new(Arc::new(generator), None);
        let (set, notice) = service.budgeting_insights(&summary(), &[], "USD").await;
        assert_eq!(set.insights[0].title, "Insights unavailable");
        assert!(notice.is_none());
    }

    #[tokio::test]
    async fn test_service_surfaces_rate_limit_as_notice() {
        let generator = ScriptedGenerator {
            response: Ok(String::new()),
            rate_limited: true,
        };
        let service = InsightService::new(Arc::new(generator), None);
        let (set, notice) = service.budgeting_insights(&summary(), &[], "USD").await;
        assert_eq!(set.insights[0].title, "Insights unavailable");
        assert!(matches!(notice, Some(InsightError::RateLimited)));
    }

    #[test]
    fn test_prompt_mentions_base_currency_and_categories() {
        let breakdown = vec![CategoryTotal {
            category: "Food".to_string(),
            total: 300.0,
            percentage: 60.0,
        }];
        let prompt = build_prompt(&summary(), &breakdown, "EUR");
        assert!(prompt.contains("EUR"));
        assert!(prompt.contains("Food"));
        assert!(prompt.contains("JSON"));
    }
}
