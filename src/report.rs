use crate::models::{MetricResult, ScraperError};
use chrono::NaiveDateTime;

/// Shown to the user in place of the underlying acquisition error.
pub const FETCH_FAILED: &str = "Fehler beim Datenabruf";

/// Card title for a metric key; unknown keys are shown as-is.
pub fn card_title(key: &str) -> &str {
    match key {
        "Preis" => "Aktueller Preis",
        "KGV" => "KGV (Kurs-Gewinn-Verhältnis)",
        "KBV" => "KBV (Kurs-Buchwert-Verhältnis)",
        "KUV" => "KUV (Kurs-Umsatz-Verhältnis)",
        other => other,
    }
}

pub fn render_cards(result: &MetricResult, updated_at: NaiveDateTime) -> String {
    let mut out = format!("--- {} ---\n", result.name);
    out.push_str(&format!("  {} : {}\n", card_title("Preis"), result.price));
    for metric in &result.metrics {
        out.push_str(&format!("  {} : {}\n", card_title(&metric.key), metric.value));
    }
    out.push_str(&format!(
        "Letzte Aktualisierung: {}\n",
        updated_at.format("%d.%m.%Y %H:%M")
    ));
    out
}

pub fn render_json(results: &[MetricResult]) -> Result<String, ScraperError> {
    Ok(serde_json::to_string_pretty(results)?)
}
