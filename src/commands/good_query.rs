use colored::Colorize;

use super::spinner;
use crate::config::AppConfig;
use crate::food::api::openfda::{AdverseEvent, EventQuery, EventResult, OpenFdaClient, SortOrder};
use crate::food::error::FetchError;

pub const INDUSTRY: &str = "Cosmetics";
pub const LIMIT: i64 = 20;

/// The fixed reporting query: Cosmetics, newest first, 20 records.
pub fn good_query() -> EventQuery {
    EventQuery::new(INDUSTRY, LIMIT, SortOrder::Newest)
}

pub async fn run(config: &AppConfig) -> Result<(), FetchError> {
    let client = OpenFdaClient::new(config);
    let bar = spinner("Querying openFDA food events...");
    let result = client.fetch_events(&good_query()).await;
    bar.finish_and_clear();

    match result {
        Ok(result) => {
            print!("{}", render(&result));
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            Err(e)
        }
    }
}

fn record_line(i: usize, event: &AdverseEvent) -> String {
    let outcomes: Vec<&str> = event.outcomes.iter().take(1).map(String::as_str).collect();
    let reactions: Vec<&str> = event.reactions.iter().take(3).map(String::as_str).collect();
    let products: Vec<&str> = event
        .products
        .iter()
        .take(2)
        .map(|p| p.name_brand.as_deref().unwrap_or("?"))
        .collect();
    format!(
        "{}. Report {} | date_created={} | outcomes={:?} | reactions={:?} | products={:?}",
        i,
        event.report_number.as_deref().unwrap_or("N/A"),
        event.date_created.as_deref().unwrap_or("N/A"),
        outcomes,
        reactions,
        products
    )
}

fn first_record_keys(event: &AdverseEvent) -> Vec<String> {
    match serde_json::to_value(event) {
        Ok(serde_json::Value::Object(map)) => map.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

pub fn render(result: &EventResult) -> String {
    let total = result
        .summary
        .total
        .map(|t| t.to_string())
        .unwrap_or_else(|| "?".to_string());

    let mut out = String::new();
    out.push_str(&format!("{}\n", "--- FDA Food Event API – query result ---".bold()));
    out.push_str(&format!("Total matching records (API): {}\n", total.cyan()));
    out.push_str(&format!("Records returned:            {}\n", result.summary.returned.to_string().cyan()));
    out.push_str(
        "--- Key fields per record: report_number, date_created, outcomes, reactions, consumer, products ---\n\n",
    );
    for (i, event) in result.events.iter().enumerate() {
        out.push_str(&record_line(i + 1, event));
        out.push('\n');
    }
    out.push_str(&format!("\n{}\n", "--- Full JSON structure (first record keys): ---".bold()));
    if let Some(first) = result.events.first() {
        out.push_str(&format!("{:?}\n", first_record_keys(first)));
    }
    out
}
