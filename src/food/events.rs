use crate::food::api::openfda::AdverseEvent;
use serde::{Deserialize, Serialize};

const MISSING: &str = "N/A";
const EMPTY: &str = "—";

pub const EVENT_COLUMNS: [&str; 5] = ["Report #", "Date", "Outcomes", "Reactions", "Products"];

/// Display projection of one adverse event report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRow {
    pub report_number: String,
    pub date: String,
    pub outcomes: String,
    pub reactions: String,
    pub products: String,
}

impl EventRow {
    pub fn cells(&self) -> [&str; 5] {
        [
            self.report_number.as_str(),
            self.date.as_str(),
            self.outcomes.as_str(),
            self.reactions.as_str(),
            self.products.as_str(),
        ]
    }
}

fn join_first(items: impl Iterator<Item = String>, n: usize) -> String {
    let joined = items.take(n).collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        EMPTY.to_string()
    } else {
        joined
    }
}

impl From<&AdverseEvent> for EventRow {
    fn from(event: &AdverseEvent) -> Self {
        Self {
            report_number: event
                .report_number
                .clone()
                .unwrap_or_else(|| MISSING.to_string()),
            date: event
                .date_created
                .clone()
                .unwrap_or_else(|| MISSING.to_string()),
            outcomes: join_first(event.outcomes.iter().cloned(), 2),
            reactions: join_first(event.reactions.iter().cloned(), 3),
            products: join_first(
                event
                    .products
                    .iter()
                    .map(|p| p.name_brand.clone().unwrap_or_else(|| "?".to_string())),
                2,
            ),
        }
    }
}

pub fn events_to_rows(events: &[AdverseEvent]) -> Vec<EventRow> {
    events.iter().map(EventRow::from).collect()
}

/// Client-side predicates over loaded rows. Blank fields are inactive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EventFilter {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl EventFilter {
    pub fn new(text: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            date: Some(date.into()),
        }
    }

    fn text_term(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    fn date_term(&self) -> Option<&str> {
        self.date.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }

    pub fn is_active(&self) -> bool {
        self.text_term().is_some() || self.date_term().is_some()
    }

    /// Case-insensitive substring over outcomes, reactions and products,
    /// AND a prefix match on the date.
    pub fn matches(&self, row: &EventRow) -> bool {
        if let Some(term) = self.text_term() {
            let hit = [&row.outcomes, &row.reactions, &row.products]
                .iter()
                .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        if let Some(prefix) = self.date_term() {
            if !row.date.starts_with(prefix) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, rows: &[EventRow]) -> Vec<EventRow> {
        rows.iter().filter(|row| self.matches(row)).cloned().collect()
    }
}
