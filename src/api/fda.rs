use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Html,
    Form, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::html::{self, alert, muted, page, AlertKind, Tab};
use super::session::{EventView, SessionData, SessionId};
use super::{ApiResult, AppState};
use crate::food::api::openfda::{EventQuery, EventSummary, SortOrder};
use crate::food::error::FetchError;
use crate::food::events::{events_to_rows, EventFilter, EventRow, EVENT_COLUMNS};

const TITLE: &str = "FDA Food Adverse Events";
const DEFAULT_INDUSTRY: &str = "Cosmetics";
const DEFAULT_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct QueryForm {
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub limit: String,
    #[serde(default)]
    pub sort: SortOrder,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn parse_limit(raw: Option<&str>) -> Result<i64, FetchError> {
    match raw.map(str::trim).unwrap_or_default() {
        "" => Ok(DEFAULT_LIMIT),
        raw => raw.parse::<i64>().map_err(|_| {
            FetchError::validation("Max records must be a whole number between 1 and 1000.")
        }),
    }
}

impl QueryForm {
    /// The validated query; nothing invalid reaches the session.
    pub fn to_query(&self) -> Result<EventQuery, FetchError> {
        let limit = parse_limit(Some(self.limit.as_str()))?;
        let query = EventQuery::new(self.industry.clone(), limit, self.sort)
            .with_api_key(self.api_key.clone());
        query.validate()?;
        Ok(query)
    }
}

#[derive(Debug, Deserialize)]
pub struct EventsParams {
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub summary: EventSummary,
    pub rows: Vec<EventRow>,
}

fn tabs(active: &str) -> [Tab<'static>; 2] {
    [
        Tab { href: "/", label: "Query", active: active == "query" },
        Tab { href: "/about", label: "About", active: active == "about" },
    ]
}

fn sidebar(last: Option<&EventQuery>) -> String {
    let (industry, limit, sort) = match last {
        Some(q) => (q.industry.as_str(), q.limit, q.sort),
        None => (DEFAULT_INDUSTRY, DEFAULT_LIMIT, SortOrder::Newest),
    };
    let options: String = [SortOrder::Newest, SortOrder::Oldest]
        .iter()
        .map(|s| {
            let selected = if *s == sort { " selected" } else { "" };
            format!(r#"<option value="{}"{}>{}</option>"#, s.as_param(), selected, s.label())
        })
        .collect();

    format!(
        r#"<h3>Query parameters</h3>
<form method="post" action="/query">
<label for="industry">Industry name</label>
<input id="industry" name="industry" value="{industry}" placeholder="e.g. Cosmetics, Dietary Supplements">
<label for="limit">Max records (1–1000)</label>
<input id="limit" name="limit" type="number" min="1" max="1000" value="{limit}">
<label for="sort">Sort by date</label>
<select id="sort" name="sort">{options}</select>
<label for="api_key">API key (optional)</label>
<input id="api_key" name="api_key" type="password" placeholder="Leave blank to use .env or no key">
<button type="submit">Run query</button>
</form>"#,
        industry = html::attr(industry),
        limit = limit,
        options = options,
    )
}

fn result_summary(data: &SessionData) -> String {
    match &data.events {
        None => muted("Click Run query to fetch adverse event reports."),
        Some(Err(e)) => alert(AlertKind::Danger, &e.to_string()),
        Some(Ok(view)) => format!(
            "{}{}",
            alert(AlertKind::Success, &view.summary.describe()),
            muted(&format!("Fetched {}", view.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")))
        ),
    }
}

fn filter_form(filter: &EventFilter) -> String {
    format!(
        r#"<h4>Filter results</h4>
<form method="get" action="/">
<label for="text">Search in outcomes, reactions, products</label>
<input id="text" name="text" value="{text}" placeholder="e.g. NAUSEA, Rash, Visited">
<label for="date">Filter by date (YYYYMMDD or partial, e.g. 2024)</label>
<input id="date" name="date" value="{date}" placeholder="e.g. 2024 or 202401">
<button type="submit">Apply filters</button> <a href="/">Clear</a>
</form>"#,
        text = html::attr(filter.text.as_deref().unwrap_or_default()),
        date = html::attr(filter.date.as_deref().unwrap_or_default()),
    )
}

fn filter_summary(filter: &EventFilter, shown: usize, total: usize) -> Option<String> {
    if shown == 0 {
        return Some(alert(
            AlertKind::Warning,
            "No rows match the current filters. Try loosening the search or date.",
        ));
    }
    if shown == total && !filter.is_active() {
        return None;
    }
    Some(muted(&format!("Showing {} of {} records.", shown, total)))
}

fn results(view: &EventView, filter: &EventFilter) -> String {
    let rows = filter.apply(&view.rows);
    let mut out = filter_form(filter);
    if let Some(summary) = filter_summary(filter, rows.len(), view.rows.len()) {
        out.push_str(&summary);
    }
    if !rows.is_empty() {
        out.push_str(&html::table(
            &EVENT_COLUMNS,
            rows.iter().map(|r| (r.cells().to_vec(), None)),
            None,
        ));
    }
    out
}

pub fn render_query_page(data: &SessionData, filter: &EventFilter) -> Html<String> {
    let mut content = String::from("<h2>Run API query</h2>");
    content.push_str(&muted(
        "Set parameters in the sidebar (industry, limit, sort), then run the query to fetch data from the openFDA API.",
    ));
    content.push_str(&result_summary(data));
    if let Some(Ok(view)) = &data.events {
        content.push_str(&results(view, filter));
    }
    page(TITLE, &tabs("query"), &sidebar(data.last_query.as_ref()), &content)
}

/// GET / - the last result of this session, filtered in memory.
pub async fn index(
    State(state): State<AppState>,
    session: SessionId,
    Query(filter): Query<EventFilter>,
) -> Html<String> {
    render_query_page(&state.sessions.get(session), &filter)
}

/// POST /query - runs the query and replaces this session's result.
pub async fn run_query(
    State(state): State<AppState>,
    session: SessionId,
    Form(form): Form<QueryForm>,
) -> Html<String> {
    let outcome = match form.to_query() {
        Ok(query) => {
            let fetched = state.fda.fetch_events(&query).await;
            (Some(query.clone()), fetched.map(|result| EventView {
                query,
                rows: events_to_rows(&result.events),
                summary: result.summary,
                fetched_at: Utc::now(),
            }))
        }
        Err(e) => (None, Err(e)),
    };

    let (query, events) = outcome;
    state.sessions.update(session, |data| {
        if query.is_some() {
            data.last_query = query;
        }
        data.events = Some(events);
    });
    render_query_page(&state.sessions.get(session), &EventFilter::default())
}

pub async fn about() -> Html<String> {
    let content = r#"<h2>FDA Food Adverse Event Explorer</h2>
<p>This app runs a query against the openFDA Food Adverse Event Reports API and displays results in a table.
Use the sidebar to set the industry name, record limit, and sort order, then click <strong>Run query</strong> to fetch data.</p>
<h3>Data source</h3>
<p><a href="https://open.fda.gov/apis/food/event/" target="_blank">openFDA Food Event API</a>: public data on adverse event reports related to FDA-regulated foods.</p>
<h3>Parameters</h3>
<ul>
<li>Industry name: filters by product industry (e.g. Cosmetics).</li>
<li>Max records: number of events to return (1–1000).</li>
<li>Sort: by report date (newest or oldest first).</li>
<li>API key: optional; increases rate limit if set in .env or here.</li>
</ul>"#;
    page(TITLE, &tabs("about"), "", content)
}

/// GET /api/events - the same query as JSON.
pub async fn events_json(
    State(state): State<AppState>,
    params: Result<Query<EventsParams>, QueryRejection>,
) -> ApiResult<EventsResponse> {
    let Query(params) = params.map_err(|e| FetchError::validation(e.body_text()))?;
    let query = EventQuery::new(params.industry, parse_limit(params.limit.as_deref())?, params.sort);
    let result = state.fda.fetch_events(&query).await?;
    Ok(Json(EventsResponse {
        summary: result.summary,
        rows: events_to_rows(&result.events),
    }))
}
