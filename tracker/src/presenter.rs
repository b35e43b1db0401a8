use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::RenderError;
use crate::history::{decode_history, DecodeError};
use crate::models::HistoryEntry;

/// Most recent points shown on the chart.
pub const CHART_WINDOW: usize = 30;

/// Page lifecycle. Starts in `Loading` and settles exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum PageState {
    Loading,
    Content(Dashboard),
    Error,
}

impl PageState {
    /// Settle a loading page. Failures are logged with their cause and shown
    /// as the generic error state; an already settled page stays as it is.
    pub fn settle(self, result: Result<Dashboard, RenderError>) -> PageState {
        match self {
            PageState::Loading => match result {
                Ok(dashboard) => PageState::Content(dashboard),
                Err(e) => {
                    tracing::error!("failed to render history: {}", e);
                    PageState::Error
                }
            },
            settled => settled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub summary: Summary,
    pub stats: Vec<StatTile>,
    pub chart: ChartSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub username: String,
    pub real_name: String,
    pub avatar: String,
    pub ranking: u64,
    /// Ranking with `en-IN` digit grouping, e.g. `1,23,456`.
    pub ranking_display: String,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatTile {
    pub difficulty: String,
    pub count: u64,
}

impl StatTile {
    pub fn css_class(&self) -> String {
        self.difficulty.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    /// Smaller ranking is better, so it is drawn higher.
    pub reverse_y: bool,
}

/// Fetch `data.json` and render it into a settled page.
pub async fn load(client: &Client, url: &str) -> PageState {
    let result = fetch_history(client, url).await.and_then(render);
    PageState::Loading.settle(result)
}

pub async fn fetch_history(client: &Client, url: &str) -> Result<Vec<HistoryEntry>, RenderError> {
    tracing::debug!("fetching history from {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| RenderError::Fetch(format!("{}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(RenderError::Fetch(format!("{} returned {}", url, status)));
    }

    let body = response
        .text()
        .await
        .map_err(|e| RenderError::Fetch(format!("failed to read body: {}", e)))?;

    parse_payload(&body)
}

/// Decode a `data.json` body, accepting the legacy single-object layout.
pub fn parse_payload(body: &str) -> Result<Vec<HistoryEntry>, RenderError> {
    if body.trim().is_empty() {
        return Err(RenderError::Data("empty response body".to_string()));
    }

    let records = decode_history(body).map_err(|e| match e {
        DecodeError::Syntax(e) => RenderError::Data(format!("invalid JSON: {}", e)),
        DecodeError::Shape(e) => RenderError::Data(format!("unexpected layout: {}", e)),
    })?;

    typed_entries(records)
}

/// Type the stored records for display. The latest record has to be readable;
/// unreadable older ones are left off the chart.
pub fn typed_entries(records: Vec<Value>) -> Result<Vec<HistoryEntry>, RenderError> {
    let last = records.len().saturating_sub(1);
    let mut entries = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<HistoryEntry>(record) {
            Ok(entry) => entries.push(entry),
            Err(e) if index == last => {
                return Err(RenderError::Data(format!("malformed latest entry: {}", e)));
            }
            Err(e) => tracing::warn!("skipping unreadable history entry {}: {}", index, e),
        }
    }

    Ok(entries)
}

pub fn render(history: Vec<HistoryEntry>) -> Result<Dashboard, RenderError> {
    render_with_window(history, CHART_WINDOW)
}

pub fn render_with_window(
    history: Vec<HistoryEntry>,
    window: usize,
) -> Result<Dashboard, RenderError> {
    // The summary trusts append order; only the chart re-sorts
    let latest = history
        .last()
        .ok_or_else(|| RenderError::Data("no data available".to_string()))?;

    let summary = summarize(latest)?;
    let stats = stat_tiles(latest);
    let chart = chart_series(history, window);

    Ok(Dashboard {
        summary,
        stats,
        chart,
    })
}

fn summarize(latest: &HistoryEntry) -> Result<Summary, RenderError> {
    let recorded = latest
        .recorded_at()
        .ok_or_else(|| RenderError::Data("latest entry has no timestamp".to_string()))?;
    let at = parse_instant(recorded)
        .ok_or_else(|| RenderError::Data(format!("bad timestamp '{}'", recorded)))?;

    Ok(Summary {
        username: latest.username.clone(),
        real_name: latest.real_name.clone().unwrap_or_default(),
        avatar: latest.avatar_url().to_string(),
        ranking: latest.ranking,
        ranking_display: format_indian(latest.ranking),
        last_updated: at.format("%d/%m/%Y, %H:%M:%S").to_string(),
    })
}

pub fn stat_tiles(entry: &HistoryEntry) -> Vec<StatTile> {
    entry
        .stats
        .iter()
        .filter(|s| s.is_rendered())
        .map(|s| StatTile {
            difficulty: s.difficulty.clone(),
            count: s.count,
        })
        .collect()
}

/// Oldest-to-newest ranking series over the last `window` entries. Input
/// order is not trusted; entries with an unreadable time sort first.
pub fn chart_series(mut history: Vec<HistoryEntry>, window: usize) -> ChartSeries {
    history.sort_by_key(|e| e.recorded_at().and_then(parse_instant));

    let skip = history.len().saturating_sub(window);
    let recent = &history[skip..];

    ChartSeries {
        labels: recent
            .iter()
            .map(|e| {
                e.recorded_at()
                    .and_then(parse_instant)
                    .map(|at| at.format("%b %-d").to_string())
                    .unwrap_or_default()
            })
            .collect(),
        values: recent.iter().map(|e| e.ranking).collect(),
        reverse_y: true,
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Group digits the way `toLocaleString("en-IN")` does: the last three
/// digits, then pairs.
pub fn format_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}
