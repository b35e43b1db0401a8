use serde_json::json;

use crate::presenter::{ChartSeries, Dashboard, PageState};

const CHART_JS: &str = "https://cdn.jsdelivr.net/npm/chart.js@4";

// Palette
const BRAND: &str = "#09090B";
const ACCENT: &str = "#71717A";
const GRID: &str = "#E4E4E7";

/// Render a page state as a complete HTML document.
pub fn render_page(state: &PageState) -> String {
    let (body, scripts) = match state {
        PageState::Content(dashboard) => (content(dashboard), chart_script(&dashboard.chart)),
        PageState::Error => (error_block(), String::new()),
        PageState::Loading => (loading_block(), String::new()),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Ranking Tracker</title>
<style>{style}</style>
</head>
<body>
<main class="container">
{body}
</main>
{scripts}
</body>
</html>
"#,
        style = STYLE,
        body = body,
        scripts = scripts,
    )
}

fn loading_block() -> String {
    r#"<div id="loading" class="state">Loading...</div>"#.to_string()
}

fn error_block() -> String {
    r#"<div id="error" class="state error">Could not load ranking data. Please try again later.</div>"#
        .to_string()
}

fn content(dashboard: &Dashboard) -> String {
    let summary = &dashboard.summary;

    let tiles: String = dashboard
        .stats
        .iter()
        .map(|tile| {
            format!(
                r#"<div class="stat-item"><span class="stat-count {class}">{count}</span><span class="stat-label">{label}</span></div>"#,
                class = escape(&tile.css_class()),
                count = tile.count,
                label = escape(&tile.difficulty),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<div id="content">
<header class="profile">
<img id="avatar" src="{avatar}" alt="avatar">
<div>
<h1 id="username">{username}</h1>
<p id="realname">{real_name}</p>
</div>
</header>
<section class="rank">
<span class="rank-label">Global Ranking</span>
<span id="ranking">{ranking}</span>
<span id="last-updated">Last updated: {updated}</span>
</section>
<section id="stats-grid" class="stats-grid">
{tiles}
</section>
<section class="chart">
<canvas id="rankChart"></canvas>
</section>
</div>"#,
        avatar = escape(&summary.avatar),
        username = escape(&summary.username),
        real_name = escape(&summary.real_name),
        ranking = escape(&summary.ranking_display),
        updated = escape(&summary.last_updated),
        tiles = tiles,
    )
}

/// Chart.js setup for the ranking series.
pub fn chart_config(series: &ChartSeries) -> serde_json::Value {
    json!({
        "type": "line",
        "data": {
            "labels": series.labels,
            "datasets": [{
                "label": "Global Ranking",
                "data": series.values,
                "borderColor": BRAND,
                "backgroundColor": "rgba(9, 9, 11, 0.1)",
                "borderWidth": 2,
                "pointBackgroundColor": "#FFFFFF",
                "pointBorderColor": BRAND,
                "pointRadius": 4,
                "pointHoverRadius": 6,
                "fill": true,
                "tension": 0.4
            }]
        },
        "options": {
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": { "legend": { "display": false } },
            "scales": {
                "x": { "grid": { "display": false }, "ticks": { "color": ACCENT } },
                "y": {
                    "reverse": series.reverse_y,
                    "grid": { "color": GRID },
                    "ticks": { "color": ACCENT }
                }
            },
            "interaction": { "intersect": false, "mode": "index" }
        }
    })
}

fn chart_script(series: &ChartSeries) -> String {
    // Keep the embedded JSON from closing the script element
    let config = chart_config(series).to_string().replace("</", "<\\/");

    format!(
        r#"<script src="{src}"></script>
<script>
const config = {config};
config.options.plugins.tooltip = {{
  displayColors: false,
  callbacks: {{ label: (ctx) => 'Rank: ' + ctx.parsed.y.toLocaleString() }}
}};
new Chart(document.getElementById('rankChart').getContext('2d'), config);
</script>"#,
        src = CHART_JS,
        config = config,
    )
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"
body { font-family: Roboto, system-ui, sans-serif; color: #09090B; background: #FAFAFA; margin: 0; }
.container { max-width: 720px; margin: 0 auto; padding: 24px; }
.profile { display: flex; gap: 16px; align-items: center; }
.profile img { width: 64px; height: 64px; border-radius: 50%; }
.rank { display: flex; flex-direction: column; margin: 24px 0; }
#ranking { font-size: 40px; font-weight: 700; }
#last-updated, .rank-label, .stat-label { color: #71717A; }
.stats-grid { display: grid; grid-template-columns: repeat(3, 1fr); gap: 12px; }
.stat-item { display: flex; flex-direction: column; padding: 12px; border: 1px solid #E4E4E7; border-radius: 8px; }
.stat-count { font-size: 24px; font-weight: 700; }
.easy { color: #00B8A3; } .medium { color: #FFC01E; } .hard { color: #EF4743; }
.chart { height: 320px; margin-top: 24px; }
.state { padding: 48px 0; text-align: center; }
.error { color: #EF4743; }
"#;
