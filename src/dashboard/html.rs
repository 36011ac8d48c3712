//! Page rendering
//!
//! Applies a `DashboardView` to a single HTML document: header, summary cards,
//! inline SVG equity chart, tab bar and the three panels.

use crate::view::{ChartView, DashboardView, LogFeedView, Tab, TradeListView};
use chrono::{DateTime, Utc};

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 280.0;
const PLOT_LEFT: f64 = 80.0;
const PLOT_RIGHT: f64 = 20.0;
const PLOT_TOP: f64 = 20.0;
const PLOT_BOTTOM: f64 = 40.0;

/// Static parts of the page that don't come from the snapshot
#[derive(Debug, Clone)]
pub struct PageMeta {
    pub bot_name: String,
    pub refresh_secs: u64,
}

pub fn render_dashboard_html(view: &DashboardView, active: Tab, meta: &PageMeta) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!(
        "<title>{} Dashboard</title>\n",
        escape_html(&meta.bot_name)
    ));
    out.push_str("<style>");
    out.push_str(STYLES);
    out.push_str("</style></head><body><main class=\"shell\">\n");

    // Header
    out.push_str("<header class=\"hero\">");
    out.push_str(&format!("<h1>{}</h1>", escape_html(&meta.bot_name)));
    out.push_str(&format!(
        "<span id=\"lastUpdated\">Last updated: {}</span>",
        escape_html(view.last_updated.as_deref().unwrap_or("-"))
    ));
    out.push_str("</header>\n");

    out.push_str(&render_summary_cards(view));
    out.push_str("<section class=\"card chart-card\">");
    out.push_str(&render_chart_svg(&view.chart));
    out.push_str("</section>\n");

    // Tabs
    out.push_str("<nav class=\"tabs\">");
    for tab in Tab::ALL {
        out.push_str(&format!(
            "<button class=\"tab-btn{}\" data-tab=\"{}\">{}</button>",
            active_class(tab == active),
            tab.id(),
            tab.label()
        ));
    }
    out.push_str("</nav>\n");

    for tab in Tab::ALL {
        out.push_str(&format!(
            "<section class=\"tab-panel{}\" id=\"{}-panel\">",
            active_class(tab == active),
            tab.id()
        ));
        match tab {
            Tab::Trades => out.push_str(&render_trades(&view.trades)),
            Tab::AiLogs => out.push_str(&render_logs(&view.logs)),
            Tab::Performance => out.push_str(&render_performance(view)),
        }
        out.push_str("</section>\n");
    }

    out.push_str(&format!(
        "<script>const PAGE_GENERATION={};const REFRESH_SECS={};</script>",
        view.generation, meta.refresh_secs
    ));
    out.push_str("<script>");
    out.push_str(CLIENT_SCRIPT);
    out.push_str("</script>");
    out.push_str("</main></body></html>\n");
    out
}

fn active_class(active: bool) -> &'static str {
    if active {
        " active"
    } else {
        ""
    }
}

fn render_summary_cards(view: &DashboardView) -> String {
    let s = &view.summary;
    let cards = [
        ("Account value", "botValue", s.current_value.as_str()),
        ("Highest", "highestValue", s.highest_value.as_str()),
        ("Lowest", "lowestValue", s.lowest_value.as_str()),
        ("Win rate", "winRate", s.win_rate.as_str()),
    ];

    let mut out = String::from("<section class=\"summary\">");
    for (label, id, value) in cards {
        out.push_str(&format!(
            "<div class=\"stat\"><span class=\"stat-label\">{}</span><span class=\"stat-value\" id=\"{}\">{}</span></div>",
            label,
            id,
            escape_html(value)
        ));
    }
    out.push_str("</section>\n");
    out
}

// ─────────────────────────────────────────────────────────────────
// Chart
// ─────────────────────────────────────────────────────────────────

/// Map a value in `[lo, hi]` onto `[0, 1]`; a degenerate range maps to the middle.
fn unit(v: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        ((v - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        0.5
    }
}

fn axis_time_label(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.format("%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

pub fn render_chart_svg(chart: &ChartView) -> String {
    let Some(range) = chart.range else {
        return "<div class=\"empty\">No equity data yet</div>".to_string();
    };

    let plot_w = CHART_WIDTH - PLOT_LEFT - PLOT_RIGHT;
    let plot_h = CHART_HEIGHT - PLOT_TOP - PLOT_BOTTOM;
    let x_of = |ts: i64| PLOT_LEFT + unit(ts as f64, range.x_min as f64, range.x_max as f64) * plot_w;
    let y_of = |v: f64| PLOT_TOP + (1.0 - unit(v, range.y_min, range.y_max)) * plot_h;
    let baseline = PLOT_TOP + plot_h;

    let mut out = format!(
        "<svg id=\"equityChart\" viewBox=\"0 0 {} {}\" preserveAspectRatio=\"none\" role=\"img\">",
        CHART_WIDTH, CHART_HEIGHT
    );

    for tick in &chart.y_ticks {
        let y = y_of(*tick);
        out.push_str(&format!(
            "<line class=\"grid\" x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\"/>",
            PLOT_LEFT,
            y,
            CHART_WIDTH - PLOT_RIGHT,
            y
        ));
        out.push_str(&format!(
            "<text class=\"axis\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{}</text>",
            PLOT_LEFT - 8.0,
            y + 4.0,
            escape_html(&crate::view::format_usd(*tick))
        ));
    }

    let coords: Vec<String> = chart
        .points
        .iter()
        .map(|p| format!("{:.1},{:.1}", x_of(p.timestamp), y_of(p.value)))
        .collect();

    if let (Some(first), Some(last)) = (chart.points.first(), chart.points.last()) {
        out.push_str(&format!(
            "<polygon class=\"area\" points=\"{:.1},{:.1} {} {:.1},{:.1}\"/>",
            x_of(first.timestamp),
            baseline,
            coords.join(" "),
            x_of(last.timestamp),
            baseline
        ));
        out.push_str(&format!(
            "<polyline class=\"line\" points=\"{}\"/>",
            coords.join(" ")
        ));
    }

    out.push_str(&format!(
        "<text class=\"axis\" x=\"{:.1}\" y=\"{:.1}\">{}</text>",
        PLOT_LEFT,
        CHART_HEIGHT - 12.0,
        axis_time_label(range.x_min)
    ));
    out.push_str(&format!(
        "<text class=\"axis\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{}</text>",
        CHART_WIDTH - PLOT_RIGHT,
        CHART_HEIGHT - 12.0,
        axis_time_label(range.x_max)
    ));
    out.push_str("</svg>");
    out
}

// ─────────────────────────────────────────────────────────────────
// Panels
// ─────────────────────────────────────────────────────────────────

fn render_trades(trades: &TradeListView) -> String {
    if trades.rows.is_empty() {
        return "<div class=\"empty\">No trades yet</div>".to_string();
    }

    let mut out = String::new();
    for row in &trades.rows {
        out.push_str(&format!(
            "<div class=\"trade-item {tone}\">\
<div class=\"trade-header\"><span class=\"coin-symbol\">{symbol}</span><span class=\"side\">{side}</span></div>\
<div class=\"price-info\"><span>Entry: {entry}</span><span>Exit: {exit}</span></div>\
<div class=\"price-info\"><span>Qty: {qty}</span><span>Duration: {duration}</span></div>\
<div class=\"pnl {tone}\">{pnl} <small>{pnl_pct}</small></div>\
<div class=\"timestamp\">{time}</div></div>",
            tone = row.tone.css_class(),
            symbol = escape_html(&row.symbol),
            side = escape_html(&row.side),
            entry = escape_html(&row.entry_price),
            exit = escape_html(&row.close_price),
            qty = escape_html(&row.qty),
            duration = escape_html(&row.duration),
            pnl = escape_html(&row.pnl),
            pnl_pct = escape_html(&row.pnl_percent),
            time = escape_html(&row.close_time),
        ));
    }
    if trades.total > trades.rows.len() {
        out.push_str(&format!(
            "<div class=\"note\">Showing {} of {} trades</div>",
            trades.rows.len(),
            trades.total
        ));
    }
    out
}

fn render_logs(logs: &LogFeedView) -> String {
    if logs.rows.is_empty() {
        return "<div class=\"empty\">No AI logs yet</div>".to_string();
    }

    let mut out = String::new();
    for entry in &logs.rows {
        out.push_str(&format!(
            "<div class=\"ai-log-item\"><div class=\"log-time\">{}</div><div class=\"log-analysis\">{}</div></div>",
            escape_html(&entry.time),
            escape_html(&entry.analysis).replace('\n', "<br>")
        ));
    }
    out
}

fn render_performance(view: &DashboardView) -> String {
    let s = &view.summary;
    let window = view
        .chart
        .range
        .map(|r| r.policy.label().to_string())
        .unwrap_or_else(|| "-".to_string());

    let rows = [
        ("Current value", s.current_value.clone()),
        ("Highest value", s.highest_value.clone()),
        ("Lowest value", s.lowest_value.clone()),
        ("Total trades", s.stats.total_trades.to_string()),
        ("Winning trades", s.stats.wins.to_string()),
        ("Win rate", s.win_rate.clone()),
        ("Realized PnL", s.total_pnl.clone()),
        ("AI analyses", s.stats.ai_analysis_count.to_string()),
        ("Chart window", window),
    ];

    let mut out = String::from("<table class=\"perf\"><tbody>");
    for (label, value) in rows {
        out.push_str(&format!(
            "<tr><th>{}</th><td>{}</td></tr>",
            label,
            escape_html(&value)
        ));
    }
    out.push_str("</tbody></table>");
    out
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const STYLES: &str = ":root{--bg:#0f1117;--card:#171a23;--ink:#e8eaf0;--muted:#888;--line:#262a36;--accent:#667eea;--pos:#22c55e;--neg:#ef4444}*{box-sizing:border-box}body{margin:0;background:var(--bg);color:var(--ink);font-family:\"Inter\",\"Segoe UI\",sans-serif}.shell{max-width:1200px;margin:0 auto;padding:20px 16px}.hero{display:flex;justify-content:space-between;align-items:baseline;flex-wrap:wrap;gap:8px}.hero h1{margin:0;font-size:1.5rem}#lastUpdated{color:var(--muted);font-size:.85rem}.summary{display:grid;grid-template-columns:repeat(4,minmax(140px,1fr));gap:12px;margin:16px 0}.stat{background:var(--card);border:1px solid var(--line);border-radius:12px;padding:12px}.stat-label{display:block;color:var(--muted);font-size:.75rem;text-transform:uppercase}.stat-value{font-size:1.25rem;font-weight:700}.card{background:var(--card);border:1px solid var(--line);border-radius:12px;padding:12px}#equityChart{width:100%;height:280px}.grid{stroke:#222;stroke-width:1}.axis{fill:var(--muted);font-size:12px}.line{fill:none;stroke:var(--accent);stroke-width:3}.area{fill:rgba(102,126,234,.15);stroke:none}.tabs{display:flex;gap:8px;margin:16px 0 8px}.tab-btn{background:var(--card);color:var(--ink);border:1px solid var(--line);border-radius:8px;padding:8px 14px;cursor:pointer}.tab-btn.active{background:var(--accent);border-color:var(--accent)}.tab-panel{display:none}.tab-panel.active{display:block}.trade-item,.ai-log-item{background:var(--card);border:1px solid var(--line);border-left:4px solid var(--line);border-radius:10px;padding:10px 12px;margin-bottom:8px}.trade-item.positive{border-left-color:var(--pos)}.trade-item.negative{border-left-color:var(--neg)}.trade-header,.price-info{display:flex;justify-content:space-between;gap:12px;font-size:.85rem}.coin-symbol{font-weight:700}.pnl{font-weight:700;margin-top:4px}.pnl.positive{color:var(--pos)}.pnl.negative{color:var(--neg)}.timestamp,.log-time,.note{color:var(--muted);font-size:.75rem}.log-analysis{margin-top:4px;line-height:1.5}.empty{color:var(--muted);padding:24px;text-align:center}.perf{width:100%;border-collapse:collapse}.perf th,.perf td{text-align:left;padding:8px;border-bottom:1px solid var(--line)}.perf th{color:var(--muted);font-weight:500}@media (max-width:760px){.summary{grid-template-columns:repeat(2,1fr)}}";

const CLIENT_SCRIPT: &str = r#"
(function(){
  const buttons = document.querySelectorAll('.tab-btn');
  const panels = document.querySelectorAll('.tab-panel');
  buttons.forEach(btn => btn.addEventListener('click', () => {
    const tab = btn.dataset.tab;
    buttons.forEach(b => b.classList.toggle('active', b === btn));
    panels.forEach(p => p.classList.toggle('active', p.id === tab + '-panel'));
    const url = new URL(window.location.href);
    if (url.searchParams.has('tab')) { url.searchParams.delete('tab'); history.replaceState(null, '', url); }
    fetch('/api/tab', {method: 'POST', headers: {'Content-Type': 'application/json'}, body: JSON.stringify({tab})})
      .catch(e => console.error('saving tab preference failed', e));
  }));

  function fallbackPolling(){ setTimeout(() => window.location.reload(), REFRESH_SECS * 1000); }
  try {
    const proto = window.location.protocol === 'https:' ? 'wss:' : 'ws:';
    const ws = new WebSocket(proto + '//' + window.location.host + '/ws');
    ws.onmessage = ev => {
      const msg = JSON.parse(ev.data);
      if (msg.type === 'SnapshotUpdated' && msg.data.generation > PAGE_GENERATION) window.location.reload();
    };
    ws.onclose = fallbackPolling;
  } catch (e) { fallbackPolling(); }
})();
"#;
