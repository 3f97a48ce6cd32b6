//! Server-side HTML rendering: the controls, the intro text and one inline
//! SVG bar chart per question, two charts per row.

use survey_core::summary::QuestionCounts;

use crate::{DashboardSettings, controller::DashboardView};

/// Maximum characters per line for question titles.
const TITLE_WRAP: usize = 60;
/// Maximum characters per line for answer labels under the bars.
const TICK_WRAP: usize = 20;

const CHART_WIDTH: f64 = 520.0;
const PLOT_HEIGHT: f64 = 220.0;
const MARGIN_LEFT: f64 = 44.0;
const MARGIN_RIGHT: f64 = 12.0;
const MARGIN_TOP: f64 = 20.0;
const TICK_LINE_HEIGHT: f64 = 13.0;

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#f4f6f8;color:#2c3e50}\
.container{max-width:1200px;margin:0 auto;padding:0 16px}\
h1{text-align:center;margin:24px 0}\
.intro{color:#6c757d}\
.controls{display:flex;flex-wrap:wrap;gap:12px;align-items:center;margin-bottom:12px}\
.controls form{display:flex;flex-wrap:wrap;gap:8px;align-items:center;margin:0}\
.controls button{background:#2c3e50;color:#fff;border:0;padding:8px 16px;border-radius:4px;cursor:pointer}\
.row{display:flex;flex-wrap:wrap;gap:24px;margin-bottom:24px}\
.card{flex:1 1 480px;background:#fff;border-radius:6px;box-shadow:0 1px 3px rgba(0,0,0,.12);padding:16px}\
.card h2{font-size:1rem;margin:0 0 8px}\
.empty{text-align:center;color:#6c757d}\
.bar{fill:#18bc9c}\
.axis{stroke:#adb5bd}\
svg text{font-size:11px;fill:#2c3e50}";

/// Render the full dashboard page.
pub fn page(settings: &DashboardSettings, view: &DashboardView) -> String {
  let title = escape(&settings.title);
  let query = view.query_string();
  format!(
    "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
     <meta charset=\"utf-8\">\n\
     <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
     <meta http-equiv=\"refresh\" content=\"{reload}; url=/?{query}\">\n\
     <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
     <div class=\"container\">\n<h1>{title}</h1>\n\
     <p class=\"intro\">{intro}</p>\n{controls}<hr>\n{charts}</div>\n</body>\n</html>\n",
    reload = settings.page_reload.as_secs(),
    intro = escape(&view.intro_text),
    controls = controls(view),
    charts = charts(view),
  )
}

fn controls(view: &DashboardView) -> String {
  let date = view.cutoff.date().format("%Y-%m-%d");
  let time = view.cutoff.time().format("%H:%M");
  let active = view.cutoff.to_param();
  let checked = if view.completed_only { " checked" } else { "" };
  let completed_hidden = if view.completed_only {
    "<input type=\"hidden\" name=\"completed_only\" value=\"1\">"
  } else {
    ""
  };

  format!(
    "<div class=\"controls\">\n\
     <form method=\"post\" action=\"/refresh\">\
     <input type=\"hidden\" name=\"date\" value=\"{date}\">\
     <input type=\"hidden\" name=\"time\" value=\"{time}\">\
     <input type=\"hidden\" name=\"active\" value=\"{active}\">{completed_hidden}\
     <button type=\"submit\">Update database</button></form>\n\
     <form method=\"get\" action=\"/\">\
     <strong>Show data after:</strong>\
     <input type=\"date\" name=\"date\" value=\"{date}\">\
     <input type=\"text\" name=\"time\" value=\"{time}\" size=\"5\" placeholder=\"HH:MM\">\
     <input type=\"hidden\" name=\"active\" value=\"{active}\">\
     <label><input type=\"checkbox\" name=\"completed_only\" value=\"1\"{checked}> Completed only</label>\
     <button type=\"submit\">Apply</button></form>\n\
     </div>\n"
  )
}

fn charts(view: &DashboardView) -> String {
  if view.is_empty() || view.questions.is_empty() {
    return "<p class=\"empty\">No data: no responses satisfy the current criteria.</p>\n"
      .to_string();
  }

  let mut out = String::new();
  for pair in view.questions.chunks(2) {
    out.push_str("<div class=\"row\">\n");
    for question in pair {
      out.push_str(&card(question));
    }
    out.push_str("</div>\n");
  }
  out
}

fn card(question: &QuestionCounts) -> String {
  let title = wrap(&question.label, TITLE_WRAP)
    .iter()
    .map(|line| escape(line))
    .collect::<Vec<_>>()
    .join("<br>");
  format!(
    "<div class=\"card\" id=\"q-{code}\"><h2>{title}</h2>{chart}</div>\n",
    code = escape(&question.code),
    chart = bar_chart(question),
  )
}

/// One vertical bar per value, labelled with its count.
fn bar_chart(question: &QuestionCounts) -> String {
  let ticks: Vec<Vec<String>> = question
    .counts
    .iter()
    .map(|c| wrap(&c.value, TICK_WRAP))
    .collect();
  let tick_lines = ticks.iter().map(Vec::len).max().unwrap_or(1).max(1);
  let height = MARGIN_TOP + PLOT_HEIGHT + 10.0 + TICK_LINE_HEIGHT * tick_lines as f64;

  let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
  let slot = plot_width / question.counts.len().max(1) as f64;
  let bar_width = slot * 0.7;
  let max = question.max_count().max(1) as f64;
  let baseline = MARGIN_TOP + PLOT_HEIGHT;

  let mut svg = format!(
    "<svg viewBox=\"0 0 {CHART_WIDTH} {height}\" width=\"100%\" role=\"img\" \
     aria-label=\"{label}\">\
     <line class=\"axis\" x1=\"{MARGIN_LEFT}\" y1=\"{baseline}\" x2=\"{x2}\" y2=\"{baseline}\"/>\
     <line class=\"axis\" x1=\"{MARGIN_LEFT}\" y1=\"{MARGIN_TOP}\" x2=\"{MARGIN_LEFT}\" y2=\"{baseline}\"/>\
     <text x=\"{ylabel}\" y=\"{baseline}\" text-anchor=\"end\">0</text>\
     <text x=\"{ylabel}\" y=\"{top}\" text-anchor=\"end\">{max_count}</text>",
    label = escape(&question.label),
    x2 = CHART_WIDTH - MARGIN_RIGHT,
    ylabel = MARGIN_LEFT - 6.0,
    top = MARGIN_TOP + 4.0,
    max_count = question.max_count(),
  );

  for (i, (count, lines)) in question.counts.iter().zip(&ticks).enumerate() {
    let center = MARGIN_LEFT + slot * (i as f64 + 0.5);
    let bar_height = PLOT_HEIGHT * count.count as f64 / max;
    let y = baseline - bar_height;
    svg.push_str(&format!(
      "<rect class=\"bar\" x=\"{x:.1}\" y=\"{y:.1}\" width=\"{bar_width:.1}\" \
       height=\"{bar_height:.1}\"><title>{value}: {n}</title></rect>\
       <text x=\"{center:.1}\" y=\"{label_y:.1}\" text-anchor=\"middle\">{n}</text>",
      x = center - bar_width / 2.0,
      value = escape(&count.value),
      n = count.count,
      label_y = y - 4.0,
    ));

    svg.push_str(&format!(
      "<text x=\"{center:.1}\" y=\"{:.1}\" text-anchor=\"middle\">",
      baseline + TICK_LINE_HEIGHT
    ));
    for (n, line) in lines.iter().enumerate() {
      let dy = if n == 0 { 0.0 } else { TICK_LINE_HEIGHT };
      svg.push_str(&format!(
        "<tspan x=\"{center:.1}\" dy=\"{dy}\">{}</tspan>",
        escape(line)
      ));
    }
    svg.push_str("</text>");
  }

  svg.push_str("</svg>");
  svg
}

/// Greedy word wrap that never splits a word. Long words get their own line.
pub(crate) fn wrap(text: &str, width: usize) -> Vec<String> {
  let mut lines: Vec<String> = Vec::new();
  let mut current = String::new();
  for word in text.split_whitespace() {
    let needed = if current.is_empty() {
      word.chars().count()
    } else {
      current.chars().count() + 1 + word.chars().count()
    };
    if needed > width && !current.is_empty() {
      lines.push(std::mem::take(&mut current));
    }
    if !current.is_empty() {
      current.push(' ');
    }
    current.push_str(word);
  }
  if !current.is_empty() || lines.is_empty() {
    lines.push(current);
  }
  lines
}

pub(crate) fn escape(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  out
}
