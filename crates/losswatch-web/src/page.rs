//! Dashboard HTML page.
//!
//! The page holds the single source dropdown and the two chart panels.
//! Chart figures come from `/api/charts/{source}` and are drawn by plotly.js.

use htmlescape::{encode_attribute, encode_minimal};
use losswatch_core::SourceEntry;

const TITLE: &str = "Russian-Ukrainian War";
const DESCRIPTION: &str =
    "A timeseries analysis and trending of Russian military forces and corresponding losses";
const AUTHOR: &str = "Michael Czigler";
const KEYWORDS: &str = "Ukraine, Russia, War, Statistics, Trending, Losses";
const PROJECT_URL: &str = "http://github.com/mcpcpc/pvalue.xyz";
const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";

pub fn render_index(sources: &[SourceEntry], selected: &str) -> String {
    let options: String = sources
        .iter()
        .map(|source| {
            format!(
                r#"<option value="{value}"{selected} title="{page}">{label}</option>"#,
                value = encode_attribute(&source.key),
                selected = if source.key == selected { " selected" } else { "" },
                page = encode_attribute(&source.page_uri),
                label = encode_minimal(&source.label()),
            )
        })
        .collect::<Vec<_>>()
        .join("\n        ");

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <meta name="description" content="{description}">
  <meta name="author" content="{author}">
  <meta name="keywords" content="{keywords}">
  <title>{title}</title>
  <script src="{plotly}"></script>
  <style>
    body {{ background: #111; color: #f2f5fa; font-family: sans-serif; margin: 2rem; }}
    a {{ color: #636efa; }}
    select {{ background: #222; color: #f2f5fa; border: 1px solid #506784; padding: 0.4rem; min-width: 16rem; }}
    .panel {{ position: relative; min-height: 450px; margin-top: 1rem; }}
    .status {{ position: absolute; top: 1rem; left: 1rem; color: #aaa; }}
    footer {{ margin-top: 2rem; color: #888; font-size: 0.9rem; }}
  </style>
</head>
<body>
  <h1>{title}</h1>
  <p>
    {description}. These metrics use "conservative" sources and, therefore, should
    only be considered for reference only. Refer to <a href="{project}">github</a>
    for additional information about this project.
  </p>
  <select id="sources">
        {options}
  </select>
  <div class="panel"><div class="status" id="trending-infantry-status"></div><div id="trending-infantry"></div></div>
  <div class="panel"><div class="status" id="trending-equipment-status"></div><div id="trending-equipment"></div></div>
  <footer>Copyright &copy; 2022 {author}. All Rights Reserved</footer>
  <script>
    const panels = ["trending-infantry", "trending-equipment"];
    const setStatus = (text) => panels.forEach((id) => {{
      document.getElementById(id + "-status").textContent = text;
    }});
    async function update(source) {{
      setStatus("Loading…");
      try {{
        const response = await fetch("/api/charts/" + encodeURIComponent(source));
        if (!response.ok) throw new Error(response.status);
        const body = await response.json();
        const config = {{ responsive: true }};
        Plotly.react("trending-infantry", body.infantry.data, body.infantry.layout, config);
        Plotly.react("trending-equipment", body.equipment.data, body.equipment.layout, config);
        setStatus("");
      }} catch (err) {{
        setStatus("Unable to render charts");
      }}
    }}
    const select = document.getElementById("sources");
    select.addEventListener("change", (event) => update(event.target.value));
    update(select.value);
  </script>
</body>
</html>
"##,
        title = TITLE,
        description = DESCRIPTION,
        author = AUTHOR,
        keywords = KEYWORDS,
        project = PROJECT_URL,
        plotly = PLOTLY_JS,
        options = options,
    )
}
