//! Self-contained browser report: a grouped bar chart above a data table.
//!
//! The query results are embedded in the document as JSON and drawn
//! client-side; nothing here computes, it only formats.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Chart input: one bar per label in each of the two series.
#[derive(Debug, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub cases: Vec<i64>,
    pub deaths: Vec<i64>,
}

pub struct Report {
    pub title: String,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    pub chart: ChartData,
}

impl Report {
    /// Render the report as one HTML document.
    pub fn to_html(&self) -> Result<String> {
        let chart_json = serde_json::to_string(&self.chart).context("encoding chart data")?;

        let mut table = String::from("<table>\n<tr>");
        for column in &self.columns {
            table.push_str(&format!("<th>{}</th>", escape(column)));
        }
        table.push_str("</tr>\n");
        for row in &self.rows {
            table.push_str("<tr>");
            for value in row {
                table.push_str(&format!("<td>{}</td>", escape(value)));
            }
            table.push_str("</tr>\n");
        }
        table.push_str("</table>");

        Ok(format!(
            r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="https://cdn.plot.ly/plotly-2.32.0.min.js"></script>
<style>
body {{ font-family: sans-serif; margin: 2em; }}
table {{ border-collapse: collapse; margin-top: 2em; }}
th, td {{ border: 1px solid #ccc; padding: 4px 10px; text-align: right; }}
th:first-child, td:first-child {{ text-align: left; }}
</style>
</head>
<body>
<h1>{title}</h1>
<div id="chart"></div>
{table}
<script>
const data = {chart_json};
Plotly.newPlot("chart", [
  {{name: "Cases", type: "bar", x: data.labels, y: data.cases}},
  {{name: "Deaths", type: "bar", x: data.labels, y: data.deaths}}
], {{barmode: "group", yaxis: {{title: "COVID-19"}}}});
</script>
</body>
</html>
"#,
            title = escape(&self.title),
        ))
    }

    /// Write the document and open it in the default browser.
    pub fn show(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_html()?)
            .with_context(|| format!("writing report {}", path.display()))?;
        open::that(path).with_context(|| format!("opening report {}", path.display()))?;
        info!(path = %path.display(), "report opened");
        Ok(())
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_embeds_table_and_chart_data() {
        let report = Report {
            title: "Michigan 2020 COVID-19 Numbers".to_string(),
            columns: vec!["County", "Cases", "Deaths"],
            rows: vec![vec!["Wayne".to_string(), "8000".to_string(), "900".to_string()]],
            chart: ChartData {
                labels: vec!["Wayne".to_string()],
                cases: vec![8000],
                deaths: vec![900],
            },
        };

        let html = report.to_html().unwrap();
        assert!(html.contains("<title>Michigan 2020 COVID-19 Numbers</title>"));
        assert!(html.contains("<th>County</th>"));
        assert!(html.contains("<td>Wayne</td>"));
        assert!(html.contains(r#""labels":["Wayne"]"#));
    }

    #[test]
    fn markup_in_values_is_escaped() {
        let report = Report {
            title: "<script>".to_string(),
            columns: vec!["County"],
            rows: vec![vec!["a & b".to_string()]],
            chart: ChartData {
                labels: vec![],
                cases: vec![],
                deaths: vec![],
            },
        };

        let html = report.to_html().unwrap();
        assert!(html.contains("<title>&lt;script&gt;</title>"));
        assert!(html.contains("<td>a &amp; b</td>"));
    }
}
