//! Budget command handlers.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::prelude::*;
use comfy_table::Table;

use finsense_core::api::ApiClient;
use finsense_core::api::types::BudgetReport;

/// Default name for the chart written after a forecast.
const CHART_FILE: &str = "budget_forecast.png";
/// Download file names, matching what the backend produces.
const CLASSIFICATION_FILE: &str = "transaction_classification.xlsx";
const BUDGET_FILE: &str = "budget_forecast.xlsx";

pub async fn predict(
    client: &ApiClient,
    files: &[PathBuf],
    income: &str,
    savings: &str,
    chart: Option<&Path>,
) -> Result<()> {
    let report = client
        .predict_budget(files, income, savings)
        .await
        .context("budget forecast failed")?;

    render_report(&report, chart)
}

fn render_report(report: &BudgetReport, chart: Option<&Path>) -> Result<()> {
    if let Some(results) = &report.results {
        println!("Classified {} transactions.", results.len());
    }

    if let Some(budget) = &report.budget {
        let mut table = Table::new();
        table.set_header(["Category", "Allocated"]);
        for (category, amount) in budget {
            table.add_row([category.clone(), format!("{amount:.2}")]);
        }
        println!("\nBudget allocation:\n{table}");
    }

    if let Some(forecast) = &report.forecast {
        println!("\nForecast details:\n{}", value_table(forecast));
    }

    if let Some(summary) = &report.summary {
        println!("\nSummary:\n{}", value_table(summary));
    }

    if let Some(image_data) = &report.image_data {
        let path = chart
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(CHART_FILE));
        let bytes = BASE64_STANDARD
            .decode(image_data)
            .context("decode forecast chart")?;
        fs::write(&path, bytes)
            .with_context(|| format!("write chart to {}", path.display()))?;
        println!("\nForecast chart written to: {}", path.display());
    }

    Ok(())
}

fn value_table(entries: &BTreeMap<String, serde_json::Value>) -> Table {
    let mut table = Table::new();
    for (key, value) in entries {
        let rendered = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(|f| format!("{f:.2}"))
                .unwrap_or_else(|| n.to_string()),
            other => other.to_string(),
        };
        table.add_row([key.clone(), rendered]);
    }
    table
}

pub async fn download(
    client: &ApiClient,
    classification: bool,
    budget: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let (bytes, default_name) = match (classification, budget) {
        (true, false) => (
            client
                .download_classification()
                .await
                .context("download classification failed")?,
            CLASSIFICATION_FILE,
        ),
        (false, true) => (
            client
                .download_budget()
                .await
                .context("download budget failed")?,
            BUDGET_FILE,
        ),
        _ => anyhow::bail!("Please specify what to download: --classification or --budget"),
    };

    let path = output.unwrap_or_else(|| PathBuf::from(default_name));
    fs::write(&path, &bytes).with_context(|| format!("write {}", path.display()))?;
    println!("✓ Saved {} bytes to {}", bytes.len(), path.display());

    Ok(())
}
