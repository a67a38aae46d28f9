//! Dataset detail commands.

use console::style;

use super::catalog::fetch_snapshot;
use crate::catalog::CatalogClient;
use crate::cli::helpers::{cell, limited, print_json_lines, spinner, summarize, truncate};
use crate::config::Settings;
use crate::dataset::{DatasetSource, DetailKind};
use crate::http_client::HttpClient;

/// Resolve a dataset in a fresh snapshot.
async fn open_source(
    settings: &Settings,
    identifier: &str,
) -> anyhow::Result<DatasetSource<HttpClient>> {
    let client = CatalogClient::from_settings(settings)?;
    let snapshot = fetch_snapshot(&client).await?;
    Ok(client.dataset_source(&snapshot, identifier, None)?)
}

fn report_unavailable(source: &DatasetSource<HttpClient>, kind: DetailKind) {
    eprintln!(
        "{} {} is unavailable for {}",
        style("!").yellow(),
        kind,
        style(source.base_url()).dim()
    );
}

pub async fn cmd_variables(
    settings: &Settings,
    identifier: &str,
    limit: usize,
    json: bool,
) -> anyhow::Result<()> {
    let source = open_source(settings, identifier).await?;
    let Some(rows) = source.variables().await? else {
        report_unavailable(&source, DetailKind::Variables);
        return Ok(());
    };

    if json {
        return print_json_lines(limited(&rows, limit));
    }

    println!("{:<20} {:<10} {:<40} {}", "Variable", "Group", "Label", "Concept");
    println!("{}", "-".repeat(100));
    for row in limited(&rows, limit) {
        println!(
            "{:<20} {:<10} {:<40} {}",
            truncate(&row.variable, 20),
            cell(row.group(), 10),
            cell(row.label.as_deref(), 40),
            cell(row.concept.as_deref(), 40),
        );
    }
    println!("\n{} variables", style(rows.len()).cyan());

    Ok(())
}

pub async fn cmd_geography(settings: &Settings, identifier: &str, json: bool) -> anyhow::Result<()> {
    let source = open_source(settings, identifier).await?;
    let Some(rows) = source.geographies().await? else {
        report_unavailable(&source, DetailKind::Geography);
        return Ok(());
    };

    if json {
        return print_json_lines(&rows);
    }

    println!("{:<8} {:<40} {}", "Level", "Name", "Requires");
    println!("{}", "-".repeat(80));
    for row in &rows {
        println!(
            "{:<8} {:<40} {}",
            cell(row.geo_level_display.as_deref(), 8),
            truncate(&row.name, 40),
            row.requires.join(", ")
        );
    }

    Ok(())
}

pub async fn cmd_groups(settings: &Settings, identifier: &str, json: bool) -> anyhow::Result<()> {
    let source = open_source(settings, identifier).await?;
    let Some(rows) = source.groups().await? else {
        report_unavailable(&source, DetailKind::Groups);
        return Ok(());
    };

    if json {
        return print_json_lines(&rows);
    }

    println!("{:<12} {:<50} {}", "Name", "Description", "Universe");
    println!("{}", "-".repeat(90));
    for row in &rows {
        println!(
            "{:<12} {:<50} {}",
            truncate(&row.name, 12),
            cell(row.description.as_deref(), 50),
            cell(row.universe.as_deref(), 30),
        );
    }

    Ok(())
}

/// Print the raw JSON of one detail endpoint.
pub async fn cmd_detail(
    settings: &Settings,
    identifier: &str,
    kind: DetailKind,
) -> anyhow::Result<()> {
    let source = open_source(settings, identifier).await?;
    match source.detail(kind).await? {
        Some(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        None => report_unavailable(&source, kind),
    }
    Ok(())
}

/// Hit every detail endpoint and report which answered.
pub async fn cmd_inspect(settings: &Settings, identifier: &str) -> anyhow::Result<()> {
    let source = open_source(settings, identifier).await?;

    println!("{}", style(source.base_url()).bold());
    for kind in DetailKind::ALL {
        let pb = spinner(&format!("Fetching {}", kind))?;
        let result = source.detail(kind).await;
        pb.finish_and_clear();

        match result {
            Ok(Some(json)) => println!(
                "  {} {:<10} {}",
                style("✓").green(),
                kind.as_str(),
                style(summarize(&json)).dim()
            ),
            Ok(None) => println!("  {} {:<10} unavailable", style("!").yellow(), kind.as_str()),
            Err(e) => println!("  {} {:<10} {}", style("✗").red(), kind.as_str(), e),
        }
    }

    Ok(())
}
