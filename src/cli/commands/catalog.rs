//! Catalog-level commands.

use console::style;

use crate::catalog::{CatalogClient, CatalogSnapshot};
use crate::cli::helpers::{cell, limited, print_json_lines, spinner, truncate};
use crate::config::Settings;
use crate::metadata::to_json_rows;

/// Fetch the catalog with a spinner on stderr.
pub(super) async fn fetch_snapshot(
    client: &CatalogClient,
) -> anyhow::Result<CatalogSnapshot> {
    let pb = spinner(&format!("Fetching {}", client.catalog_url()))?;
    let result = client.snapshot().await;
    pb.finish_and_clear();
    Ok(result?)
}

/// List the catalog, newest first.
pub async fn cmd_catalog(settings: &Settings, limit: usize, json: bool) -> anyhow::Result<()> {
    let client = CatalogClient::from_settings(settings)?;
    let snapshot = fetch_snapshot(&client).await?;
    let table = snapshot.table();

    if json {
        let records = table.to_table().to_records();
        return print_json_lines(limited(&records, limit));
    }

    println!(
        "{} datasets in {}",
        style(table.len()).cyan(),
        style(client.catalog_url()).dim()
    );
    println!("{}", "-".repeat(100));
    println!(
        "{:<20} {:<8} {:<44} {}",
        "Modified", "Vintage", "Identifier", "Title"
    );
    println!("{}", "-".repeat(100));

    for entry in limited(table.entries(), limit) {
        let modified = entry
            .modified
            .map(|m| m.format("%Y-%m-%d").to_string());
        let identifier = entry
            .identifier
            .strip_prefix("https://api.census.gov/data/id/")
            .unwrap_or(&entry.identifier);
        println!(
            "{:<20} {:<8} {:<44} {}",
            cell(modified.as_deref(), 20),
            cell(entry.vintage().as_deref(), 8),
            truncate(identifier, 44),
            cell(entry.title().as_deref(), 60),
        );
        if let Some(url) = entry.access_url() {
            println!("{:<30}{}", "", style(url).dim());
        }
    }

    Ok(())
}

/// Show the projected metadata table.
pub async fn cmd_metadata(settings: &Settings, limit: usize, json: bool) -> anyhow::Result<()> {
    let client = CatalogClient::from_settings(settings)?;
    let snapshot = fetch_snapshot(&client).await?;
    let rows = snapshot.metadata();

    if json {
        let records = to_json_rows(limited(&rows, limit))?;
        return print_json_lines(&records);
    }

    let time_of_check = rows
        .first()
        .map(|r| r.time_of_check.clone())
        .unwrap_or_default();
    println!(
        "{} datasets checked at {}",
        style(rows.len()).cyan(),
        style(time_of_check).dim()
    );
    println!("{}", "-".repeat(100));

    for row in limited(&rows, limit) {
        let flags: Vec<&str> = [
            (row.is_aggregate, "aggregate"),
            (row.is_microdata, "microdata"),
            (row.is_cube, "cube"),
            (row.is_timeseries, "timeseries"),
            (row.is_available, "available"),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, name)| *name)
        .collect();

        println!(
            "{} {}",
            style(cell(row.title.as_deref(), 70)).bold(),
            style(format!("[{}]", row.dataset.join("/"))).dim()
        );
        println!(
            "  vintage: {}  flags: {}",
            cell(row.vintage.as_deref(), 8),
            if flags.is_empty() {
                style("-").dim().to_string()
            } else {
                flags.join(", ")
            }
        );
        println!(
            "  access:  {}",
            cell(row.distribution_access_url.as_deref(), 90)
        );
    }

    Ok(())
}

/// Count labels of a list-valued catalog field.
pub async fn cmd_labels(settings: &Settings, key: &str, limit: usize) -> anyhow::Result<()> {
    let client = CatalogClient::from_settings(settings)?;
    let snapshot = fetch_snapshot(&client).await?;
    let counts = snapshot.count_nested_labels(key)?;

    if counts.is_empty() {
        println!("No datasets carry '{}'", key);
        return Ok(());
    }

    println!("{:<50} {:>8}", style(key).bold(), "Count");
    println!("{}", "-".repeat(60));
    for (label, count) in limited(&counts, limit) {
        println!("{:<50} {:>8}", truncate(label, 50), count);
    }

    Ok(())
}

/// Print a dataset's base access URL.
pub async fn cmd_url(settings: &Settings, identifier: &str) -> anyhow::Result<()> {
    let client = CatalogClient::from_settings(settings)?;
    let snapshot = fetch_snapshot(&client).await?;
    println!("{}", snapshot.dataset_base_url(identifier)?);
    Ok(())
}
