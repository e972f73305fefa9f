//! Store-backed commands: list, table view, review and photo upload.

use std::path::Path;

use anyhow::Context;
use poidash_core::AppConfig;
use poidash_dashboard::{Dashboard, MapPlan, SortColumn, SortSpec, TableRow};
use poidash_store::{PoiStoreClient, ReviewAction};

use crate::SortArg;

pub(crate) fn store_client(config: &AppConfig) -> anyhow::Result<PoiStoreClient> {
    Ok(PoiStoreClient::new(
        &config.store_url,
        config.http_timeout_secs,
        &config.user_agent,
    )?)
}

pub(crate) async fn load_dashboard(store: &PoiStoreClient) -> anyhow::Result<Dashboard> {
    let pois = store.list_pois().await?;
    Ok(Dashboard::with_pois(pois))
}

fn sort_spec(sort: Option<SortArg>, desc: bool) -> Option<SortSpec> {
    let column = match sort? {
        SortArg::Name => SortColumn::Name,
        SortArg::Address => SortColumn::Address,
        SortArg::Status => SortColumn::Status,
    };
    Some(if desc {
        SortSpec::descending(column)
    } else {
        SortSpec::ascending(column)
    })
}

fn print_row(row: &TableRow) {
    let marker = if row.is_selected { '*' } else { ' ' };
    let image = if row.image.is_some() { "yes" } else { "-" };
    println!(
        "{marker} {:<12} {:<30} {:<40} {:<5} {}",
        row.id, row.name, row.address, image, row.status_label
    );
}

pub(crate) async fn run_list(config: &AppConfig) -> anyhow::Result<()> {
    let store = store_client(config)?;
    let dashboard = load_dashboard(&store).await?;

    for poi in dashboard.pois() {
        let placement = if poi.has_valid_coordinates() {
            poi.coordinates_label()
        } else {
            "invalid coordinates".to_string()
        };
        println!("{}\t{}\t{}\t{}", poi.id, poi.status.label(), poi.name, placement);
    }
    println!("{} POIs", dashboard.pois().len());
    Ok(())
}

pub(crate) async fn run_table(
    config: &AppConfig,
    sort: Option<SortArg>,
    desc: bool,
    select: Option<&str>,
) -> anyhow::Result<()> {
    let store = store_client(config)?;
    let mut dashboard = load_dashboard(&store).await?;
    if let Some(id) = select {
        dashboard.select(id)?;
    }

    println!(
        "  {:<12} {:<30} {:<40} {:<5} {}",
        "ID", "Name", "Address", "Image", "Status"
    );
    for row in dashboard.rows(sort_spec(sort, desc)) {
        print_row(&row);
    }

    let plan = MapPlan::compute(dashboard.pois(), dashboard.selection());
    if plan.dropped > 0 {
        println!("{} POIs not shown on the map (invalid coordinates)", plan.dropped);
    }
    match plan.command {
        Some(command) => println!("map: {command}"),
        None => println!("map: nothing to show"),
    }
    Ok(())
}

pub(crate) async fn run_review(
    config: &AppConfig,
    id: &str,
    action: ReviewAction,
) -> anyhow::Result<()> {
    let store = store_client(config)?;
    let mut dashboard = load_dashboard(&store).await?;

    let notice = dashboard.review(&store, id, action).await;
    println!("{notice}");
    if !notice.is_success() {
        anyhow::bail!("{action} failed for POI {id}");
    }

    if let Some(detail) = dashboard.detail(id) {
        println!(
            "{} | {} | {} | {}",
            detail.name, detail.address, detail.coordinates, detail.status_label
        );
    }
    Ok(())
}

pub(crate) async fn run_upload(
    config: &AppConfig,
    path: &Path,
    latitude: &str,
    longitude: &str,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload");

    let store = store_client(config)?;
    let mut dashboard = Dashboard::new();
    let notice = dashboard
        .upload(&store, filename, None, bytes, latitude, longitude)
        .await;
    println!("{notice}");
    if !notice.is_success() {
        anyhow::bail!("upload of {} failed", path.display());
    }
    println!("{} POIs", dashboard.pois().len());
    Ok(())
}
