use std::path::Path;

use poidash_core::AppConfig;
use poidash_export::{ExportEngine, ExportFormat};

use crate::review::{load_dashboard, store_client};
use crate::FormatArg;

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Xlsx => ExportFormat::Xlsx,
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

pub(crate) async fn run_export(
    config: &AppConfig,
    format: FormatArg,
    out_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let store = store_client(config)?;
    let dashboard = load_dashboard(&store).await?;

    let engine = ExportEngine::new(config.export_source.clone());
    let dir = out_dir.unwrap_or(&config.export_dir);
    let notice = engine.run(format.into(), dashboard.pois(), dir);
    println!("{notice}");

    if !notice.is_success() {
        anyhow::bail!("export failed");
    }
    Ok(())
}
