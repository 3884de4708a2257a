//! `report` subcommand: one pipeline run from the command line.

use crate::config::ReportArgs;
use crate::service::{ReportRequest, ReportService};
use anyhow::Context;
use std::path::Path;
use tracing::info;

pub async fn run_report(service: &ReportService, args: ReportArgs) -> anyhow::Result<()> {
    let request = ReportRequest {
        app_id: args.app_id,
        competitors: args.competitors,
        keywords: (!args.keywords.is_empty()).then_some(args.keywords),
        country: args.country,
        variant: Some(args.variant),
        title: args.title,
    };

    let report = service
        .generate(request)
        .await
        .context("report generation failed")?;

    let Some(out) = args.out else {
        print!("{}", report.report_text);
        return Ok(());
    };

    write_report(&out, &report.report_text).await?;
    let sidecar = out.with_extension("json");
    let json = serde_json::to_vec_pretty(&report).context("failed to serialize report rows")?;
    write_report(&sidecar, &json).await?;

    info!(
        markdown = %out.display(),
        json = %sidecar.display(),
        rows = report.rows.len(),
        "Report written"
    );
    Ok(())
}

async fn write_report(path: &Path, contents: impl AsRef<[u8]>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}
