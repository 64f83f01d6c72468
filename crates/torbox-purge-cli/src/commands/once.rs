use super::{build_task, load_config};
use crate::output::Output;
use color_eyre::Result;
use purge_config::PathManager;

pub async fn run_once(path_manager: &PathManager, dry_run: bool, output: &Output) -> Result<()> {
    tracing::debug!("Once command started");

    let config = load_config(path_manager)?;
    let task = build_task(path_manager, &config, dry_run)?;
    let report = task.run_once().await;
    output.report(&report);

    Ok(())
}
