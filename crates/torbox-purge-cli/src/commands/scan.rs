use super::{build_task, load_config};
use crate::output::Output;
use color_eyre::Result;
use purge_config::PathManager;

/// Fetch and classify without deleting anything
pub async fn run_scan(path_manager: &PathManager, output: &Output) -> Result<()> {
    let config = load_config(path_manager)?;
    let task = build_task(path_manager, &config, true)?;
    let scan = task.scan().await;
    output.scan(&scan);
    Ok(())
}
