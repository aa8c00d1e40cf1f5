//! Status command: server health plus the pile forest.

use anyhow::Result;
use colored::Colorize;

use crate::api::ApiClient;
use crate::cli::{PileAction, PileCommand};
use crate::commands::pile;

pub async fn execute(client: &ApiClient) -> Result<()> {
    let health = client.health().await?;
    let dot = if health.status == "ok" {
        "●".green()
    } else {
        "●".yellow()
    };
    let mode = if health.orchestration_enabled {
        "orchestrated".green()
    } else {
        "legacy".yellow()
    };
    println!(
        "{} hearth-server v{} ({}, up {}s)",
        dot, health.version, mode, health.uptime_secs
    );
    println!();

    pile::execute(
        PileCommand {
            action: PileAction::List,
        },
        client,
    )
    .await
}
