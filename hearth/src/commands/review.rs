//! Review commands: complete.

use anyhow::Result;
use colored::Colorize;

use crate::api::ApiClient;
use crate::cli::{ReviewAction, ReviewCommand};

pub async fn execute(cmd: ReviewCommand, client: &ApiClient) -> Result<()> {
    match cmd.action {
        ReviewAction::Complete { task_id, reviewer } => {
            let event = client.complete_review(&task_id, &reviewer).await?;
            println!(
                "{} {} ({})",
                "Reviewed".green().bold(),
                event.task_name,
                event.task_id.dimmed()
            );
            Ok(())
        }
    }
}
