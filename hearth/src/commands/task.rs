//! Task commands: complete.

use anyhow::Result;
use colored::Colorize;

use crate::api::ApiClient;
use crate::cli::{TaskAction, TaskCommand};

pub async fn execute(cmd: TaskCommand, client: &ApiClient) -> Result<()> {
    match cmd.action {
        TaskAction::Complete { task_id, user } => {
            let event = client.complete_task(&task_id, &user).await?;
            println!(
                "{} {} ({})",
                "Completed".green().bold(),
                event.task_name,
                event.task_id.dimmed()
            );
            if let Some(reviewer) = &event.reviewer {
                println!("Awaiting review by {}", reviewer.bold());
            }
            Ok(())
        }
    }
}
