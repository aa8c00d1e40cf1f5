//! Leaderboard command.

use anyhow::Result;
use colored::Colorize;

use crate::api::ApiClient;

pub async fn execute(client: &ApiClient) -> Result<()> {
    let entries = client.leaderboard().await?;
    if entries.is_empty() {
        println!("{}", "No completed tasks yet.".dimmed());
        return Ok(());
    }

    println!(
        "{:<4} {:<16} {:>10} {:>12} {:>8}",
        "#".bold(),
        "User".bold(),
        "Completed".bold(),
        "Efficiency".bold(),
        "On time".bold()
    );
    for (idx, entry) in entries.iter().enumerate() {
        let rank = format!("{}", idx + 1);
        let rank = if idx == 0 {
            rank.yellow().bold()
        } else {
            rank.normal()
        };
        println!(
            "{:<4} {:<16} {:>10} {:>11.0}% {:>8}",
            rank,
            entry.user,
            entry.completed,
            entry.avg_efficiency * 100.0,
            entry.on_time
        );
    }
    Ok(())
}
