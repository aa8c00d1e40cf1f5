//! Pile commands: add value, list.

use anyhow::Result;
use colored::Colorize;
use hearth_core::types::Pile;

use crate::api::ApiClient;
use crate::cli::{PileAction, PileCommand};

pub async fn execute(cmd: PileCommand, client: &ApiClient) -> Result<()> {
    match cmd.action {
        PileAction::Add { pile_id, delta } => {
            let resp = client.add_pile_value(&pile_id, delta).await?;
            println!(
                "{} {} -> {}",
                "Updated".green().bold(),
                resp.pile_id,
                resp.value
            );
            Ok(())
        }
        PileAction::List => {
            let piles = client.list_piles().await?;
            if piles.is_empty() {
                println!("{}", "No piles configured.".dimmed());
                return Ok(());
            }
            for pile in &piles {
                print_pile(pile, 0);
            }
            Ok(())
        }
    }
}

fn print_pile(pile: &Pile, depth: usize) {
    let indent = "  ".repeat(depth);
    let gauge = if pile.value >= pile.max_value {
        format!("{}/{}", pile.value, pile.max_value).red().bold()
    } else {
        format!("{}/{}", pile.value, pile.max_value).normal()
    };
    println!(
        "{}{} {} [{}]",
        indent,
        pile.display_name.bold(),
        format!("({})", pile.id).dimmed(),
        gauge
    );
    for sub in &pile.subpiles {
        print_pile(sub, depth + 1);
    }
}
