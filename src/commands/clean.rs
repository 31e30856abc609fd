//! Clean command implementation.

use anyhow::Result;
use humansize::{format_size, BINARY};
use std::io::{self, Write};

use crate::cleaner::CleanOrchestrator;
use crate::cli::CleanArgs;
use crate::engine::Engine;
use crate::events::EngineEvent;
use crate::targets::{Registry, SafetyClass, Target};

use super::{aborted, cancel_on_interrupt, progress_bar};

/// Run the clean command.
pub fn run(engine: &Engine, args: CleanArgs) -> Result<()> {
    let registry = engine.registry();
    let selected = select_ids(registry, &args);

    for id in &selected {
        if let Err(e) = registry.require(id) {
            eprintln!("Warning: {} (skipped)", e);
        }
    }

    let known: Vec<&Target> = selected.iter().filter_map(|id| registry.get(id)).collect();
    if known.is_empty() && !args.json {
        println!("Nothing to clean.");
        return Ok(());
    }

    if !args.json {
        print_selection(&known);
    }

    // Confirmation
    if !args.force && !args.json {
        print!("\nProceed with cleanup? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let bar = progress_bar(args.json);
    let token = engine.begin_clean();
    cancel_on_interrupt(&token);
    let complete = engine.run_clean(&selected, &token, |event| {
        if let EngineEvent::CleanProgress(progress) = event {
            bar.set_position(u64::from(progress.percent));
            bar.set_message(progress.target_id);
        }
    });
    bar.finish_and_clear();

    let summary = CleanOrchestrator::summarize(&complete.details);

    if args.json {
        let was_aborted = complete.aborted;
        let event = EngineEvent::CleanComplete(complete);
        println!("{}", serde_json::to_string_pretty(&event)?);
        if was_aborted {
            return Err(aborted());
        }
    } else if complete.aborted {
        return Err(aborted());
    } else {
        println!("\nResults:");
        for outcome in &complete.details {
            if outcome.succeeded {
                println!(
                    "  ok    {:<22} {:>12}",
                    outcome.id,
                    format_size(outcome.reclaimed_bytes, BINARY)
                );
            } else {
                println!(
                    "  FAIL  {:<22} {}",
                    outcome.id,
                    outcome.error.as_deref().unwrap_or("clean failed")
                );
            }
        }

        println!(
            "\n  Cleaned: {} location{}",
            summary.success_count,
            if summary.success_count == 1 { "" } else { "s" }
        );
        if summary.failed_count > 0 {
            println!(
                "  Failed:  {} location{}",
                summary.failed_count,
                if summary.failed_count == 1 { "" } else { "s" }
            );
        }
        println!("  Freed:   {}", format_size(complete.freed_bytes, BINARY));
    }

    if summary.failed_count > 0 {
        std::process::exit(5); // Partial failure
    }

    Ok(())
}

/// Ids to clean: the explicit list, or every safe target in registry order.
pub fn select_ids(registry: &Registry, args: &CleanArgs) -> Vec<String> {
    if args.all_safe {
        registry
            .targets()
            .iter()
            .filter(|t| t.safety_class == SafetyClass::Safe)
            .map(|t| t.id.clone())
            .collect()
    } else {
        args.ids.clone()
    }
}

fn print_selection(targets: &[&Target]) {
    println!("\n  {:<22} {:<9} {}", "ID", "SAFETY", "LABEL");
    println!("  {}", "-".repeat(60));

    for target in targets {
        println!(
            "  {:<22} {:<9} {}",
            target.id, target.safety_class, target.label
        );
        if !target.hint.is_empty() {
            println!("  {:<22} {}", "", target.hint);
        }
    }
}
