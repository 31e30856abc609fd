//! Targets command implementation.

use anyhow::Result;

use crate::cli::TargetsArgs;
use crate::engine::Engine;
use crate::targets::{Method, Target};

pub fn run(engine: &Engine, args: TargetsArgs) -> Result<()> {
    let targets = engine.list_targets();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&targets)?);
        return Ok(());
    }

    if targets.is_empty() {
        println!("No targets configured.");
        return Ok(());
    }

    print!("{}", format_targets_table(&targets));
    println!(
        "\n{} target{}",
        targets.len(),
        if targets.len() == 1 { "" } else { "s" }
    );

    Ok(())
}

/// Human-readable location of a target.
pub fn location(target: &Target) -> String {
    match &target.method {
        Method::PlainDirectory { path } | Method::MultiProfileCache { path } => {
            path.display().to_string()
        }
        Method::PatternMatch { path, pattern } => {
            format!("{} ({})", path.display(), pattern.as_str())
        }
        Method::SystemTrash => "(system trash)".to_string(),
    }
}

pub fn format_targets_table(targets: &[Target]) -> String {
    let mut out = format!(
        "  {:<22} {:<9} {:<20} {}\n",
        "ID", "SAFETY", "METHOD", "LOCATION"
    );
    out.push_str(&format!("  {}\n", "-".repeat(72)));

    for target in targets {
        out.push_str(&format!(
            "  {:<22} {:<9} {:<20} {}\n",
            target.id,
            target.safety_class,
            target.method.name(),
            location(target)
        ));
    }

    out
}
