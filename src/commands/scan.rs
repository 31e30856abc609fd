//! Scan command implementation

use anyhow::Result;
use humansize::{format_size, BINARY};

use crate::cli::ScanArgs;
use crate::engine::Engine;
use crate::events::EngineEvent;
use crate::scanner::ScanItem;

use super::{aborted, cancel_on_interrupt, progress_bar};

/// Run the scan command
pub fn run(engine: &Engine, args: ScanArgs) -> Result<()> {
    let bar = progress_bar(args.json);
    let token = engine.begin_scan();
    cancel_on_interrupt(&token);

    let complete = engine.run_scan(&token, |event| {
        if let EngineEvent::ScanProgress(progress) = event {
            bar.set_position(u64::from(progress.percent));
            bar.set_message(progress.target_id);
        }
    });
    bar.finish_and_clear();

    if args.json {
        let was_aborted = complete.aborted;
        let event = EngineEvent::ScanComplete(complete);
        println!("{}", serde_json::to_string_pretty(&event)?);
        return if was_aborted { Err(aborted()) } else { Ok(()) };
    }
    if complete.aborted {
        return Err(aborted());
    }

    print!("{}", format_scan_table(&complete.items));

    let total: u64 = complete.items.iter().map(|i| i.size_bytes).sum();
    println!(
        "\nTotal: {} across {} location{}",
        format_size(total, BINARY),
        complete.items.len(),
        if complete.items.len() == 1 { "" } else { "s" }
    );

    Ok(())
}

pub fn format_scan_table(items: &[ScanItem]) -> String {
    let mut out = format!("  {:<22} {:<9} {:>12}  {}\n", "ID", "SAFETY", "SIZE", "LABEL");
    out.push_str(&format!("  {}\n", "-".repeat(72)));

    for item in items {
        out.push_str(&format!(
            "  {:<22} {:<9} {:>12}  {}\n",
            item.target.id,
            item.target.safety_class,
            format_size(item.size_bytes, BINARY),
            item.target.label
        ));
    }

    out
}
