//! Verify command implementation.

use super::{open_store, CommandResult};
use sealog_core::{StoreConfig, VerifyReport};

/// Runs the verify command. Fails if any line does not decrypt.
pub fn run(config: StoreConfig, include_rotated: bool, format: &str) -> CommandResult {
    let store = open_store(config)?;
    let segments = if include_rotated {
        store.list_segments(true)?
    } else {
        store
            .list_segments(true)?
            .into_iter()
            .filter(|segment| segment.active)
            .collect()
    };
    let report = store.verify(&segments)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_result(&report),
    }

    if report.is_ok() {
        Ok(())
    } else {
        Err(format!("{} corrupt line(s) found", report.total.invalid).into())
    }
}

fn print_result(report: &VerifyReport) {
    for segment in &report.segments {
        println!("{}:", segment.path.display());
        println!("  Lines:   {}", segment.lines);
        println!("  Valid:   {}", segment.valid);
        println!("  Invalid: {}", segment.invalid);
    }

    println!();
    println!(
        "{} segment(s), {} line(s): {} valid, {} invalid",
        report.total.segments, report.total.lines, report.total.valid, report.total.invalid
    );
    if report.is_ok() {
        println!("✓ Verification passed");
    } else {
        println!("✗ Verification failed");
    }
}
