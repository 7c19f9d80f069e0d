//! `simulate` subcommand: replay a scenario file in virtual time.

use std::path::Path;

use super::{Led, Result, Scenario, kv, kv_indent, kv_width, level, print_json};

pub(super) fn cmd_simulate(scenario_file: &Path, quiet: bool, json: bool) -> Result<()> {
    let scenario = Scenario::load(scenario_file)?;
    log::debug!(
        "[scenario] {} step(s) from {}",
        scenario.steps.len(),
        scenario_file.display()
    );
    let report = scenario.run();

    if json {
        print_json(&report);
        return Ok(());
    }

    let w = kv_width(
        &["Device:", "Ticks:", "Virtual time:"],
        &["GSM:", "GPS:", "Power:"],
    );
    kv("Device:", &report.device_type, w);
    kv("Ticks:", report.ticks, w);
    kv("Virtual time:", format_args!("{} ms", report.elapsed_ms), w);
    println!();

    println!("Writes:");
    for led in Led::ALL {
        kv_indent(
            &format!("{led}:"),
            format_args!(
                "{} ({} changes)",
                report.writes.get(led),
                report.events_for(led).count()
            ),
            w,
        );
    }
    println!();

    println!("Final state:");
    for s in &report.final_state.leds {
        kv_indent(
            &format!("{}:", s.led),
            format_args!("{} ({} ms since change)", level(s.is_on), s.elapsed_ms),
            w,
        );
    }

    if !quiet {
        println!();
        println!("Transitions:");
        for e in &report.events {
            println!("  [{:>8} ms] {:<6}{}", e.at_ms, e.led, level(e.on));
        }
    }
    Ok(())
}
