//! Markdown output generation for case records.

use crate::result::CaseRecord;
use std::collections::BTreeMap;
use std::fmt::{self, Write};

/// Generate a markdown summary from case records.
///
/// Records are listed in log order, followed by per-suite totals.
pub fn generate_summary(records: &[CaseRecord]) -> String {
    let mut output = String::new();
    write_summary(&mut output, records).expect("writing to a String cannot fail");
    output
}

fn write_summary(output: &mut String, records: &[CaseRecord]) -> fmt::Result {
    writeln!(output, "# Perfsuite Summary")?;
    writeln!(output)?;
    writeln!(output, "Generated: {}", chrono::Utc::now().to_rfc3339())?;
    writeln!(output)?;
    writeln!(output, "## Results")?;
    writeln!(output)?;
    writeln!(
        output,
        "| Test | Iterations | Total (ms) | Avg (ms) | Min (ms) | Max (ms) |"
    )?;
    writeln!(
        output,
        "|------|------------|------------|----------|----------|----------|"
    )?;

    for record in records {
        writeln!(
            output,
            "| {} | {} | {:.3} | {:.3} | {:.3} | {:.3} |",
            record.name,
            record.iterations,
            record.total_ms(),
            record.average_ms(),
            record.min_ms(),
            record.max_ms()
        )?;
    }

    let suites = suite_totals(records);
    if !suites.is_empty() {
        writeln!(output)?;
        writeln!(output, "## Suites")?;
        writeln!(output)?;
        writeln!(output, "| Suite | Cases | Total (ms) |")?;
        writeln!(output, "|-------|-------|------------|")?;
        for (suite, (cases, total_us)) in &suites {
            writeln!(
                output,
                "| {} | {} | {:.3} |",
                suite,
                cases,
                *total_us as f64 / 1000.0
            )?;
        }
    }

    writeln!(output)?;
    writeln!(output, "---")?;
    writeln!(output, "Total cases: {}", records.len())?;

    Ok(())
}

/// Case count and summed total per suite, in first-seen order.
fn suite_totals(records: &[CaseRecord]) -> Vec<(&str, (usize, u64))> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: BTreeMap<&str, (usize, u64)> = BTreeMap::new();
    for record in records {
        let entry = totals.entry(record.suite.as_str()).or_insert_with(|| {
            order.push(record.suite.as_str());
            (0, 0)
        });
        entry.0 += 1;
        entry.1 += u64::from(record.total_us);
    }
    order
        .into_iter()
        .filter_map(|suite| totals.get(suite).map(|t| (suite, *t)))
        .collect()
}
