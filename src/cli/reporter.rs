// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::kernel::OperationReport;
use crate::predicates::StatsSnapshot;
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Solidity verdict in the classic two-line layout
    pub fn report_solidity(file: &str, solid: bool) {
        println!("The mesh {} is:", file);
        if solid {
            println!("    {}", "SOLID".green().bold());
        } else {
            println!("    {}", "NOT SOLID".red().bold());
        }
    }

    /// Report a finished operation
    pub fn report_operation(operation: &str, output: &str, triangles: usize, duration: Duration) {
        println!(
            "{} {} {} {}",
            "✅".green(),
            operation.bold(),
            "->".bright_black(),
            output.cyan()
        );
        println!(
            "  {} {}",
            "Triangles:".bright_black(),
            triangles.to_string().cyan()
        );
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
    }

    /// Report resolution, classification and predicate counters
    pub fn report_stats(report: &OperationReport) {
        println!("\n{}", "Statistics:".bold());
        let resolve = &report.resolve;
        Self::print_count("Candidate pairs", resolve.candidate_pairs);
        Self::print_count("Contacts", resolve.contacts);
        Self::print_count("Degenerate contacts", resolve.degenerate_contacts);
        Self::print_count("Triple points", resolve.triple_points);
        Self::print_count("Inserted vertices", resolve.inserted_vertices);
        Self::print_count("Retriangulated faces", resolve.retriangulated_faces);

        let classification = &report.classification;
        if classification.patches > 0 {
            Self::print_count("Patches", classification.patches);
            Self::print_count("Boundary patches", classification.boundary_patches);
            Self::print_count("Ray casts", classification.ray_casts);
            Self::print_count("Degenerate rays", classification.degenerate_rays);
        }

        if let Some(predicates) = &report.predicates {
            Self::report_predicates(predicates);
        }
    }

    pub fn report_predicates(stats: &StatsSnapshot) {
        Self::print_count("Predicate calls", stats.calls as usize);
        Self::print_count("Exact evaluations", stats.exact_calls as usize);
        Self::print_count("Degeneracies", stats.degeneracies as usize);
        println!(
            "  {} {}",
            "Filter hit rate:".bright_black(),
            format!("{:.2}%", 100.0 * stats.filter_hit_rate()).cyan()
        );
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("{} {}", "❌ Error:".red().bold(), message);
    }

    fn print_count(name: &str, value: usize) {
        println!(
            "  {} {}",
            format!("{}:", name).bright_black(),
            value.to_string().cyan()
        );
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(
            Reporter::format_duration(Duration::from_micros(500)),
            "500µs"
        );
        assert_eq!(
            Reporter::format_duration(Duration::from_millis(5)),
            "5.00ms"
        );
        assert_eq!(Reporter::format_duration(Duration::from_secs(2)), "2.00s");
    }
}
