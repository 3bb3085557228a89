//! Output formatting utilities

use chrono::Utc;
use colored::Colorize;
use rollback_lib::{ClusterOps, RunOutcome, WorkloadRef};
use tabled::{settings::Style, Table, Tabled};

/// Row for the revision history table
#[derive(Tabled)]
struct RevisionRow {
    #[tabled(rename = "Revision")]
    revision: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Current")]
    current: String,
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print the deployment's replica-set revision history, newest first.
/// Lookup failures are silent; the table is operator convenience only.
pub async fn print_revision_history(cluster: &dyn ClusterOps, workload: &WorkloadRef) {
    let mut records = match cluster.list_revisions(workload).await {
        Ok(records) => records,
        Err(_) => return,
    };
    if records.is_empty() {
        return;
    }

    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let rows: Vec<RevisionRow> = records
        .iter()
        .map(|r| RevisionRow {
            revision: r.revision.clone(),
            created: r.created_at.format("%Y-%m-%d %H:%M").to_string(),
            age: format_age(Utc::now().signed_duration_since(r.created_at)),
            current: if r.is_current {
                "✓".to_string()
            } else {
                String::new()
            },
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("Rollout history for {workload}:");
    println!("{}", table);
}

/// Print the terminal state of the run
pub fn print_outcome(outcome: &RunOutcome, workload: &WorkloadRef) {
    match outcome {
        RunOutcome::Healthy => {
            print_success(&format!(
                "Deployment {} is healthy, no rollback required",
                workload.name
            ));
        }
        RunOutcome::CheckOnlyUnhealthy => {
            print_warning(&format!(
                "Deployment {} is unhealthy (check-only mode, no rollback executed)",
                workload.name
            ));
        }
        RunOutcome::RolledBack(result) => {
            print_success(&format!(
                "Rolled back {} to revision {}",
                workload.name,
                result.target_revision.as_deref().unwrap_or("?")
            ));
        }
        RunOutcome::RollbackFailed(result) => {
            print_error(&format!(
                "Rollback of {} to revision {} failed",
                workload.name,
                result.target_revision.as_deref().unwrap_or("?")
            ));
            if let Some(detail) = &result.error_detail {
                eprintln!("{}", detail.trim());
            }
        }
    }
}

fn format_age(age: chrono::Duration) -> String {
    let minutes = age.num_minutes();
    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m", minutes)
    } else if minutes < 24 * 60 {
        format!("{}h", minutes / 60)
    } else {
        format!("{}d", minutes / (24 * 60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(chrono::Duration::seconds(30)), "just now");
        assert_eq!(format_age(chrono::Duration::minutes(45)), "45m");
        assert_eq!(format_age(chrono::Duration::hours(26)), "1d");
        assert_eq!(format_age(chrono::Duration::hours(5)), "5h");
    }
}
