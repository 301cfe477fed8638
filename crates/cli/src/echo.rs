use ngoscope_core::{FieldKind, OrganizationRecord};
use owo_colors::OwoColorize;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "ngoscope".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Extract organization records from NGO websites\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// Print timing information with color coding
pub fn print_timing(label: &str, duration: std::time::Duration) {
    let secs = duration.as_secs_f64();
    let label = format!("{}:", label);

    if secs < 5.0 {
        eprintln!("  {} {:>8.2}s ({})", label.dimmed(), secs, "fast".dimmed());
    } else if secs < 30.0 {
        eprintln!("  {} {:>8.2}s ({})", label.dimmed(), secs, "moderate".bright_yellow());
    } else {
        eprintln!("  {} {:>8.2}s ({})", label.dimmed(), secs, "slow".bright_red());
    }
}

/// Print which fields of a record are still unresolved
pub fn print_record_summary(record: &OrganizationRecord) {
    let unresolved = record.unresolved_fields();
    let resolved = FieldKind::RESOLVABLE.len() - unresolved.len();
    let name = record.ngo_name.as_deref().unwrap_or(&record.website_url);

    eprintln!(
        "  {} {} {}",
        name.bright_white(),
        format!("{}/{}", resolved, FieldKind::RESOLVABLE.len()).dimmed(),
        "fields resolved".dimmed()
    );
    if !unresolved.is_empty() {
        let keys: Vec<&str> = unresolved.iter().map(FieldKind::key).collect();
        eprintln!("  {} {}", "Missing:".dimmed(), keys.join(", ").bright_yellow());
    }
}

/// Print batch summary
pub fn print_batch_summary(total: std::time::Duration, succeeded: usize, failed: usize) {
    eprintln!("{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Batch Summary".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    eprintln!("  {} {}", "Extracted:".dimmed(), succeeded.to_string().bright_white());
    if failed > 0 {
        eprintln!("  {} {}", "Failed:".dimmed(), failed.to_string().bright_red());
    }
    print_timing("Total", total);
    eprintln!();
}
