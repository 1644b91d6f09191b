//! Output formatting for CLI

use crate::pipeline::OutcomeTally;

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Format a rate in [0, 1] as a percentage
pub fn format_percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print wins, draws and losses with their rates
pub fn print_tally(tally: &OutcomeTally) {
    print_kv("Games", &format_number(tally.total()));
    print_kv(
        "Wins",
        &format!("{} ({})", tally.wins, format_percent(tally.win_rate())),
    );
    print_kv(
        "Draws",
        &format!("{} ({})", tally.draws, format_percent(tally.draw_rate())),
    );
    print_kv(
        "Losses",
        &format!("{} ({})", tally.losses, format_percent(tally.loss_rate())),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.5), "50.0%");
        assert_eq!(format_percent(1.0 / 3.0), "33.3%");
    }
}
