use colored::Colorize;
use serde_json::Value;

pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => print_error(&format!("Failed to render JSON: {e}")),
    }
}

pub fn print_counts(counts: &[(String, usize)]) {
    if counts.is_empty() {
        println!("No resources found.");
        return;
    }
    let width = counts.iter().map(|(t, _)| t.len()).max().unwrap_or(0);
    for (resource_type, count) in counts {
        println!("{}  {}", format!("{resource_type:<width$}").cyan(), count);
    }
    let total: usize = counts.iter().map(|(_, c)| c).sum();
    println!("Total: {total}");
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}
