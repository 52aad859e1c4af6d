use console::Style;

struct Styles {
    title: Style,
    label: Style,
    value: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
        }
    }
}

/// Print a styled parameter block before a long-running command starts.
pub fn print_summary(title: &str, rows: &[(&str, String)]) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to(title));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(title.len())));
    for (label, value) in rows {
        println!(
            "  {:<14}{}",
            s.label.apply_to(*label),
            s.value.apply_to(value)
        );
    }
    println!();
}
