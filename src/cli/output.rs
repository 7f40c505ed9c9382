use console::style;
use std::fmt::Display;

/// Console formatting shared by every command
pub struct Output;

impl Output {
    pub fn success<T: Display>(message: T) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error<T: Display>(message: T) {
        println!("{} {}", style("✗").red(), message);
    }

    pub fn warning<T: Display>(message: T) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info<T: Display>(message: T) {
        println!("{} {}", style("ℹ").cyan(), message);
    }

    /// Print a sub-item with arrow prefix
    pub fn sub_item<T: Display>(message: T) {
        println!("  {} {}", style("→").dim(), message);
    }

    pub fn bullet<T: Display>(message: T) {
        println!("  {} {}", style("•").dim(), message);
    }

    pub fn section<T: Display>(title: T) {
        println!("\n{}", style(title).bold().underlined());
    }

    pub fn tip<T: Display>(message: T) {
        println!("{} {}", style("TIP:").cyan(), style(message).dim());
    }

    /// Print a numbered item
    pub fn numbered_item<T: Display>(number: usize, message: T) {
        println!("  {}. {}", style(number).cyan(), message);
    }

    /// Print a command example
    pub fn command_example<T: Display>(command: T) {
        println!("    {}", style(command).yellow());
    }

    pub fn spacing() {
        println!();
    }
}
