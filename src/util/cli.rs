use std::io::{Read, Write};

use anyhow::{Context, Result};
use dialoguer::theme::Theme;

pub fn confirm<T>(theme: &dyn Theme, default: bool, text: T) -> std::io::Result<bool>
where
    T: Into<String>,
{
    dialoguer::Confirm::with_theme(theme)
        .with_prompt(text)
        .default(default)
        .interact()
}

pub fn print_output<T: std::fmt::Display>(arg: T) {
    if is_terminal() {
        writeln!(std::io::stdout(), "{arg:#}")
    } else {
        write!(std::io::stdout(), "{arg}")
    }
    .unwrap()
}

pub fn print_error(text: impl std::fmt::Display) {
    if is_terminal() {
        eprintln!("{}", console::style(format!("✘ {text}")).red().bold());
    } else {
        eprintln!("Error: {text}");
    }
}

pub fn note(text: impl std::fmt::Display) -> impl std::fmt::Display {
    console::style(format!("({text})")).dim()
}

/// Reads the argument, falling back to stdin when absent
pub fn parse_optional_input(data: Option<String>) -> Result<String> {
    match data {
        Some(data) => Ok(data),
        None => {
            let mut data = String::new();
            std::io::stdin()
                .read_to_string(&mut data)
                .context("failed to read from stdin")?;
            Ok(data)
        }
    }
}

pub fn is_terminal() -> bool {
    use once_cell::race::OnceBox;

    static IS_TERMINAL: OnceBox<bool> = OnceBox::new();
    *IS_TERMINAL.get_or_init(|| Box::new(console::user_attended()))
}
