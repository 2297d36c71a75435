use crate::models::Source;
use crossterm::style::Stylize;
use std::io::IsTerminal;
use std::time::Duration;

pub fn is_stdout_terminal() -> bool {
    if std::env::var("PARLEY_FORCE_TTY").is_ok() {
        return true;
    }
    std::io::stdout().is_terminal()
}

pub fn is_stdin_terminal() -> bool {
    std::io::stdin().is_terminal()
}

/// Citation footer for streamed responses.
pub fn print_sources(sources: &[Source]) {
    if sources.is_empty() {
        return;
    }

    let styled = is_stdout_terminal();
    let dim = |text: String| {
        if styled {
            text.dim().to_string()
        } else {
            text
        }
    };

    println!("\n{}", dim("─── Sources ───".to_string()));
    for (index, source) in sources.iter().enumerate() {
        println!("{}", dim(format!("[{}] {}", index + 1, source.label())));
        if let (Some(url), Some(_)) = (&source.url, &source.title) {
            println!("{}", dim(format!("    {}", url)));
        }
    }
}

/// Elapsed wall-clock line on stderr, kept off piped output's stdout.
pub fn print_elapsed(duration: Duration) {
    let info = format!("Generated in {:.1}s", duration.as_secs_f64());
    if is_stdout_terminal() {
        eprintln!("{}", info.dim());
    } else {
        eprintln!("{}", info);
    }
}

/// Non-fatal continuation notice: provider history is advisory metadata.
pub fn warn_provider_mismatch(stored: &str, current: &str) {
    eprintln!(
        "Warning: Continuing {} conversation with {}",
        stored, current
    );
}

pub fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(limit).collect();
    truncated.push('…');
    truncated
}
