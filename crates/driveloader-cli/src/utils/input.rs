//! User input utilities for interactive command-line prompts.

use std::io::{self, Write};

use anyhow::{Context, Result};

use driveloader_core::domain::RemoteObject;
use driveloader_download::Disambiguator;

/// Prompts the user for a string input.
///
/// The input is read from stdin and returned with whitespace trimmed.
pub fn prompt_string(prompt: &str) -> Result<String> {
    print!("{prompt}: ");
    io::stdout().flush().ok();

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Failed to read user input")?;

    Ok(input.trim().to_string())
}

/// Parse a 1-based menu choice. Empty input or `q` means no choice.
pub fn parse_choice(input: &str, count: usize) -> Option<Result<usize, String>> {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("q") {
        return None;
    }
    Some(match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
        _ => Err(format!("Please enter a number between 1 and {count}.")),
    })
}

/// Asks on the terminal which of several same-named folders to use.
pub struct PromptDisambiguator;

impl Disambiguator for PromptDisambiguator {
    fn choose(&self, name: &str, candidates: &[RemoteObject]) -> Option<usize> {
        println!("Multiple folders match '{name}':");
        for (i, folder) in candidates.iter().enumerate() {
            println!(
                "  {}. {} (id {}, parent {})",
                i + 1,
                folder.name,
                folder.id,
                folder.parent_id.as_deref().unwrap_or("-")
            );
        }

        loop {
            let input = match prompt_string("Choose a folder (Enter to skip)") {
                Ok(input) => input,
                Err(e) => {
                    tracing::warn!(error = %e, "Cannot read choice, skipping folder");
                    return None;
                }
            };
            match parse_choice(&input, candidates.len())? {
                Ok(index) => return Some(index),
                Err(message) => eprintln!("{message}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("2", 3), Some(Ok(1)));
        assert_eq!(parse_choice(" 1 ", 3), Some(Ok(0)));
        assert_eq!(parse_choice("", 3), None);
        assert_eq!(parse_choice("Q", 3), None);
        assert!(matches!(parse_choice("4", 3), Some(Err(_))));
        assert!(matches!(parse_choice("two", 3), Some(Err(_))));
    }
}
