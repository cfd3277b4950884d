//! # Shell Completion Module
//!
//! Shell completion for Tunemates:
//! - Generation of completion scripts through clap_complete
//! - Dynamic username completion read from the profile corpus
//!
//! ## Usage
//!
//! ```bash
//! # Generate bash completions
//! tunemates completion bash > ~/.local/share/bash-completion/completions/tunemates
//!
//! # Usernames for the `similar` command
//! tunemates complete-users
//! ```

use crate::profile::ProfileStore;
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::io;
use std::path::Path;

/// Generate shell completions for the given shell
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

/// Convert our Shell enum to clap_complete's Shell enum
pub fn shell_to_completion_shell(shell: &crate::cli::Shell) -> CompletionShell {
    match shell {
        crate::cli::Shell::Bash => CompletionShell::Bash,
        crate::cli::Shell::Zsh => CompletionShell::Zsh,
        crate::cli::Shell::Fish => CompletionShell::Fish,
        crate::cli::Shell::PowerShell => CompletionShell::PowerShell,
        crate::cli::Shell::Elvish => CompletionShell::Elvish,
    }
}

/// Usernames available in `corpus_dir`, sorted.
///
/// Completion must never fail loudly, so an unreadable corpus yields nothing.
pub fn get_user_completions(corpus_dir: &Path) -> Vec<String> {
    match ProfileStore::load_dir(corpus_dir) {
        Ok(store) => store.usernames().map(str::to_owned).collect(),
        Err(err) => {
            log::debug!("No username completions: {err:#}");
            Vec::new()
        }
    }
}

/// Quote a completion candidate for shells that split on whitespace.
fn quote_for_shell(candidate: &str) -> String {
    if candidate.contains(char::is_whitespace) {
        format!("\"{}\"", candidate.replace('"', "\\\""))
    } else {
        candidate.to_owned()
    }
}

/// Print available usernames, one per line.
pub fn print_user_completions(corpus_dir: &Path) {
    for username in get_user_completions(corpus_dir) {
        println!("{}", quote_for_shell(&username));
    }
}
