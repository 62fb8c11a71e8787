//! User prompting: rename-vs-add questions and confirmations.
//!
//! Prompting is an injected collaborator so the reconciler can run
//! scripted in tests and fully non-interactive in deployments.

use std::io::{self, BufRead, Write};

use crate::error::MigrateResult;

/// Asks the user the few questions a migration run needs.
pub trait Prompter: Send + Sync {
    /// Present numbered options and return the chosen index. Empty input
    /// selects `default`.
    fn ask(&self, question: &str, options: &[String], default: usize) -> MigrateResult<usize>;

    /// Yes/no confirmation. Interactively only the literal `yes` counts as
    /// true; non-interactive implementations return `default`.
    fn ask_confirm(&self, question: &str, default: bool) -> MigrateResult<bool>;
}

/// Interactive prompter reading from stdin.
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn ask(&self, question: &str, options: &[String], default: usize) -> MigrateResult<usize> {
        let stdin = io::stdin();
        println!("{}", question);
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }
        loop {
            print!("> ");
            io::stdout().flush()?;

            let mut line = String::new();
            stdin.lock().read_line(&mut line)?;
            let line = line.trim();

            if line.is_empty() {
                return Ok(default);
            }
            if let Ok(n) = line.parse::<usize>()
                && (1..=options.len()).contains(&n)
            {
                return Ok(n - 1);
            }
            if let Some(i) = options.iter().position(|o| o == line) {
                return Ok(i);
            }
            println!("Please answer with a number between 1 and {}.", options.len());
        }
    }

    fn ask_confirm(&self, question: &str, _default: bool) -> MigrateResult<bool> {
        print!("{} [yes/no] ", question);
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim() == "yes")
    }
}

/// Prompter that answers every question with its default: renames resolve
/// to "added", confirmations to yes.
pub struct NonInteractivePrompter;

impl Prompter for NonInteractivePrompter {
    fn ask(&self, _question: &str, _options: &[String], default: usize) -> MigrateResult<usize> {
        Ok(default)
    }

    fn ask_confirm(&self, _question: &str, default: bool) -> MigrateResult<bool> {
        Ok(default)
    }
}

/// The answer to a "was this added or renamed?" question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameDecision {
    /// The table or column is new.
    Added,
    /// It was renamed from the given previous name.
    RenamedFrom(String),
}

/// Ask whether a missing table was added or renamed from one of the
/// unclaimed live tables.
pub fn ask_rename_table(
    prompter: &dyn Prompter,
    table: &str,
    candidates: &[String],
) -> MigrateResult<RenameDecision> {
    let question = format!(
        "Table '{}' is not in the database. Was it added, or renamed from an existing table?",
        table
    );
    ask_rename(prompter, &question, candidates)
}

/// Ask whether a missing column was added or renamed from one of the
/// unmatched live columns.
pub fn ask_rename_field(
    prompter: &dyn Prompter,
    table: &str,
    column: &str,
    candidates: &[String],
) -> MigrateResult<RenameDecision> {
    let question = format!(
        "Column '{}.{}' is not in the database. Was it added, or renamed from an existing column?",
        table, column
    );
    ask_rename(prompter, &question, candidates)
}

fn ask_rename(
    prompter: &dyn Prompter,
    question: &str,
    candidates: &[String],
) -> MigrateResult<RenameDecision> {
    let mut options = Vec::with_capacity(candidates.len() + 1);
    options.push("added".to_string());
    options.extend(candidates.iter().cloned());

    let choice = prompter.ask(question, &options, 0)?;
    if choice == 0 {
        Ok(RenameDecision::Added)
    } else {
        Ok(RenameDecision::RenamedFrom(options[choice].clone()))
    }
}
