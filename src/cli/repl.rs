//! # REPL (Read-Eval-Print Loop)
//!
//! The interactive front end. Reads lines with rustyline (history, line
//! editing), dispatches dot commands and statements, and prints results
//! on the fixed message surface:
//!
//! ```text
//! db > insert 1 test test@email.com
//! Executed.
//! db > select
//! (1, test, test@email.com)
//! Executed.
//! db > .exit
//! ```
//!
//! Statement-level problems (bad syntax, duplicate keys) are printed
//! and the loop continues. Environmental failures such as pager errors
//! and the internal-node split limit propagate out of [`Repl::run`];
//! the binary reports them on stderr and exits non-zero.
//!
//! `.exit` (or Ctrl-D) closes the table, which is the only point at
//! which changes become durable.

use eyre::{Result, WrapErr};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::cli::commands::{CommandHandler, CommandResult};
use crate::cli::history::history_path;
use crate::sql::{execute_statement, prepare_statement, ExecuteResult};
use crate::table::Table;

const PROMPT: &str = "db > ";

enum LoopSignal {
    Continue,
    Exit,
}

pub struct Repl {
    table: Table,
    editor: DefaultEditor,
}

impl Repl {
    pub fn new(table: Table) -> Result<Self> {
        let mut editor = DefaultEditor::new().wrap_err("failed to initialize line editor")?;

        if let Some(history_file) = history_path() {
            let _ = editor.load_history(&history_file);
        }

        Ok(Self { table, editor })
    }

    /// Runs until `.exit` or end of input, then closes the table.
    pub fn run(mut self) -> Result<()> {
        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    if let LoopSignal::Exit = self.handle_line(&line)? {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                }
                Err(ReadlineError::Eof) => {
                    break;
                }
                Err(err) => {
                    eprintln!("Error reading input: {}", err);
                    break;
                }
            }
        }

        self.save_history();
        self.table.close()
    }

    fn handle_line(&mut self, line: &str) -> Result<LoopSignal> {
        let input = line.trim();

        if input.is_empty() {
            return Ok(LoopSignal::Continue);
        }
        self.editor.add_history_entry(input).ok();

        if CommandHandler::is_command(input) {
            return self.handle_command(input);
        }

        match prepare_statement(input) {
            Ok(statement) => {
                let result = execute_statement(&statement, &mut self.table)?;
                print_result(result);
            }
            Err(err) => println!("{}", err),
        }

        Ok(LoopSignal::Continue)
    }

    fn handle_command(&mut self, input: &str) -> Result<LoopSignal> {
        match CommandHandler::execute(input, &mut self.table)? {
            CommandResult::Exit => Ok(LoopSignal::Exit),
            CommandResult::Output(text) => {
                println!("{}", text);
                Ok(LoopSignal::Continue)
            }
            CommandResult::Unrecognized => {
                println!("Unrecognized command: {}", input);
                Ok(LoopSignal::Continue)
            }
        }
    }

    fn save_history(&mut self) {
        if let Some(history_file) = history_path() {
            if let Err(err) = self.editor.save_history(&history_file) {
                eprintln!("Warning: could not save history: {}", err);
            }
        }
    }
}

fn print_result(result: ExecuteResult) {
    match result {
        ExecuteResult::Inserted => println!("Executed."),
        ExecuteResult::Rows(rows) => {
            for row in rows {
                println!("{}", row);
            }
            println!("Executed.");
        }
        ExecuteResult::DuplicateKey => println!("Error: Duplicate key."),
        ExecuteResult::TableFull => println!("Error: Table full."),
        ExecuteResult::Unhandled => println!("Error: Unhandled statement."),
    }
}
