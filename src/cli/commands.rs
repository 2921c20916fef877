//! # Meta Command Handler
//!
//! Parses and executes the dot commands the REPL recognizes. Dot
//! commands start with a period and bypass statement preparation.
//!
//! | Command       | Description                           |
//! |---------------|---------------------------------------|
//! | `.exit`       | Close the table and leave the REPL    |
//! | `.btree`      | Print the tree structure              |
//! | `.constants`  | Print the on-disk layout constants    |
//!
//! Anything else is reported back as unrecognized; the REPL prints the
//! message and returns to the prompt.

use eyre::Result;

use crate::config::{
    COMMON_HEADER_SIZE, LEAF_CELL_SIZE, LEAF_HEADER_SIZE, LEAF_MAX_CELLS, LEAF_SPACE_FOR_CELLS,
    ROW_SIZE,
};
use crate::table::Table;

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Close the table and terminate with success.
    Exit,
    /// Text to display, then back to the prompt.
    Output(String),
    /// Not a known command; the REPL reports it.
    Unrecognized,
}

pub struct CommandHandler;

impl CommandHandler {
    pub fn is_command(input: &str) -> bool {
        input.trim_start().starts_with('.')
    }

    pub fn execute(input: &str, table: &mut Table) -> Result<CommandResult> {
        match input.trim() {
            ".exit" => Ok(CommandResult::Exit),
            ".btree" => {
                let tree = table.render_tree()?;
                Ok(CommandResult::Output(format!("Tree:\n{}", tree.trim_end())))
            }
            ".constants" => Ok(CommandResult::Output(constants_text())),
            _ => Ok(CommandResult::Unrecognized),
        }
    }
}

fn constants_text() -> String {
    format!(
        "Constants:\n\
         ROW_SIZE: {}\n\
         COMMON_HEADER_SIZE: {}\n\
         LEAF_HEADER_SIZE: {}\n\
         LEAF_CELL_SIZE: {}\n\
         LEAF_SPACE_FOR_CELLS: {}\n\
         LEAF_MAX_CELLS: {}",
        ROW_SIZE,
        COMMON_HEADER_SIZE,
        LEAF_HEADER_SIZE,
        LEAF_CELL_SIZE,
        LEAF_SPACE_FOR_CELLS,
        LEAF_MAX_CELLS
    )
}
