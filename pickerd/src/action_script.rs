//! # Action Script Parser
//!
//! A line-based script format that drives the picker deterministically.
//!
//! ## Format
//!
//! Each line is one command:
//! - `click <col> <path>`: single click on a row in column 1, 2 or 3
//! - `open <col> <path>`: double click on a row
//! - `crumb <path>`: double click on a breadcrumb segment
//! - `goto <text>`: submit text from the path bar (the rest of the line, trimmed)
//! - `up`, `back`, `select` (the "Open" button), `close`
//! - `reload`: load a fresh snapshot from the source
//! - Comments: `# This is a comment`
//!
//! ## Example
//!
//! ```text
//! # Drill into the docs folder
//! open 1 /docs
//! click 2 /docs/readme.md
//! select
//! ```

use services_column_picker::{Column, PickerAction};
use std::collections::VecDeque;
use thiserror::Error;

/// Action script error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Unknown command at line {line}: {command}")]
    UnknownCommand { line: usize, command: String },

    #[error("Missing argument at line {line}: {command} expects {expected}")]
    MissingArgument {
        line: usize,
        command: String,
        expected: &'static str,
    },

    #[error("Invalid column at line {line}: {value} (expected 1, 2 or 3)")]
    InvalidColumn { line: usize, value: String },

    #[error("Empty script")]
    EmptyScript,
}

/// What a script line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    /// Dispatch an action to the picker
    Action(PickerAction),
    /// Reload the snapshot
    Reload,
}

/// One parsed script line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStep {
    /// One-based line number
    pub line: usize,
    /// The line as written, trimmed
    pub text: String,
    pub command: ScriptCommand,
}

/// Action script
#[derive(Debug, Clone, Default)]
pub struct ActionScript {
    steps: VecDeque<ScriptStep>,
}

impl ActionScript {
    /// Creates an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a script from text
    pub fn from_text(text: &str) -> Result<Self, ScriptError> {
        let mut steps = VecDeque::new();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let command = Self::parse_line(line, index + 1)?;
            steps.push_back(ScriptStep {
                line: index + 1,
                text: line.to_string(),
                command,
            });
        }

        if steps.is_empty() {
            return Err(ScriptError::EmptyScript);
        }

        Ok(Self { steps })
    }

    fn parse_line(line: &str, line_num: usize) -> Result<ScriptCommand, ScriptError> {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let action = match command.to_lowercase().as_str() {
            "click" => {
                let (column, path) = Self::parse_row(command, rest, line_num)?;
                PickerAction::Click { column, path }
            }
            "open" => {
                let (column, path) = Self::parse_row(command, rest, line_num)?;
                PickerAction::DoubleClick { column, path }
            }
            "crumb" => {
                if rest.is_empty() {
                    return Err(ScriptError::MissingArgument {
                        line: line_num,
                        command: command.to_string(),
                        expected: "<path>",
                    });
                }
                PickerAction::Breadcrumb(rest.to_string())
            }
            "goto" => PickerAction::SubmitPath(rest.to_string()),
            "up" => PickerAction::Up,
            "back" => PickerAction::Back,
            "select" => PickerAction::Open,
            "close" => PickerAction::Close,
            "reload" => return Ok(ScriptCommand::Reload),
            _ => {
                return Err(ScriptError::UnknownCommand {
                    line: line_num,
                    command: command.to_string(),
                })
            }
        };

        Ok(ScriptCommand::Action(action))
    }

    /// Parses `<col> <path>`
    fn parse_row(command: &str, rest: &str, line_num: usize) -> Result<(Column, String), ScriptError> {
        let missing = || ScriptError::MissingArgument {
            line: line_num,
            command: command.to_string(),
            expected: "<col> <path>",
        };
        let (column, path) = rest.split_once(char::is_whitespace).ok_or_else(missing)?;
        let path = path.trim();
        if path.is_empty() {
            return Err(missing());
        }

        let column = column
            .parse::<usize>()
            .ok()
            .and_then(Column::from_position)
            .ok_or_else(|| ScriptError::InvalidColumn {
                line: line_num,
                value: column.to_string(),
            })?;

        Ok((column, path.to_string()))
    }

    /// Returns the next step, if any
    pub fn next_step(&mut self) -> Option<ScriptStep> {
        self.steps.pop_front()
    }

    /// Returns true if the script has more steps
    pub fn has_more(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Returns the number of remaining steps
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_command(text: &str) -> ScriptCommand {
        ActionScript::from_text(text).unwrap().next_step().unwrap().command
    }

    #[test]
    fn test_parse_row_commands() {
        assert_eq!(
            first_command("click 2 /docs/a.txt"),
            ScriptCommand::Action(PickerAction::Click {
                column: Column::Second,
                path: "/docs/a.txt".to_string(),
            })
        );
        assert_eq!(
            first_command("open 3 /a/b/c"),
            ScriptCommand::Action(PickerAction::DoubleClick {
                column: Column::Third,
                path: "/a/b/c".to_string(),
            })
        );
    }

    #[test]
    fn test_path_may_contain_spaces() {
        assert_eq!(
            first_command("open 1 /My Documents"),
            ScriptCommand::Action(PickerAction::DoubleClick {
                column: Column::First,
                path: "/My Documents".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_bare_commands() {
        let mut script = ActionScript::from_text("up\nback\nselect\nclose\nreload").unwrap();
        assert_eq!(script.remaining(), 5);
        assert_eq!(script.next_step().unwrap().command, ScriptCommand::Action(PickerAction::Up));
        assert_eq!(script.next_step().unwrap().command, ScriptCommand::Action(PickerAction::Back));
        assert_eq!(script.next_step().unwrap().command, ScriptCommand::Action(PickerAction::Open));
        assert_eq!(script.next_step().unwrap().command, ScriptCommand::Action(PickerAction::Close));
        assert_eq!(script.next_step().unwrap().command, ScriptCommand::Reload);
        assert!(!script.has_more());
    }

    #[test]
    fn test_goto_keeps_inner_text() {
        assert_eq!(
            first_command("goto docs/notes/"),
            ScriptCommand::Action(PickerAction::SubmitPath("docs/notes/".to_string()))
        );
        assert_eq!(
            first_command("goto    /docs/My Notes  "),
            ScriptCommand::Action(PickerAction::SubmitPath("/docs/My Notes".to_string()))
        );
        assert_eq!(
            first_command("goto"),
            ScriptCommand::Action(PickerAction::SubmitPath(String::new()))
        );
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let mut script = ActionScript::from_text("# intro\n\n  crumb /  \n# end").unwrap();
        let step = script.next_step().unwrap();
        assert_eq!(step.line, 3);
        assert_eq!(step.text, "crumb /");
        assert_eq!(step.command, ScriptCommand::Action(PickerAction::Breadcrumb("/".to_string())));
    }

    #[test]
    fn test_empty_script_error() {
        assert_eq!(ActionScript::from_text("").unwrap_err(), ScriptError::EmptyScript);
        assert_eq!(
            ActionScript::from_text("# only comments").unwrap_err(),
            ScriptError::EmptyScript
        );
    }

    #[test]
    fn test_unknown_command() {
        let err = ActionScript::from_text("up\njump /a").unwrap_err();
        assert_eq!(
            err,
            ScriptError::UnknownCommand {
                line: 2,
                command: "jump".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_column() {
        let err = ActionScript::from_text("click 4 /a").unwrap_err();
        assert!(matches!(err, ScriptError::InvalidColumn { line: 1, .. }));
        let err = ActionScript::from_text("open x /a").unwrap_err();
        assert!(matches!(err, ScriptError::InvalidColumn { .. }));
    }

    #[test]
    fn test_missing_arguments() {
        for text in ["click", "click 1", "open 2   ", "crumb"] {
            let err = ActionScript::from_text(text).unwrap_err();
            assert!(matches!(err, ScriptError::MissingArgument { .. }), "{}", text);
        }
    }
}
