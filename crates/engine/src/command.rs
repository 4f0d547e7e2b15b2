//! Command description passed to session primitives.

use dbkit_core::{CommandKind, Parameter};

/// SQL text (or stored procedure name) plus its parameters.
///
/// `&str` converts into a parameterless text command, so simple calls read
/// `session.fill_table("SELECT ...")`.
#[derive(Debug, Clone, Copy)]
pub struct Command<'a> {
    /// SQL text or procedure name
    pub text: &'a str,
    /// How `text` is interpreted
    pub kind: CommandKind,
    /// Parameters, bound in order
    pub parameters: &'a [Parameter],
}

impl<'a> Command<'a> {
    /// A text command.
    pub fn text(text: &'a str) -> Self {
        Self {
            text,
            kind: CommandKind::Text,
            parameters: &[],
        }
    }

    /// A stored procedure call.
    pub fn procedure(name: &'a str) -> Self {
        Self {
            text: name,
            kind: CommandKind::StoredProcedure,
            parameters: &[],
        }
    }

    /// Attach parameters.
    pub fn with_parameters(mut self, parameters: &'a [Parameter]) -> Self {
        self.parameters = parameters;
        self
    }
}

impl<'a> From<&'a str> for Command<'a> {
    fn from(text: &'a str) -> Self {
        Command::text(text)
    }
}

impl<'a> From<&'a String> for Command<'a> {
    fn from(text: &'a String) -> Self {
        Command::text(text)
    }
}

impl<'a> From<(&'a str, &'a [Parameter])> for Command<'a> {
    fn from((text, parameters): (&'a str, &'a [Parameter])) -> Self {
        Command::text(text).with_parameters(parameters)
    }
}
