//! Command interpretation engine.
//!
//! # Responsibility
//! - Rewrite dot-call syntax into the canonical verb-first form.
//! - Turn free-text parameter lists into typed attribute sets.
//! - Resolve create/show/destroy/update arguments into typed requests.
//!
//! # Invariants
//! - Every function here is pure: no storage access, no output.
//! - User-facing failures are `CommandError` values whose `Display` is the
//!   fixed console diagnostic.

pub mod coercion;
pub mod create;
pub mod map_literal;
pub mod normalize;
pub mod target;
pub mod token;
pub mod update;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub use create::{resolve_create, CreateRequest};
pub use normalize::{normalize, Normalized, PassthroughReason};
pub use target::resolve_target;
pub use update::{parse_update_args, resolve_update, UpdateArgs, UpdateRequest};

/// User-facing command diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    ClassNameMissing,
    ClassDoesNotExist,
    InstanceIdMissing,
    NoInstanceFound,
    AttributeNameMissing,
    ValueMissing,
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::ClassNameMissing => "** class name missing **",
            Self::ClassDoesNotExist => "** class doesn't exist **",
            Self::InstanceIdMissing => "** instance id missing **",
            Self::NoInstanceFound => "** no instance found **",
            Self::AttributeNameMissing => "** attribute name missing **",
            Self::ValueMissing => "** value missing **",
        };
        f.write_str(message)
    }
}

impl Error for CommandError {}

/// Recognized console verbs. Matching is exact and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Create,
    Show,
    Destroy,
    All,
    Count,
    Update,
    Quit,
    Eof,
    Help,
}

impl Verb {
    /// Verbs with help topics, in the order `help` lists them.
    pub const DOCUMENTED: [Verb; 9] = [
        Verb::Eof,
        Verb::All,
        Verb::Count,
        Verb::Create,
        Verb::Destroy,
        Verb::Help,
        Verb::Quit,
        Verb::Show,
        Verb::Update,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Show => "show",
            Self::Destroy => "destroy",
            Self::All => "all",
            Self::Count => "count",
            Self::Update => "update",
            Self::Quit => "quit",
            Self::Eof => "EOF",
            Self::Help => "help",
        }
    }

    pub fn help_text(self) -> &'static str {
        match self {
            Self::Create => {
                "Creates an instance of a class and prints its id\n\
                 [Usage]: create <className> [<key>=<value> ...]\n"
            }
            Self::Show => {
                "Shows an individual instance of a class\n\
                 [Usage]: show <className> <objectId>\n"
            }
            Self::Destroy => {
                "Destroys an individual instance of a class\n\
                 [Usage]: destroy <className> <objectId>\n"
            }
            Self::All => "Shows all objects, or all of a class\n[Usage]: all [<className>]\n",
            Self::Count => "Counts the stored instances of a class\n[Usage]: count <className>\n",
            Self::Update => {
                "Updates an object with new information\n\
                 [Usage]: update <className> <id> <attName> <attVal>\n\
                 [Usage]: update <className> <id> {<attName>: <attVal>, ...}\n"
            }
            Self::Quit => "Exits the program with formatting\n",
            Self::Eof => "Exits the program without formatting\n",
            Self::Help => "List available commands with \"help\" or detailed help with \"help cmd\".\n",
        }
    }
}

impl Display for Verb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(Self::Create),
            "show" => Ok(Self::Show),
            "destroy" => Ok(Self::Destroy),
            "all" => Ok(Self::All),
            "count" => Ok(Self::Count),
            "update" => Ok(Self::Update),
            "quit" => Ok(Self::Quit),
            "EOF" => Ok(Self::Eof),
            "help" => Ok(Self::Help),
            other => Err(other.to_string()),
        }
    }
}

/// Splits `text` at the first single space, like a one-shot partition.
///
/// Runs of spaces are not collapsed: `"User  42"` yields `("User", " 42")`.
pub(crate) fn partition_space(text: &str) -> (&str, &str) {
    text.split_once(' ').unwrap_or((text, ""))
}

#[cfg(test)]
mod tests {
    use super::{partition_space, CommandError, Verb};

    #[test]
    fn diagnostics_render_fixed_strings() {
        assert_eq!(CommandError::ClassNameMissing.to_string(), "** class name missing **");
        assert_eq!(CommandError::ClassDoesNotExist.to_string(), "** class doesn't exist **");
        assert_eq!(CommandError::InstanceIdMissing.to_string(), "** instance id missing **");
        assert_eq!(CommandError::NoInstanceFound.to_string(), "** no instance found **");
        assert_eq!(
            CommandError::AttributeNameMissing.to_string(),
            "** attribute name missing **"
        );
        assert_eq!(CommandError::ValueMissing.to_string(), "** value missing **");
    }

    #[test]
    fn verb_lookup_is_exact() {
        assert_eq!("update".parse::<Verb>(), Ok(Verb::Update));
        assert_eq!("EOF".parse::<Verb>(), Ok(Verb::Eof));
        assert!("Update".parse::<Verb>().is_err());
        assert!("eof".parse::<Verb>().is_err());
    }

    #[test]
    fn partition_keeps_space_runs() {
        assert_eq!(partition_space("User 42 rest"), ("User", "42 rest"));
        assert_eq!(partition_space("User  42"), ("User", " 42"));
        assert_eq!(partition_space("User"), ("User", ""));
    }
}
