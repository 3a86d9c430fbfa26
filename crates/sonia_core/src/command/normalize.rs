//! Dot-call syntax normalizer.
//!
//! Rewrites `<Class>.<verb>(<id>[, <args>])` into `<verb> <Class> <id> <args>`.
//! Any line that does not fit is passed through unchanged; the reason is kept
//! on the result so callers and tests can tell why.

use super::map_literal::is_map_literal;

/// Verbs accepted in dot-call position.
pub const DOT_CALL_VERBS: &[&str] = &["all", "count", "show", "destroy", "update"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassthroughReason {
    /// The line lacks one of `.`, `(`, `)` in usable order.
    NotDotCall,
    /// The text between `.` and `(` is not a dot-call verb.
    UnknownVerb(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Rewritten(String),
    Passthrough {
        line: String,
        reason: PassthroughReason,
    },
}

impl Normalized {
    pub fn as_line(&self) -> &str {
        match self {
            Self::Rewritten(line) => line,
            Self::Passthrough { line, .. } => line,
        }
    }

    pub fn is_rewritten(&self) -> bool {
        matches!(self, Self::Rewritten(_))
    }
}

/// Normalizes one raw input line.
pub fn normalize(line: &str) -> Normalized {
    let passthrough = |reason| Normalized::Passthrough {
        line: line.to_string(),
        reason,
    };

    if !(line.contains('.') && line.contains('(') && line.contains(')')) {
        return passthrough(PassthroughReason::NotDotCall);
    }

    let Some((class, remainder)) = line.split_once('.') else {
        return passthrough(PassthroughReason::NotDotCall);
    };
    let Some((verb, call)) = remainder.split_once('(') else {
        return passthrough(PassthroughReason::NotDotCall);
    };
    if !DOT_CALL_VERBS.contains(&verb) {
        return passthrough(PassthroughReason::UnknownVerb(verb.to_string()));
    }
    let Some(close) = call.rfind(')') else {
        return passthrough(PassthroughReason::NotDotCall);
    };
    let body = &call[..close];

    let mut id = String::new();
    let mut args = String::new();
    if !body.is_empty() {
        let (id_part, args_part) = body.split_once(", ").unwrap_or((body, ""));
        // An empty quoted id stays an empty field.
        id = id_part.replace('"', "");

        let args_part = args_part.trim();
        if !args_part.is_empty() {
            args = if args_part.starts_with('{')
                && args_part.ends_with('}')
                && is_map_literal(args_part)
            {
                args_part.to_string()
            } else {
                args_part.replace(',', "")
            };
        }
    }

    Normalized::Rewritten(format!("{verb} {class} {id} {args}"))
}
