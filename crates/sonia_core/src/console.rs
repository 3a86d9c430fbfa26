//! Line-oriented command dispatcher.
//!
//! # Responsibility
//! - Read command lines, normalize them and route each verb to its handler.
//! - Render objects, lists, counts and fixed diagnostics to the output sink.
//!
//! # Invariants
//! - One line is fully dispatched before the next one is read.
//! - User errors and storage failures are printed and never end the loop;
//!   only output I/O failures propagate.
//! - Nothing is written to the sink except console output.

use crate::command::{
    normalize, resolve_create, resolve_target, resolve_update, CommandError, Verb,
};
use crate::model::object::{quote_text, ClassName};
use crate::service::ObjectService;
use crate::store::{ObjectStore, StoreError};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, IsTerminal, Write};

/// Prompt shown before each read in interactive mode.
pub const PROMPT: &str = "(hbnb) ";

const HELP_HEADER: &str = "Documented commands (type help <topic>):";

/// Whether the interpreter keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// How prompts are rendered around commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// `(hbnb) ` before every read.
    Interactive,
    /// `(hbnb)` once up front, then `(hbnb) ` after every command.
    Piped,
}

impl PromptMode {
    /// Picks the mode from whether stdin is attached to a terminal.
    pub fn detect() -> Self {
        if io::stdin().is_terminal() {
            Self::Interactive
        } else {
            Self::Piped
        }
    }
}

/// Failure of a single command handler.
#[derive(Debug)]
pub enum ConsoleError {
    /// User-facing diagnostic, printed verbatim.
    Command(CommandError),
    /// Backend failure, printed as a storage error.
    Store(StoreError),
    /// Output sink failure; ends the loop.
    Io(io::Error),
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

impl Display for ConsoleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Command(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "** storage error: {err} **"),
            Self::Io(err) => write!(f, "console output error: {err}"),
        }
    }
}

impl Error for ConsoleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Command(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<CommandError> for ConsoleError {
    fn from(value: CommandError) -> Self {
        Self::Command(value)
    }
}

impl From<StoreError> for ConsoleError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<io::Error> for ConsoleError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Interactive interpreter over an object service and an output sink.
pub struct Console<S: ObjectStore, W: Write> {
    service: ObjectService<S>,
    out: W,
    prompt_mode: PromptMode,
}

impl<S: ObjectStore, W: Write> Console<S, W> {
    /// Creates an interactive-mode console.
    pub fn new(service: ObjectService<S>, out: W) -> Self {
        Self::with_prompt_mode(service, out, PromptMode::Interactive)
    }

    pub fn with_prompt_mode(service: ObjectService<S>, out: W, prompt_mode: PromptMode) -> Self {
        Self {
            service,
            out,
            prompt_mode,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs the read-eval loop until `quit`, `EOF` or end of input.
    pub fn run<R: BufRead>(&mut self, mut input: R) -> io::Result<()> {
        info!(
            "event=console_start module=console status=ok mode={:?} storage={}",
            self.prompt_mode,
            self.service.mode()
        );
        if self.prompt_mode == PromptMode::Piped {
            writeln!(self.out, "{}", PROMPT.trim_end())?;
        }

        let mut buffer = String::new();
        loop {
            if self.prompt_mode == PromptMode::Interactive {
                write!(self.out, "{PROMPT}")?;
                self.out.flush()?;
            }

            buffer.clear();
            let line = if input.read_line(&mut buffer)? == 0 {
                "EOF"
            } else {
                buffer.trim_end_matches(['\n', '\r'])
            };

            let flow = self.onecmd(line)?;
            if self.prompt_mode == PromptMode::Piped {
                write!(self.out, "{PROMPT}")?;
            }
            self.out.flush()?;
            if flow == Flow::Stop {
                break;
            }
        }

        info!("event=console_stop module=console status=ok");
        Ok(())
    }

    /// Interprets one input line.
    ///
    /// # Errors
    /// Only output failures are returned; every other failure is printed.
    pub fn onecmd(&mut self, line: &str) -> io::Result<Flow> {
        let normalized = normalize(line);
        if normalized.is_rewritten() {
            debug!("event=command_normalize module=console status=ok");
        }
        let line = normalized.as_line().trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let (verb_text, args) = match line.strip_prefix('?') {
            Some(topic) => ("help", topic.trim()),
            None => {
                let split = line
                    .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
                    .unwrap_or(line.len());
                (&line[..split], line[split..].trim())
            }
        };

        let verb = match verb_text.parse::<Verb>() {
            Ok(verb) => verb,
            Err(_) => {
                debug!(
                    "event=command_dispatch module=console status=unknown verb_len={}",
                    verb_text.len()
                );
                writeln!(self.out, "*** Unknown syntax: {line}")?;
                return Ok(Flow::Continue);
            }
        };
        debug!(
            "event=command_dispatch module=console status=ok verb={} args_len={}",
            verb,
            args.len()
        );

        let result = match verb {
            Verb::Quit => return Ok(Flow::Stop),
            Verb::Eof => {
                writeln!(self.out)?;
                return Ok(Flow::Stop);
            }
            Verb::Help => self.do_help(args),
            Verb::Create => self.do_create(args),
            Verb::Show => self.do_show(args),
            Verb::Destroy => self.do_destroy(args),
            Verb::All => self.do_all(args),
            Verb::Count => self.do_count(args),
            Verb::Update => self.do_update(args),
        };

        match result {
            Ok(()) => {}
            Err(ConsoleError::Io(err)) => return Err(err),
            Err(ConsoleError::Store(err)) => {
                error!(
                    "event=command_store module=console status=error verb={} error={}",
                    verb, err
                );
                writeln!(self.out, "{}", ConsoleError::Store(err))?;
            }
            Err(err @ ConsoleError::Command(_)) => writeln!(self.out, "{err}")?,
        }
        Ok(Flow::Continue)
    }

    fn do_create(&mut self, args: &str) -> ConsoleResult<()> {
        let request = resolve_create(args)?;
        let object = self.service.create(request.class, request.attributes)?;
        writeln!(self.out, "{}", object.id)?;
        Ok(())
    }

    fn do_show(&mut self, args: &str) -> ConsoleResult<()> {
        let key = resolve_target(args)?;
        let object = self
            .service
            .get(&key)?
            .ok_or(CommandError::NoInstanceFound)?;
        writeln!(self.out, "{object}")?;
        Ok(())
    }

    fn do_destroy(&mut self, args: &str) -> ConsoleResult<()> {
        let key = resolve_target(args)?;
        if !self.service.destroy(&key)? {
            return Err(CommandError::NoInstanceFound.into());
        }
        Ok(())
    }

    fn do_all(&mut self, args: &str) -> ConsoleResult<()> {
        let class = match args.split(' ').next().filter(|text| !text.is_empty()) {
            Some(text) => Some(
                text.parse::<ClassName>()
                    .map_err(|_| CommandError::ClassDoesNotExist)?,
            ),
            None => None,
        };

        let rendered = self
            .service
            .all(class)?
            .values()
            .map(|object| quote_text(&object.to_string()))
            .collect::<Vec<_>>();
        writeln!(self.out, "[{}]", rendered.join(", "))?;
        Ok(())
    }

    fn do_count(&mut self, args: &str) -> ConsoleResult<()> {
        let (class_text, _) = args.split_once(' ').unwrap_or((args, ""));
        let count = match class_text.parse::<ClassName>() {
            Ok(class) => self.service.count(class)?,
            Err(_) => 0,
        };
        writeln!(self.out, "{count}")?;
        Ok(())
    }

    fn do_update(&mut self, args: &str) -> ConsoleResult<()> {
        let request = resolve_update(args)?;
        let mut object = self
            .service
            .get(&request.key)?
            .ok_or(CommandError::NoInstanceFound)?;

        for (name, value) in request.args.into_pairs()? {
            if !object.set_attribute(name.as_str(), value) {
                warn!(
                    "event=update_attr_skip module=console status=ok key={} name={}",
                    request.key, name
                );
            }
        }

        self.service.save(&mut object)?;
        Ok(())
    }

    fn do_help(&mut self, topic: &str) -> ConsoleResult<()> {
        if topic.is_empty() {
            let names = Verb::DOCUMENTED
                .iter()
                .map(|verb| verb.as_str())
                .collect::<Vec<_>>();
            writeln!(self.out)?;
            writeln!(self.out, "{HELP_HEADER}")?;
            writeln!(self.out, "{}", "=".repeat(HELP_HEADER.len()))?;
            writeln!(self.out, "{}", names.join("  "))?;
            writeln!(self.out)?;
            return Ok(());
        }

        let (name, _) = topic.split_once(' ').unwrap_or((topic, ""));
        match name.parse::<Verb>() {
            Ok(verb) => writeln!(self.out, "{}", verb.help_text())?,
            Err(_) => writeln!(self.out, "*** No help on {topic}")?,
        }
        Ok(())
    }
}
