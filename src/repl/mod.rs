//! Interactive session runner.
//!
//! Startup: banner, availability probe, instructions bootstrap, session.
//! Loop: one line in, one [`LoopSignal`] out, until `exit` or end-of-input.
//! Model failures are reported per turn and never end the loop.

mod output;

use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::config::ConfigLocation;
use crate::instructions::load_instructions;
use crate::model::{Availability, LanguageModel, ModelSession};
use output::Console;

pub use output::{separator_rule, SEPARATOR_WIDTH};

pub const BANNER: &str = "AI Code Assistant initializing.";
pub const READY_MESSAGE: &str = "I'm ready. How can I help?";
pub const FAREWELL_MESSAGE: &str = "10-4! I'm out. Catch you next time.";
pub const UNAVAILABLE_PREFIX: &str = "Error: The on-device language model is not available.";
/// Case-insensitive command that ends the session.
pub const EXIT_COMMAND: &str = "exit";

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Startup found no usable model; the loop never ran.
    ModelUnavailable,
    /// The user typed `exit`.
    Exited,
    /// Standard input ran out.
    EndOfInput,
}

/// Control signal produced by one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopSignal {
    Continue,
    Terminate,
    TerminateWithMessage(&'static str),
}

/// True when `line` is the exit command, ignoring case and surrounding space.
pub fn is_exit_command(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(EXIT_COMMAND)
}

/// Text printed when startup finds the model unusable.
pub fn unavailable_message(availability: &Availability) -> Option<String> {
    match availability {
        Availability::Available => None,
        Availability::Unavailable(reason) => Some(format!("{UNAVAILABLE_PREFIX} {reason}")),
        Availability::Unknown => Some(format!("{UNAVAILABLE_PREFIX} Unknown error")),
    }
}

/// Run the assistant against `model`, reading lines from `input`.
///
/// Only write failures on `out` and read failures on `input` are returned as
/// errors; everything else is reported inline.
pub async fn run<M, R, W>(
    model: &M,
    location: Option<&ConfigLocation>,
    mut input: R,
    out: W,
) -> io::Result<RunOutcome>
where
    M: LanguageModel + ?Sized,
    R: AsyncBufRead + Unpin,
    W: Write + Send,
{
    let mut console = Console::new(out);
    let Some(mut session) = start(model, location, &mut console).await? else {
        return Ok(RunOutcome::ModelUnavailable);
    };

    loop {
        let line = read_line(&mut input).await?;
        let signal = match line {
            None => LoopSignal::Terminate,
            Some(line) => step(session.as_mut(), &line, &mut console).await?,
        };
        match signal {
            LoopSignal::Continue => continue,
            LoopSignal::Terminate => {
                tracing::debug!("end of input");
                return Ok(RunOutcome::EndOfInput);
            }
            LoopSignal::TerminateWithMessage(message) => {
                console.line(message)?;
                return Ok(RunOutcome::Exited);
            }
        }
    }
}

/// Startup sequence. Returns `None` when the model is unavailable.
async fn start<'m, M, W>(
    model: &'m M,
    location: Option<&ConfigLocation>,
    console: &mut Console<W>,
) -> io::Result<Option<Box<dyn ModelSession + 'm>>>
where
    M: LanguageModel + ?Sized,
    W: Write,
{
    console.line(BANNER)?;

    let availability = model.availability().await;
    tracing::debug!(?availability, "model availability");
    if let Some(message) = unavailable_message(&availability) {
        console.line(&message)?;
        return Ok(None);
    }

    let loaded = load_instructions(location);
    tracing::debug!(fallback = loaded.outcome.is_fallback(), "instructions ready");
    for notice in loaded.notices(location) {
        console.line(&notice)?;
    }
    let session = model.create_session(&loaded.instructions);

    console.line(READY_MESSAGE)?;
    Ok(Some(session))
}

/// Handle one input line.
async fn step<W>(
    session: &mut (dyn ModelSession + '_),
    line: &str,
    console: &mut Console<W>,
) -> io::Result<LoopSignal>
where
    W: Write + Send,
{
    if is_exit_command(line) {
        return Ok(LoopSignal::TerminateWithMessage(FAREWELL_MESSAGE));
    }

    let mut write_error: Option<io::Error> = None;
    let result = session
        .respond(line, &mut |fragment: &str| {
            if write_error.is_none() {
                if let Err(err) = console.fragment(fragment) {
                    write_error = Some(err);
                }
            }
        })
        .await;
    if let Some(err) = write_error {
        return Err(err);
    }

    match result {
        Ok(_) => console.end_turn()?,
        Err(err) => {
            tracing::debug!(error = %err, "turn failed");
            console.turn_error(&err)?;
        }
    }
    Ok(LoopSignal::Continue)
}

/// Read one line without its terminator; `None` at end of input.
///
/// Invalid UTF-8 is replaced rather than treated as an error.
async fn read_line<R>(input: &mut R) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    if input.read_until(b'\n', &mut buf).await? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
