//! Chat command handler.
//!
//! REPL-style loop over stdin that maintains the in-memory transcript.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use finsense_core::api::ApiClient;
use finsense_core::chat::{ChatMessage, Transcript};
use finsense_core::session::{SessionManager, Startup};

const QUIT_COMMAND: &str = ":q";
const RESET_COMMAND: &str = ":reset";
const PROMPT_PREFIX: &str = "you> ";
const ASSISTANT_PREFIX: &str = "assistant> ";
const AUTH_NOTICE: &str =
    "This question requires authentication. Please sign in with `finsense login` and try again.";

pub async fn run(client: &ApiClient, question: Option<&str>) -> Result<()> {
    // Reconcile the stored session first so an expired token is cleaned up
    // before the first question goes out.
    let mut manager = SessionManager::new();
    let startup = manager.startup(client).await.context("resolve session")?;

    if let Some(question) = question {
        return one_shot(client, question).await;
    }

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    writeln!(
        stdout,
        "FinSense Chat ({} to quit, {} to clear)",
        QUIT_COMMAND, RESET_COMMAND
    )?;
    match &startup {
        Startup::Resumed(profile) => writeln!(stdout, "Signed in as {}", profile.username)?,
        _ => writeln!(
            stdout,
            "Anonymous session (protected questions require `finsense login`)"
        )?,
    }
    write!(stdout, "{}", PROMPT_PREFIX)?;
    stdout.flush()?;

    run_loop(stdin.lock(), &mut stdout, client).await
}

async fn one_shot(client: &ApiClient, question: &str) -> Result<()> {
    match client.send_message(question).await {
        Ok(reply) => {
            println!("{}", reply.response);
            Ok(())
        }
        Err(err) if err.requires_auth() => {
            anyhow::bail!("{} Sign in with `finsense login` and try again.", err)
        }
        Err(err) => Err(err.into()),
    }
}

/// Runs the chat loop.
///
/// Reads user input from `input`, writes responses to `output`.
/// Exits on `:q` or EOF; every error is rendered inline and the loop
/// continues.
async fn run_loop<R, W>(input: R, output: &mut W, client: &ApiClient) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut transcript = Transcript::default();

    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();

        // Handle quit command
        if trimmed == QUIT_COMMAND {
            writeln!(output, "Goodbye!")?;
            break;
        }

        if trimmed == RESET_COMMAND {
            writeln!(output, "Transcript cleared ({} messages).", transcript.len())?;
            transcript.reset();
            write!(output, "{}", PROMPT_PREFIX)?;
            output.flush()?;
            continue;
        }

        // Skip empty lines
        if trimmed.is_empty() {
            write!(output, "{}", PROMPT_PREFIX)?;
            output.flush()?;
            continue;
        }

        transcript.push(ChatMessage::user(trimmed));

        match client.send_message(trimmed).await {
            Ok(reply) => {
                writeln!(output, "{}{}", ASSISTANT_PREFIX, reply.response)?;
                transcript.push(ChatMessage::assistant(reply.response));
            }
            Err(err) if err.requires_auth() => {
                writeln!(output, "{}{}", ASSISTANT_PREFIX, AUTH_NOTICE)?;
                transcript.push(ChatMessage::auth_notice(AUTH_NOTICE));
            }
            Err(err) => {
                writeln!(output, "Error: {}", err)?;
            }
        }

        write!(output, "{}", PROMPT_PREFIX)?;
        output.flush()?;
    }

    Ok(())
}
