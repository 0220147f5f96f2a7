//! Outer shell REPL.
//!
//! The shell owns stdin and the top-level prompt. `connect <username>
//! [host] [port]` hands control to the connected-mode loop in
//! [`crate::runtime`]; when that session ends (disconnect or server close)
//! control returns here.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{render, runtime};

/// Top-level prompt.
const PROMPT: &str = "palaver~$ ";

/// Default connection endpoint, overridable per `connect` invocation.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Host used when `connect` omits one.
    pub host: String,
    /// Port used when `connect` omits one.
    pub port: u16,
}

/// One parsed line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Enter connected mode.
    Connect {
        /// Name to announce to the server.
        username: String,
        /// Host override.
        host: Option<String>,
        /// Port override.
        port: Option<u16>,
    },
    /// Show the command summary.
    Help,
    /// Leave the shell.
    Exit,
    /// Blank line; ignored.
    Empty,
    /// Recognized command with unusable arguments.
    InvalidArgs {
        /// The command that was attempted.
        command: &'static str,
        /// What was wrong.
        error: String,
    },
    /// Anything else.
    Unknown(String),
}

/// Parse one line of shell input.
pub fn parse(line: &str) -> ShellCommand {
    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else {
        return ShellCommand::Empty;
    };

    match first {
        "connect" => {
            let Some(username) = tokens.next() else {
                return ShellCommand::InvalidArgs {
                    command: "connect",
                    error: "usage: connect <username> [host] [port]".to_string(),
                };
            };
            let host = tokens.next().map(String::from);
            let port = match tokens.next() {
                None => None,
                Some(raw) => match raw.parse::<u16>() {
                    Ok(port) => Some(port),
                    Err(_) => {
                        return ShellCommand::InvalidArgs {
                            command: "connect",
                            error: format!("invalid port: {raw}"),
                        };
                    },
                },
            };

            if tokens.next().is_some() {
                return ShellCommand::InvalidArgs {
                    command: "connect",
                    error: "usage: connect <username> [host] [port]".to_string(),
                };
            }

            ShellCommand::Connect { username: username.to_string(), host, port }
        },
        "help" => ShellCommand::Help,
        "exit" | "quit" => ShellCommand::Exit,
        other => ShellCommand::Unknown(other.to_string()),
    }
}

/// Run the shell until `exit` or stdin ends.
pub async fn run(defaults: ShellConfig) {
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    println!("palaver - type `help` for commands");

    loop {
        prompt(PROMPT);

        let line = match stdin.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                render::error(&format!("failed to read input: {e}"));
                break;
            },
        };

        match parse(&line) {
            ShellCommand::Connect { username, host, port } => {
                let host = host.unwrap_or_else(|| defaults.host.clone());
                let port = port.unwrap_or(defaults.port);

                match runtime::run_session(&username, &host, port, &mut stdin).await {
                    Ok(()) => render::notice("session ended"),
                    // Connect failure aborts mode entry; the shell goes on.
                    Err(e) => render::error(&format!("connect failed: {e}")),
                }
            },
            ShellCommand::Help => help(),
            ShellCommand::Exit => break,
            ShellCommand::Empty => {},
            ShellCommand::InvalidArgs { command, error } => {
                render::error(&format!("{command}: {error}"));
            },
            ShellCommand::Unknown(input) => {
                render::error(&format!("Command <{input}> was not recognized"));
            },
        }
    }
}

/// Print a prompt without a trailing newline.
pub fn prompt(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

fn help() {
    println!("commands:");
    println!("  connect <username> [host] [port]   join a chat server");
    println!("  exit                               leave the shell");
    println!();
    println!("while connected:");
    println!("  echo <message>       server repeats the message to you");
    println!("  broadcast <message>  send to everyone");
    println!("  @<user> <message>    whisper to one user");
    println!("  users                list connected users");
    println!("  disconnect           leave the session");
    println!();
    println!("any other line repeats your previous command with that text");
}
