//! Interactive chat mode.

use crate::cli::ChatArgs;
use crate::commands::{persona_prompt, stream_reply};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use neuroverse_domain::Message;
use neuroverse_llm::{CompletionRequest, ProviderRouter};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// Run the interactive chat loop.
pub async fn run_chat(
    args: ChatArgs,
    router: &ProviderRouter,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let system = persona_prompt(&args.persona)?;
    let mut history: Vec<Message> = Vec::new();

    println!(
        "{}",
        formatter.info("NeuroVerse chat - Type '/help' for commands, '/exit' to quit")
    );
    println!();

    let mut editor = DefaultEditor::new()
        .map_err(|e| CliError::Readline(format!("Failed to initialize editor: {}", e)))?;

    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    loop {
        match editor.readline("you> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_line(line) {
                    ChatInput::Exit => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    ChatInput::Help => print_help(formatter),
                    ChatInput::Clear => {
                        history.clear();
                        println!("{}", formatter.success("Conversation cleared"));
                    }
                    ChatInput::Message(text) => {
                        history.push(Message::user(text));
                        trim_history(&mut history, config.settings.history_limit);

                        let request = CompletionRequest::new(history.clone(), system.clone());
                        let mut stdout = std::io::stdout();
                        let reply = stream_reply(router, &request, &mut stdout).await;
                        println!();

                        match reply {
                            Ok(reply) => history.push(Message::assistant(reply)),
                            Err(e) => {
                                history.pop();
                                eprintln!("{}", formatter.error(&e.to_string()));
                            }
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use '/exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();

    Ok(())
}

/// One line of chat input.
#[derive(Debug, PartialEq)]
enum ChatInput {
    Exit,
    Help,
    Clear,
    Message(String),
}

fn parse_line(line: &str) -> ChatInput {
    match line {
        "/exit" | "/quit" | "/q" => ChatInput::Exit,
        "/help" | "/?" => ChatInput::Help,
        "/clear" => ChatInput::Clear,
        _ => ChatInput::Message(line.to_string()),
    }
}

/// Keep only the newest `limit` turns.
fn trim_history(history: &mut Vec<Message>, limit: usize) {
    let excess = history.len().saturating_sub(limit);
    history.drain(..excess);
}

fn get_history_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    let dir = home.join(".neuroverse");
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("history.txt"))
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Commands:"));
    println!("  /clear   Forget the conversation so far");
    println!("  /help    Show this help");
    println!("  /exit    Leave chat");
    println!();
    println!("Anything else is sent as a message.");
}
