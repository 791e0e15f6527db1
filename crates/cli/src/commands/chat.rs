//! Chat command handler.
//!
//! Interactive question-and-answer loop. The pipeline itself is stateless;
//! the session history kept here exists only for the `/history` command and
//! never feeds back into prompts.

use clap::Args;
use finstep_core::{config::AppConfig, AppResult};
use std::io::Write;

/// Interactive question-and-answer session
#[derive(Args, Debug)]
pub struct ChatCommand {}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let (orchestrator, report) = super::build_pipeline(config).await?;
        if let Some(report) = report {
            println!("Loaded {} reference guides into the knowledge store.", report.added.len());
        }

        println!("FinStep financial mentor. Ask a question, /history to review, /quit to leave.");

        let mut history: Vec<(String, String)> = Vec::new();
        let stdin = std::io::stdin();

        loop {
            print!("you> ");
            std::io::stdout().flush().ok();

            let mut line = String::new();
            let bytes_read = stdin.read_line(&mut line)?;
            if bytes_read == 0 {
                // EOF (Ctrl-D or closed stdin)
                break;
            }

            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            match input {
                "/quit" | "/exit" => break,
                "/history" => {
                    if history.is_empty() {
                        println!("No turns yet.");
                    }
                    for (role, text) in &history {
                        println!("[{}] {}", role, text);
                    }
                }
                question => match orchestrator.answer(question).await {
                    Ok(result) => {
                        println!();
                        println!("{}", result.answer);
                        println!();
                        history.push(("you".to_string(), question.to_string()));
                        history.push(("finstep".to_string(), result.answer));
                    }
                    Err(e) => {
                        // A failed turn does not end the session
                        eprintln!("error: {}", e);
                    }
                },
            }
        }

        println!("Bye!");
        Ok(())
    }
}
