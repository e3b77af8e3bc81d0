use std::sync::Arc;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::ai::chat::{RenderSink, SessionBuilder, Transcript};
use crate::api::routes::web::GREETING;
use crate::core::AppConfig;
use crate::openai::OpenAiClient;

const HELP: &str = "Commands: /reset starts over, /model <id> switches models, /models lists them. \
Ctrl-D to quit.";

/// Prints the latest reply, or the error if the cycle failed.
struct TerminalSink;

impl RenderSink for TerminalSink {
    fn render(&mut self, transcript: &Transcript, error: Option<&str>) {
        match (error, transcript.all().last()) {
            (Some(err), _) => println!("Error: {}", err),
            (None, Some(turn)) => println!("{}", turn.ai_text()),
            (None, None) => {}
        }
    }
}

pub async fn run(config: AppConfig, model: Option<String>) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    let client = OpenAiClient::new(
        &config.openai_api_hostname,
        &config.openai_api_key,
        config.request_timeout,
    );
    let session = SessionBuilder::new(config.session.clone(), Arc::new(client)).build();
    if let Some(model) = model {
        session.set_model(&model)?;
    }

    println!("{}", GREETING);
    println!("{}", HELP);

    let mut sink = TerminalSink;
    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                let line = line.trim_end();

                if line == "/reset" {
                    session.reset()?;
                    println!("Started a new conversation.");
                } else if line == "/models" {
                    let current = session.model();
                    for m in session.config().models.iter() {
                        let marker = if *m == current { "*" } else { " " };
                        println!("{} {}", marker, m);
                    }
                } else if let Some(model) = line.strip_prefix("/model ") {
                    match session.set_model(model) {
                        Ok(model) => println!("Using {}", model),
                        Err(e) => println!("Error: {}", e),
                    }
                } else if line == "/help" {
                    println!("{}", HELP);
                } else {
                    // Errors are printed by the sink, the session stays usable
                    let _ = session.submit(line, &mut sink).await;
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
