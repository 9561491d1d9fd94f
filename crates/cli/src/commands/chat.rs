//! `genui chat`: Interactive or single-message chat mode.

use std::io::Write;
use std::sync::Arc;

use futures::StreamExt;
use genui_agent::{AgentLoop, RunOutcome, UiEvent, UiEventKind};
use genui_config::AppConfig;
use genui_core::message::ConversationTurn;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for the API key early so the error is clear
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export OPENAI_API_KEY=sk-...");
        eprintln!("    export GENUI_API_KEY=sk-...   (any OpenAI-compatible API)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = genui_providers::build_from_config(&config)?;
    let tools = Arc::new(genui_tools::default_registry(&config)?);
    let agent = AgentLoop::from_config(provider, tools, &config);

    if let Some(msg) = message {
        return match run_turn(&agent, &msg, Vec::new()).await {
            Ok(answer) => {
                println!("{answer}");
                Ok(())
            }
            Err(e) => Err(e.into()),
        };
    }

    println!();
    println!("  genui chat ({})", config.provider.model);
    println!("  Type a message and press Enter. Ctrl-C cancels a running request, Ctrl-D exits.");
    println!();

    let mut history: Vec<ConversationTurn> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "exit" | "quit") {
            break;
        }

        match run_turn(&agent, input, history.clone()).await {
            Ok(answer) => {
                println!();
                for line in answer.lines() {
                    println!("  Assistant > {line}");
                }
                println!();
                history.push(ConversationTurn::user(input));
                history.push(ConversationTurn::assistant(answer));
            }
            Err(e) => {
                eprintln!("  [Error] {e}");
                println!();
            }
        }
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

/// Run one request, printing UI events as they stream in.
async fn run_turn(agent: &AgentLoop, input: &str, history: Vec<ConversationTurn>) -> RunOutcome {
    let mut run = agent.invoke(input, history);

    loop {
        tokio::select! {
            event = run.ui.next() => match event {
                Some(event) => eprintln!("{}", format_event(&event)),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                eprintln!("  [Cancelling]");
                run.cancel();
            }
        }
    }

    run.result.await
}

/// One line per UI event, e.g. `  [loading] get_weather`.
fn format_event(event: &UiEvent) -> String {
    let props = &event.fragment.props;
    match event.kind {
        UiEventKind::Loading => format!("  [loading] {}", event.tool),
        UiEventKind::Result => format!("  [result]  {} {}", event.tool, props),
        UiEventKind::Error => {
            let message = props
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("failed");
            format!("  [error]   {}: {}", event.tool, message)
        }
    }
}
