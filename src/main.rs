use anyhow::Result;
use mockingbird::composer::{CharacterCount, can_send};
use mockingbird::config::{AppConfig, load_env_files};
use mockingbird::settings::SettingUpdate;
use mockingbird::ui::{Command, HELP, Renderer, render_settings};
use mockingbird::Chatbot;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn emit(line: &str) {
    let mut stdout = std::io::stdout();
    if line == "\x07" {
        let _ = write!(stdout, "{line}");
    } else {
        let _ = writeln!(stdout, "{line}");
    }
    let _ = stdout.flush();
}

fn main() -> Result<()> {
    load_env_files();
    let config = AppConfig::from_env();
    init_tracing(&config.log_filter);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(config))
}

async fn run(config: AppConfig) -> Result<()> {
    let bot = Chatbot::open(&config);
    let mut renderer = Renderer::new(bot.appearance());
    let mut events = bot.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut confirming_clear = false;

    emit(&renderer.greeting());
    emit("Type /help for commands.");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(line) = renderer.render(&event) {
                        emit(&line);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "renderer fell behind, events skipped");
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };

                if confirming_clear {
                    confirming_clear = false;
                    if matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
                        bot.reset();
                    }
                    continue;
                }

                match Command::parse(&line) {
                    Command::Send(text) => {
                        let count = CharacterCount::of(&text);
                        if count.is_over_limit() {
                            emit(&format!("Message too long ({}).", count.label()));
                            continue;
                        }
                        if let Some(warning) = renderer.input_warning(&text) {
                            emit(&warning);
                        }
                        let pending = bot.conversation.is_pending();
                        if !can_send(&text, pending) {
                            if pending {
                                emit("Still waiting for the previous reply.");
                            }
                            continue;
                        }
                        bot.submit(&text);
                    }
                    Command::Clear => {
                        emit("Are you sure you want to clear the chat history? [y/N]");
                        confirming_clear = true;
                    }
                    Command::Set { key, value } => match SettingUpdate::parse(&key, &value) {
                        Ok(change) => bot.update(change),
                        Err(err) => emit(&err.to_string()),
                    },
                    Command::Settings => emit(&render_settings(&bot.settings.snapshot())),
                    Command::System(appearance) => bot.set_system_appearance(appearance),
                    Command::Help => emit(HELP),
                    Command::Quit => break,
                    Command::Unknown(input) => emit(&format!("Unknown command: {input}. Try /help.")),
                }
            }
        }
    }

    Ok(())
}
