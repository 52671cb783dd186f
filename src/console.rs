//! Stdin command loop mirroring the editor's agent commands.
//!
//! ```text
//! > start Research Agent
//! > run research-agent-1718000000000 ownership rules
//! > list
//! > stop research-agent-1718000000000
//! > quit
//! ```

use std::str::FromStr;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::agent::{AgentKind, Coordinator, TaskRequest};

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start { kind: String },
    Stop { id: String },
    StopAll,
    List,
    Kinds,
    Run { id: String, text: String },
    Suggest { id: String, text: String },
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map(|(v, r)| (v, r.trim()))
            .unwrap_or((line, ""));

        let id_and_text = |usage: &str| -> Result<(String, String), String> {
            match rest.split_once(char::is_whitespace) {
                Some((id, text)) if !text.trim().is_empty() => {
                    Ok((id.to_string(), text.trim().to_string()))
                }
                _ => Err(format!("usage: {usage}")),
            }
        };

        match verb {
            "start" if !rest.is_empty() => Ok(Self::Start {
                kind: rest.to_string(),
            }),
            "start" => Err("usage: start <agent type>".to_string()),
            "stop" if !rest.is_empty() => Ok(Self::Stop {
                id: rest.to_string(),
            }),
            "stop" => Err("usage: stop <agent id>".to_string()),
            "stop-all" => Ok(Self::StopAll),
            "list" | "ls" => Ok(Self::List),
            "kinds" => Ok(Self::Kinds),
            "run" => {
                let (id, text) = id_and_text("run <agent id> <text>")?;
                Ok(Self::Run { id, text })
            }
            "suggest" => {
                let (id, text) = id_and_text("suggest <agent id> <text>")?;
                Ok(Self::Suggest { id, text })
            }
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "/quit" => Ok(Self::Quit),
            other => Err(format!("unknown command: {other} (try 'help')")),
        }
    }
}

const HELP: &str = "\
commands:
  start <agent type>        start an agent (see 'kinds')
  stop <agent id>           stop an agent
  stop-all                  stop every agent
  list                      list running agents
  kinds                     list agent types
  run <agent id> <text>     run a task and print the result
  suggest <agent id> <text> request suggestions (empty when busy)
  quit                      stop all agents and exit";

/// Execute one command and return the text to print.
pub async fn execute(coordinator: &Coordinator, command: Command) -> String {
    match command {
        Command::Start { kind } => match coordinator.start(&kind).await {
            Ok(id) => format!("Started {kind} as {id}"),
            Err(e) => format!("error: {e}"),
        },
        Command::Stop { id } => {
            coordinator.stop(&id).await;
            format!("Stopped {id}")
        }
        Command::StopAll => {
            coordinator.stop_all().await;
            "Stopped all agents".to_string()
        }
        Command::List => {
            let agents = coordinator.list_all().await;
            if agents.is_empty() {
                return "No agents running".to_string();
            }
            agents
                .iter()
                .map(|a| format!("{}  {}  {}", a.id, a.kind, a.label))
                .collect::<Vec<_>>()
                .join("\n")
        }
        Command::Kinds => AgentKind::ALL
            .iter()
            .map(|k| format!("{}  [{}]", k, k.capabilities().join(", ")))
            .collect::<Vec<_>>()
            .join("\n"),
        Command::Run { id, text } => {
            let worker = match coordinator.require(&id).await {
                Ok(worker) => worker,
                Err(e) => return format!("error: {e}"),
            };
            match worker.run(TaskRequest::new(text)).await {
                Ok(output) => serde_json::to_string_pretty(&output)
                    .unwrap_or_else(|e| format!("error: {e}")),
                Err(e) => format!("error: {e}"),
            }
        }
        Command::Suggest { id, text } => {
            let worker = match coordinator.require(&id).await {
                Ok(worker) => worker,
                Err(e) => return format!("error: {e}"),
            };
            let suggestions = worker.suggest(TaskRequest::new(text)).await;
            if suggestions.is_empty() {
                return "No suggestions".to_string();
            }
            suggestions
                .iter()
                .map(|s| format!("- {} ({})", s.label, s.detail))
                .collect::<Vec<_>>()
                .join("\n")
        }
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    }
}

/// Read commands from `reader` until `quit` or EOF, writing replies to `writer`.
pub async fn run<R, W>(coordinator: Arc<Coordinator>, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    writer.write_all(b"> ").await?;
    writer.flush().await?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            writer.write_all(b"> ").await?;
            writer.flush().await?;
            continue;
        }

        let reply = match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => execute(&coordinator, command).await,
            Err(usage) => usage,
        };
        writer.write_all(reply.as_bytes()).await?;
        writer.write_all(b"\n> ").await?;
        writer.flush().await?;
    }

    tracing::debug!("Console input closed");
    Ok(())
}

/// Run the console on the process's stdin/stdout.
pub async fn run_stdio(coordinator: Arc<Coordinator>) -> std::io::Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    run(coordinator, stdin, tokio::io::stdout()).await
}
