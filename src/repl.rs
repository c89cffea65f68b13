//! Interactive command loop
//!
//! Lines starting with `!` run shell commands and lines starting with `>` run
//! Python code, both straight through the tools. Anything else goes to the
//! agent.

use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::agent::{Agent, DirectCall};
use crate::config::{process_env, Settings};
use crate::error::Result;
use crate::prompt::{combined_system_prompt, load_system_prompt};
use crate::tool::ToolResult;
use crate::welcome::{render_goodbye_message, render_welcome_message};

const PROMPT: &str = "\n~ ";

/// What a line of input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    /// `!command`
    Shell(String),
    /// `>code`, with the line as typed
    Code { code: String, line: String },
    Query(String),
    Empty,
}

/// Classify a line of input
pub fn parse_input(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
        return Command::Exit;
    }
    if let Some(command) = line.strip_prefix('!') {
        return Command::Shell(command.to_string());
    }
    if let Some(code) = line.strip_prefix('>') {
        return Command::Code {
            code: code.trim().to_string(),
            line: line.to_string(),
        };
    }
    if trimmed.is_empty() {
        return Command::Empty;
    }
    Command::Query(line.to_string())
}

/// Whether the loop keeps going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

type EnvFn = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Recorded `retrieve` call that puts knowledge base hits into the conversation
pub async fn retrieve_context(agent: &mut Agent, kb_id: &str, text: &str) -> Result<ToolResult> {
    debug!(knowledge_base_id = kb_id, "Retrieving context");
    agent
        .call_tool(
            "retrieve",
            json!({ "text": text, "knowledge_base_id": kb_id }),
            DirectCall::recorded(),
        )
        .await
}

/// Store a query and its answer in the knowledge base
pub async fn store_exchange(agent: &Agent, kb_id: &str, query: &str, response: &str) -> Result<()> {
    let document = agent
        .context()
        .knowledge
        .store_conversation(kb_id, query, response)
        .await?;
    debug!(knowledge_base_id = kb_id, document = %document.id, "Stored conversation");
    Ok(())
}

/// Read-eval-print loop around an [`Agent`]
pub struct Repl {
    agent: Agent,
    knowledge_base_id: Option<String>,
    working_directory: PathBuf,
    data_dir: PathBuf,
    env: EnvFn,
}

impl Repl {
    pub fn new(agent: Agent, settings: &Settings) -> Self {
        Self {
            agent,
            knowledge_base_id: settings.knowledge_base_id.clone(),
            working_directory: settings.working_directory.clone(),
            data_dir: settings.data_dir.clone(),
            env: Box::new(process_env),
        }
    }

    /// Replace the environment source used when the system prompt is re-read
    pub fn with_env(mut self, env: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Current welcome text via an unrecorded `welcome` call
    async fn welcome_text(&mut self) -> Option<String> {
        match self
            .agent
            .call_tool("welcome", json!({ "action": "view" }), DirectCall::unrecorded())
            .await
        {
            Ok(result) => Some(result.output),
            Err(e) => {
                debug!("Welcome text unavailable: {e}");
                None
            }
        }
    }

    /// Run a single command
    pub async fn handle(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Exit => {
                render_goodbye_message();
                return Ok(Flow::Exit);
            }
            Command::Empty => {}
            Command::Shell(command) => {
                println!("$ {command}");
                let direct = DirectCall::recorded().with_user_message(format!("!{command}"));
                match self
                    .agent
                    .call_tool("shell", json!({ "command": command }), direct)
                    .await
                {
                    Ok(result) => println!("{}\n", result.output),
                    Err(e) => println!("Shell command execution error: {e}"),
                }
            }
            Command::Code { code, line } => {
                let direct = DirectCall::recorded().with_user_message(line);
                match self
                    .agent
                    .call_tool("python_repl", json!({ "code": code }), direct)
                    .await
                {
                    Ok(result) => println!("{}\n", result.output),
                    Err(e) => println!("Python execution error: {e}"),
                }
            }
            Command::Query(query) => self.query(&query).await?,
        }
        Ok(Flow::Continue)
    }

    async fn query(&mut self, query: &str) -> Result<()> {
        if let Some(kb_id) = self.knowledge_base_id.clone() {
            retrieve_context(&mut self.agent, &kb_id, query).await?;
        }

        let welcome = self.welcome_text().await.unwrap_or_default();
        let base = load_system_prompt(&self.working_directory, &self.data_dir, &*self.env);
        let system_prompt = combined_system_prompt(&base, &welcome);

        let response = self.agent.invoke(query, Some(&system_prompt)).await?;

        if let Some(kb_id) = &self.knowledge_base_id {
            store_exchange(&self.agent, kb_id, query, &response.content).await?;
        }
        Ok(())
    }

    /// Loop over `reader` until exit, end of input or Ctrl-C
    pub async fn run<R>(&mut self, reader: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        if let Some(text) = self.welcome_text().await {
            render_welcome_message(&text);
        }

        let mut lines = reader.lines();
        loop {
            print!("{PROMPT}");
            std::io::stdout().flush()?;

            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => None,
            };
            let Some(line) = line else {
                render_goodbye_message();
                break;
            };

            // The first ctrl_c() call replaced the default SIGINT action, so a
            // running turn has to watch for it too
            let outcome = tokio::select! {
                outcome = self.handle(parse_input(&line)) => Some(outcome),
                _ = tokio::signal::ctrl_c() => None,
            };
            match outcome {
                Some(Ok(Flow::Continue)) => {}
                Some(Ok(Flow::Exit)) => break,
                Some(Err(e)) => println!("\nError: {e}"),
                None => {
                    debug!("Interrupted during a turn");
                    render_goodbye_message();
                    break;
                }
            }
        }
        Ok(())
    }
}
