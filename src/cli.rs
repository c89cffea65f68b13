//! CLI module for agent-builder
//!
//! Handles command-line argument parsing and the top-level flow: build the
//! agent, then answer a one-shot query or start the interactive loop.

use clap::Parser;
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::debug;

use crate::agent::Agent;
use crate::config::{process_env, Settings, TOOL_CONSOLE_MODE_ENV};
use crate::error::Result;
use crate::extra_tools::load_extra_tools;
use crate::knowledge::KnowledgeStore;
use crate::model::{load_config, load_model, ModelProvider};
use crate::prompt::load_system_prompt;
use crate::repl::{retrieve_context, store_exchange, Repl};
use crate::telemetry::{TelemetryConfig, TraceAttributes};
use crate::tool::{ToolContext, ToolRegistry};

/// agent-builder - configure and launch a tool-using conversational agent
#[derive(Parser, Debug)]
#[command(name = "agent-builder")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Query to process; starts the interactive loop when omitted
    pub query: Vec<String>,

    /// Knowledge base ID to use for retrievals
    #[arg(long = "kb", visible_alias = "knowledge-base", value_name = "ID")]
    pub knowledge_base: Option<String>,

    /// Model provider to use for inference (openai or ollama)
    #[arg(long, default_value = "openai")]
    pub model_provider: String,

    /// Model config as JSON string or path
    #[arg(long, default_value = "{}")]
    pub model_config: String,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub debug: bool,
}

impl Args {
    /// The positional words joined into one query
    pub fn joined_query(&self) -> Option<String> {
        (!self.query.is_empty()).then(|| self.query.join(" "))
    }
}

/// Export variables that child processes started by tools should see
fn export_child_env(telemetry: Option<&TelemetryConfig>) {
    if let Some(config) = telemetry {
        for (key, value) in config.child_env() {
            std::env::set_var(key, value);
        }
    }
    std::env::set_var(TOOL_CONSOLE_MODE_ENV, "enabled");
}

/// Build the agent from settings and the process environment
fn build_agent(args: &Args, settings: &Settings) -> Result<Agent> {
    let provider: ModelProvider = args.model_provider.parse()?;
    let model = load_model(provider, load_config(&args.model_config)?, &process_env)?;

    let system_prompt =
        load_system_prompt(&settings.working_directory, &settings.data_dir, &process_env);

    let telemetry = TelemetryConfig::from_env(&process_env);
    export_child_env(telemetry.as_ref());

    let mut tools = ToolRegistry::with_defaults();
    tools.extend(load_extra_tools(
        &settings.working_directory,
        settings.extra_tools.as_deref(),
    ));

    let attributes = TraceAttributes::new_session(&process_env);
    let ctx = ToolContext::new(
        attributes.session_id.clone(),
        &settings.working_directory,
        &settings.data_dir,
    )
    .with_knowledge(KnowledgeStore::new(&settings.knowledge_dir));

    debug!(
        tools = tools.len(),
        session = %attributes.session_id,
        telemetry = telemetry.is_some(),
        "Agent initialized"
    );

    Ok(Agent::new(model, tools, ctx, system_prompt, attributes))
}

/// Answer a single query
async fn run_once(mut agent: Agent, settings: &Settings, query: &str) -> Result<()> {
    debug!("Processing command line query: {query}");

    if let Some(kb_id) = &settings.knowledge_base_id {
        retrieve_context(&mut agent, kb_id, query).await?;
    }

    let response = agent.invoke(query, None).await?;

    if let Some(kb_id) = &settings.knowledge_base_id {
        store_exchange(&agent, kb_id, query, &response.content).await?;
    }
    Ok(())
}

/// Run the CLI with parsed arguments
pub async fn run(args: Args) -> Result<()> {
    let working_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let settings = Settings::resolve(args.knowledge_base.clone(), working_dir, &process_env)?;
    let agent = build_agent(&args, &settings)?;

    match args.joined_query() {
        Some(query) => run_once(agent, &settings, &query).await,
        None => {
            debug!("Starting interactive mode");
            Repl::new(agent, &settings)
                .run(BufReader::new(tokio::io::stdin()))
                .await
        }
    }
}
