use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use taskweave_agents::AgentRegistry;
use taskweave_core::config::AppConfig;
use taskweave_core::types::{WorkflowRequest, WorkflowStatus};
use taskweave_engine::ExecutionEngine;
use taskweave_gateway::GatewayServer;
use taskweave_tools::ToolRegistry;

#[derive(Parser)]
#[command(name = "taskweave", version, about = "Multi-agent workflow orchestration")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "taskweave.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Runserver {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(long)]
        port: Option<u16>,
        /// Accepted for interface parity; hot reload is not supported
        #[arg(long)]
        reload: bool,
    },
    /// List registered agent types
    ListAgents,
    /// List registered tools
    ListTools,
    /// Execute a workflow defined in a JSON file
    RunWorkflow {
        /// Path to the workflow JSON configuration
        #[arg(long)]
        config: PathBuf,
    },
}

struct Runtime {
    tools: Arc<ToolRegistry>,
    agents: Arc<AgentRegistry>,
    engine: Arc<ExecutionEngine>,
}

fn build_runtime(config: &AppConfig) -> Runtime {
    let tools = Arc::new(ToolRegistry::with_builtins());
    let agents = Arc::new(AgentRegistry::with_builtins(tools.clone()));
    let engine = Arc::new(ExecutionEngine::new(agents.clone(), config.engine.clone()));
    Runtime {
        tools,
        agents,
        engine,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("taskweave=info,warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load_or_default(&cli.config)?;
    let runtime = build_runtime(&config);

    match cli.command {
        Commands::Runserver { host, port, reload } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if reload {
                warn!("--reload accepted but hot reload is not supported");
            }

            let server = GatewayServer::new(
                config.server.clone(),
                runtime.engine,
                runtime.agents,
                runtime.tools,
            );

            let cancel = tokio_util::sync::CancellationToken::new();
            let cancel_clone = cancel.clone();

            // Graceful shutdown on Ctrl-C
            tokio::spawn(async move {
                tokio::signal::ctrl_c().await.ok();
                info!("Shutting down gateway...");
                cancel_clone.cancel();
            });

            server.run(cancel).await?;
        }
        Commands::ListAgents => {
            for agent in runtime.agents.list() {
                println!("{:<18} {}", agent.agent_type, agent.description);
            }
        }
        Commands::ListTools => {
            for tool in runtime.tools.list() {
                println!("{:<18} {}", tool.name, tool.description);
            }
        }
        Commands::RunWorkflow { config: path } => {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
            let request: WorkflowRequest = serde_json::from_str(&content)?;

            let result = runtime.engine.execute(request).await;
            println!("{}", serde_json::to_string_pretty(&result)?);

            if result.status != WorkflowStatus::Success {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
