//! Gateling CLI: chat against a locally running AI gateway.

mod demo_tools;

use clap::{Parser, Subcommand};
use gateling_client::{
    ChatOutcome, ChatRunner, ContextWindow, GatewayClient, GatewayConfig, StreamEvent,
    ToolDescriptor, ToolRegistry,
};
use gateling_core::Message;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gateling", about = "Gateling — streaming chat client for an AI gateway")]
struct Cli {
    /// Path to config file (defaults apply when the file is absent)
    #[arg(short, long, default_value = "gateling.toml")]
    config: PathBuf,

    /// Model override, `provider/model` style
    #[arg(long)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One-shot chat completion
    Chat {
        /// The user prompt
        #[arg(default_value = "Hello, world!")]
        prompt: String,
    },
    /// Streamed chat, printing text as it arrives
    Stream {
        /// The user prompt
        prompt: String,
    },
    /// Streamed tool-calling demo with mock weather and local-time tools
    Tools {
        /// The user prompt
        #[arg(default_value = "What's the weather and current time in Tokyo?")]
        prompt: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Same .env convention as the gateway's own example clients.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config: GatewayConfig = match tokio::fs::read_to_string(&cli.config).await {
        Ok(contents) => toml::from_str(&contents)?,
        Err(_) => GatewayConfig::default(),
    };
    if let Ok(key) = std::env::var("HELICONE_CONTROL_PLANE_API_KEY") {
        config.api_key = key;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }

    match cli.command {
        Commands::Chat { prompt } => chat(config, &prompt).await,
        Commands::Stream { prompt } => stream(config, &prompt).await,
        Commands::Tools { prompt } => tools(config, &prompt).await,
    }
}

async fn chat(config: GatewayConfig, prompt: &str) -> anyhow::Result<()> {
    let runner = ChatRunner::new(config, Arc::new(ToolRegistry::new()));
    let mut context = ContextWindow::new(100);
    context.set_system_prompt(
        "You are a helpful assistant that can answer questions and help with tasks.",
    );

    let answer = runner.run(&mut context, prompt).await?;
    println!("{answer}");
    Ok(())
}

async fn stream(config: GatewayConfig, prompt: &str) -> anyhow::Result<()> {
    let client = GatewayClient::new(config);
    let messages = vec![Message::user(prompt)];

    let (mut rx, handle) = client.chat_stream(None, &messages, &[]).await?;
    while let Some(event) = rx.recv().await {
        if let StreamEvent::TextDelta { text } = event {
            print!("{text}");
            std::io::stdout().flush()?;
        }
    }
    handle.await??;
    println!();
    Ok(())
}

async fn tools(config: GatewayConfig, prompt: &str) -> anyhow::Result<()> {
    let mut registry = ToolRegistry::new();
    demo_tools::register(&mut registry);
    let registry = Arc::new(registry);

    let client = GatewayClient::new(config);
    let descriptors: Vec<ToolDescriptor> =
        registry.descriptors().into_iter().cloned().collect();

    let mut context = ContextWindow::new(100);
    context.push(Message::user(prompt));

    // First request: stream silently while the accumulator rebuilds any
    // fragmented tool calls.
    let (rx, handle) = client
        .chat_stream(None, context.messages(), &descriptors)
        .await?;
    drop(rx);
    let outcome = handle.await??;

    match outcome {
        ChatOutcome::Done(text) => println!("{text}"),
        ChatOutcome::ToolUse {
            content,
            tool_calls,
        } => {
            context.push(Message::assistant_tool_use(
                content.unwrap_or_default(),
                tool_calls.clone(),
            ));

            for call in &tool_calls {
                info!(tool = %call.name, call_id = %call.id, "Executing tool call");
                let result = registry.execute(call).await?;
                context.push(Message::tool_result(
                    &result.call_id,
                    &call.name,
                    &result.content,
                ));
            }

            // Follow-up request with the tool results backfilled.
            let (mut rx, handle) = client
                .chat_stream(None, context.messages(), &descriptors)
                .await?;
            while let Some(event) = rx.recv().await {
                if let StreamEvent::TextDelta { text } = event {
                    print!("{text}");
                    std::io::stdout().flush()?;
                }
            }
            handle.await??;
            println!();
        }
    }
    Ok(())
}
