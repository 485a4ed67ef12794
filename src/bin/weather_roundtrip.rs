//! weather-roundtrip: walk through a function-calling round trip
//!
//! Usage:
//!   weather-roundtrip [--config <path>] [--model <id>] [--location <city>]
//!
//! Steps:
//!   1. Baseline completion with no tools
//!   2. Send the weather tool schema with a prompt
//!   3. Execute the requested call locally and append the result
//!   4. Resubmit for the final answer, then continue the conversation

use std::path::PathBuf;

use ai_toolcall::tools::{weather, ToolRegistry};
use ai_toolcall::{Conversation, HttpChatClient, Orchestrator, Turn};
use anyhow::{bail, Context};

struct Args {
    config: Option<PathBuf>,
    model: Option<String>,
    location: String,
}

fn print_usage() {
    println!(
        r#"weather-roundtrip: function-calling round trip demo

USAGE:
    weather-roundtrip [OPTIONS]

OPTIONS:
    --config <path>      YAML client configuration
    --model <id>         Model identifier (overrides config)
    --location <city>    Location to ask about (default: "Paris, France")
    -h, --help           Show this help message

ENVIRONMENT:
    OPENAI_API_KEY       Bearer key (or the variable named by api_key_env)
    AI_BASE_URL          Endpoint base URL
    AI_MODEL             Model identifier
    RUST_LOG             Log filter, e.g. info or ai_toolcall=debug"#
    );
}

fn parse_args() -> anyhow::Result<Option<Args>> {
    let mut args = Args {
        config: None,
        model: None,
        location: "Paris, France".to_string(),
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = Some(it.next().context("--config needs a path")?.into()),
            "--model" => args.model = Some(it.next().context("--model needs a value")?),
            "--location" => args.location = it.next().context("--location needs a value")?,
            "-h" | "--help" => return Ok(None),
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(Some(args))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Some(args) = parse_args()? else {
        print_usage();
        return Ok(());
    };

    let mut builder = HttpChatClient::builder();
    if let Some(path) = &args.config {
        builder = builder.config_path(path);
    }
    if let Some(model) = &args.model {
        builder = builder.model(model);
    }
    let client = builder.build().context("failed to build chat client")?;
    println!("Using model: {}\n", client.config().model);

    let mut registry = ToolRegistry::new();
    weather::register(&mut registry)?;
    let orchestrator = Orchestrator::new(client, registry);

    // (a) baseline completion, no tools
    let mut baseline = Conversation::with_developer("You are a helpful assistant.");
    baseline.push_user("In one sentence, what can you help me with?");
    let reply = orchestrator.complete(&mut baseline).await?;
    println!("Baseline answer:\n{reply}\n");

    // (b)-(c) schema + prompt
    let mut conversation = Conversation::with_developer(
        "You are a helpful assistant. Use the provided tools to answer weather questions.",
    );
    conversation.push_user(format!("What's the weather like in {}?", args.location));

    // (d) the model either answers directly or asks for the tool
    let pending = match orchestrator.step(&mut conversation).await? {
        Turn::Final { content, .. } => {
            println!("Model answered without calling a tool:\n{content}");
            return Ok(());
        }
        Turn::ToolCalls(pending) => pending,
    };
    for call in pending.calls() {
        println!(
            "Tool call {} -> {}({})",
            call.id, call.function.name, call.function.arguments
        );
    }

    // (e)-(f) execute locally and append correlated results
    let results = orchestrator.resolve(&mut conversation, pending)?;
    for r in &results {
        println!("Tool result {} -> {}", r.tool_call_id, r.content_string()?);
    }

    // (g) resubmit for the final answer
    let final_answer = orchestrator.run(&mut conversation).await?;
    println!("\nFinal answer:\n{}\n", final_answer.content);

    let follow_up = orchestrator
        .ask(&mut conversation, "Should I bring sunglasses?")
        .await?;
    println!("Follow-up answer:\n{}\n", follow_up.content);

    println!("History:");
    for (i, m) in conversation.messages().iter().enumerate() {
        let detail = match (&m.tool_calls, &m.tool_call_id) {
            (Some(calls), _) => format!("{} tool call(s)", calls.len()),
            (_, Some(id)) => format!("result for {id}"),
            _ => m.content_text().chars().take(60).collect(),
        };
        println!("  {i:>2}. {:?}: {detail}", m.role);
    }

    Ok(())
}
