//! `ferroact demo` — a scripted Reason-Act session.
//!
//! The model is a [`ScriptedProvider`] that asks for one calculator call and
//! then answers, so the whole pipeline runs offline.

use std::path::Path;
use std::sync::Arc;

use ferroact_agent::{Agent, AgentOptions, Session, ToolRegistry};
use ferroact_config::RuntimeConfig;
use ferroact_core::{AgentResult, ChatResponse, DomainEvent, EventBus, ToolCall, Usage};
use ferroact_memory::InMemoryConversation;
use ferroact_providers::ScriptedProvider;
use ferroact_tools::calculator;

const EXPRESSION: &str = "(17 + 4) * 2";

pub async fn run(
    config_path: Option<&Path>,
    max_iterations: Option<u32>,
    prompt: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;
    if let Some(n) = max_iterations {
        config.agent.max_iterations = n;
    }

    let events = Arc::new(EventBus::new(64));
    let mut rx = events.subscribe();

    let result = run_session(&config, events, prompt).await?;

    println!("Transcript");
    println!("==========");
    for message in &result.messages {
        let text = message.content.as_deref().unwrap_or("");
        if message.tool_calls.is_empty() {
            println!("  {:<9} {text}", format!("{:?}", message.role));
        }
        for call in &message.tool_calls {
            println!("  {:<9} -> {}({})", "Assistant", call.name, call.arguments);
        }
    }
    println!();
    println!("  Status:      {:?}", result.status);
    println!("  Iterations:  {}", result.iterations);
    println!("  Tokens:      {}", result.total_tokens());
    if let Some(response) = &result.response {
        println!("  Response:    {response}");
    }

    let mut tool_runs = 0;
    while let Ok(event) = rx.try_recv() {
        if let DomainEvent::ToolExecuted { .. } = event.as_ref() {
            tool_runs += 1;
        }
    }
    println!("  Tool runs:   {tool_runs}");

    Ok(())
}

/// Open a session, run one agent against the scripted model, close it.
pub async fn run_session(
    config: &RuntimeConfig,
    events: Arc<EventBus>,
    prompt: &str,
) -> ferroact_core::Result<AgentResult> {
    let session = Session::open_observed(config, events)?;
    let registry = ToolRegistry::create(&session)?;
    registry.add_all(ferroact_tools::default_tools())?;

    let memory = InMemoryConversation::bounded(config.memory.max_messages);
    let options = AgentOptions::from_defaults("demo", &config.agent)
        .with_registry(registry)
        .with_memory(Arc::new(memory));
    let agent = Agent::create(&session, options, Arc::new(script()))?;

    let result = agent.run(prompt).await;
    let stats = session.arena_stats();
    tracing::debug!(
        used = stats.total_used,
        blocks = stats.block_count,
        "Arena usage before close"
    );
    session.close()?;
    result
}

fn script() -> ScriptedProvider {
    let answer = match calculator::evaluate(EXPRESSION) {
        Ok(value) => format!("{EXPRESSION} = {value}."),
        Err(reason) => format!("I could not evaluate that: {reason}"),
    };
    let usage = |input, output| Usage {
        input_tokens: input,
        output_tokens: output,
        ..Usage::default()
    };

    ScriptedProvider::named("scripted-demo")
        .with_response(
            ChatResponse::tool_use(vec![ToolCall::new(
                "call_1",
                "calculator",
                serde_json::json!({ "expression": EXPRESSION }).to_string(),
            )])
            .with_usage(usage(24, 12)),
        )
        .with_response(ChatResponse::stop(answer).with_usage(usage(40, 9)))
}
