//! Example demonstrating a short scripted session
//!
//! This example shows how to:
//! - Build a persona from profile attributes
//! - Wire a session controller to a terminal display
//! - Post messages through a session handle
//!
//! Prerequisites:
//! - Ollama must be installed and running
//! - A model must be available (e.g., llama3.2:1b)

use eva_engine::{
    config::{GenerationConfig, OllamaConfig},
    conversation::PromptAssembler,
    display::TerminalDisplay,
    llm::{ollama::OllamaGenerator, GenerationPipeline, TextGenerator},
    persona::PersonaHeader,
    profile::{Profile, ProfileValue},
    session::SessionController,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Persona Session Example ===\n");

    let profile = Profile::from_pairs([
        ("name", ProfileValue::Text("Eva".to_string())),
        ("favorite_food", ProfileValue::Text("ramen".to_string())),
        (
            "hobbies",
            ProfileValue::List(vec!["bouldering".to_string(), "synthwave".to_string()]),
        ),
        ("humor_style", ProfileValue::Text("dry".to_string())),
    ]);
    let header = PersonaHeader::build(&profile);
    println!("{}\n", header.as_str());

    let generator = Arc::new(OllamaGenerator::from_config(&OllamaConfig::default()));
    if !generator.check_health().await {
        println!("✗ Ollama is not reachable at the default address");
        return Ok(());
    }
    println!("✓ Ollama is reachable\n");

    let pipeline = Arc::new(GenerationPipeline::new(
        generator,
        GenerationConfig::default(),
    ));
    let controller = SessionController::new(
        PromptAssembler::new(header),
        6,
        pipeline,
        Box::new(TerminalDisplay::new(std::io::stdout(), true, true)),
    );
    let handle = controller.handle();
    let session = tokio::spawn(controller.run());

    // Shutdown waits for the reply in flight
    handle.submit("Hi! What do you like to eat?").await?;
    handle.shutdown().await?;

    let stats = session.await?;
    println!(
        "\n✓ Session finished: {} exchange(s) committed",
        stats.exchanges_committed
    );

    Ok(())
}
