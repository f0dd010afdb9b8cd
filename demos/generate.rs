//! Run one edit session end to end: polish, generate, share.
//!
//! Reads `EDIT_SESSION_*` environment variables (see `StudioConfig::from_env`).
//! Without a reachable backend the session still completes with the
//! placeholder image.
//!
//! ```sh
//! EDIT_SESSION_ENDPOINT=http://localhost:5000 cargo run --example generate
//! ```

use edit_session::{
    HttpBackend, ModelName, Sampler, SessionConfig, ShareOutcome, StudioConfig,
    WorkflowController, WorkflowState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = StudioConfig::from_env();
    let backend = HttpBackend::from_config(&config);

    if !backend.health().await.unwrap_or(false) {
        eprintln!("Edit backend at {} is not responding", backend.endpoint());
    }

    let controller = WorkflowController::new(backend, &config);

    let mut state = WorkflowState::open(
        SessionConfig::new()
            .with_prompt("a majestic lion in a futuristic city")
            .with_model(ModelName::StableDiffusionV15)
            .with_sampler(Sampler::DpmPlusPlus)
            .with_steps(30)
            .with_input_image("https://picsum.photos/id/237/512/512"),
    );

    controller.polish_prompt(&mut state).await?;
    println!("Prompt: {}", state.config().prompt);

    let running = controller.begin(&state)?;
    println!("-> {}", running.directive().route());

    let done = controller.run(&running).await?;
    let directive = done.directive();
    println!("-> {} ({})", directive.route(), done.status());

    if let Some(url) = done.config().output_image_url() {
        println!("Output: {}", url);
        println!("Save as: {}", done.config().download_file_name());
    }

    match controller.share(&done).await {
        Ok(ShareOutcome::Published { image_id }) => println!("Shared image {}", image_id),
        Ok(ShareOutcome::Simulated) => println!("Shared (placeholder result)"),
        Err(e) => eprintln!("Share failed: {}", e),
    }

    Ok(())
}
