//! Show the degradation path: the backend is unreachable, yet the session
//! ends `SUCCEEDED` with the placeholder image.
//!
//! ```sh
//! cargo run --example offline_fallback
//! ```

use edit_session::{
    DegradationPolicy, HttpBackend, SessionConfig, StudioConfig, WorkflowController,
    WorkflowState,
};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = StudioConfig::builder()
        .with_endpoint("http://127.0.0.1:9")
        .with_request_timeout(Duration::from_secs(2))
        .with_fallback_delay(Duration::from_millis(500))
        .build();

    let session = SessionConfig::new()
        .with_prompt("a cat")
        .with_input_image("blob:abc");

    for policy in [DegradationPolicy::DegradeAll, DegradationPolicy::FailAll] {
        let controller = WorkflowController::new(HttpBackend::from_config(&config), &config)
            .with_policy(policy);
        let done = controller
            .generate(&WorkflowState::open(session.clone()))
            .await?;

        println!(
            "{:?}: {} -> {} {:?}",
            policy,
            done.status(),
            done.directive().route(),
            done.config().output_image_url()
        );
    }

    Ok(())
}
