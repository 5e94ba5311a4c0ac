//! Minimal agent: prints every committed configuration and mirrors it back
//! as operational state under the application root.
//!
//! Run on an SR Linux node with the `greeter` YANG module installed:
//! `RUST_LOG=info cargo run --example greeter`
use ndk_bond::AgentBuilder;
use ndk_bond::AgentConfig;
use ndk_bond::Error;
use ndk_bond::Result;
use tracing::error;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    init_observability();

    let settings = AgentConfig::new()?.validate()?;
    let agent = AgentBuilder::new("greeter")
        .with_settings(settings)
        .build()
        .map_err(|errors| Error::Fatal(format!("invalid agent options: {:?}", errors)))?;

    let mut feed = agent.start().await?;
    info!("application started. Waiting for configuration...");

    while let Some(cfg) = feed.full_config.recv().await {
        let Some(json) = cfg.json else {
            info!(commit_seq = ?cfg.commit_seq, "configuration removed");
            if let Err(e) = agent.delete_all_state().await {
                error!("failed to clear state: {}", e);
            }
            continue;
        };

        println!("commit {:?}: {}", cfg.commit_seq, json);
        if let Err(e) = agent.update_state("", &json).await {
            error!("failed to mirror configuration: {}", e);
        }
    }

    println!("Exiting program.");
    Ok(())
}

fn init_observability() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true).with_filter(filter))
        .init();
}
