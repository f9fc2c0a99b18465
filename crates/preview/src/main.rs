//! Mirage Preview - renders one seeded listing fragment to stdout.
//!
//! Composition root: wires the bundled catalog and the optional HTTP
//! adapters into a DynamicSystem for the seed given on the command line
//! (or MIRAGE_SEED), then prints the resulting HTML fragment.

mod render;

use anyhow::Result;
use mirage_core::application::{DynamicSystem, EngineConfig};
use mirage_core::domain::EntityFamily;
use mirage_infra_bundle::{load_variant_tables, BundledCatalog};
use mirage_infra_http::{HttpConfig, HttpGenerator, HttpSeededStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_PROJECT_KEY: &str = "mirage-demo";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format = std::env::var("MIRAGE_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("mirage_core=info,mirage_infra_http=info,mirage_preview=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Mirage preview v{} starting...", VERSION);

    // 2. Load configuration
    let raw_seed = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("MIRAGE_SEED").ok());
    let raw_structure_seed = std::env::var("MIRAGE_STRUCTURE_SEED").ok();

    let selection_url = std::env::var("MIRAGE_SELECTION_URL").ok();
    let generate_url = std::env::var("MIRAGE_GENERATE_URL").ok();
    let project_key =
        std::env::var("MIRAGE_PROJECT_KEY").unwrap_or_else(|_| DEFAULT_PROJECT_KEY.to_string());

    let step_timeout_ms: u64 = std::env::var("MIRAGE_STEP_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(4000);

    let config = EngineConfig {
        seeded_store_enabled: selection_url.is_some(),
        generation_enabled: generate_url.is_some(),
        step_timeout: Duration::from_millis(step_timeout_ms),
        ..EngineConfig::default()
    };

    // 3. Load bundled assets
    let catalog = Arc::new(BundledCatalog::load()?);
    let tables = load_variant_tables()?;

    // 4. Setup dependencies (DI wiring)
    let mut builder = DynamicSystem::builder()
        .seed_param(raw_seed.as_deref())
        .structure_param(raw_structure_seed.as_deref())
        .config(config)
        .catalog(catalog);

    if let Some(url) = selection_url {
        let store = HttpSeededStore::new(HttpConfig::new(url, project_key.clone()))
            .map_err(|e| anyhow::anyhow!("Seeded store setup failed: {}", e))?;
        builder = builder.seeded_store(Arc::new(store));
    }
    if let Some(url) = generate_url {
        let generator = HttpGenerator::new(HttpConfig::new(url, project_key))
            .map_err(|e| anyhow::anyhow!("Generator setup failed: {}", e))?;
        builder = builder.generator(Arc::new(generator));
    }

    let system = builder.build()?;
    info!(seed = %system.seed(), "Rendering with seed");

    // 5. Load entities and render
    system.initialize_all();
    system.when_ready_all().await;

    let html = render::listing_page(&system, &tables, EntityFamily::Jobs)?;
    println!("{}", html);

    // 6. Teardown
    system.shutdown();
    info!("Done.");

    Ok(())
}
