use anyhow::{Context, Result};
use oas_provision::{core::events::log_event, ProvisionSettings, Provisioner};
use tracing::metadata::LevelFilter;

fn setup_logging() {
    let filter = std::env::var("OAS_LOG")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(LevelFilter::INFO);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> Result<()> {
    setup_logging();

    let settings = ProvisionSettings::resolve().context("load provisioning settings")?;
    let catalog = settings.catalog();
    let provisioner = Provisioner::from_settings(&settings)?;

    provisioner
        .provision_all(&catalog, &settings.storage_path, |event| log_event(&event))
        .with_context(|| {
            format!(
                "provisioning models under {}",
                settings.storage_path.display()
            )
        })?;

    tracing::info!("All models provisioned");
    Ok(())
}
