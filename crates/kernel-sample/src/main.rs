use kernel_sample::lifecycle::{SampleConfig, SampleError, SampleSystem};
use module_kernel::tracing::setup_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), SampleError> {
    setup_tracing();

    info!("Starting sample application");
    let system = SampleSystem::new(SampleConfig::default())?;
    let summary = system.run().await?;

    info!(
        readings = summary.readings,
        first_clock = summary.first_clock,
        last_clock = summary.last_clock,
        monotonic = summary.monotonic,
        "Application completed successfully"
    );
    Ok(())
}
