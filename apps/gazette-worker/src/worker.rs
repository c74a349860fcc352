use std::time::Duration;

use tokio::time as tokio_time;

use gazette_service::GazetteService;

/// Periodically converges the semantic index with the article store. A
/// failed pass is logged and retried on the next tick; the loop never exits
/// on its own.
pub async fn run_worker(service: GazetteService) -> color_eyre::Result<()> {
	let interval = Duration::from_secs(service.cfg.sync.poll_interval_secs);

	tracing::info!(interval_secs = interval.as_secs(), "Sync worker started.");

	loop {
		match service.sync_index().await {
			Ok(report) =>
				if report.synced > 0 || report.failed > 0 {
					tracing::info!(
						synced = report.synced,
						skipped = report.skipped,
						failed = report.failed,
						"Sync pass complete."
					);
				},
			Err(err) => {
				tracing::error!(error = %err, "Sync pass failed.");
			},
		}

		tokio_time::sleep(interval).await;
	}
}
