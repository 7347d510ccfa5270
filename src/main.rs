use anyhow::Result;
use nodecount::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!(
        base_path = %app_config.base_path().display(),
        history = %app_config.history_path().display(),
        "{} starting",
        version::banner()
    );

    // Run outcomes are reported on the console only; the exit code stays 0.
    match collector::Collector::new(&app_config).run() {
        Ok(report) => println!(
            "Average total nodes across nodes, excluding the top and bottom {}%: {:.2}",
            report.trim_percent, report.record.average_nodes
        ),
        Err(collector::CollectError::Aggregate(e)) => {
            tracing::warn!(error = %e, "Insufficient data after excluding outliers");
            println!("Insufficient data after excluding top and bottom outliers: {e}");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Run aborted");
            println!("{e}");
        }
    }

    Ok(())
}
