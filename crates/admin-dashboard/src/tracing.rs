use admin_shared::telemetry::{init_tracing, TraceTarget};

const APP_NAME: &str = "admin_dashboard";
const DEFAULT_FILTER: &str = "info";

/// Traces go to a file unless `--stdout` was passed. If the file cannot be
/// created stdout is used instead
pub fn init(cli: &super::cli::Cli) -> anyhow::Result<()> {
    if !cli.is_to_std_out {
        match init_tracing(APP_NAME, DEFAULT_FILTER, TraceTarget::File) {
            Ok(path) => {
                if let Some(path) = path {
                    println!("Tracing started to file {path:?}");
                }
                return Ok(());
            }
            Err(e) => {
                // Print error and fall though to logging to stdout
                eprintln!("Failed to start logging to file: {e:#}");
            }
        }
    }

    match init_tracing(APP_NAME, DEFAULT_FILTER, TraceTarget::Stdout) {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing_subscriber::fmt()
                .try_init()
                .map_err(|fmt_err| anyhow::anyhow!("{e:#}, plain output also failed: {fmt_err}"))
        }
    }
}
