//! `xymon-channel`: decode a Xymon channel feed from standard input.
//!
//! Run it as a channel worker, e.g. `xymond_channel --channel=status
//! xymon-channel`. Each decoded message is logged at info level; decode and
//! handler failures are logged as warnings.

mod cli;

use std::{
    error::Error,
    future::{self, Future},
    io,
    process::ExitCode,
    time::Duration,
};

use clap::Parser;
use tokio::signal;
use tracing::{Level, error, info, warn};
use xymon_channels::{
    ChannelError,
    HandlerError,
    Message,
    Pipeline,
    PipelineConfig,
    PipelineReport,
    QueueConfig,
    QueueName,
};

use crate::cli::{Cli, LogLevel};

fn level(log_level: LogLevel) -> Level {
    match log_level {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

fn pipeline_config(cli: &Cli) -> PipelineConfig {
    let defaults = PipelineConfig::default();
    let queue = |name: QueueName, capacity: Option<usize>| {
        let base = defaults.queue(name);
        QueueConfig::new(
            capacity.unwrap_or(base.capacity),
            cli.warning_fraction.unwrap_or(base.warning_fraction),
        )
    };
    PipelineConfig::default()
        .line_queue(queue(QueueName::Lines, cli.line_queue))
        .message_queue(queue(QueueName::Messages, cli.message_queue))
        .error_queue(queue(QueueName::Errors, cli.error_queue))
        .monitor_interval(
            cli.monitor_interval
                .map_or(defaults.monitor_interval, Duration::from_secs),
        )
        .line_buffer(
            cli.initial_line_buffer
                .unwrap_or(defaults.initial_line_capacity),
            cli.max_line_length.unwrap_or(defaults.max_line_length),
        )
        .decode_concurrency(
            cli.decode_concurrency
                .unwrap_or(defaults.decode_concurrency),
        )
}

#[cfg(feature = "metrics")]
fn install_metrics(cli: &Cli) -> Result<(), Box<dyn Error>> {
    if let Some(addr) = cli.metrics_listen {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!(%addr, "serving metrics");
    }
    Ok(())
}

#[cfg(not(feature = "metrics"))]
#[expect(clippy::unnecessary_wraps, reason = "matches the metrics-enabled signature")]
fn install_metrics(cli: &Cli) -> Result<(), Box<dyn Error>> {
    if cli.metrics_listen.is_some() {
        warn!("built without metrics support; ignoring --metrics-listen");
    }
    Ok(())
}

/// Resolve once `signal` fires.
///
/// If the handler cannot be installed the error is logged and this never
/// resolves, so the run ends with its input instead of stopping at once.
async fn shutdown_signal<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(err) = signal.await {
        error!(error = %err, "failed to listen for Ctrl-C; running until input ends");
        future::pending::<()>().await;
    }
}

async fn run(cli: &Cli) -> Result<PipelineReport, Box<dyn Error>> {
    install_metrics(cli)?;
    let pipeline = Pipeline::new(
        pipeline_config(cli),
        |message: Message| -> Result<(), HandlerError> {
            info!(
                kind = %message.kind,
                id = message.id.as_deref().unwrap_or("-"),
                host = %message.hostname,
                test = message.test().unwrap_or("-"),
                color = message.color().unwrap_or("-"),
                body_lines = message.body.len(),
                "message"
            );
            Ok(())
        },
        |error: ChannelError| {
            warn!(error = %error, header = error.header().unwrap_or("-"), "channel error");
        },
    )?;
    let report = pipeline
        .run_with_shutdown(tokio::io::stdin(), shutdown_signal(signal::ctrl_c()))
        .await?;
    Ok(report)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(level(cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    match run(&cli).await {
        Ok(report) => {
            info!(?report, "channel closed");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "channel reader failed");
            ExitCode::FAILURE
        }
    }
}
