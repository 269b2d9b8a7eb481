/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Telemetry xApp: subscribes every connected E2 node to the configured service models and
//! reports per-subscription indication latency on shutdown.

mod config;

use crate::config::{ConfigError, XappConfig};
use clap::Parser;
use e2_reconciler::{E2Reconciler, LatencyTracker, StartupError};
use e2_static_engine::E2StaticFileEngine;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct StartupArgs {
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,
}

#[derive(Debug, Error)]
enum XappError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("unable to listen for shutdown signals: {0}")]
    Signal(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = StartupArgs::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(err = %err, "e2-telemetry-xapp failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: StartupArgs) -> Result<(), XappError> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        "starting e2-telemetry-xapp"
    );

    let config = XappConfig::load(&args.config)?;
    let specs = config.service_model_specs()?;
    info!(
        nodes_file = %config.engine.nodes_file.display(),
        synthetic_indications = config.engine.synthetic_indications,
        specs = specs.len(),
        "configuration loaded"
    );

    let engine = Arc::new(
        E2StaticFileEngine::new(config.engine.nodes_file.clone())
            .with_synthetic_indications(config.engine.synthetic_indications),
    );
    let tracker = Arc::new(LatencyTracker::new());
    let reconciler = E2Reconciler::start(
        "e2-telemetry-xapp",
        config.reconciler_config(),
        specs,
        engine,
        tracker.clone(),
    )?;

    wait_for_shutdown_signal().await?;
    info!("received shutdown signal");

    let report = reconciler.shutdown().await?;
    info!(
        unsubscribed = report.unsubscribed,
        failed = report.failed,
        abandoned = report.abandoned,
        timed_out = report.timed_out,
        "drain finished"
    );

    for (key, stats) in tracker.snapshot().await {
        info!(
            subscription = %key,
            received = stats.received,
            mean_latency_us = ?stats.mean_latency_us(),
            max_latency_us = stats.max_latency_us,
            "indication latency summary"
        );
    }
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<(), std::io::Error> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<(), std::io::Error> {
    tokio::signal::ctrl_c().await
}
