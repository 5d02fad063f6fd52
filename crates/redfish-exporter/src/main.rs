/*
 * SPDX-FileCopyrightText: Copyright (c) 2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: Apache-2.0
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 * http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use redfish_exporter::{Config, ExporterError, ServiceOptions};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[clap(name = "redfish-exporter", version)]
struct Args {
    #[clap(long = "config.file", env = "REDFISH_EXPORTER_CONFIG", default_value = "config.toml")]
    #[clap(help = "Path to the configuration file, reloaded on SIGHUP and /-/reload")]
    config_file: PathBuf,

    #[clap(long = "web.listen-address", default_value = "0.0.0.0:9610")]
    listen_address: SocketAddr,

    #[clap(long = "web.reload-token", env = "REDFISH_EXPORTER_RELOAD_TOKEN")]
    #[clap(help = "Require `Authorization: Bearer <token>` on /-/reload")]
    reload_token: Option<String>,

    #[clap(long = "print.config")]
    #[clap(help = "Print the loaded configuration with passwords redacted, then exit")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), ExporterError> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
        .add_directive("tower=warn".parse().map_err(|e| format!("{e}"))?)
        .add_directive("hyper=warn".parse().map_err(|e| format!("{e}"))?)
        .add_directive("reqwest=warn".parse().map_err(|e| format!("{e}"))?)
        .add_directive("rustls=warn".parse().map_err(|e| format!("{e}"))?);

    tracing_subscriber::registry()
        .with(Layer::default().compact())
        .with(env_filter)
        .init();

    let args = Args::parse();

    let config = Config::load(&args.config_file)?;

    if args.print_config {
        let rendered = serde_json::to_string_pretty(&config.redacted())
            .map_err(|e| format!("Failed to render configuration: {e}"))?;
        println!("{rendered}");
        return Ok(());
    }

    tracing::info!(
        config = %args.config_file.display(),
        hosts = config.hosts.len(),
        groups = config.groups.len(),
        "Starting redfish exporter"
    );

    redfish_exporter::run_service(
        ServiceOptions {
            config_path: args.config_file,
            listen_address: args.listen_address,
            reload_token: args.reload_token,
        },
        config,
    )
    .await
}
