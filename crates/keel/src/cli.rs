use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use keel_core::config::ConfigError;
use keel_core::kernel::constants::DEFAULT_ENV_PREFIX;
use keel_core::{expand, KernelError, LifecycleHost, RuntimeParams, SystemConfig, TokioProcessHost};
use log::info;

use crate::components::builtin_registry;

/// Arguments shared by commands that operate on a system configuration.
#[derive(Args, Debug)]
pub struct SystemArgs {
    /// Configuration file (.json, .toml, .yaml)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Runtime param as name=value; repeatable, overrides the environment
    #[arg(short, long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// Environment variables starting with this prefix become runtime params
    #[arg(long, default_value = DEFAULT_ENV_PREFIX)]
    pub env_prefix: String,
}

impl SystemArgs {
    /// Load the configuration and collect runtime params.
    pub fn load(&self) -> Result<(SystemConfig, RuntimeParams), ConfigError> {
        let config = SystemConfig::load(&self.config)?;
        let mut params = RuntimeParams::from_env(&self.env_prefix);
        params.merge(&RuntimeParams::from_pairs(&self.params)?);
        Ok((config, params))
    }
}

/// Resolve the configuration and print the order components would start in.
pub fn check(args: &SystemArgs) -> Result<(), KernelError> {
    let (config, params) = args.load()?;
    let graph = expand(&config, &params, &builtin_registry())?;

    println!("Configuration OK: {} component(s)", graph.len());
    for (position, spec) in graph.iter().enumerate() {
        let deps: Vec<String> = spec.dependencies().iter().map(ToString::to_string).collect();
        if deps.is_empty() {
            println!("  {}. {} (factory: {})", position + 1, spec.key(), spec.factory());
        } else {
            println!(
                "  {}. {} (factory: {}, after: {})",
                position + 1,
                spec.key(),
                spec.factory(),
                deps.join(", ")
            );
        }
    }
    Ok(())
}

/// Start the system and keep it up until a termination signal arrives.
pub async fn run(args: &SystemArgs) -> Result<(), KernelError> {
    let (config, params) = args.load()?;
    let process = TokioProcessHost::new();
    let host = LifecycleHost::builder(config, builtin_registry())
        .process_host(Arc::new(process.clone()))
        .build();

    if let Err(e) = host.start_system(&params).await {
        if e.is_interrupted() {
            info!("Terminated before the system finished starting");
            return Ok(());
        }
        return Err(e);
    }
    let status = host.status().await;
    println!("System running with {} component(s); press Ctrl-C to stop", status.components.len());

    process.terminated().await;
    info!("Termination handled, host state: {:?}", host.status().await.state);
    Ok(())
}
