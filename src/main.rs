use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;

use proxy_config::utils::FormatVariables;
use proxy_config::settings::ProxyConfig;
use proxy_config::{ProxySettings, ProxyTypes};

/// Inspect and validate multi-protocol proxy configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a configuration file and report what it contains
    Check {
        /// Path to the configuration file (YAML, TOML or JSON)
        #[arg(value_name = "FILE")]
        config: String,
    },

    /// Print freshly generated default settings for a protocol
    Default {
        /// One of vmess, vless, trojan, shadowsocks
        #[arg(value_name = "PROTOCOL")]
        protocol: ProxyTypes,
    },

    /// Print the hosts of an inbound with their templates expanded
    Render {
        /// Path to the configuration file (YAML, TOML or JSON)
        #[arg(value_name = "FILE")]
        config: String,

        /// Tag of the inbound whose hosts are rendered
        #[arg(short, long)]
        tag: String,

        /// Template variable, may be repeated
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
        vars: Vec<(String, String)>,
    },
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))
}

fn load(path: &str) -> Result<ProxyConfig> {
    ProxyConfig::load_from_file(path).with_context(|| format!("failed to load {}", path))
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args = Args::parse();

    match args.command {
        Command::Check { config } => {
            let proxy_config = load(&config)?;
            info!(
                "{}: {} inbounds, {} host groups",
                config,
                proxy_config.inbounds.len(),
                proxy_config.hosts.len()
            );
            for inbound in &proxy_config.inbounds {
                println!(
                    "{}\t{}\t{}{}\t{}\t{} hosts",
                    inbound.tag,
                    inbound.protocol,
                    inbound.network,
                    if inbound.tls { "+tls" } else { "" },
                    inbound.port,
                    proxy_config.hosts_for(&inbound.tag).len()
                );
            }
        }
        Command::Default { protocol } => {
            let settings = ProxySettings::default_for(protocol);
            println!("{}", serde_json::to_string_pretty(&settings.to_json())?);
        }
        Command::Render { config, tag, vars } => {
            let proxy_config = load(&config)?;
            let inbound = proxy_config
                .inbound(&tag)
                .ok_or_else(|| anyhow!("no inbound tagged '{}'", tag))?;

            let mut variables: FormatVariables = vars.into_iter().collect();
            if variables.get("PROTOCOL").is_none() {
                variables.insert("PROTOCOL", inbound.protocol.as_str());
            }

            for host in proxy_config.hosts_for(&tag) {
                println!(
                    "{}\t{}:{}\t{}",
                    host.format_remark(&variables)?,
                    host.format_address(&variables)?,
                    host.port().unwrap_or(inbound.port),
                    host.security
                );
            }
        }
    }

    Ok(())
}
