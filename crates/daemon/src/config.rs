use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(name = "statusd", version)]
#[command(about = "Keeps the latest reported status of each machine")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "STATUSD_BIND", default_value = "127.0.0.1:3030")]
    pub bind: SocketAddr,

    /// Accepted API key. Repeat the flag or pass a comma-separated list.
    #[arg(long = "api-key", env = "STATUSD_API_KEYS", value_delimiter = ',')]
    pub api_keys: Vec<String>,

    /// tracing filter directive, e.g. `info` or `statusd=debug,tower_http=debug`.
    #[arg(long, env = "STATUSD_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn env_filter(&self) -> anyhow::Result<EnvFilter> {
        EnvFilter::try_new(&self.log_level)
            .with_context(|| format!("invalid log level directive '{}'", self.log_level))
    }
}
