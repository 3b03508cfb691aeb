use clap::Parser;
use std::path::PathBuf;

/// Agent swarm orchestration server
#[derive(Parser, Debug, Clone)]
#[command(name = "myrmidon", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "MYRMIDON_CONFIG", default_value = "myrmidon.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "MYRMIDON_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "MYRMIDON_PORT")]
    pub port: Option<u16>,
}
