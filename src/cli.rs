use clap::Parser;
use std::path::PathBuf;

use crate::config::StoreBackend;

/// Lead capture form server - build, store, embed and submit web forms
#[derive(Parser, Debug, Clone)]
#[command(name = "leadform", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "LEADFORM_CONFIG", default_value = "leadform.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "LEADFORM_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "LEADFORM_PORT")]
    pub port: Option<u16>,

    /// Form store backend
    #[arg(long, env = "LEADFORM_STORE_BACKEND", value_enum)]
    pub store_backend: Option<StoreBackend>,

    /// Directory for the file store backend
    #[arg(long, env = "LEADFORM_STORE_PATH")]
    pub store_path: Option<String>,

    /// Public base URL written into generated embed code
    #[arg(long, env = "LEADFORM_PUBLIC_URL")]
    pub public_url: Option<String>,
}
