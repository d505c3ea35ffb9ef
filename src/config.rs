//! Process configuration, parsed once at start-up and shared read-only with
//! every worker.

use std::time::Duration;

use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn scheme(self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(about = "Upload an image and show the labels a TF Serving model assigns to it")]
pub struct Config {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Interface to bind.
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub bind_host: String,

    /// Address of the TF Serving host.
    #[arg(long, env = "SERVING_HOST", default_value = "localhost")]
    pub serving_host: String,

    /// Path to the model's classify endpoint on the serving host.
    #[arg(long, env = "MODEL_PATH", default_value = "/v1/models/default:classify")]
    pub model_path: String,

    /// Protocol used to reach the serving host.
    #[arg(long, env = "PROTOCOL", value_enum, default_value_t = Protocol::Http)]
    pub protocol: Protocol,

    /// Number of labels shown to the user.
    #[arg(
        long,
        env = "NUM_RESULTS",
        default_value_t = 5,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub num_results: u32,

    /// Abort backend calls that take longer than this. Unset means wait forever.
    #[arg(long, env = "BACKEND_TIMEOUT_SECS")]
    pub backend_timeout_secs: Option<u64>,

    /// Largest accepted upload, in bytes.
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn serving_address(&self) -> String {
        format!(
            "{}://{}{}",
            self.protocol.scheme(),
            self.serving_host,
            self.model_path
        )
    }

    pub fn listen_address(&self) -> (String, u16) {
        (self.bind_host.clone(), self.port)
    }

    pub fn backend_timeout(&self) -> Option<Duration> {
        self.backend_timeout_secs.map(Duration::from_secs)
    }

    pub fn num_results(&self) -> usize {
        self.num_results as usize
    }
}
