use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use ground_control::capabilities;
use ground_control::client;
use ground_control::config::{ClientConfig, DispatcherConfig, SatelliteConfig};
use ground_control::dispatcher::Dispatcher;
use ground_control::satellite::Satellite;
use ground_control::shutdown::install_shutdown_handler;

#[derive(Parser, Debug)]
#[command(name = "ground-control")]
#[command(version)]
#[command(about = "A distributed job-execution fabric with satellite worker nodes")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the central dispatcher
    Dispatcher {
        /// Address to listen on for registrations and job requests
        #[arg(long, default_value = "127.0.0.1:7400")]
        listen: SocketAddr,
    },

    /// Start a satellite worker node
    Satellite {
        /// Name this satellite registers under
        #[arg(long)]
        name: String,

        /// Address to listen on for forwarded jobs
        #[arg(long, default_value = "127.0.0.1:7410")]
        listen: SocketAddr,

        /// Host other nodes should use to reach this satellite
        #[arg(long, default_value = "127.0.0.1")]
        advertise_host: String,

        /// Dispatcher address (host:port)
        #[arg(long, default_value = "127.0.0.1:7400")]
        dispatcher: String,
    },

    /// Submit a single job and print the result
    Submit {
        /// Dispatcher address (host:port)
        #[arg(long, short = 'a', default_value = "127.0.0.1:7400")]
        dispatcher: String,

        /// Fully-qualified capability name (e.g. "capabilities.fibonacci")
        capability: String,

        /// Job input as JSON (e.g. '21')
        input: String,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing();

    match args.command {
        Commands::Dispatcher { listen } => {
            let shutdown = install_shutdown_handler();
            let dispatcher = Dispatcher::new(DispatcherConfig::new(listen));
            dispatcher.run(shutdown).await?;
        }
        Commands::Satellite {
            name,
            listen,
            advertise_host,
            dispatcher,
        } => {
            let shutdown = install_shutdown_handler();
            let config =
                SatelliteConfig::new(name, listen, dispatcher).with_advertise_host(advertise_host);
            let source = Arc::new(capabilities::default_catalog());
            Satellite::new(config, source).run(shutdown).await?;
        }
        Commands::Submit {
            dispatcher,
            capability,
            input,
        } => {
            let input: Value = serde_json::from_str(&input)
                .map_err(|e| format!("input is not valid JSON: {}", e))?;
            let config = ClientConfig::new(dispatcher);
            let result = client::submit_job(&config, &capability, input).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
