use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::DispatcherConfig;
use crate::dispatcher::balancer::LoadBalancer;
use crate::dispatcher::registry::SatelliteRegistry;
use crate::error::{FabricError, Result};
use crate::protocol::{read_frame, write_frame, Envelope, JobReply};

/// Registry and balancer behind one lock, so a job request can never observe
/// a satellite that is registered but not yet in the rotation.
#[derive(Debug, Default)]
struct DispatchState {
    registry: SatelliteRegistry,
    balancer: LoadBalancer,
}

/// The central dispatcher process.
pub struct Dispatcher {
    config: DispatcherConfig,
    state: Arc<Mutex<DispatchState>>,
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(DispatchState::default())),
        }
    }

    /// Bind the configured listen address and serve until cancelled.
    ///
    /// Failing to bind is fatal; everything after that is connection-local.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let listener = TcpListener::bind(self.config.listen_addr).await?;
        self.run_on(listener, shutdown).await
    }

    /// Serve on an already-bound listener. Lets tests bind port 0 and learn
    /// the address before starting the loop.
    pub async fn run_on(self, listener: TcpListener, shutdown: CancellationToken) -> Result<()> {
        tracing::info!(addr = %listener.local_addr()?, "Dispatcher listening");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Dispatcher shutting down");
                    return Ok(());
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let state = self.state.clone();
                            let config = self.config.clone();
                            tokio::spawn(async move {
                                let request_id = Uuid::new_v4();
                                match handle_connection(stream, state, &config, request_id).await {
                                    Ok(()) => {}
                                    Err(FabricError::ConnectionClosed) => {
                                        tracing::debug!(%request_id, %peer, "Peer closed without sending a request");
                                    }
                                    Err(e) => {
                                        tracing::warn!(%request_id, %peer, error = %e, "Connection handler failed");
                                    }
                                }
                            });
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Accept failed");
                        }
                    }
                }
            }
        }
    }
}

/// One request/response exchange with whoever connected.
async fn handle_connection(
    mut stream: TcpStream,
    state: Arc<Mutex<DispatchState>>,
    config: &DispatcherConfig,
    request_id: Uuid,
) -> Result<()> {
    let envelope: Envelope = timeout(config.read_timeout, read_frame(&mut stream))
        .await
        .map_err(|_| FabricError::Timeout("reading request envelope"))??;

    match envelope {
        Envelope::RegisterSatellite(info) => {
            let mut state = state.lock().await;
            let name = state.registry.register(info)?;
            state.balancer.satellite_added(&name);
            tracing::info!(
                %request_id,
                satellite = %name,
                registered = state.registry.len(),
                "Satellite registered"
            );
            // no acknowledgment frame; registration is fire-and-forget
            Ok(())
        }
        envelope @ Envelope::JobRequest(_) => {
            let reply = match forward_job(&envelope, &state, config, request_id).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!(%request_id, error = %e, "Dispatch failed");
                    JobReply::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            write_frame(&mut stream, &reply).await
        }
    }
}

/// Pick a satellite, relay the envelope unmodified, and return its reply.
async fn forward_job(
    envelope: &Envelope,
    state: &Mutex<DispatchState>,
    config: &DispatcherConfig,
    request_id: Uuid,
) -> Result<JobReply> {
    // pick under the lock, then do all I/O outside it
    let (name, info) = {
        let mut state = state.lock().await;
        let name = state.balancer.next_satellite()?;
        let info = state.registry.lookup(&name).map_err(|e| {
            tracing::error!(satellite = %name, "Balancer returned a satellite missing from the registry");
            e
        })?;
        (name, info)
    };

    tracing::info!(%request_id, satellite = %name, addr = %info.socket_addr(), "Forwarding job");

    let mut satellite = timeout(config.connect_timeout, TcpStream::connect(info.socket_addr()))
        .await
        .map_err(|_| FabricError::Timeout("connecting to the satellite"))??;

    write_frame(&mut satellite, envelope).await?;

    let reply: JobReply = timeout(config.reply_timeout, read_frame(&mut satellite))
        .await
        .map_err(|_| FabricError::Timeout("waiting for the satellite's reply"))??;

    tracing::debug!(%request_id, satellite = %name, "Relaying reply to client");
    Ok(reply)
}
