use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::SatelliteConfig;
use crate::error::{FabricError, Result};
use crate::protocol::{read_frame, write_frame, Envelope, JobDescriptor, JobReply, SatelliteInfo};
use crate::satellite::cache::CapabilityCache;
use crate::satellite::capability::CapabilitySource;

/// A satellite worker node.
pub struct Satellite {
    config: SatelliteConfig,
    cache: Arc<CapabilityCache>,
}

impl Satellite {
    pub fn new(config: SatelliteConfig, source: Arc<dyn CapabilitySource>) -> Self {
        Self {
            config,
            cache: Arc::new(CapabilityCache::new(source)),
        }
    }

    /// Bind the listening socket, register with the dispatcher, and serve
    /// job requests until cancelled.
    ///
    /// Binding before registering lets the advertised port be the one the
    /// listener actually got, which matters when the configured port is 0.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let listener = TcpListener::bind(self.config.listen_addr).await?;
        self.run_on(listener, shutdown).await
    }

    /// Serve on an already-bound listener; registers first.
    pub async fn run_on(self, listener: TcpListener, shutdown: CancellationToken) -> Result<()> {
        let local_addr = listener.local_addr()?;
        self.register_with_dispatcher(local_addr.port()).await?;

        tracing::info!(satellite = %self.config.name, addr = %local_addr, "Satellite listening");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!(satellite = %self.config.name, "Satellite shutting down");
                    return Ok(());
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let cache = self.cache.clone();
                            let read_timeout = self.config.read_timeout;
                            tokio::spawn(async move {
                                let request_id = Uuid::new_v4();
                                match handle_connection(stream, cache, read_timeout, request_id).await {
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

    /// Send the one registration envelope. Fatal at startup if the
    /// dispatcher is unreachable; a satellite nobody can dispatch to is
    /// useless.
    async fn register_with_dispatcher(&self, advertised_port: u16) -> Result<()> {
        let info = SatelliteInfo::new(
            self.config.name.clone(),
            self.config.advertise_host.clone(),
            advertised_port,
        );
        let envelope = Envelope::RegisterSatellite(info);

        let mut dispatcher = timeout(
            self.config.register_timeout,
            TcpStream::connect(&self.config.dispatcher_addr),
        )
        .await
        .map_err(|_| FabricError::Timeout("connecting to the dispatcher"))??;

        write_frame(&mut dispatcher, &envelope).await?;

        tracing::info!(
            satellite = %self.config.name,
            dispatcher = %self.config.dispatcher_addr,
            "Registered with dispatcher"
        );
        Ok(())
    }
}

/// One request/response exchange on a forwarded connection.
async fn handle_connection(
    mut stream: TcpStream,
    cache: Arc<CapabilityCache>,
    read_timeout: std::time::Duration,
    request_id: Uuid,
) -> Result<()> {
    let envelope: Envelope = timeout(read_timeout, read_frame(&mut stream))
        .await
        .map_err(|_| FabricError::Timeout("reading job request"))??;

    let job = match envelope {
        Envelope::JobRequest(job) => job,
        other => {
            tracing::warn!(%request_id, kind = other.kind(), "Message kind not implemented here, dropping");
            return Ok(());
        }
    };

    let capability = job.capability.clone();
    let reply = match run_job(&cache, job, request_id).await {
        Ok(result) => JobReply::Completed { result },
        Err(e) => {
            tracing::warn!(%request_id, capability = %capability, error = %e, "Job failed");
            JobReply::Failed {
                reason: e.to_string(),
            }
        }
    };

    write_frame(&mut stream, &reply).await
}

/// Resolve the capability through the cache and execute it off the async
/// workers; capabilities are synchronous and may be CPU-heavy.
async fn run_job(
    cache: &CapabilityCache,
    job: JobDescriptor,
    request_id: Uuid,
) -> Result<serde_json::Value> {
    let capability = cache.resolve(&job.capability).await?;

    tracing::info!(%request_id, capability = %job.capability, "Executing job");
    let result = tokio::task::spawn_blocking(move || capability.execute(job.input))
        .await
        .map_err(|e| FabricError::Capability(format!("execution task failed: {}", e)))??;

    Ok(result)
}
