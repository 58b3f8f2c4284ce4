//! Minimal client: one connection, one job, one reply.

use serde_json::Value;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::ClientConfig;
use crate::error::{FabricError, Result};
use crate::protocol::{read_frame, write_frame, Envelope, JobDescriptor, JobReply};

/// Submit one job to the dispatcher and wait for its result.
pub async fn submit_job(config: &ClientConfig, capability: &str, input: Value) -> Result<Value> {
    let mut dispatcher = timeout(
        config.connect_timeout,
        TcpStream::connect(&config.dispatcher_addr),
    )
    .await
    .map_err(|_| FabricError::Timeout("connecting to the dispatcher"))??;

    let envelope = Envelope::JobRequest(JobDescriptor::new(capability, input));
    write_frame(&mut dispatcher, &envelope).await?;

    let reply: JobReply = timeout(config.reply_timeout, read_frame(&mut dispatcher))
        .await
        .map_err(|_| FabricError::Timeout("waiting for the job result"))??;

    match reply {
        JobReply::Completed { result } => Ok(result),
        JobReply::Failed { reason } => Err(FabricError::JobFailed(reason)),
    }
}
