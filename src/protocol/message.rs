use serde::{Deserialize, Serialize};

/// Connectivity info for a reachable endpoint.
///
/// `name` is the identifier a satellite registers under; the dispatcher
/// itself has no name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatelliteInfo {
    pub name: Option<String>,
    pub host: String,
    pub port: u16,
}

impl SatelliteInfo {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: Some(name.into()),
            host: host.into(),
            port,
        }
    }

    pub fn unnamed(host: impl Into<String>, port: u16) -> Self {
        Self {
            name: None,
            host: host.into(),
            port,
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// What a client wants executed: a capability name and its opaque input.
///
/// The dispatcher relays this verbatim; only the executing satellite ever
/// interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub capability: String,
    pub input: serde_json::Value,
}

impl JobDescriptor {
    pub fn new(capability: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            capability: capability.into(),
            input,
        }
    }
}

/// The one request frame ever written to a socket. The tag determines the
/// payload type; a mismatched combination fails to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload")]
pub enum Envelope {
    #[serde(rename = "REGISTER_SATELLITE")]
    RegisterSatellite(SatelliteInfo),
    #[serde(rename = "JOB_REQUEST")]
    JobRequest(JobDescriptor),
}

impl Envelope {
    /// Wire name of the envelope kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::RegisterSatellite(_) => "REGISTER_SATELLITE",
            Envelope::JobRequest(_) => "JOB_REQUEST",
        }
    }
}

/// The one response frame, written by the satellite and relayed verbatim
/// by the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome")]
pub enum JobReply {
    #[serde(rename = "COMPLETED")]
    Completed { result: serde_json::Value },
    #[serde(rename = "FAILED")]
    Failed { reason: String },
}
