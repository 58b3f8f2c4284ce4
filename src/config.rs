use std::net::SocketAddr;
use std::time::Duration;

/// Configuration for the central dispatcher process.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub listen_addr: SocketAddr,
    /// Bound on reading the request envelope off an accepted connection.
    pub read_timeout: Duration,
    /// Bound on connecting to a satellite when relaying a job.
    pub connect_timeout: Duration,
    /// Bound on waiting for a satellite's reply to a relayed job.
    pub reply_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            // SAFETY: This is a hardcoded valid address that will always parse
            listen_addr: "127.0.0.1:7400"
                .parse()
                .expect("default listen address is valid"),
            read_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            reply_timeout: Duration::from_secs(60),
        }
    }
}

impl DispatcherConfig {
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            ..Default::default()
        }
    }
}

/// Configuration for a satellite worker node.
#[derive(Debug, Clone)]
pub struct SatelliteConfig {
    /// Name this satellite registers under with the dispatcher.
    pub name: String,
    pub listen_addr: SocketAddr,
    /// Host other nodes should use to reach this satellite. The advertised
    /// port is always the one the listener actually bound.
    pub advertise_host: String,
    /// Dispatcher address in host:port format, supports both IP and hostnames.
    pub dispatcher_addr: String,
    /// Bound on connecting to the dispatcher during startup registration.
    pub register_timeout: Duration,
    /// Bound on reading a job request off an accepted connection.
    pub read_timeout: Duration,
}

impl SatelliteConfig {
    pub fn new(name: impl Into<String>, listen_addr: SocketAddr, dispatcher_addr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listen_addr,
            advertise_host: "127.0.0.1".to_string(),
            dispatcher_addr: dispatcher_addr.into(),
            register_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_advertise_host(mut self, host: impl Into<String>) -> Self {
        self.advertise_host = host.into();
        self
    }
}

/// Configuration for a client submitting jobs to the dispatcher.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Dispatcher address in host:port format.
    pub dispatcher_addr: String,
    pub connect_timeout: Duration,
    /// Bound on waiting for the job result. Covers the whole relay round
    /// trip, so it should exceed the dispatcher's own reply timeout.
    pub reply_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            dispatcher_addr: "127.0.0.1:7400".to_string(),
            connect_timeout: Duration::from_secs(5),
            reply_timeout: Duration::from_secs(90),
        }
    }
}

impl ClientConfig {
    pub fn new(dispatcher_addr: impl Into<String>) -> Self {
        Self {
            dispatcher_addr: dispatcher_addr.into(),
            ..Default::default()
        }
    }
}
