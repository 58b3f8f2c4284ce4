use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use crate::error::Result;
use crate::satellite::capability::{Capability, CapabilitySource};

type Slot = Arc<OnceCell<Arc<dyn Capability>>>;

/// Per-process memory of already-resolved capabilities.
///
/// Resolution is single-flight per name: of two concurrent first requests,
/// one pays the fetch and the other waits on the same slot, so the source is
/// hit at most once per name on the success path. A failed fetch leaves the
/// slot empty and a later request retries. Entries are never evicted.
pub struct CapabilityCache {
    source: Arc<dyn CapabilitySource>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl CapabilityCache {
    pub fn new(source: Arc<dyn CapabilitySource>) -> Self {
        Self {
            source,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// The ready-to-invoke capability for `name`, fetching it on first use.
    pub async fn resolve(&self, name: &str) -> Result<Arc<dyn Capability>> {
        let slot = {
            let mut slots = self.slots.lock().await;
            slots.entry(name.to_string()).or_default().clone()
        };

        // map lock released; only requests for this name wait here
        let capability = slot
            .get_or_try_init(|| async {
                tracing::info!(capability = name, "Fetching capability implementation");
                self.source.fetch(name).await.map(Arc::from)
            })
            .await?;

        Ok(capability.clone())
    }
}
