use std::collections::HashMap;

use crate::error::{FabricError, Result};
use crate::protocol::SatelliteInfo;

/// Maps satellite names to their connectivity info.
///
/// Entries are added on registration and never removed or revalidated: a
/// satellite that dies stays registered. There is no heartbeat or expiry.
#[derive(Debug, Default)]
pub struct SatelliteRegistry {
    entries: HashMap<String, SatelliteInfo>,
}

impl SatelliteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for the satellite's name and return
    /// that name. Re-registration is last-write-wins.
    pub fn register(&mut self, info: SatelliteInfo) -> Result<String> {
        let name = info
            .name
            .clone()
            .ok_or_else(|| FabricError::Protocol("satellite registration without a name".to_string()))?;
        if let Some(previous) = self.entries.insert(name.clone(), info) {
            tracing::info!(
                satellite = %name,
                previous_addr = %previous.socket_addr(),
                "Satellite re-registered"
            );
        }
        Ok(name)
    }

    pub fn lookup(&self, name: &str) -> Result<SatelliteInfo> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| FabricError::UnknownSatellite(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
