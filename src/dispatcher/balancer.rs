use crate::error::{FabricError, Result};

/// Picks which satellite receives the next job.
///
/// Policy: round-robin over satellite names in registration order. Ties
/// cannot occur; the rotation is a plain cursor walk. Re-registering a known
/// name keeps its existing slot so a bouncing satellite never gets a double
/// share of the load.
#[derive(Debug, Default)]
pub struct LoadBalancer {
    rotation: Vec<String>,
    cursor: usize,
}

impl LoadBalancer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a newly registered satellite to the rotation.
    pub fn satellite_added(&mut self, name: &str) {
        if self.rotation.iter().any(|n| n == name) {
            tracing::debug!(satellite = name, "Already in rotation, keeping existing slot");
            return;
        }
        self.rotation.push(name.to_string());
        tracing::info!(satellite = name, rotation_size = self.rotation.len(), "Satellite added to rotation");
    }

    /// Name of the satellite that should receive the next job.
    ///
    /// Every name returned here is present in the registry: both structures
    /// are updated under one lock and registry entries are never removed.
    pub fn next_satellite(&mut self) -> Result<String> {
        if self.rotation.is_empty() {
            return Err(FabricError::NoSatellitesAvailable);
        }
        let name = self.rotation[self.cursor % self.rotation.len()].clone();
        self.cursor = (self.cursor + 1) % self.rotation.len();
        Ok(name)
    }

    pub fn len(&self) -> usize {
        self.rotation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rotation.is_empty()
    }
}
