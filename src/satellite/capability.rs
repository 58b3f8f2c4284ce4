use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{FabricError, Result};

/// A named, invokable unit of computation.
///
/// `execute` is synchronous and must be safe to call repeatedly from a
/// cached instance; implementations hold no per-invocation state.
pub trait Capability: Send + Sync {
    fn execute(&self, input: Value) -> Result<Value>;
}

/// Where capability implementations come from.
///
/// This is the code-serving boundary: the cache calls `fetch` exactly once
/// per name on the success path, so implementations may be as expensive as a
/// network round trip.
#[async_trait]
pub trait CapabilitySource: Send + Sync {
    async fn fetch(&self, name: &str) -> Result<Box<dyn Capability>>;
}

type CapabilityFactory = Box<dyn Fn() -> Box<dyn Capability> + Send + Sync>;

/// Compiled-in name-to-constructor map for a closed set of capabilities.
#[derive(Default)]
pub struct CapabilityCatalog {
    factories: HashMap<String, CapabilityFactory>,
}

impl CapabilityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F, C>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: Capability + 'static,
    {
        self.factories
            .insert(name.into(), Box::new(move || Box::new(factory())));
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[async_trait]
impl CapabilitySource for CapabilityCatalog {
    async fn fetch(&self, name: &str) -> Result<Box<dyn Capability>> {
        match self.factories.get(name) {
            Some(factory) => Ok(factory()),
            None => Err(FabricError::CapabilityLoad {
                name: name.to_string(),
                reason: "not in the catalog".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    impl Capability for Echo {
        fn execute(&self, input: Value) -> Result<Value> {
            Ok(input)
        }
    }

    #[tokio::test]
    async fn catalog_fetches_registered_capabilities() {
        let catalog = CapabilityCatalog::new().register("echo", || Echo);
        let capability = catalog.fetch("echo").await.unwrap();
        assert_eq!(capability.execute(json!("hi")).unwrap(), json!("hi"));
    }

    #[tokio::test]
    async fn catalog_rejects_unknown_names() {
        let catalog = CapabilityCatalog::new().register("echo", || Echo);
        let result = catalog.fetch("missing").await;
        assert!(
            matches!(result, Err(FabricError::CapabilityLoad { name, .. }) if name == "missing")
        );
    }
}
