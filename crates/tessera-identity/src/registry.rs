use std::fmt;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tessera_core::{Did, IdentityConfig};

use crate::connector::LedgerConnector;
use crate::error::IdentityError;
use crate::memory_ledger::InMemoryLedger;

type ConnectorFactory = Arc<dyn Fn() -> Arc<dyn LedgerConnector> + Send + Sync>;

/// A registered factory plus the connector it built, once built.
struct ConnectorSlot {
    factory: ConnectorFactory,
    instance: OnceLock<Arc<dyn LedgerConnector>>,
}

/// Routes DID namespaces to ledger connectors.
///
/// Connectors are built lazily on first use, at most once per registration
/// even when several callers race to resolve the same namespace.
#[derive(Default)]
pub struct ConnectorRegistry {
    slots: DashMap<String, Arc<ConnectorSlot>>,
}

impl ConnectorRegistry {
    /// Create a new registry with no namespaces registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry serving the configured default namespace from an
    /// [`InMemoryLedger`] that mints DIDs with the configured method.
    pub fn in_memory(config: &IdentityConfig) -> Self {
        let registry = Self::new();
        let config = config.clone();
        registry.register(config.default_namespace.clone(), move || {
            Arc::new(InMemoryLedger::from_config(&config, config.default_namespace.clone()))
                as Arc<dyn LedgerConnector>
        });
        registry
    }

    /// Install the factory for `namespace`.
    ///
    /// Re-registering replaces both the factory and any connector already
    /// built from the previous one.
    pub fn register<F>(&self, namespace: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn LedgerConnector> + Send + Sync + 'static,
    {
        let namespace = namespace.into();
        let slot = Arc::new(ConnectorSlot {
            factory: Arc::new(factory),
            instance: OnceLock::new(),
        });
        let replaced = self.slots.insert(namespace.clone(), slot).is_some();
        tracing::info!(namespace = %namespace, replaced, "Registering ledger connector");
    }

    /// Remove a namespace. Returns whether it was registered.
    pub fn unregister(&self, namespace: &str) -> bool {
        self.slots.remove(namespace).is_some()
    }

    /// The connector for `namespace`, building it on first use.
    pub fn resolve(&self, namespace: &str) -> Result<Arc<dyn LedgerConnector>, IdentityError> {
        // Clone the slot out so the map shard is not locked while the
        // factory runs.
        let slot = self
            .slots
            .get(namespace)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| IdentityError::NamespaceNotRegistered(namespace.to_string()))?;

        let connector = slot.instance.get_or_init(|| {
            tracing::debug!(namespace, "instantiating ledger connector");
            (slot.factory)()
        });
        Ok(Arc::clone(connector))
    }

    /// The connector responsible for `did`.
    pub fn resolve_for(&self, did: &Did) -> Result<Arc<dyn LedgerConnector>, IdentityError> {
        self.resolve(did.namespace())
    }

    pub fn is_registered(&self, namespace: &str) -> bool {
        self.slots.contains_key(namespace)
    }

    /// Registered namespaces, sorted.
    pub fn namespaces(&self) -> Vec<String> {
        let mut namespaces: Vec<String> = self.slots.iter().map(|e| e.key().clone()).collect();
        namespaces.sort();
        namespaces
    }
}

impl fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("namespaces", &self.namespaces())
            .finish()
    }
}
