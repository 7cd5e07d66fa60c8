//! Domain resolver
//!
//! Looks up reference entities (reconciliation instances and the servers
//! hosting them) mentioned in free text. Matching is case-insensitive
//! substring containment against catalog identifiers.

use serde::{Deserialize, Serialize};

/// Reconciliation instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRef {
    pub id: String,
    pub name: String,
    pub server_id: String,
}

/// Server hosting one or more instances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRef {
    pub id: String,
    pub host: String,
}

/// Fixed catalog of reference entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCatalog {
    pub instances: Vec<InstanceRef>,
    pub servers: Vec<ServerRef>,
}

impl ReferenceCatalog {
    /// Built-in catalog
    #[must_use]
    pub fn builtin() -> Self {
        let instance = |id: &str, name: &str, server: &str| InstanceRef {
            id: id.to_string(),
            name: name.to_string(),
            server_id: server.to_string(),
        };
        let server = |id: &str, host: &str| ServerRef {
            id: id.to_string(),
            host: host.to_string(),
        };

        Self {
            instances: vec![
                instance("INV", "Investments Reconciliation", "recon-app-01"),
                instance("FXO", "FX Operations", "recon-app-02"),
                instance("TRSY", "Treasury Settlements", "recon-app-02"),
                instance("CSL", "Cash & Securities Lending", "recon-app-03"),
            ],
            servers: vec![
                server("recon-app-01", "recon-app-01.internal"),
                server("recon-app-02", "recon-app-02.internal"),
                server("recon-app-03", "recon-app-03.internal"),
            ],
        }
    }
}

impl Default for ReferenceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Stateless lookup over a [`ReferenceCatalog`]
#[derive(Debug, Clone, Default)]
pub struct DomainResolver {
    catalog: ReferenceCatalog,
}

impl DomainResolver {
    #[inline]
    #[must_use]
    pub fn new(catalog: ReferenceCatalog) -> Self {
        Self { catalog }
    }

    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    /// First catalog instance whose id appears in the text
    #[must_use]
    pub fn resolve_instance(&self, text: &str) -> Option<&InstanceRef> {
        let lower = text.to_lowercase();
        self.catalog
            .instances
            .iter()
            .find(|i| lower.contains(&i.id.to_lowercase()))
    }

    /// Server mentioned in the text, else the server of a mentioned instance
    #[must_use]
    pub fn resolve_server(&self, text: &str) -> Option<&ServerRef> {
        let lower = text.to_lowercase();
        self.catalog
            .servers
            .iter()
            .find(|s| lower.contains(&s.id.to_lowercase()))
            .or_else(|| {
                self.resolve_instance(text)
                    .and_then(|i| self.server(&i.server_id))
            })
    }

    #[must_use]
    pub fn server(&self, id: &str) -> Option<&ServerRef> {
        self.catalog.servers.iter().find(|s| s.id == id)
    }

    /// First instance hosted on the server
    #[must_use]
    pub fn owning_instance(&self, server_id: &str) -> Option<&InstanceRef> {
        self.catalog
            .instances
            .iter()
            .find(|i| i.server_id == server_id)
    }
}
