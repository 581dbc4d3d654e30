//! Name lists used for search suggestions.
//!
//! The console keeps the service, application and consumer names it last
//! loaded so pages can offer completions without asking the registry on
//! every keystroke. A list is only replaced by a successful load; a failed
//! load keeps whatever was there (the failure was already notified).

use tracing::debug;

use crate::api::{ApiClient, ApiError};

/// Items containing `filter`, ignoring case. An empty filter keeps all.
pub fn filter_items<'a>(items: &'a [String], filter: &str) -> Vec<&'a str> {
    let needle = filter.to_lowercase();
    items
        .iter()
        .filter(|item| item.to_lowercase().contains(&needle))
        .map(String::as_str)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Services,
    Applications,
    Consumers,
}

impl ItemKind {
    pub const ALL: [ItemKind; 3] = [ItemKind::Services, ItemKind::Applications, ItemKind::Consumers];

    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Services => "service",
            ItemKind::Applications => "application",
            ItemKind::Consumers => "consumer",
        }
    }
}

#[derive(Debug, Default)]
pub struct ItemCatalog {
    services: Option<Vec<String>>,
    applications: Option<Vec<String>>,
    consumers: Option<Vec<String>>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: ItemKind) -> Option<&[String]> {
        match kind {
            ItemKind::Services => self.services.as_deref(),
            ItemKind::Applications => self.applications.as_deref(),
            ItemKind::Consumers => self.consumers.as_deref(),
        }
    }

    pub fn set(&mut self, kind: ItemKind, items: Vec<String>) {
        debug!(?kind, count = items.len(), "Catalog updated");
        let cached = Some(items);
        match kind {
            ItemKind::Services => self.services = cached,
            ItemKind::Applications => self.applications = cached,
            ItemKind::Consumers => self.consumers = cached,
        }
    }

    /// Filtered names of `kind`; empty if that list was never loaded
    pub fn filtered(&self, kind: ItemKind, filter: &str) -> Vec<&str> {
        self.get(kind).map(|items| filter_items(items, filter)).unwrap_or_default()
    }

    fn store(&mut self, kind: ItemKind, result: Result<Vec<String>, ApiError>) -> Result<usize, ApiError> {
        let items = result?;
        let count = items.len();
        self.set(kind, items);
        Ok(count)
    }

    pub async fn load_services(&mut self, client: &ApiClient) -> Result<usize, ApiError> {
        let result = client.services().await;
        self.store(ItemKind::Services, result)
    }

    pub async fn load_applications(&mut self, client: &ApiClient) -> Result<usize, ApiError> {
        let result = client.applications().await;
        self.store(ItemKind::Applications, result)
    }

    /// Applications from instance registration share the application slot
    pub async fn load_instance_applications(&mut self, client: &ApiClient) -> Result<usize, ApiError> {
        let result = client.instance_applications().await;
        self.store(ItemKind::Applications, result)
    }

    pub async fn load_consumers(&mut self, client: &ApiClient) -> Result<usize, ApiError> {
        let result = client.consumers().await;
        self.store(ItemKind::Consumers, result)
    }

    /// Load all three lists concurrently. Returns the failures; each list
    /// that loaded is stored regardless of the others.
    pub async fn load_all(&mut self, client: &ApiClient) -> Vec<ApiError> {
        let (services, applications, consumers) =
            futures::join!(client.services(), client.applications(), client.consumers());

        [
            self.store(ItemKind::Services, services),
            self.store(ItemKind::Applications, applications),
            self.store(ItemKind::Consumers, consumers),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect()
    }
}
