//! Console state and command handlers.
//!
//! `App` wires the credential store, API client and navigation guard
//! together once per run. Every page-level command first asks the guard
//! whether it may open its page; without a session token it lands on the
//! login page instead and the command does nothing else.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use dubbo_console_core::{
    ApiClient, ApiError, AuthState, Config, CredentialStore, FileStorage, ItemCatalog, ItemKind,
    KeyringStorage, NavigationGuard, Notification, Notifier, RuleKind, RuleQuery,
    Severity, StorageBackend,
};

use crate::ui::{TerminalNavigator, TerminalNotifier};

// ============================================================================
// Pages
// ============================================================================

pub const SERVICE_SEARCH_PAGE: &str = "/service";
pub const SERVICE_DETAIL_PAGE: &str = "/serviceDetail";

/// Maximum length accepted for a typed username
const MAX_USERNAME_LENGTH: usize = 64;

pub fn rule_page(kind: RuleKind) -> &'static str {
    match kind {
        RuleKind::ConditionRoute => "/governance/routingRule",
        RuleKind::TagRoute => "/governance/tagRule",
        RuleKind::Override => "/governance/config",
        RuleKind::Access => "/governance/access",
        RuleKind::Weight => "/governance/weight",
        RuleKind::Balancing => "/governance/loadbalance",
    }
}

fn open_credentials(config: &Config) -> Result<CredentialStore> {
    let store = match config.storage {
        StorageBackend::Keyring => CredentialStore::new(KeyringStorage::new()),
        StorageBackend::File => {
            let data_dir = config.data_dir()?;
            CredentialStore::new(FileStorage::new(&data_dir))
        }
    };
    Ok(store)
}

pub struct App {
    credentials: Arc<CredentialStore>,
    client: ApiClient,
    guard: NavigationGuard,
    navigator: TerminalNavigator,
    notifier: Arc<TerminalNotifier>,
    catalog: ItemCatalog,
}

impl App {
    pub fn new(config: &Config, color: bool) -> Result<Self> {
        let credentials = Arc::new(open_credentials(config)?);
        Self::with_credentials(config, credentials, color)
    }

    pub fn with_credentials(config: &Config, credentials: Arc<CredentialStore>, color: bool) -> Result<Self> {
        let notifier = Arc::new(TerminalNotifier::new(color));
        let client = ApiClient::new(config, Arc::clone(&credentials), notifier.clone())
            .context("Failed to build HTTP client")?;
        let guard = NavigationGuard::with_login_path(Arc::clone(&credentials), &config.login_path);

        Ok(Self {
            credentials,
            client,
            guard,
            navigator: TerminalNavigator::new(),
            notifier,
            catalog: ItemCatalog::new(),
        })
    }

    pub fn current_page(&self) -> &str {
        self.navigator.current()
    }

    /// Try to open `page`. Returns false when the guard sent us to login.
    pub fn enter(&mut self, page: &str) -> bool {
        let from = self.navigator.current().to_string();
        let decision = self.guard.navigate(&mut self.navigator, &from, page);
        if decision.is_redirect() {
            eprintln!(
                "Not logged in - redirected to {}. Run `dubbo-console login --redirect {}` first.",
                self.guard.login_path(),
                page
            );
            return false;
        }
        debug!(page, "Entered page");
        true
    }

    // ===== Session =====

    pub async fn login(
        &mut self,
        username: Option<String>,
        password: Option<String>,
        redirect: Option<String>,
    ) -> Result<()> {
        let login_path = self.guard.login_path().to_string();
        self.enter(&login_path);

        let username = match username {
            Some(name) => name,
            None => prompt_username(&self.credentials.get_username())?,
        };
        let password = match password {
            Some(password) => password,
            None => rpassword::prompt_password("Password: ").context("Failed to read password")?,
        };

        match self.client.login(&username, &password).await {
            Ok(_) => {
                self.notifier.notify(Notification::success("Login successful!", ""));
                let target = self.guard.post_login_target(redirect.as_deref()).to_string();
                self.enter(&target);
                println!("Logged in as {} - now at {}", username, self.current_page());
                Ok(())
            }
            Err(ApiError::LoginRejected) => {
                self.notifier.notify(Notification::error(
                    "Login failed, please try again!",
                    "The registry did not accept this user name and password.",
                ));
                Err(ApiError::LoginRejected.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn logout(&mut self) -> Result<()> {
        if self.credentials.auth_state() == AuthState::Unauthenticated {
            println!("Not logged in");
            return Ok(());
        }
        let result = self.client.logout().await;
        let login_path = self.guard.login_path().to_string();
        self.enter(&login_path);
        result?;
        println!("Logged out");
        Ok(())
    }

    pub fn whoami(&self) {
        match self.credentials.auth_state() {
            AuthState::Authenticated => {
                let username = self.credentials.get_username();
                if username.is_empty() {
                    println!("Logged in (user name unknown)");
                } else {
                    println!("Logged in as {}", username);
                }
            }
            AuthState::Unauthenticated => println!("Not logged in"),
        }
    }

    // ===== Listings =====

    pub async fn list(&mut self, kind: ItemKind, filter: &str) -> Result<()> {
        if !self.enter(SERVICE_SEARCH_PAGE) {
            return Ok(());
        }
        match kind {
            ItemKind::Services => self.catalog.load_services(&self.client).await?,
            ItemKind::Applications => self.catalog.load_applications(&self.client).await?,
            ItemKind::Consumers => self.catalog.load_consumers(&self.client).await?,
        };
        self.print_items(kind, filter);
        Ok(())
    }

    /// Applications registered at instance level rather than per interface
    pub async fn list_instance_applications(&mut self, filter: &str) -> Result<()> {
        if !self.enter(SERVICE_SEARCH_PAGE) {
            return Ok(());
        }
        self.catalog.load_instance_applications(&self.client).await?;
        self.print_items(ItemKind::Applications, filter);
        Ok(())
    }

    /// Names of every kind matching `filter`, loaded together. Lists that
    /// fail to load were already notified and are skipped.
    pub async fn suggest(&mut self, filter: &str) -> Result<()> {
        if !self.enter(SERVICE_SEARCH_PAGE) {
            return Ok(());
        }
        let mut failures = self.catalog.load_all(&self.client).await;
        if failures.len() == ItemKind::ALL.len() {
            return Err(failures.remove(0).into());
        }
        for kind in ItemKind::ALL {
            for item in self.catalog.filtered(kind, filter) {
                println!("{:<14} {}", kind.label(), item);
            }
        }
        Ok(())
    }

    fn print_items(&self, kind: ItemKind, filter: &str) {
        let items = self.catalog.filtered(kind, filter);
        for item in &items {
            println!("{}", item);
        }
        info!(?kind, shown = items.len(), "Listed items");
    }

    pub async fn search(&mut self, pattern: &str, filter: &str) -> Result<()> {
        if !self.enter(SERVICE_SEARCH_PAGE) {
            return Ok(());
        }
        let found = self.client.search_services(pattern, filter).await?;
        for service in &found {
            println!(
                "{:<60} {}",
                service.key(),
                service.app_name.as_deref().unwrap_or("-")
            );
        }
        Ok(())
    }

    pub async fn detail(&mut self, service: &str) -> Result<()> {
        if !self.enter(SERVICE_DETAIL_PAGE) {
            return Ok(());
        }
        let detail = self.client.service_detail(service).await?;
        println!("{}", serde_json::to_string_pretty(&detail)?);
        Ok(())
    }

    // ===== Rules =====

    pub async fn list_rules(&mut self, kind: RuleKind, query: &RuleQuery) -> Result<()> {
        if !self.enter(rule_page(kind)) {
            return Ok(());
        }
        if query.is_empty() {
            anyhow::bail!("Either --application or --service is required");
        }
        let rules = self.client.list_rules(kind, query).await?;
        println!("{}", serde_json::to_string_pretty(&rules)?);
        Ok(())
    }

    pub async fn show_rule(&mut self, kind: RuleKind, id: &str) -> Result<()> {
        if !self.enter(rule_page(kind)) {
            return Ok(());
        }
        let rule = self.client.rule_detail(kind, id).await?;
        println!("{}", serde_json::to_string_pretty(&rule)?);
        Ok(())
    }

    pub async fn create_rule(&mut self, kind: RuleKind, file: &Path) -> Result<()> {
        if !self.enter(rule_page(kind)) {
            return Ok(());
        }
        let rule = read_rule_file(file)?;
        let created = self.client.create_rule(kind, &rule).await?;
        self.report(created, &format!("Created {} rule", kind));
        Ok(())
    }

    pub async fn update_rule(&mut self, kind: RuleKind, id: &str, file: &Path) -> Result<()> {
        if !self.enter(rule_page(kind)) {
            return Ok(());
        }
        let rule = read_rule_file(file)?;
        let updated = self.client.update_rule(kind, id, &rule).await?;
        self.report(updated, &format!("Updated {} rule {}", kind, id));
        Ok(())
    }

    pub async fn delete_rule(&mut self, kind: RuleKind, id: &str) -> Result<()> {
        if !self.enter(rule_page(kind)) {
            return Ok(());
        }
        let deleted = self.client.delete_rule(kind, id).await?;
        self.report(deleted, &format!("Deleted {} rule {}", kind, id));
        Ok(())
    }

    pub async fn toggle_rule(&mut self, kind: RuleKind, id: &str, enable: bool) -> Result<()> {
        if !kind.can_toggle() {
            anyhow::bail!("{} rules cannot be enabled or disabled", kind);
        }
        if !self.enter(rule_page(kind)) {
            return Ok(());
        }
        let done = if enable {
            self.client.enable_rule(kind, id).await?
        } else {
            self.client.disable_rule(kind, id).await?
        };
        let verb = if enable { "Enabled" } else { "Disabled" };
        self.report(done, &format!("{} {} rule {}", verb, kind, id));
        Ok(())
    }

    /// Open an arbitrary page and say where we ended up
    pub fn open(&mut self, page: &str) {
        if self.enter(page) {
            println!("{}", self.current_page());
        }
    }

    fn report(&self, accepted: bool, what: &str) {
        if accepted {
            self.notifier.notify(Notification::success(what, ""));
        } else {
            self.notifier.notify(Notification::new(
                what,
                "The registry reported no change.",
                Severity::Warning,
            ));
        }
    }
}

fn read_rule_file(file: &Path) -> Result<serde_json::Value> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read rule file {}", file.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Rule file {} is not valid JSON", file.display()))
}

/// Username input is printable and bounded
pub fn is_valid_username(name: &str) -> bool {
    !name.is_empty() && name.chars().count() <= MAX_USERNAME_LENGTH && !name.chars().any(char::is_control)
}

fn prompt_username(last: &str) -> Result<String> {
    if last.is_empty() {
        print!("Username: ");
    } else {
        print!("Username [{}]: ", last);
    }
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).context("Failed to read username")?;
    let typed = line.trim();
    let name = if typed.is_empty() { last } else { typed };

    if !is_valid_username(name) {
        anyhow::bail!("Invalid username");
    }
    Ok(name.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use dubbo_console_core::MemoryStorage;

    use super::*;

    fn app_with_token(token: Option<&str>) -> App {
        let credentials = Arc::new(CredentialStore::new(MemoryStorage::new()));
        if let Some(token) = token {
            credentials.set_token(token).unwrap();
        }
        App::with_credentials(&Config::default(), credentials, false).unwrap()
    }

    #[test]
    fn test_enter_without_token_lands_on_login() {
        let mut app = app_with_token(None);
        assert!(!app.enter(SERVICE_SEARCH_PAGE));
        assert_eq!(app.current_page(), "/login");
    }

    #[test]
    fn test_enter_login_without_token() {
        let mut app = app_with_token(None);
        assert!(app.enter("/login"));
        assert_eq!(app.current_page(), "/login");
    }

    #[test]
    fn test_enter_with_token() {
        let mut app = app_with_token(Some("abc"));
        assert!(app.enter(rule_page(RuleKind::TagRoute)));
        assert_eq!(app.current_page(), "/governance/tagRule");
    }

    #[test]
    fn test_file_storage_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let credentials = CredentialStore::new(FileStorage::new(dir.path()));
        credentials.set_token("abc").unwrap();

        let app = App::with_credentials(&Config::default(), Arc::new(credentials), false).unwrap();
        assert_eq!(app.credentials.auth_state(), AuthState::Authenticated);
    }

    #[test]
    fn test_is_valid_username() {
        assert!(is_valid_username("root"));
        assert!(is_valid_username("ops@example.com"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("bad\nname"));
        assert!(!is_valid_username(&"a".repeat(MAX_USERNAME_LENGTH + 1)));
    }

    #[tokio::test]
    async fn test_toggle_unsupported_kind_fails_before_request() {
        let mut app = app_with_token(Some("abc"));
        let result = app.toggle_rule(RuleKind::Weight, "a.B", true).await;
        assert!(result.is_err());
        assert_eq!(app.current_page(), "/");
    }

    #[tokio::test]
    async fn test_suggest_without_token_makes_no_request() -> Result<()> {
        let config = Config {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let credentials = Arc::new(CredentialStore::new(MemoryStorage::new()));
        let mut app = App::with_credentials(&config, credentials, false)?;

        app.suggest("demo").await?;
        assert_eq!(app.current_page(), "/login");
        Ok(())
    }

    #[tokio::test]
    async fn test_suggest_fails_when_nothing_loads() -> Result<()> {
        // Nothing listens here, so all three lists fail
        let config = Config {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let credentials = Arc::new(CredentialStore::new(MemoryStorage::new()));
        credentials.set_token("abc")?;
        let mut app = App::with_credentials(&config, credentials, false)?;

        let err = app.suggest("demo").await.unwrap_err();
        assert!(err.downcast_ref::<ApiError>().is_some_and(ApiError::is_network));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_without_token_makes_no_request() -> Result<()> {
        // Base URL points nowhere; reaching the network would fail the test
        let config = Config {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let credentials = Arc::new(CredentialStore::new(MemoryStorage::new()));
        let mut app = App::with_credentials(&config, credentials, false)?;

        app.list(ItemKind::Services, "").await?;
        assert_eq!(app.current_page(), "/login");
        Ok(())
    }
}
