//! dubbo-console - a terminal console for a Dubbo service registry.
//!
//! Log in once, then browse services, applications and consumers, and
//! manage governance rules. The session token is kept between runs; any
//! command that needs it sends you to login when it is missing.

mod app;
mod ui;

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dubbo_console_core::{Config, ItemKind, RuleKind, RuleQuery, StorageBackend};

use app::App;

/// Log file name prefix in the data directory's `logs/` folder
const LOG_FILE_PREFIX: &str = "dubbo-console.log";

#[derive(Parser)]
#[command(name = "dubbo-console")]
#[command(about = "Terminal console for a Dubbo service registry")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
struct Cli {
    /// Registry admin base URL (overrides config and DUBBO_CONSOLE_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Backend environment segment in API paths
    #[arg(long, global = true)]
    env: Option<String>,

    /// Where to keep credentials: file or keyring
    #[arg(long, global = true)]
    storage: Option<StorageBackend>,

    /// Disable coloured output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session token
    Login {
        #[arg(short, long)]
        username: Option<String>,
        /// Password; prompted for when omitted
        #[arg(short, long, env = "DUBBO_CONSOLE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Page to open after logging in
        #[arg(long)]
        redirect: Option<String>,
    },
    /// Log out and forget the session token
    Logout,
    /// Show who is logged in
    Whoami,
    /// List service names
    Services {
        /// Case-insensitive substring filter
        filter: Option<String>,
    },
    /// List application names
    Applications {
        filter: Option<String>,
        /// Applications from instance-level registration
        #[arg(long)]
        instance: bool,
    },
    /// List consumer names
    Consumers { filter: Option<String> },
    /// Matching service, application and consumer names together
    Suggest {
        #[arg(default_value = "")]
        filter: String,
    },
    /// Search services by service name, application or ip
    Search {
        /// What the filter matches: service, application or ip
        #[arg(short, long, default_value = "service")]
        pattern: String,
        filter: String,
    },
    /// Show providers and consumers of a service
    Detail { service: String },
    /// Manage governance rules
    Rules {
        #[command(subcommand)]
        action: RuleAction,
    },
    /// Navigate to a console page
    Open { page: String },
}

#[derive(Args)]
struct RuleTarget {
    /// condition-route, tag-route, override, access, weight, balancing
    kind: RuleKind,
}

#[derive(Subcommand)]
enum RuleAction {
    List {
        #[command(flatten)]
        target: RuleTarget,
        #[arg(long)]
        application: Option<String>,
        #[arg(long)]
        service: Option<String>,
        #[arg(long)]
        service_version: Option<String>,
        #[arg(long)]
        service_group: Option<String>,
    },
    Show {
        #[command(flatten)]
        target: RuleTarget,
        id: String,
    },
    Create {
        #[command(flatten)]
        target: RuleTarget,
        /// JSON file with the rule body
        file: PathBuf,
    },
    Update {
        #[command(flatten)]
        target: RuleTarget,
        id: String,
        file: PathBuf,
    },
    Delete {
        #[command(flatten)]
        target: RuleTarget,
        id: String,
    },
    Enable {
        #[command(flatten)]
        target: RuleTarget,
        id: String,
    },
    Disable {
        #[command(flatten)]
        target: RuleTarget,
        id: String,
    },
}

/// Initialize the tracing subscriber for logging.
/// RUST_LOG controls the level (e.g. RUST_LOG=debug); stderr gets the
/// filtered output and a daily log file in the data directory gets the same.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = config.data_dir().ok().map(|dir| {
        let appender = tracing_appender::rolling::daily(dir.join("logs"), LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (fmt::layer().with_writer(writer).with_ansi(false), guard)
    });
    let (file_layer, guard) = match file_layer {
        Some((layer, guard)) => (Some(layer), Some(guard)),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(ref base_url) = cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(ref env) = cli.env {
        config.env = env.clone();
    }
    if let Some(storage) = cli.storage {
        config.storage = storage;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let _log_guard = init_tracing(&config);
    info!(base_url = %config.base_url, env = %config.env, "dubbo-console starting");

    let color = !cli.no_color && io::stderr().is_terminal();
    let mut app = App::new(&config, color)?;

    match cli.command {
        Command::Login {
            username,
            password,
            redirect,
        } => app.login(username, password, redirect).await,
        Command::Logout => app.logout().await,
        Command::Whoami => {
            app.whoami();
            Ok(())
        }
        Command::Services { filter } => app.list(ItemKind::Services, filter.as_deref().unwrap_or("")).await,
        Command::Applications { filter, instance } => {
            let filter = filter.as_deref().unwrap_or("");
            if instance {
                app.list_instance_applications(filter).await
            } else {
                app.list(ItemKind::Applications, filter).await
            }
        }
        Command::Consumers { filter } => app.list(ItemKind::Consumers, filter.as_deref().unwrap_or("")).await,
        Command::Suggest { filter } => app.suggest(&filter).await,
        Command::Search { pattern, filter } => app.search(&pattern, &filter).await,
        Command::Detail { service } => app.detail(&service).await,
        Command::Rules { action } => run_rule_action(&mut app, action).await,
        Command::Open { page } => {
            app.open(&page);
            Ok(())
        }
    }
}

async fn run_rule_action(app: &mut App, action: RuleAction) -> Result<()> {
    match action {
        RuleAction::List {
            target,
            application,
            service,
            service_version,
            service_group,
        } => {
            let query = RuleQuery {
                application,
                service,
                service_version,
                service_group,
            };
            app.list_rules(target.kind, &query).await
        }
        RuleAction::Show { target, id } => app.show_rule(target.kind, &id).await,
        RuleAction::Create { target, file } => app.create_rule(target.kind, &file).await,
        RuleAction::Update { target, id, file } => app.update_rule(target.kind, &id, &file).await,
        RuleAction::Delete { target, id } => app.delete_rule(target.kind, &id).await,
        RuleAction::Enable { target, id } => app.toggle_rule(target.kind, &id, true).await,
        RuleAction::Disable { target, id } => app.toggle_rule(target.kind, &id, false).await,
    }
}
