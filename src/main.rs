// Command-line front end for the trek marketplace client

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use trek_client::api::{BookingQuery, Page, Trek, TrekQuery};
use trek_client::auth::{Notification, NotificationLevel, Notifier, RegisterRequest, Role};
use trek_client::store::FileStorage;
use trek_client::{ClientConfig, SessionState, TrekClient};

#[derive(Parser)]
#[command(name = "trek-client")]
#[command(about = "Sign in to the trek marketplace and browse treks and bookings", version)]
struct Cli {
    /// Backend base URL, e.g. http://localhost:5000/api
    #[arg(long, global = true, env = "TREK_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TREK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "TREK_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        phone: Option<String>,
        /// Register as a trek vendor instead of a customer
        #[arg(long)]
        vendor: bool,
    },
    /// Show the signed-in user
    Whoami,
    /// Sign out and forget the stored session
    Logout,
    /// Browse the trek catalogue
    Treks {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one trek
    Trek { id: String },
    /// List your bookings
    Bookings,
}

/// Prints notifications to stderr so stdout stays machine-readable
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let prefix = match notification.level {
            NotificationLevel::Success => "✓",
            NotificationLevel::Info => "i",
            NotificationLevel::Error => "✗",
        };
        eprintln!("{} {}", prefix, notification.message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let api_url = cli.api_url.clone();
    let config = ClientConfig::from_lookup(|key| match key {
        "TREK_API_URL" => api_url.clone(),
        _ => std::env::var(key).ok(),
    })
    .context("Invalid client configuration")?;

    let client = TrekClient::with_parts(
        &config,
        Arc::new(FileStorage::new(config.session_file.clone())),
        Arc::new(ConsoleNotifier),
    )
    .context("Failed to build HTTP client")?;

    run(cli.command, &client).await
}

async fn run(command: Command, client: &TrekClient) -> Result<()> {
    let session = &client.session;

    match command {
        Command::Login { email, password } => {
            let outcome = session.login(&email, &password).await?;
            println!("Signed in as {} ({})", outcome.session.display_name(), outcome.session.role());
            println!("Continue at {}", outcome.redirect_to);
        }
        Command::Register {
            name,
            email,
            password,
            phone,
            vendor,
        } => {
            let request = RegisterRequest {
                name,
                email,
                password,
                phone,
                role: Some(if vendor { Role::Vendor } else { Role::Customer }),
            };
            let outcome = session.register(request).await?;
            println!("Registered {} ({})", outcome.session.display_name(), outcome.session.role());
            println!("Continue at {}", outcome.redirect_to);
        }
        Command::Whoami => match session.initialize().await {
            SessionState::Authenticated(current) => {
                println!("{}", serde_json::to_string_pretty(&current.user)?);
            }
            _ => bail!("Not signed in"),
        },
        Command::Logout => {
            session.initialize().await;
            session.logout().await;
        }
        Command::Treks {
            search,
            location,
            page,
            limit,
        } => {
            session.initialize().await;
            let query = TrekQuery {
                search,
                location,
                page,
                limit,
                ..Default::default()
            };
            let treks = client.treks.list(&query).await?;
            print_treks(&treks);
        }
        Command::Trek { id } => {
            session.initialize().await;
            let trek = client.treks.get(&id).await?;
            println!("{}", serde_json::to_string_pretty(&trek)?);
        }
        Command::Bookings => {
            if !session.initialize().await.is_authenticated() {
                bail!("Sign in first with `trek-client login`");
            }
            let bookings = client.bookings.mine(&BookingQuery::default()).await?;
            for booking in &bookings.items {
                println!(
                    "{}  {:<10} {:>3} pax  {:>10}  {}",
                    booking.id,
                    booking.status.as_str(),
                    booking.participants,
                    booking.total_amount.to_string(),
                    booking.trek_title().unwrap_or("-")
                );
            }
            if bookings.is_empty() {
                println!("No bookings yet");
            }
        }
    }

    Ok(())
}

fn print_treks(treks: &Page<Trek>) {
    for trek in &treks.items {
        println!(
            "{}  {:<40} {:>10}  {}",
            trek.id,
            trek.title,
            trek.price.to_string(),
            trek.location_name().unwrap_or("-")
        );
    }
    match treks.pagination {
        Some(p) => println!("Page {} of {} ({} treks)", p.page, p.pages, p.total),
        None if treks.is_empty() => println!("No treks found"),
        None => {}
    }
}
