use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use gudang_api::{
    auth::UserProfile,
    config::{self, AppConfig},
    db::{self, DbPool},
    events::{Event, EventSender},
    models::UserRole,
    services::users::{NewUser, UserService},
};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize().await?;

    match cli.command {
        Commands::Migrate => {
            db::run_migrations(&context.db)
                .await
                .context("failed to run migrations")?;
            println!("Migrations applied");
        }
        Commands::CreateUser(args) => handle_create_user(&context, args, cli.json).await?,
        Commands::ListUsers => handle_list_users(&context, cli.json).await?,
        Commands::ResetPassword(args) => {
            context
                .users()
                .reset_password(args.id, &args.password)
                .await
                .context("failed to reset password")?;
            println!("Password reset for {}", args.id);
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "gudang-admin",
    about = "Administrative tasks for the gudang-api database",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,
    /// Create an account (admin_gudang by default)
    CreateUser(CreateUserArgs),
    /// List all accounts, newest first
    ListUsers,
    /// Set a new password for an account
    ResetPassword(ResetPasswordArgs),
}

#[derive(Args)]
struct CreateUserArgs {
    #[arg(long, help = "Email address used to log in")]
    email: String,
    #[arg(long, help = "Display name")]
    name: String,
    #[arg(long, help = "Initial password (min. 6 characters)")]
    password: String,
    #[arg(
        long,
        default_value = "admin_gudang",
        value_parser = parse_role,
        help = "One of staff, verifikator, admin_gudang"
    )]
    role: UserRole,
}

#[derive(Args)]
struct ResetPasswordArgs {
    #[arg(long, value_parser = clap::value_parser!(Uuid), help = "Account identifier (UUID)")]
    id: Uuid,
    #[arg(long, help = "New password (min. 6 characters)")]
    password: String,
}

fn parse_role(raw: &str) -> Result<UserRole, String> {
    raw.parse::<UserRole>().map_err(|e| e.to_string())
}

async fn handle_create_user(context: &CliContext, args: CreateUserArgs, json: bool) -> Result<()> {
    let user = context
        .users()
        .create(NewUser {
            email: args.email,
            name: args.name,
            password: args.password,
            role: Some(args.role),
        })
        .await
        .context("failed to create user")?;

    if json {
        print_json(&user)?;
    } else {
        render_user(&user);
    }
    Ok(())
}

async fn handle_list_users(context: &CliContext, json: bool) -> Result<()> {
    let users = context.users().list().await.context("failed to list users")?;
    if json {
        print_json(&users)?;
    } else if users.is_empty() {
        println!("No accounts");
    } else {
        users.iter().for_each(render_user);
    }
    Ok(())
}

struct CliContext {
    _config: AppConfig,
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;

        let (event_tx, mut event_rx) = mpsc::channel::<Event>(32);
        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                debug!(target: "gudang_admin", event = event.name(), "received async event");
            }
        });

        Ok(Self {
            _config: config,
            db: Arc::new(db_pool),
            event_sender: Arc::new(EventSender::new(event_tx)),
        })
    }

    fn users(&self) -> UserService {
        UserService::new(self.db.clone(), self.event_sender.clone())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_user(user: &UserProfile) {
    println!(
        "- {} • {} <{}> • {} • {}",
        user.id,
        user.name,
        user.email,
        user.role.label(),
        if user.active { "aktif" } else { "nonaktif" }
    );
}
