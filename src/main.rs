//! Ledger CLI
//!
//! Command-line client for the ledger backend:
//! - Register, log in and out
//! - Manage accounts, categories and transactions
//! - Dashboard totals and chart data

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm as Prompt, Password};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledger::model::{AccountId, CategoryId, NewUser, TransactionId};
use ledger::render::{self, OutputFormat, Table};
use ledger::views::{AccountForm, CategoryForm, TransactionForm};
use ledger::{
    AccountType, ApiError, App, Config, Confirm, DateFilter, LedgerApi, LoggingConfig, Route,
    TransactionType, ViewError,
};

#[derive(Parser)]
#[command(name = "ledger")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Personal finance tracker")]
#[command(long_about = "Ledger tracks accounts, categories and income/expense transactions.\nBalances and charts are computed from the transactions stored on the backend.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: user config dir, then ./ledger.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Answer yes to deletion prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Keep the session in memory for this run only
    #[arg(long, global = true)]
    pub ephemeral: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a user
    Register {
        email: String,
        username: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in and store the session token
    Login {
        username: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the session token
    Logout,

    /// Show session and backend settings
    Status,

    /// Balances and this month's totals
    Dashboard,

    /// Manage accounts
    Accounts {
        #[command(subcommand)]
        command: AccountCommands,
    },

    /// Show one account with its transactions
    Account { id: AccountId },

    /// Manage categories
    Categories {
        #[command(subcommand)]
        command: CategoryCommands,
    },

    /// Manage transactions of an account
    Transactions {
        #[command(subcommand)]
        command: TransactionCommands,
    },

    /// Expense breakdown and daily totals
    Charts {
        /// Account (default: first account)
        #[arg(short, long)]
        account: Option<AccountId>,
        /// Date filter (all, this-month, last-month, this-year)
        #[arg(long, default_value = "this-month")]
        filter: DateFilter,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// List accounts
    List,
    /// Create an account
    Add {
        name: String,
        /// Account type (checking, savings, credit)
        #[arg(short = 't', long = "type", default_value = "checking")]
        kind: AccountType,
    },
    /// Delete an account and all its transactions
    Delete { id: AccountId },
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories
    List,
    /// Create a category
    Add { name: String },
    /// Delete a category
    Delete { id: CategoryId },
}

#[derive(Subcommand)]
pub enum TransactionCommands {
    /// List transactions with totals
    List {
        #[arg(short, long)]
        account: AccountId,
        /// Date filter (default from config)
        #[arg(long)]
        filter: Option<DateFilter>,
    },
    /// Record a transaction
    Add {
        #[arg(short, long)]
        account: AccountId,
        #[arg(long)]
        amount: String,
        /// income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: TransactionType,
        /// Category name (default: first category)
        #[arg(short, long)]
        category: Option<String>,
        /// Date as YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Change a transaction; omitted fields keep their value
    Edit {
        id: TransactionId,
        #[arg(short, long)]
        account: AccountId,
        #[arg(long)]
        amount: Option<String>,
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionType>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a transaction
    Delete {
        id: TransactionId,
        #[arg(short, long)]
        account: AccountId,
    },
    /// Show one transaction
    Show { id: TransactionId },
}

/// Deletion confirmation on the terminal
struct TerminalConfirm {
    assume_yes: bool,
    theme: ColorfulTheme,
}

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        match Prompt::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
        {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "Confirmation prompt failed");
                false
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_unauthorized(&e) => {
            eprintln!("Session expired. Log in again with `ledger login <username>`.");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    Ok(config)
}

/// Logs go to stderr; `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("ledger={}", logging.level).into());
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn is_unauthorized(error: &anyhow::Error) -> bool {
    if let Some(e) = error.downcast_ref::<ViewError>() {
        return e.is_unauthorized();
    }
    if let Some(e) = error.downcast_ref::<ApiError>() {
        return e.is_unauthorized();
    }
    false
}

/// Refuse protected commands without a session
fn require_page(app: &App, route: Route) -> anyhow::Result<()> {
    let reached = app.open(route);
    if reached != route {
        bail!("Not logged in. Run `ledger login <username>` first.");
    }
    Ok(())
}

fn emit<T: serde::Serialize + ?Sized>(format: OutputFormat, table: &Table, value: &T) -> anyhow::Result<()> {
    print!("{}", render::render(format, table, value)?);
    Ok(())
}

fn password_or_prompt(password: Option<String>, confirm: bool) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    let theme = ColorfulTheme::default();
    let mut prompt = Password::with_theme(&theme).with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Repeat password", "Passwords do not match");
    }
    prompt.interact().context("Failed to read password")
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let format = cli.format;
    let confirm = TerminalConfirm {
        assume_yes: cli.yes,
        theme: ColorfulTheme::default(),
    };

    if let Commands::Config { output } = &cli.command {
        let content = ledger::config::generate_default_config();
        match output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, &content)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let app = App::init(config, cli.ephemeral)?;

    match cli.command {
        Commands::Config { .. } => {}

        Commands::Register {
            email,
            username,
            password,
        } => {
            if app.open(Route::Register) != Route::Register {
                bail!("Already logged in. Run `ledger logout` first.");
            }
            let password = password_or_prompt(password, true)?;
            let user = app
                .client
                .register(&NewUser {
                    email,
                    username,
                    password,
                })
                .await?;
            println!("Registered {} ({}). Log in with `ledger login {}`.", user.username, user.email, user.username);
        }

        Commands::Login { username, password } => {
            if app.open(Route::Login) != Route::Login {
                bail!("Already logged in. Run `ledger logout` first.");
            }
            let password = password_or_prompt(password, false)?;
            app.client.login(&username, &password).await?;
            app.open(Route::Dashboard);
            println!("Logged in as {}", username);
        }

        Commands::Logout => {
            app.client.logout()?;
            println!("Logged out");
        }

        Commands::Status => {
            let status = json!({
                "version": env!("CARGO_PKG_VERSION"),
                "api_url": app.config.api.base_url,
                "authenticated": app.session.is_authenticated(),
                "token_path": if cli.ephemeral { None } else { Some(app.config.session.token_path()) },
                "calendar": app.config.display.calendar,
                "today": app.clock.today(),
            });
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
                _ => {
                    println!("Ledger v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!("Backend:  {}", app.config.api.base_url);
                    println!(
                        "Session:  {}",
                        if app.session.is_authenticated() { "logged in" } else { "logged out" }
                    );
                    println!("Today:    {} ({:?})", app.clock.today(), app.config.display.calendar);
                }
            }
        }

        Commands::Dashboard => {
            require_page(&app, Route::Dashboard)?;
            let mut view = app.dashboard();
            view.load().await?;

            if view.is_empty() {
                println!("No accounts yet.");
                println!();
                println!("Create your first account with:");
                println!("  ledger accounts add \"Checking\"");
                return Ok(());
            }

            let balances = view.account_balances();
            let stats = view.stats().unwrap_or_default();
            let breakdown = view.category_breakdown();

            match format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "accounts": balances,
                        "stats": stats,
                        "expenses_by_category": breakdown
                            .iter()
                            .map(|(k, v)| (k.clone(), render::money(*v)))
                            .collect::<std::collections::BTreeMap<_, _>>(),
                    }))?
                ),
                OutputFormat::Csv => print!("{}", render::balances_table(&balances).to_csv()?),
                OutputFormat::Table => {
                    println!("Total balance:       {}", render::money(stats.total_balance));
                    println!("Income this month:   {}", render::money(stats.month_income));
                    println!("Expenses this month: {}", render::money(stats.month_expense));
                    println!();
                    print!("{}", render::balances_table(&balances).to_text());
                    if !breakdown.is_empty() {
                        println!();
                        print!("{}", render::breakdown_table(&breakdown).to_text());
                    }
                }
            }
        }

        Commands::Accounts { command } => {
            require_page(&app, Route::Accounts)?;
            let mut view = app.accounts();

            match command {
                AccountCommands::List => {
                    view.load().await?;
                    let accounts = view.accounts();
                    if accounts.is_empty() && format == OutputFormat::Table {
                        println!("No accounts yet.");
                    } else {
                        emit(format, &render::accounts_table(accounts), accounts)?;
                    }
                }
                AccountCommands::Add { name, kind } => {
                    let account = view.create(&AccountForm::new(name, kind)).await?;
                    println!("Created account {} ({})", account.name, account.id);
                }
                AccountCommands::Delete { id } => {
                    if view.delete(id, &confirm).await? {
                        println!("Deleted account {}", id);
                    } else {
                        println!("Cancelled");
                    }
                }
            }
        }

        Commands::Account { id } => {
            require_page(&app, Route::AccountDetail(id))?;
            let mut view = app.account_detail(id);
            if let Err(e) = view.load().await {
                if matches!(e, ViewError::AccountNotFound(_)) {
                    app.open(Route::Dashboard);
                }
                return Err(e.into());
            }
            let detail = match view.detail() {
                Some(detail) => detail,
                None => bail!("Account {} is not loaded", id),
            };

            match format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "account": detail.account,
                        "balance": render::money(detail.balance()),
                        "transactions": detail.transactions,
                    }))?
                ),
                OutputFormat::Csv => print!("{}", render::transactions_table(&detail.transactions).to_csv()?),
                OutputFormat::Table => {
                    println!("{} ({})", detail.account.name, detail.account.account_type);
                    println!("Balance: {}", render::money(detail.balance()));
                    println!();
                    if detail.transactions.is_empty() {
                        println!("No transactions yet.");
                    } else {
                        print!("{}", render::transactions_table(&detail.transactions).to_text());
                    }
                    let unknown = detail.unknown_categories();
                    if !unknown.is_empty() {
                        println!();
                        println!("Categories not in your list: {}", unknown.join(", "));
                    }
                }
            }
        }

        Commands::Categories { command } => {
            require_page(&app, Route::Categories)?;
            let mut view = app.categories();

            match command {
                CategoryCommands::List => {
                    view.load().await?;
                    let categories = view.categories();
                    emit(format, &render::categories_table(categories), categories)?;
                }
                CategoryCommands::Add { name } => {
                    let category = view.create(&CategoryForm::new(name)).await?;
                    println!("Created category {} ({})", category.name, category.id);
                }
                CategoryCommands::Delete { id } => {
                    if view.delete(id, &confirm).await? {
                        println!("Deleted category {}", id);
                    } else {
                        println!("Cancelled");
                    }
                }
            }
        }

        Commands::Transactions { command } => {
            require_page(&app, Route::Transactions)?;
            let mut view = app.transactions();

            match command {
                TransactionCommands::List { account, filter } => {
                    if let Some(filter) = filter {
                        view.set_filter(filter).await?;
                    }
                    view.select_account(account).await?;
                    let snapshot = match view.snapshot() {
                        Some(snapshot) => snapshot,
                        None => bail!("No transactions loaded"),
                    };

                    match format {
                        OutputFormat::Table => {
                            print!("{}", render::transactions_table(&snapshot.transactions).to_text());
                            println!();
                            print!("{}", render::summary_table(&snapshot.summary).to_text());
                        }
                        _ => emit(
                            format,
                            &render::transactions_table(&snapshot.transactions),
                            &snapshot.transactions,
                        )?,
                    }
                }
                TransactionCommands::Add {
                    account,
                    amount,
                    kind,
                    category,
                    date,
                    description,
                } => {
                    view.select_account(account).await?;
                    let defaults = view.new_form();
                    let form = TransactionForm {
                        transaction_type: kind,
                        amount,
                        category: category.unwrap_or(defaults.category),
                        date,
                        description: description.unwrap_or_default(),
                    };
                    let created = view.add(&form).await?;
                    println!(
                        "Recorded {} {} on {} ({})",
                        created.transaction_type,
                        render::money(created.amount),
                        created.date,
                        created.id
                    );
                }
                TransactionCommands::Edit {
                    id,
                    account,
                    amount,
                    kind,
                    category,
                    description,
                } => {
                    view.select_account(account).await?;
                    let mut edit = match view.fetch_edit(id).await? {
                        Some(edit) => edit,
                        None => bail!("Transaction {} not found in account {}", id, account),
                    };
                    if let Some(amount) = amount {
                        edit.amount = amount;
                    }
                    if let Some(kind) = kind {
                        edit.transaction_type = kind;
                    }
                    if let Some(category) = category {
                        edit.category = category;
                    }
                    if let Some(description) = description {
                        edit.description = description;
                    }
                    let updated = view.update(id, &edit).await?;
                    println!("Updated transaction {}", updated.id);
                }
                TransactionCommands::Delete { id, account } => {
                    view.select_account(account).await?;
                    if view.delete(id, &confirm).await? {
                        println!("Deleted transaction {}", id);
                    } else {
                        println!("Cancelled");
                    }
                }
                TransactionCommands::Show { id } => {
                    let transaction = app.client.get_transaction(id).await?;
                    let list = [transaction];
                    emit(format, &render::transactions_table(&list), &list[0])?;
                }
            }
        }

        Commands::Charts { account, filter } => {
            require_page(&app, Route::Charts)?;
            let mut view = app.charts();
            view.load().await?;
            if let Some(account) = account {
                view.select_account(account).await?;
            }
            if filter != view.filter() {
                view.set_filter(filter).await?;
            }

            let breakdown = view.category_breakdown();
            let series = view.daily_series();

            match format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "account_id": view.account_id(),
                        "filter": view.filter(),
                        "expenses_by_category": breakdown
                            .iter()
                            .map(|(k, v)| (k.clone(), render::money(*v)))
                            .collect::<std::collections::BTreeMap<_, _>>(),
                        "daily": series,
                    }))?
                ),
                OutputFormat::Csv => print!("{}", render::daily_table(&series).to_csv()?),
                OutputFormat::Table => {
                    if view.account_id().is_none() {
                        println!("No accounts yet.");
                        return Ok(());
                    }
                    if breakdown.is_empty() {
                        println!("No expenses for {}", view.filter());
                    } else {
                        print!("{}", render::breakdown_table(&breakdown).to_text());
                    }
                    println!();
                    if series.is_empty() {
                        println!("No transactions for {}", view.filter());
                    } else {
                        print!("{}", render::daily_table(&series).to_text());
                    }
                }
            }
        }
    }

    Ok(())
}
