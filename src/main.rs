use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use skycast_core::{AppError, TemperatureUnit, WindSpeedUnit};
use skycast_services::{DeleteOutcome, FetchOutcome, ProfileUpdate, RegisterForm};
use std::path::PathBuf;

mod app;
mod terminal;

use app::App;

#[derive(Parser)]
#[command(name = "skycast", version, about = "Weather lookups backed by the SkyCast service")]
struct Cli {
    /// Path to an alternative config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Do not ask before destructive actions
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SKYCAST_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the saved session
    Logout,
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, value_enum, default_value_t = TemperatureArg::C)]
        temperature: TemperatureArg,
        #[arg(long, value_enum, default_value_t = WindArg::Kmh)]
        wind: WindArg,
    },
    /// Current conditions and forecast for a city
    Weather {
        city: String,
        /// Hourly points to show
        #[arg(long)]
        hours: Option<usize>,
        /// Days to show
        #[arg(long)]
        days: Option<usize>,
    },
    /// Past searches
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Display name and unit preferences
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Permanently erase the account and its data
    DeleteAccount,
    /// Service administration
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    List,
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum ProfileAction {
    Show,
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_enum)]
        temperature: Option<TemperatureArg>,
        #[arg(long, value_enum)]
        wind: Option<WindArg>,
        /// Prompt for a new password
        #[arg(long)]
        change_password: bool,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Usage statistics
    Dashboard,
    /// Request log, one page at a time
    Logs {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Drop cached weather, for one city or all
    ClearCache {
        #[arg(long)]
        city: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TemperatureArg {
    C,
    F,
}

impl From<TemperatureArg> for TemperatureUnit {
    fn from(arg: TemperatureArg) -> Self {
        match arg {
            TemperatureArg::C => TemperatureUnit::Celsius,
            TemperatureArg::F => TemperatureUnit::Fahrenheit,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum WindArg {
    Kmh,
    Knots,
}

impl From<WindArg> for WindSpeedUnit {
    fn from(arg: WindArg) -> Self {
        match arg {
            WindArg::Kmh => WindSpeedUnit::KmPerHour,
            WindArg::Knots => WindSpeedUnit::Knots,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    skycast_core::init()?;

    let cli = Cli::parse();
    let app = App::new(cli.config.as_deref(), cli.yes)?;
    tracing::debug!("Config directory: {}", app.config().config_dir.display());

    if let Err(e) = run(&app, cli.command).await {
        tracing::debug!("Command failed: {:?}", e);
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

async fn run(app: &App, command: Command) -> std::result::Result<(), AppError> {
    match command {
        Command::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => secret("Password: ")?,
            };
            app.account().login(&email, &password).await?;
        }
        Command::Logout => {
            app.account().logout()?;
            println!("Signed out");
        }
        Command::Register {
            email,
            name,
            temperature,
            wind,
        } => {
            let form = RegisterForm {
                email,
                display_name: name,
                password: secret("Password: ")?,
                confirm_password: secret("Confirm password: ")?,
                temperature_unit: temperature.into(),
                wind_speed_unit: wind.into(),
            };
            let message = app.account().register(&form).await?;
            println!("{}", message);
        }
        Command::Weather { city, hours, days } => {
            let view = app.weather(hours, days);
            if let FetchOutcome::Applied(_) = view.fetch_weather(&city).await? {
                if let Some(display) = view.display() {
                    terminal::print_weather(&display);
                }
            }
        }
        Command::History { action } => {
            let history = app.history();
            let entries = history.refresh().await?;
            match action {
                HistoryAction::List => terminal::print_history(&entries),
                HistoryAction::Delete { id } => match history.delete_entry(id).await? {
                    DeleteOutcome::Deleted => terminal::print_history(&history.entries()),
                    DeleteOutcome::Cancelled => println!("Nothing deleted"),
                },
            }
        }
        Command::Profile { action } => {
            let account = app.account();
            let current = account.profile().await?;
            match action {
                ProfileAction::Show => terminal::print_profile(&current),
                ProfileAction::Update {
                    name,
                    temperature,
                    wind,
                    change_password,
                } => {
                    let (password, confirm_password) = if change_password {
                        (secret("New password: ")?, secret("Confirm password: ")?)
                    } else {
                        (String::new(), String::new())
                    };
                    let update = ProfileUpdate {
                        display_name: name.unwrap_or(current.display_name),
                        password,
                        confirm_password,
                        temperature_unit: temperature
                            .map(Into::into)
                            .unwrap_or(current.temperature_unit),
                        wind_speed_unit: wind.map(Into::into).unwrap_or(current.wind_speed_unit),
                    };
                    let updated = account.update_profile(&update).await?;
                    terminal::print_profile(&updated);
                }
            }
        }
        Command::DeleteAccount => {
            if app.account().delete_account().await? {
                println!("Account deleted");
            }
        }
        Command::Admin { action } => {
            let admin = app.admin();
            if !admin.enter().await? {
                return Ok(());
            }
            match action {
                AdminAction::Dashboard => {
                    let dashboard = admin.load_dashboard().await?;
                    terminal::print_dashboard(&dashboard);
                }
                AdminAction::Logs { page } => {
                    let dashboard = admin.load_dashboard().await?;
                    terminal::print_logs_page(&dashboard, page);
                }
                AdminAction::ClearCache { city: Some(city) } => {
                    admin.clear_city_cache(&city).await?;
                    println!("Cache cleared for {}", city.trim());
                }
                AdminAction::ClearCache { city: None } => {
                    admin.clear_cache().await?;
                    println!("Cache cleared");
                }
            }
        }
    }

    Ok(())
}

fn secret(label: &str) -> std::result::Result<String, AppError> {
    Ok(terminal::read_password(label)?)
}
