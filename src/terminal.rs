//! Terminal front-end: navigation hints, confirmation prompts and rendering.

use skycast_auth::{Confirmer, Navigator, Route};
use skycast_core::UserPreferences;
use skycast_services::{AdminDashboard, HistoryEntry};
use skycast_weather::WeatherDisplay;
use std::io::{self, BufRead, Write};

/// Translates route changes into hints for the next command to run.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        match route {
            Route::Login => eprintln!("Please log in: skycast login --email <email>"),
            Route::Dashboard => eprintln!("Signed in. Try: skycast weather <city>"),
        }
    }
}

/// Asks on stdin; anything other than `y`/`yes` declines.
pub struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        match read_line(&format!("{} [y/N] ", prompt)) {
            Ok(answer) => matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                tracing::warn!("Could not read confirmation: {}", e);
                false
            }
        }
    }
}

/// Print `prompt` and read one trimmed line from stdin.
pub fn read_line(prompt: &str) -> io::Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{}", prompt)?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Read a password without echoing it to the terminal.
pub fn read_password(prompt: &str) -> io::Result<String> {
    rpassword::prompt_password(prompt)
}

pub fn print_weather(display: &WeatherDisplay) {
    println!("{}", display.city);
    println!(
        "  {:.1}{}  humidity {:.0}%  wind {:.1} {}",
        display.temperature,
        display.temperature_symbol,
        display.humidity,
        display.wind_speed,
        display.wind_symbol
    );
    println!(
        "  retrieved {}  valid until {}",
        display.retrieved_at.format("%Y-%m-%d %H:%M UTC"),
        display.valid_until.format("%H:%M UTC")
    );

    if !display.hourly.is_empty() {
        println!("\nHourly");
        for point in &display.hourly {
            println!(
                "  {}  {:>6.1}{}  {:>3.0}%  {:>5.1} {} {}",
                point.time.format("%a %H:%M"),
                point.temperature,
                display.temperature_symbol,
                point.humidity,
                point.wind_speed,
                display.wind_symbol,
                point.wind_direction.unwrap_or("")
            );
        }
    }

    if !display.daily.is_empty() {
        println!("\nDaily");
        for point in &display.daily {
            let rain = point
                .precipitation_probability
                .map(|p| format!("  rain {:.0}%", p))
                .unwrap_or_default();
            println!(
                "  {}  {:>6.1}{}  {:>3.0}%{}",
                point.time.format("%a %d %b"),
                point.temperature,
                display.temperature_symbol,
                point.humidity,
                rain
            );
        }
    }
}

pub fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("No searches yet");
        return;
    }
    for entry in entries {
        println!(
            "{:>6}  {}  {}",
            entry.id,
            entry.searched_at.format("%Y-%m-%d %H:%M"),
            entry.city
        );
    }
}

pub fn print_profile(prefs: &UserPreferences) {
    if let Some(email) = &prefs.email {
        println!("Email:        {}", email);
    }
    println!("Name:         {}", prefs.display_name);
    println!("Temperature:  {}", prefs.temperature_unit.symbol());
    println!("Wind speed:   {}", prefs.wind_speed_unit.symbol());
}

pub fn print_dashboard(dashboard: &AdminDashboard) {
    println!("Requests per city");
    for (city, count) in &dashboard.city_frequency {
        println!("  {:<24} {}", city, count);
    }

    println!("\nTemperature units");
    match &dashboard.temperature_units {
        Ok([celsius, fahrenheit]) => println!("  °C {}  °F {}", celsius, fahrenheit),
        Err(e) => println!("  unavailable: {}", e),
    }

    println!("\nWind speed units");
    match &dashboard.wind_speed_units {
        Ok([kmh, knots]) => println!("  km/h {}  kn {}", kmh, knots),
        Err(e) => println!("  unavailable: {}", e),
    }

    println!("\n{} users, {} requests", dashboard.users.len(), dashboard.logs.len());
}

pub fn print_logs_page(dashboard: &AdminDashboard, page: usize) {
    let entries = dashboard.logs_on_page(page);
    if entries.is_empty() {
        println!("No log entries on page {}", page);
    }
    for entry in entries {
        let user = entry
            .acting_user
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>6}  {}  {:<12}  {:<24} {}",
            entry.id,
            entry.requested_at.format("%Y-%m-%d %H:%M"),
            user,
            entry.city,
            entry.response_status
        );
    }
    println!(
        "Page {} of {}",
        page,
        dashboard.cursor.total_pages().max(1)
    );
}
