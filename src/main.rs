use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use wayfarer::{
    app::{ChatSession, DEFAULT_MODEL_ID, GenerationService, TurnOutcome},
    domain::{INTEREST_OPTIONS, PACE_OPTIONS, TripContext},
    infra::llm::{
        DEFAULT_TIMEOUT, GenerateEndpointProvider,
        env::{
            ENV_ENDPOINT_URL, ENV_MODEL, ENV_TIMEOUT_SECS, ENV_USERS_FILE, read_env_var,
            read_timeout_from_env, resolve_with_env_fallback,
        },
    },
    infra::store::UserStore,
};

const DEFAULT_USERS_FILE: &str = "users.json";
const DEFAULT_PACE: &str = "Relaxed";
const DATE_FORMATS: [&str; 2] = ["%d-%m-%Y", "%Y-%m-%d"];
const RETRY_HINT: &str = "Temporary failure: retry with /plan or resend your message.";
const HELP_TEXT: &str = "Commands: /plan generate an itinerary, /trip edit trip details, /history show the conversation, /logout, /quit. Anything else is sent as a chat message.";

/// Terminal travel planner backed by a remote text-generation endpoint.
#[derive(Parser, Debug)]
#[command(name = "wayfarer", version)]
#[command(about = "Plan and refine day-by-day trip itineraries with an LLM", long_about = None)]
struct Args {
    /// Tunnel link or full generate URL (`/api/generate` is appended when missing)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// JSON file holding accounts and chat history
    #[arg(short, long)]
    users_file: Option<PathBuf>,

    /// Model identifier sent with each request
    #[arg(short, long)]
    model: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let users_file = match args.users_file {
        Some(path) => path,
        None => read_env_var(ENV_USERS_FILE)?
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_USERS_FILE)),
    };
    let model = resolve_with_env_fallback(
        args.model,
        || read_env_var(ENV_MODEL),
        DEFAULT_MODEL_ID.to_string(),
    )?;
    let timeout = resolve_with_env_fallback(
        args.timeout_secs.map(Duration::from_secs),
        || read_timeout_from_env(ENV_TIMEOUT_SECS),
        DEFAULT_TIMEOUT,
    )?;

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock());

    let endpoint = match args.endpoint {
        Some(endpoint) => endpoint,
        None => match read_env_var(ENV_ENDPOINT_URL)? {
            Some(endpoint) => endpoint,
            None => {
                let Some(link) = console.ask_required("Generation endpoint link: ")? else {
                    return Ok(());
                };
                link
            }
        },
    };

    let provider = GenerateEndpointProvider::with_config(&endpoint, timeout)
        .map_err(|error| anyhow::anyhow!("invalid endpoint configuration: {error}"))?;
    println!("Using endpoint {}", provider.endpoint_url());
    let service = GenerationService::with_model(Arc::new(provider), model);
    let store = UserStore::open(users_file);

    while let Some(mut session) = authenticate(&mut console, &store)? {
        println!("Logged in as: {}", session.username());
        print_history(&session);

        let Some(mut trip) = read_trip(&mut console)? else {
            return Ok(());
        };
        println!("{HELP_TEXT}");

        match chat_loop(&mut console, &service, &mut session, &mut trip)? {
            LoopExit::Logout => println!("Logged out."),
            LoopExit::Quit => return Ok(()),
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

enum LoopExit {
    Logout,
    Quit,
}

fn authenticate<R: BufRead>(
    console: &mut Console<R>,
    store: &UserStore,
) -> Result<Option<ChatSession>> {
    loop {
        let Some(mode) = console.ask("Select mode [login/register/quit]: ")? else {
            return Ok(None);
        };

        let register = match mode.trim().to_ascii_lowercase().as_str() {
            "login" | "l" => false,
            "register" | "r" => true,
            "quit" | "q" => return Ok(None),
            _ => {
                println!("Choose login, register or quit.");
                continue;
            }
        };

        let Some(username) = console.ask("Username: ")? else {
            return Ok(None);
        };
        let Some(password) = console.ask("Password: ")? else {
            return Ok(None);
        };

        let session = if register {
            ChatSession::register_and_login(store.clone(), &username, &password)
        } else {
            ChatSession::login(store.clone(), &username, &password)
        };

        match session {
            Ok(session) => {
                if register {
                    println!("Registration successful.");
                }
                return Ok(Some(session));
            }
            Err(error) => println!("{}", error.user_message()),
        }
    }
}

fn read_trip<R: BufRead>(console: &mut Console<R>) -> Result<Option<TripContext>> {
    let Some(origin) = console.ask_required("Enter Departure: ")? else {
        return Ok(None);
    };
    let Some(destination) = console.ask_required("Enter Destination: ")? else {
        return Ok(None);
    };
    let Some(start) = ask_date(console, "Enter Start Date (d-m-yyyy): ", Local::now().date_naive())?
    else {
        return Ok(None);
    };
    let Some(end) = ask_date(console, "Enter End Date (d-m-yyyy): ", start)? else {
        return Ok(None);
    };

    let interests = loop {
        let label = format!("Your Interests ({}; comma-separated): ", INTEREST_OPTIONS.join(", "));
        let Some(line) = console.ask(&label)? else {
            return Ok(None);
        };
        match parse_interests(&line) {
            Ok(interests) => break interests,
            Err(message) => println!("{message}"),
        }
    };

    let pace = loop {
        let label = format!("Preferred Pace ({}) [{DEFAULT_PACE}]: ", PACE_OPTIONS.join("/"));
        let Some(line) = console.ask(&label)? else {
            return Ok(None);
        };
        match parse_pace(&line) {
            Ok(pace) => break pace,
            Err(message) => println!("{message}"),
        }
    };

    Ok(Some(TripContext {
        origin,
        destination,
        start_date: format_trip_date(start),
        end_date: format_trip_date(end),
        interests,
        pace,
    }))
}

fn ask_date<R: BufRead>(
    console: &mut Console<R>,
    label: &str,
    earliest: NaiveDate,
) -> Result<Option<NaiveDate>> {
    loop {
        let Some(line) = console.ask_required(label)? else {
            return Ok(None);
        };
        match parse_trip_date(&line, earliest) {
            Ok(date) => return Ok(Some(date)),
            Err(message) => println!("{message}"),
        }
    }
}

fn chat_loop<R: BufRead>(
    console: &mut Console<R>,
    service: &GenerationService,
    session: &mut ChatSession,
    trip: &mut TripContext,
) -> Result<LoopExit> {
    loop {
        let Some(line) = console.ask("> ")? else {
            return Ok(LoopExit::Quit);
        };

        match line.trim() {
            "" => continue,
            "/quit" => return Ok(LoopExit::Quit),
            "/logout" => return Ok(LoopExit::Logout),
            "/help" => println!("{HELP_TEXT}"),
            "/history" => print_history(session),
            "/trip" => match read_trip(console)? {
                Some(updated) => *trip = updated,
                None => return Ok(LoopExit::Quit),
            },
            "/plan" => {
                println!("Generating plan...");
                let outcome = session.generate_plan(service, trip);
                report_turn(outcome);
            }
            _ => {
                println!("Generating answer...");
                match session.send_message(service, trip, &line) {
                    Ok(outcome) => report_turn(outcome),
                    Err(error) => println!("{}", error.user_message()),
                }
            }
        }
    }
}

fn report_turn(outcome: TurnOutcome) {
    println!("{}", outcome.display_text());
    if outcome.can_retry() {
        println!("{RETRY_HINT}");
    }
    if let Some(error) = outcome.save_error {
        println!("{}", error.user_message());
    }
}

fn print_history(session: &ChatSession) {
    for message in session.messages() {
        println!("[{}] {}", message.role.label(), message.content);
    }
}

fn parse_interests(line: &str) -> Result<Vec<String>, String> {
    let mut interests = Vec::new();
    for item in line.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        let option = INTEREST_OPTIONS
            .iter()
            .find(|option| option.eq_ignore_ascii_case(item))
            .ok_or_else(|| {
                format!(
                    "Unknown interest '{item}'. Choose from: {}",
                    INTEREST_OPTIONS.join(", ")
                )
            })?;
        if !interests.iter().any(|chosen| chosen == option) {
            interests.push((*option).to_string());
        }
    }
    Ok(interests)
}

/// Accepts `d-m-yyyy` or `yyyy-mm-dd`; rejects impossible dates and days before `earliest`.
fn parse_trip_date(line: &str, earliest: NaiveDate) -> Result<NaiveDate, String> {
    let line = line.trim();
    let date = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(line, format).ok())
        .ok_or_else(|| format!("'{line}' is not a valid date. Use d-m-yyyy."))?;

    if date < earliest {
        return Err(format!(
            "Date must be on or after {}.",
            format_trip_date(earliest)
        ));
    }
    Ok(date)
}

fn format_trip_date(date: NaiveDate) -> String {
    format!("{}-{}-{}", date.day(), date.month(), date.year())
}

fn parse_pace(line: &str) -> Result<String, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(DEFAULT_PACE.to_string());
    }

    PACE_OPTIONS
        .iter()
        .find(|option| option.eq_ignore_ascii_case(line))
        .map(|option| (*option).to_string())
        .ok_or_else(|| format!("Choose one of: {}", PACE_OPTIONS.join(", ")))
}

struct Console<R> {
    input: R,
}

impl<R: BufRead> Console<R> {
    fn new(input: R) -> Self {
        Self { input }
    }

    /// Prompts and reads one line; `None` on end of input.
    fn ask(&mut self, label: &str) -> Result<Option<String>> {
        print!("{label}");
        io::stdout().flush().context("failed to flush stdout")?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read from stdin")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn ask_required(&mut self, label: &str) -> Result<Option<String>> {
        loop {
            match self.ask(label)? {
                Some(value) if value.trim().is_empty() => println!("This field is required."),
                Some(value) => return Ok(Some(value.trim().to_string())),
                None => return Ok(None),
            }
        }
    }
}
