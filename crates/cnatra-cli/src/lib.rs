//! Command-line front end for the schedule scraper.

pub mod cli_args;

use cli_args::{Cli, Command, ConfigCommand, NetworkArgs, SquadronDatesArgs, SweepArgs, TrackArgs};
use cnatra_core::logging::{LoggingDestination, init_logging};
use cnatra_core::{
    HttpTransport, JsonFileStore, ScheduleSession, ScraperConfig, config_path, date_codec,
    load_config, run_sweep, save_config,
};
use tracing::info;

/// Parse-independent entry point used by the binary.
pub async fn run(cli: Cli) -> Result<(), String> {
    let default_filter = if cli.verbose { "debug" } else { "info" };
    let destination = match cli.command {
        Command::Sweep(_) | Command::Fetch(_) => LoggingDestination::FileAndStderr,
        _ => LoggingDestination::StderrOnly,
    };
    init_logging(destination, default_filter).map_err(|err| err.to_string())?;

    dispatch(cli.command).await
}

async fn dispatch(command: Command) -> Result<(), String> {
    match command {
        Command::Sweep(args) => run_sweep_command(args).await,
        Command::Fetch(args) => run_fetch(args).await,
        Command::Track(args) => run_track(args),
        Command::DateNumber { date } => {
            let number = date_codec::encode(&date).map_err(|err| err.to_string())?;
            println!("{number}");
            Ok(())
        }
        Command::FrontPage { squadron, date } => {
            println!("{}", date_codec::front_page_url(&squadron, &date));
            Ok(())
        }
        Command::Config(cmd) => handle_config_command(cmd),
    }
}

/// Load config.toml, apply environment overrides and report warnings on stderr.
pub fn resolve_config() -> Result<ScraperConfig, String> {
    let load = load_config();
    for warning in load.warnings {
        eprintln!("Warning: {warning}");
    }
    let mut config = load.config;
    config
        .apply_env_overrides()
        .map_err(|err| err.to_string())?;
    Ok(config)
}

pub fn apply_network_args(config: &mut ScraperConfig, args: &NetworkArgs) {
    if let Some(url) = &args.schedule_url {
        config.schedule_url = url.clone();
    }
    if let Some(timeout) = args.timeout_secs {
        config.request_timeout_secs = timeout;
    }
}

pub fn apply_sweep_args(config: &mut ScraperConfig, args: &SweepArgs) {
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(store) = &args.store {
        config.store_path = store.clone();
    }
    if let Some(max_retries) = args.max_retries {
        config.max_retries = max_retries;
    }
    apply_network_args(config, &args.network);
}

async fn run_sweep_command(args: SweepArgs) -> Result<(), String> {
    let mut config = resolve_config()?;
    apply_sweep_args(&mut config, &args);
    config.validate().map_err(|err| err.to_string())?;

    let transport = HttpTransport::new(&config).map_err(|err| err.to_string())?;
    let mut store =
        JsonFileStore::open(config.resolved_store_path()).map_err(|err| err.to_string())?;

    let report = run_sweep(&mut store, &transport, &config)
        .await
        .map_err(|err| err.to_string())?;
    let rendered = serde_json::to_string_pretty(&report).map_err(|err| err.to_string())?;
    println!("{rendered}");

    info!(
        published = report.published(),
        failures = report.failures(),
        "Sweep finished"
    );
    if report.failures() > 0 {
        return Err(format!("{} squadron(s) failed", report.failures()));
    }
    Ok(())
}

async fn run_fetch(args: SquadronDatesArgs) -> Result<(), String> {
    let mut config = resolve_config()?;
    apply_network_args(&mut config, &args.network);
    config.validate().map_err(|err| err.to_string())?;

    let transport = HttpTransport::new(&config).map_err(|err| err.to_string())?;
    let session = ScheduleSession::new(&transport, &config.schedule_url, &args.squadron);
    let schedules = session
        .fetch_schedules(&args.dates)
        .await
        .map_err(|err| err.to_string())?;

    let rendered = serde_json::to_string_pretty(&schedules).map_err(|err| err.to_string())?;
    println!("{rendered}");
    Ok(())
}

fn run_track(args: TrackArgs) -> Result<(), String> {
    let mut config = resolve_config()?;
    if let Some(store) = &args.store {
        config.store_path = store.clone();
    }
    for date in &args.dates {
        date_codec::parse_date(date).map_err(|err| err.to_string())?;
    }

    let mut store =
        JsonFileStore::open(config.resolved_store_path()).map_err(|err| err.to_string())?;
    let added = store
        .track_dates(&args.squadron, &args.dates)
        .map_err(|err| err.to_string())?;
    println!(
        "Tracking {} new date(s) for {} in {}",
        added,
        args.squadron,
        store.path().display()
    );
    Ok(())
}

fn handle_config_command(command: ConfigCommand) -> Result<(), String> {
    match command {
        ConfigCommand::Show => {
            let config = resolve_config()?;
            let rendered = toml::to_string_pretty(&config).map_err(|err| err.to_string())?;
            println!("# {}", config_path().display());
            print!("{rendered}");
            Ok(())
        }
        ConfigCommand::Init { force } => {
            let path = config_path();
            if path.exists() && !force {
                return Err(format!(
                    "{} already exists; pass --force to overwrite it.",
                    path.display()
                ));
            }
            let written = save_config(&ScraperConfig::default()).map_err(|err| err.to_string())?;
            println!("Wrote {}", written.display());
            Ok(())
        }
    }
}
