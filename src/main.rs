use std::error::Error;
use std::io::IsTerminal;

use chrono::{Days, Local, NaiveDate};
use clap::Parser;
use icovid::cli::{Cli, Command, DiffArgs, HistoryArgs, ShowArgs, UpdateArgs};
use icovid::config::{parse_interval, Config};
use icovid::logging;
use icovid::prompt::{Interactive, Prompt, Unattended};
use icovid::report::{self, json, table};
use icovid::store::diff::compare_country;
use icovid::store::history::country_history;
use icovid::store::{date_key, parse_date_key, SnapshotStore, StoreError};
use icovid::update::source::{FileSource, RegionPolicy, Source};
use icovid::update::{self, error_summary};
use tracing::{error, info, warn};

type CmdResult = Result<(), Box<dyn Error>>;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Accepts the store format ("20 May 2020") and ISO dates ("2020-05-20").
fn resolve_date(value: Option<&str>) -> Result<NaiveDate, Box<dyn Error>> {
    let Some(value) = value else {
        return Ok(today());
    };

    parse_date_key(value)
        .or_else(|| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
        .ok_or_else(|| format!("Invalid date: '{value}'. Use e.g. \"20 May 2020\" or 2020-05-20.").into())
}

fn use_color(config: &Config) -> bool {
    config.color && std::io::stdout().is_terminal()
}

/// Open the store for a command that only reads it.
fn open_read_only(config: &Config) -> Result<SnapshotStore, Box<dyn Error>> {
    match SnapshotStore::open(&config.db_path) {
        Ok(mut store) => {
            store.disable_auto_save();
            Ok(store)
        }
        Err(StoreError::Missing { path }) => Err(format!(
            "No store at {}. Run 'icovid update' to create one.",
            path.display()
        )
        .into()),
        Err(e) => Err(e.into()),
    }
}

fn build_sources(config: &Config, args: &UpdateArgs) -> Vec<Box<dyn Source>> {
    let cli_policy = if args.skip_bad_regions {
        RegionPolicy::Skip
    } else {
        RegionPolicy::Abort
    };

    config
        .sources
        .iter()
        .map(|entry| Box::new(FileSource::new(&entry.path, entry.region_policy)) as Box<dyn Source>)
        .chain(
            args.sources
                .iter()
                .map(|path| Box::new(FileSource::new(path, cli_policy)) as Box<dyn Source>),
        )
        .collect()
}

fn run_update(config: &Config, args: UpdateArgs) -> CmdResult {
    let prompt: Box<dyn Prompt> = if args.server {
        info!("server mode enabled, prompts use their defaults");
        Box::new(Unattended)
    } else {
        Box::new(Interactive)
    };

    let interval = match &args.interval {
        Some(value) => parse_interval(value)?,
        None => config.interval,
    };

    let sources = build_sources(config, &args);
    if sources.is_empty() {
        warn!("no sources configured, nothing to update");
    }

    let mut store = SnapshotStore::open_or_create(&config.db_path, prompt.as_ref(), config.create_if_missing)?;

    loop {
        let date = resolve_date(args.date.as_deref())?;
        let cycle = update::run(&mut store, &sources, &date_key(date));

        if args.json {
            println!("{}", json::render(&cycle)?);
        } else {
            print!("{}", table::render(&store, date, use_color(config)));
            print!("{}", report::render_update(&cycle, config.verbose));
        }

        if let Some(summary) = error_summary(&cycle) {
            eprintln!("\n{summary}");
        }

        if !args.server {
            break;
        }

        if let Err(e) = store.save() {
            error!("failed to save store: {e}");
        }

        if let Some(next) = chrono::Duration::from_std(interval).ok().map(|d| Local::now() + d) {
            info!("next update at {}", next.format("%H:%M:%S"));
        }
        std::thread::sleep(interval);
    }

    store.close()?;
    Ok(())
}

fn run_show(config: &Config, args: ShowArgs) -> CmdResult {
    let date = resolve_date(args.date.as_deref())?;
    let store = open_read_only(config)?;

    if args.json {
        match store.day(&date_key(date)) {
            Some(day) => println!("{}", json::render(day)?),
            None => println!("{{}}"),
        }
    } else {
        print!("{}", table::render(&store, date, use_color(config)));
    }

    store.close()?;
    Ok(())
}

fn run_dates(config: &Config) -> CmdResult {
    let store = open_read_only(config)?;
    let dates = store.list_dates();

    if dates.is_empty() {
        println!("No dates stored. Run 'icovid update' to record one.");
    } else {
        for date in dates {
            println!("{date}");
        }
    }

    store.close()?;
    Ok(())
}

fn run_history(config: &Config, args: HistoryArgs) -> CmdResult {
    let store = open_read_only(config)?;
    let history = country_history(&store, &args.country, args.days.unwrap_or(config.history_days));

    if args.json {
        println!("{}", json::render(&history)?);
    } else {
        print!("{}", report::render_history(&history));
    }

    store.close()?;
    Ok(())
}

fn run_diff(config: &Config, args: DiffArgs) -> CmdResult {
    let to = resolve_date(args.to.as_deref())?;
    let from = match args.from.as_deref() {
        Some(value) => resolve_date(Some(value))?,
        None => to
            .checked_sub_days(Days::new(1))
            .ok_or("Cannot compute the day before --to")?,
    };

    let store = open_read_only(config)?;
    let (from_key, to_key) = (date_key(from), date_key(to));

    let Some(today) = store.country(&to_key, &args.country) else {
        return Err(format!("No data for {} on {to_key}.", args.country).into());
    };

    let delta = compare_country(today, store.country(&from_key, &args.country));
    print!("{}", report::render_diff(&delta, &from_key, &to_key));

    store.close()?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    let config = match Config::load(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Update(args) => run_update(&config, args),
        Command::Show(args) => run_show(&config, args),
        Command::Dates => run_dates(&config),
        Command::History(args) => run_history(&config, args),
        Command::Diff(args) => run_diff(&config, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
