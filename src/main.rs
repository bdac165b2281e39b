use color_eyre::Result;
use clap::Parser;
use std::io;
use recall::{Config, Database, Profile, cli::{self, Cli, Commands}, logging, utils};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev keeps a separate config and database
    let profile = if cli.dev {
        Profile::Dev
    } else {
        Profile::Prod
    };

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from_path(&utils::expand_path(path))?.with_profile_defaults(profile),
        None => Config::load_with_profile(profile)?,
    };
    let owner = cli.user.clone().unwrap_or_else(|| config.current_user.clone());

    if let Err(e) = logging::init(&config.get_log_path(), &config.log_level) {
        eprintln!("Warning: logging disabled: {}", e);
    }
    tracing::info!(?profile, %owner, "starting");

    let db_path = config.get_database_path();
    let db = Database::new(
        db_path.to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?
    )?;

    let today = utils::today();
    let mut out = io::stdout().lock();

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            drop(out);
            let app = recall::tui::App::new(config, db, owner, today)?;
            recall::tui::run_event_loop(app)?;
        }
        Commands::Add { front, back, tags } => {
            cli::handle_add(front, back, tags, &owner, today, &db, &mut out)?;
        }
        Commands::Due { date } => {
            let date = cli::resolve_date(date.as_deref(), today)?;
            cli::handle_due(&owner, date, &db, &mut out)?;
        }
        Commands::Rate { id, outcome, date } => {
            let date = cli::resolve_date(date.as_deref(), today)?;
            cli::handle_rate(&id, outcome.into(), date, &owner, &db, &mut out)?;
        }
        Commands::List => {
            cli::handle_list(&owner, &db, &mut out)?;
        }
        Commands::Stats { date } => {
            let date = cli::resolve_date(date.as_deref(), today)?;
            cli::handle_stats(&owner, date, &db, &mut out)?;
        }
        Commands::Delete { id } => {
            cli::handle_delete(&id, &owner, &db, &mut out)?;
        }
        Commands::Export { file } => {
            cli::handle_export(&file, &db, &mut out)?;
        }
        Commands::Import { file } => {
            cli::handle_import(&file, &owner, &db, &mut out)?;
        }
        Commands::AddBulk { file } => {
            cli::handle_add_bulk(&file, &owner, today, &db, &mut out)?;
        }
    }

    Ok(())
}
