use anyhow::{Context, Result};
use pokedex_seed::{
    cli::{Cli, Commands},
    paths::DataDir,
    query::{get_by_id, list_all},
    schema::LoadPlan,
    ui::{ProgressUi, SilentUi, Ui},
    wrangle::{wrangle, NamePolicy, WrangleOptions},
    writer::{Seeder, Store},
};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    if cli.quiet {
        init_logging(&cli.log_level, std::io::stderr);
        execute(cli.command, &mut SilentUi::new())
    } else {
        let mut ui = ProgressUi::new();
        init_logging(&cli.log_level, ui.log_writer());
        let result = execute(cli.command, &mut ui);
        ui.finish(if result.is_ok() { "done" } else { "failed" });
        result
    }
}

fn init_logging<W>(level: &str, writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .without_time()
        .init();
}

fn execute<U: Ui>(command: Commands, ui: &mut U) -> Result<()> {
    match command {
        Commands::Wrangle {
            data_dir,
            strict_names,
        } => {
            let data = DataDir::new(data_dir)?;
            run_wrangle(&data, strict_names, ui)?;
        }

        Commands::Seed { data_dir, db } => {
            let data = DataDir::new(data_dir)?;
            run_seed(&data, db, ui)?;
        }

        Commands::Run {
            data_dir,
            db,
            strict_names,
        } => {
            let data = DataDir::new(data_dir)?;
            run_wrangle(&data, strict_names, ui)?;
            run_seed(&data, db, ui)?;
        }

        Commands::List { data_dir, db } => {
            let store = open_existing(data_dir, db)?;
            let all = list_all(store.connection())?;
            println!("{}", serde_json::to_string_pretty(&all)?);
        }

        Commands::Show { id, data_dir, db } => {
            let store = open_existing(data_dir, db)?;
            match get_by_id(store.connection(), id)? {
                Some(pokemon) => println!("{}", serde_json::to_string_pretty(&pokemon)?),
                None => anyhow::bail!("Pokemon #{} not found", id),
            }
        }

        Commands::ListTables => {
            let plan = LoadPlan::new()?;
            println!("Tables in load order:\n");
            for table in plan.all_tables() {
                println!("  {} ({})", table.name, table.source_file);
            }
        }
    }

    Ok(())
}

fn run_wrangle<U: Ui>(data: &DataDir, strict_names: bool, ui: &mut U) -> Result<()> {
    let start = Instant::now();
    let options = WrangleOptions {
        name_policy: if strict_names {
            NamePolicy::Strict
        } else {
            NamePolicy::LastWins
        },
    };

    let report = wrangle(data, &options, ui)?;

    println!(
        "\nWrote {} files ({} rows) to {:?} in {:.1}s",
        report.tables.len(),
        report.total_rows(),
        data.processed_dir(),
        start.elapsed().as_secs_f64()
    );
    if !report.unresolved.is_empty() {
        println!("{} evolution names could not be resolved", report.unresolved.len());
    }
    Ok(())
}

fn run_seed<U: Ui>(data: &DataDir, db: Option<PathBuf>, ui: &mut U) -> Result<()> {
    let start = Instant::now();
    let db_path = data.database(db);

    let mut store = Store::open(&db_path)?;
    let report = Seeder::new()?
        .seed(&mut store, &data.processed_dir(), ui)
        .context("Seed failed, database left unchanged")?;

    println!(
        "\nSeeded {:?} ({} records) in {:.1}s",
        db_path,
        report.total_inserted(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn open_existing(data_dir: Option<PathBuf>, db: Option<PathBuf>) -> Result<Store> {
    let data = DataDir::new(data_dir)?;
    let db_path = data.database(db);
    if !db_path.exists() {
        anyhow::bail!("Database {:?} does not exist; run `seed` first", db_path);
    }
    Store::open(&db_path)
}
