// src/main.rs
use chrono::Duration;
use clap::Parser;
use escooter_extractor::display::{render_table, Locale, Menu};
use escooter_extractor::fetch::{self, ListingSource, ListingTable};
use escooter_extractor::processing::filter::{mean, sort_by};
use escooter_extractor::storage::{LoadRequest, StorageManager};
use escooter_extractor::utils::{self, AppError};

/// Command Line Interface for the e-scooter listing analyzer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the page holding the listing tables
    #[arg(long, env = "ESCOOTER_URL", default_value = fetch::models::DEFAULT_LISTING_URL)]
    url: String,

    /// Directory for cached snapshots
    #[arg(short, long, env = "ESCOOTER_DATA_DIR", default_value = "./data")]
    output_dir: String,

    /// Reuse a cached snapshot younger than this many hours
    #[arg(long, default_value_t = 24)]
    max_age_hours: u32,

    /// Ignore the cache and fetch fresh data
    #[arg(short, long)]
    refresh: bool,

    /// Which listing table to analyze
    #[arg(short, long, value_enum, default_value_t = ListingTable::Current)]
    table: ListingTable,

    /// Display language
    #[arg(short, long, value_enum, default_value_t = Locale::De)]
    lang: Locale,

    /// Sort by this column before showing the data
    #[arg(short, long)]
    sort: Option<String>,

    /// Sort in descending order
    #[arg(long, requires = "sort")]
    descending: bool,

    /// Print the table and exit instead of opening the menu
    #[arg(long)]
    no_interactive: bool,

    /// Debug mode - save the fetched page next to the cache
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting with args: {:?}", args);

    // 3. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;
    let source = ListingSource::new(&args.url);
    let request = LoadRequest {
        table: args.table,
        source_url: source.url.clone(),
        max_age: Duration::hours(i64::from(args.max_age_hours)),
        refresh: args.refresh,
        save_raw_page: args.debug,
    };

    // 4. Load from cache or fetch
    let mut dataset = storage
        .load_or_fetch(&request, || fetch::fetch_listing(&source))
        .await;

    let strings = args.lang.strings();
    if dataset.is_empty() {
        println!("{}", strings.no_data);
        return Ok(());
    }

    println!("{}", strings.title);
    println!("{} {}", dataset.row_count(), strings.loaded);
    for column in ["uvp", "akku_wh"] {
        if let Some(avg) = mean(&dataset, column) {
            println!("{} {}: {:.0}", strings.average, args.lang.column_label(column), avg);
        }
    }

    // 5. Optional initial sort
    if let Some(column) = &args.sort {
        if dataset.column(column).is_none() {
            return Err(AppError::Config(format!(
                "Unknown sort column '{}'. Available: {}",
                column,
                dataset.column_names().join(", ")
            )));
        }
        dataset = sort_by(&dataset, column, !args.descending);
    }

    // 6. Show
    if args.no_interactive {
        print!("{}", render_table(&dataset, args.lang));
    } else {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        Menu::new(stdin.lock(), stdout.lock(), args.lang).run(&dataset)?;
    }

    Ok(())
}
