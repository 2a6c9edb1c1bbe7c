use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use prestadores::locations;
use prestadores::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prcli")]
#[command(about = "Provider lookup CLI - fetch, filter and locate healthcare providers by municipality", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the departments and municipalities available
    Locations,
    /// Fetch providers for a location and drill down through the filters
    Search(SearchArgs),
    /// Show summary statistics for a location's records
    Stats(LocationArgs),
    /// Resolve a free-text place to coordinates
    Geocode(GeocodeArgs),
}

#[derive(Args)]
struct LocationArgs {
    /// Department id (e.g. 76)
    #[arg(short, long)]
    department: u32,
    /// Municipality id (e.g. 76109)
    #[arg(short, long)]
    municipality: u32,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SearchArgs {
    #[command(flatten)]
    location: LocationArgs,
    /// Specialty category to select
    #[arg(long)]
    category: Option<String>,
    /// Specialty to select (requires --category)
    #[arg(long, requires = "category")]
    specialty: Option<String>,
    /// Secondary provider class (complementary, medications, other_services, informational)
    #[arg(long, requires = "id")]
    class: Option<String>,
    /// Secondary provider id to show details for
    #[arg(long, requires = "class")]
    id: Option<i64>,
    /// Free-text place to center the map on afterwards
    #[arg(long)]
    place: Option<String>,
    /// Expand the complementary information panel
    #[arg(long)]
    details: bool,
}

#[derive(Args)]
struct GeocodeArgs {
    /// Address or place name
    text: String,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Locations => cmd_locations(),
        Commands::Search(args) => cmd_search(args).await,
        Commands::Stats(args) => cmd_stats(args).await,
        Commands::Geocode(args) => cmd_geocode(args).await,
    };

    if let Err(e) = outcome {
        match e.downcast_ref::<PrestadoresError>() {
            Some(err) => eprintln!("Error: {}", err.user_message()),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn cmd_locations() -> anyhow::Result<()> {
    for department in locations::departments() {
        println!("{} {}", department.id, department.name);
        for municipality in locations::municipalities(Some(department.id)) {
            println!("  {} {}", municipality.id, municipality.name);
        }
    }
    Ok(())
}

#[cfg(feature = "progress")]
fn spinner(message: &str) -> indicatif::ProgressBar {
    let pb = indicatif::ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn build_lookup(config: &AppConfig) -> anyhow::Result<ProviderLookup<GeoDataClient, GoogleMap>> {
    let source = GeoDataClient::new(config)?;
    let map = GoogleMap::new(config)?;
    Ok(ProviderLookup::new(source, map, config))
}

async fn submit(
    lookup: &mut ProviderLookup<GeoDataClient, GoogleMap>,
    location: &LocationArgs,
) -> anyhow::Result<usize> {
    lookup.select_department(Some(location.department));
    lookup.select_municipality(Some(location.municipality));

    #[cfg(feature = "progress")]
    let pb = spinner("Consultando prestadores...");

    let result = lookup.submit().await;

    #[cfg(feature = "progress")]
    pb.finish_and_clear();

    Ok(result?)
}

async fn cmd_search(args: SearchArgs) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let mut lookup = build_lookup(&config)?;
    submit(&mut lookup, &args.location).await?;

    if args.category.is_some() {
        lookup.select_category(args.category.clone());
    }
    if args.specialty.is_some() {
        lookup.select_specialty(args.specialty.clone());
    }
    if let (Some(class), Some(id)) = (args.class.as_deref(), args.id) {
        let class = ProviderClass::from_code(class)?;
        lookup.select_secondary(class, Some(id));
    }
    if args.details {
        lookup.toggle_complementary_info();
    }
    if let Some(place) = args.place.as_deref() {
        if let Err(e) = lookup.search_place(place).await {
            tracing::debug!(error = %e, place, "place search failed");
        }
    }

    if args.location.json {
        println!("{}", serde_json::to_string_pretty(&lookup.view())?);
    } else {
        print!("{}", lookup.view());
        println!("\n{}", lookup.map().static_map_url()?);
    }
    Ok(())
}

async fn cmd_stats(args: LocationArgs) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let mut lookup = build_lookup(&config)?;
    let count = submit(&mut lookup, &args).await?;

    let stats = lookup.state().store.statistics();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        let department = locations::department_name(args.department).unwrap_or("?");
        let municipality = locations::municipality_name(args.municipality).unwrap_or("?");
        println!("{} / {} ({} records)", department, municipality, count);
        stats.print_summary();
    }
    Ok(())
}

async fn cmd_geocode(args: GeocodeArgs) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let map = GoogleMap::new(&config)?;
    let center = map
        .geocode(args.text.trim())
        .await
        .with_context(|| format!("geocoding '{}'", args.text.trim()))?;
    println!("{}", center);
    Ok(())
}
