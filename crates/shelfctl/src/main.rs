use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shelf_store::fs::FsCatalogStore;
use shelf_store::seed::seed;
use shelf_store::CatalogStore;
use shelfmate::engine::Engine;
use shelfmate::query::parse_id;

#[derive(Parser)]
#[command(version, about = "shelfmate control: seed the catalog store, inspect, query offline")]
struct Cli {
    /// Catalog store file
    #[arg(long, global = true, default_value = "catalog.json", env = "SHELF_CATALOG")]
    store: String,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Wipe the store and load every book from a JSON array file
    Seed {
        #[arg(long)]
        source: String,
    },
    /// Train on the store and print engine status as JSON
    Status,
    /// Recommend for the given ids, straight from the store
    Recommend {
        /// Book ids, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<String>,
        #[arg(long, default_value_t = shelfmate::query::DEFAULT_LIMIT)]
        limit: usize,
        /// Print raw JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let store = FsCatalogStore::new(&cli.store);

    match cli.cmd {
        Cmd::Seed { source } => {
            let report = seed(&source, &store)
                .await
                .with_context(|| format!("seed {} from {source}", cli.store))?;
            eprintln!("inserted {} books; ids: {:?}", report.inserted, report.ids);
        }
        Cmd::Status => {
            let engine = train(&store).await?;
            println!("{}", serde_json::to_string_pretty(&engine.status())?);
        }
        Cmd::Recommend { ids, limit, json } => {
            let ids = ids
                .iter()
                .map(|s| parse_id(s))
                .collect::<Result<Vec<_>, _>>()?;
            let engine = train(&store).await?;
            let recs = engine.recommend(&ids, limit);

            if json {
                println!("{}", serde_json::to_string_pretty(&recs)?);
            } else {
                for r in &recs {
                    let reasons: Vec<String> = r.reasons.iter().map(|x| x.to_string()).collect();
                    println!(
                        "{}\t{}\t{}%\t{}",
                        r.book.id,
                        r.book.title,
                        r.score,
                        reasons.join("; ")
                    );
                }
            }
        }
    }
    Ok(())
}

async fn train(store: &FsCatalogStore) -> Result<Engine> {
    let records = store.fetch_all().await?;
    let engine = Engine::new();
    if let Err(e) = engine.train(records) {
        eprintln!("engine not ready: {e}");
    }
    Ok(engine)
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
