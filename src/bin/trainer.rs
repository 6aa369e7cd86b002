use anyhow::{Context, Result};
use clap::Parser;
use songrec::algorithms::Recommender;
use songrec::services::training::CatalogSource;
use songrec::{init_tracing, AppState, Catalog, Config};
use tracing::info;

/// Fit a catalog's model offline and inspect it. Nothing is persisted.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// `track` or `artist`
    #[arg(long, default_value = "track")]
    catalog: Catalog,

    /// External id to print neighbours for
    #[arg(long)]
    item: Option<String>,

    /// User index to print recommendations for
    #[arg(long)]
    user: Option<usize>,

    #[arg(short, long, default_value_t = 10)]
    n: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    std::env::set_var("RUST_LOG", &args.log_level);
    init_tracing();

    info!("Starting SongRec trainer for the {} catalog", args.catalog);

    let config = Config::load_or_default(&args.config)?;
    info!("Training configuration loaded: {:?}", config.als);

    let state = AppState::new(config)?;
    let source = CatalogSource::for_catalog(&state.config.data, args.catalog);
    let (ids, trained) = state.training_service.load_and_train(source).await?;

    println!(
        "{} model: {} users, {} items, {} interactions, trained at {}",
        args.catalog,
        trained.engine().num_users(),
        trained.engine().num_items(),
        trained.nnz(),
        trained.trained_at()
    );

    if let Some(id) = &args.item {
        let index = ids.index_of(id).with_context(|| format!("unknown {} id '{}'", args.catalog, id))?;
        println!("Items similar to {}:", id);
        for scored in trained.engine().similar_items(index, args.n)? {
            println!("  {}\t{:.4}", ids.id_of(scored.item).unwrap_or("?"), scored.score);
        }
    }

    if let Some(user) = args.user {
        println!("Recommendations for user {}:", user);
        let exclude = trained.interacted(user);
        for scored in trained.engine().recommend_for_user(user, &exclude, args.n)? {
            println!("  {}\t{:.4}", ids.id_of(scored.item).unwrap_or("?"), scored.score);
        }
    }

    Ok(())
}
