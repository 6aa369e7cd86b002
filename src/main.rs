use clap::Parser;
use songrec::api::create_router;
use songrec::{init_tracing, AppState, Catalog, Config};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = Config::load_or_default(&args.config)?;
    info!("Starting SongRec server with config: {:?}", config.server);

    let state = AppState::new(config.clone())?;
    for catalog in Catalog::ALL {
        state.train_catalog(catalog).await?;
    }

    let app = create_router(state);
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
