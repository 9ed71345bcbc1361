use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;
use std::io;

use provenance_chain::api::{self, AppState};
use provenance_chain::blockchain::Blockchain;
use provenance_chain::clock::SystemClock;
use provenance_chain::config::AppConfig;
use provenance_chain::network::LogBroadcaster;
use provenance_chain::storage::{BlockStore, JsonFileStore, MemoryStore};

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = AppConfig::from_env();

    let store: Box<dyn BlockStore> = match &config.data_dir {
        Some(dir) => {
            info!("STORE - persisting blocks under {}", dir.display());
            Box::new(JsonFileStore::new(dir))
        }
        None => {
            info!("STORE - no DATA_DIR set, blocks are kept in memory only");
            Box::new(MemoryStore::new())
        }
    };
    let broadcaster = LogBroadcaster::new(config.peers.clone(), &config.node_address);

    let blockchain = Blockchain::open(
        config.chain.clone(),
        store,
        Box::new(broadcaster),
        Box::new(SystemClock),
    )
    .map_err(io::Error::other)?;
    let cancel = blockchain.cancel_token();

    println!(
        "⛓️ Starting provenance ledger at http://{}:{}",
        config.host, config.port
    );

    let state = web::Data::new(AppState::new(blockchain, config.reload_before_lookup));

    let result = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    // Release any mining still running on the blocking pool.
    cancel.cancel();
    result
}
