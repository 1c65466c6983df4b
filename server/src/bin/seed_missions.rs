use sc_core::initialize_logger;
use log::{error, info, LevelFilter};
use server::keydb_store::{self, KeydbStore};
use server::populate::seed_default_missions;
use server::service::MissionService;

/// Seeds the default mission catalog into KeyDB. Pass `--demo-user` to also
/// create a fresh user for manual testing.
#[tokio::main(flavor = "multi_thread")]
async fn main() {
    dotenvy::dotenv().ok();
    initialize_logger(LevelFilter::Info, None).expect("Failed to initialize logger");

    let con = match keydb_store::connect().await {
        Ok(con) => con,
        Err(err) => {
            error!("Could not reach KeyDB at {}: {}", keydb_store::keydb_url(), err);
            std::process::exit(1);
        }
    };

    let mut service = MissionService::new(KeydbStore::new(con));

    match seed_default_missions(&mut service).await {
        Ok(created) => info!("Seeding done, {} missions created", created),
        Err(err) => {
            error!("Seeding failed: {}", err);
            std::process::exit(1);
        }
    }

    if std::env::args().any(|arg| arg == "--demo-user") {
        match service.register_user().await {
            Ok(progress) => info!("Created demo user {}", progress.user_id),
            Err(err) => {
                error!("Could not create demo user: {}", err);
                std::process::exit(1);
            }
        }
    }
}
