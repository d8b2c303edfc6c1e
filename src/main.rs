use page_routes::{AppState, Config, GuardRegistry, PageServer, Result, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_rust_env_or_default();
    config.setup_tracing();

    let table = web::route_table()?;
    let state = AppState::from_config(&config);
    let guards = GuardRegistry::from_config(&config.auth);

    PageServer::new(config, state, table, &guards)?
        .setup_middleware()
        .start()
        .await
}
