use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use food_analyzer::api::{configure_routes, json_config, AppState};
use food_analyzer::{banner, config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Print the startup banner
    banner::print_banner();

    if let Err(e) = dotenvy::dotenv() {
        eprintln!("ℹ️  No .env file loaded ({}); using the process environment", e);
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app_config = match config::AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Failed to load configuration: {}", e);
            return Err(std::io::Error::other(e));
        }
    };

    banner::print_setup_hints(&app_config);

    let bind = (app_config.server.host.clone(), app_config.server.port);
    let max_body_bytes = app_config.server.max_body_bytes;

    log::info!(
        "🤖 Using {} model {}",
        app_config.upstream.provider.label(),
        app_config.upstream.model
    );

    let state = AppState::new(app_config);

    println!("🚀 Starting server...");
    println!("🍽️  Analyzer listening on http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(json_config(max_body_bytes))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind(bind)?
    .run()
    .await
}
