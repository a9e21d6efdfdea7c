use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use bookshelf_server::auth::handlers::{login, logout, refresh, register, user};
use bookshelf_server::books::handlers::{create_book, delete_book, get_book, list_books};
use bookshelf_server::{health_check, AppError, AppState, Settings};
use dotenv::dotenv;
use std::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[actix_web::main]
async fn main() -> bookshelf_server::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();

    // Load configuration
    let config = Settings::new()?;
    info!("Configuration loaded successfully");

    info!("Starting server at {}:{}", config.server.host, config.server.port);

    // Initialize application state
    let state = AppState::new(config.clone()).await?;
    let state = web::Data::new(state);

    // Create and bind TCP listener
    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;

    // Start HTTP server
    let workers = config.server.workers as usize;
    HttpServer::new(move || {
        let cors = if config.is_production() {
            // The SPA is served from another origin; credentials carry the
            // refresh cookie.
            Cors::default()
                .allowed_origin("https://your-production-frontend.com")
                .allowed_methods(vec!["GET", "POST", "DELETE"])
                .allowed_headers(vec!["Authorization", "Content-Type"])
                .supports_credentials()
                .max_age(3600)
        } else {
            Cors::default()
                .allowed_origin("http://localhost:5173")
                .allowed_origin("http://127.0.0.1:5173")
                .allow_any_method()
                .allow_any_header()
                .supports_credentials()
                .max_age(3600)
        };

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/api/auth")
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/logout", web::post().to(logout))
                    .route("/refresh", web::post().to(refresh))
                    .route("/user", web::get().to(user)),
            )
            .service(
                web::scope("/api/books")
                    .route("", web::post().to(create_book))
                    .route("", web::get().to(list_books))
                    .route("/{id}", web::get().to(get_book))
                    .route("/{id}", web::delete().to(delete_book)),
            )
    })
    .listen(listener)?
    .workers(workers)
    .run()
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(())
}
