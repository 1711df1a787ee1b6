#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use pawnest::{
    auth::AuthService,
    handlers::{
        add_favorite, apply_for_pet, delete_pet, get_pet, health, list_pets, list_stories, login,
        my_applications, my_favorites, my_pets, my_profile, oauth_callback, oauth_start,
        publish_pet, refresh, remove_favorite, sign_out, signup, signup_username, update_my_profile,
    },
    provider::{GoTrueProvider, IdentityProvider},
    settings::PawnestSettings,
    store::{DataStore, PostgrestStore},
    utils::cookies::CookieFactory,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = PawnestSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    // Clients for the platform's auth and data APIs
    let provider: Arc<dyn IdentityProvider> = Arc::new(
        GoTrueProvider::from_settings(&settings).map_err(|e| {
            std::io::Error::other(format!("Failed to configure auth platform client: {e}"))
        })?,
    );
    let store = Arc::new(PostgrestStore::from_settings(&settings).map_err(|e| {
        std::io::Error::other(format!("Failed to configure data API client: {e}"))
    })?);

    println!("✓ Using identity platform at {}", settings.platform.base_url);
    start_server(provider, store, settings).await
}

/// Start the server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(
    provider: Arc<dyn IdentityProvider>,
    store: Arc<PostgrestStore>,
    settings: PawnestSettings,
) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    let auth_service = AuthService::new(provider.clone(), store.clone());
    let cookie_factory = CookieFactory::from_settings(&settings);
    let data_store: Arc<dyn DataStore> = store;

    // Configure CORS for browser clients
    let cors_origins = settings.get_cors_origins();

    HttpServer::new(move || {
        let cors_origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                cors_origins
                    .iter()
                    .any(|allowed| allowed == origin.to_str().unwrap_or(""))
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(settings.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(cookie_factory.clone()))
            .app_data(web::Data::from(provider.clone()))
            .app_data(web::Data::from(data_store.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .configure(configure_services)
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg
        // Credential endpoints
        .route("/auth/login", web::post().to(login))
        .route("/auth/signup", web::post().to(signup))
        .route("/auth/signup_username", web::post().to(signup_username))
        .route("/auth/sign_out", web::get().to(sign_out))
        .route("/auth/sign_out", web::post().to(sign_out))
        .route("/auth/refresh", web::post().to(refresh))
        // Federated sign-in endpoints
        .route("/auth/oauth/{provider}", web::get().to(oauth_start))
        .route("/auth/callback", web::get().to(oauth_callback))
        // Pet listing endpoints
        .route("/api/pets", web::get().to(list_pets))
        .route("/api/pets", web::post().to(publish_pet))
        .route("/api/pets/{id}", web::get().to(get_pet))
        .route("/api/pets/{id}", web::delete().to(delete_pet))
        .route("/api/my/pets", web::get().to(my_pets))
        // Adoption application endpoints
        .route("/api/pets/{id}/applications", web::post().to(apply_for_pet))
        .route("/api/my/applications", web::get().to(my_applications))
        // Favorites endpoints
        .route("/api/pets/{id}/favorite", web::put().to(add_favorite))
        .route("/api/pets/{id}/favorite", web::delete().to(remove_favorite))
        .route("/api/my/favorites", web::get().to(my_favorites))
        // Success story endpoint
        .route("/api/stories", web::get().to(list_stories))
        // Profile endpoints
        .route("/api/me", web::get().to(my_profile))
        .route("/api/me", web::patch().to(update_my_profile))
        // Health endpoint
        .route("/ping", web::get().to(health));
}

fn print_startup_info(bind_address: &str, settings: &PawnestSettings) {
    println!("Starting Pawnest adoption API on http://{bind_address}");
    println!();
    println!("Credential endpoints:");
    println!("  POST /auth/login           - Sign in with email, mobile number, or username");
    println!("  POST /auth/signup          - Register with username + email or mobile number");
    println!("  POST /auth/signup_username - Register with username only");
    println!("  GET|POST /auth/sign_out    - Clear session");
    println!("  POST /auth/refresh         - Rotate session cookies");
    println!();
    println!("Federated sign-in:");
    println!("  GET  /auth/oauth/{{provider}} - Start hosted sign-in");
    println!();
    println!("Callback URL for the identity platform:");
    println!("  {}/auth/callback", settings.application.redirect_base_url);
    println!();
    println!("Marketplace endpoints:");
    println!("  GET    /api/pets                   - Browse adoptable pets");
    println!("  POST   /api/pets                   - Publish a listing");
    println!("  GET    /api/pets/{{id}}              - Pet details");
    println!("  DELETE /api/pets/{{id}}              - Remove own listing");
    println!("  POST   /api/pets/{{id}}/applications - Apply to adopt");
    println!("  PUT|DELETE /api/pets/{{id}}/favorite - Save or unsave a pet");
    println!("  GET    /api/my/pets                - Own listings");
    println!("  GET    /api/my/applications        - Own applications");
    println!("  GET    /api/my/favorites           - Saved pets");
    println!("  GET    /api/stories                - Published success stories");
    println!("  GET|PATCH /api/me                  - Own profile");
    println!();
    println!("System endpoints:");
    println!("  GET  /ping            - Health check");
}
