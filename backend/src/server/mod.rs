//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{ServerConfig, ServerConfigError};

use state_builders::{build_http_state, build_stores};

use actix_cors::Cors;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{Method, header};
use actix_web::{App, HttpServer, web};
use tracing::info;

use grocer::Trace;
#[cfg(debug_assertions)]
use grocer::doc::ApiDoc;
use grocer::inbound::http::auth_config::AuthSettings;
use grocer::inbound::http::health::{HealthState, live, ready};
use grocer::inbound::http::lists;
use grocer::inbound::http::state::HttpState;
use grocer::inbound::http::users::{current_user, signin, signout, signup};
use grocer::inbound::http::validation::json_error_handler;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    cors_origins: Vec<String>,
}

fn build_cors(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allowed_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .supports_credentials()
        .max_age(3600);
    origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        cors_origins,
    } = deps;

    let api = web::scope("/api/v1")
        .service(signup)
        .service(signin)
        .service(signout)
        .service(current_user)
        .configure(lists::configure);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(build_cors(&cors_origins))
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server from loaded settings.
///
/// Selects the store adapters, wires the services, binds the listener, and
/// marks `health_state` ready once the socket is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when settings are invalid, the store cannot
/// be prepared, or binding the socket fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
    auth: AuthSettings,
) -> std::io::Result<Server> {
    let bind_addr = config.bind_addr().map_err(std::io::Error::other)?;
    let store_timeout = config.store_timeout().map_err(std::io::Error::other)?;
    let stores = build_stores(&config, store_timeout).await?;
    let http_state = build_http_state(stores, &auth, store_timeout);
    let cors_origins = config.cors_origins();

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            cors_origins: cors_origins.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    Ok(server)
}
