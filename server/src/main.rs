#[cfg(feature = "ssr")]
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use clap::Parser;
    use device_console::{
        api::{AppState, create_api_router},
        config::{AppConfig, Cli, is_security_enabled},
        web::app::App,
    };
    use leptos::get_configuration;
    use leptos_axum::{LeptosRoutes, generate_route_list};
    use tower::ServiceBuilder;
    use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
    use tracing::info;
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "device_console={level},device_wizard={level},tower_http=debug",
            level = config.logging.level
        ))
    });
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json_format {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let security_enabled = is_security_enabled();
    info!(
        "Starting device console, core-metadata at {}, security {}",
        config.metadata.base_url,
        if security_enabled { "enabled" } else { "disabled" }
    );

    let app_state = AppState::new(config.clone(), security_enabled)?;

    // cargo-leptos provides the site settings through the environment
    let conf = get_configuration(None).await?;
    let mut leptos_options = conf.leptos_options;
    leptos_options.site_addr = config.bind_address().parse()?;
    let addr = leptos_options.site_addr;
    let routes = generate_route_list(App);

    let api_routes = create_api_router().with_state(app_state);

    let web_routes = Router::new()
        .leptos_routes(&leptos_options, routes, App)
        .fallback(file_and_error_handler)
        .nest_service("/pkg", ServeDir::new(format!("{}/pkg", leptos_options.site_root)))
        .nest_service("/assets", ServeDir::new(&config.server.static_dir))
        .with_state(leptos_options.clone());

    let app = Router::<()>::new()
        .merge(api_routes)
        .merge(web_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Device console listening on http://{}", &addr);
    info!("Add device wizard at /metadata/add-device");

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

#[cfg(feature = "ssr")]
async fn file_and_error_handler(
    uri: axum::http::Uri,
    State(options): State<leptos::LeptosOptions>,
) -> Result<Response, (StatusCode, String)> {
    let root = options.site_root.clone();
    let (status, file) = get_static_file(uri.clone(), &root).await?;

    if status == StatusCode::OK {
        return Ok(file.into_response());
    }

    let request = build_request(uri)?;
    let handler = leptos_axum::render_app_to_stream(options.to_owned(), device_console::web::app::App);
    Ok(handler(request).await.into_response())
}

#[cfg(feature = "ssr")]
fn build_request(uri: axum::http::Uri) -> Result<axum::http::Request<axum::body::Body>, (StatusCode, String)> {
    axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, format!("Invalid request: {err}")))
}

#[cfg(feature = "ssr")]
async fn get_static_file(
    uri: axum::http::Uri,
    root: &str,
) -> Result<(StatusCode, Response), (StatusCode, String)> {
    let req = build_request(uri)?;

    // `ServeDir` implements `tower::Service` so it can be driven with `oneshot`
    match tower::ServiceExt::oneshot(tower_http::services::ServeDir::new(root), req).await {
        Ok(res) => Ok((res.status(), res.into_response())),
        Err(err) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Something went wrong: {err}"),
        )),
    }
}

#[cfg(not(feature = "ssr"))]
pub fn main() {
    // client-side entry is `device_console::hydrate`
}
