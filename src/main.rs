use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use linktrack::application::ports::url_normalizer::UrlNormalizer;
use linktrack::bootstrap::app_context::{AppContext, AppServices};
use linktrack::bootstrap::config::Config;
use linktrack::domain::pages::page::SchemaRegistry;
use linktrack::infrastructure::db::repositories::files_repository_sqlx::SqlxFilesRepository;
use linktrack::infrastructure::db::repositories::link_tracking_repository_sqlx::SqlxLinkTrackingRepository;
use linktrack::infrastructure::db::repositories::page_repository_sqlx::SqlxPageRepository;
use linktrack::infrastructure::memory::InMemoryStore;
use linktrack::infrastructure::url::SiteUrlNormalizer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            linktrack::presentation::http::pages::create_page,
            linktrack::presentation::http::pages::update_page,
            linktrack::presentation::http::pages::delete_page,
            linktrack::presentation::http::pages::sync_page,
            linktrack::presentation::http::pages::resync_page_dependents,
            linktrack::presentation::http::pages::get_backlinks,
            linktrack::presentation::http::pages::get_outgoing_links,
            linktrack::presentation::http::files::get_file_usage,
            linktrack::presentation::http::files::resync_file_dependents,
            linktrack::presentation::http::reports::broken_links,
            linktrack::presentation::http::links::audit_links,
            linktrack::presentation::http::health::health,
        ),
        components(schemas(
            linktrack::presentation::http::pages::PageResponse,
            linktrack::presentation::http::pages::CreatePageRequest,
            linktrack::presentation::http::pages::UpdatePageRequest,
            linktrack::presentation::http::pages::ResyncResponse,
            linktrack::presentation::http::pages::BacklinkItem,
            linktrack::presentation::http::pages::BacklinksResponse,
            linktrack::presentation::http::pages::OutgoingLinkItem,
            linktrack::presentation::http::pages::OutgoingLinksResponse,
            linktrack::presentation::http::files::FileUsageResponse,
            linktrack::presentation::http::reports::BrokenPageItem,
            linktrack::presentation::http::reports::BrokenLinksResponse,
            linktrack::presentation::http::links::AuditRequest,
            linktrack::presentation::http::links::LinkItem,
            linktrack::presentation::http::links::AuditResponse,
            linktrack::presentation::http::health::HealthResp,
        )),
        tags(
            (name = "Pages", description = "Page drafts and their link tracking"),
            (name = "Files", description = "File usage"),
            (name = "Reports", description = "Broken link reports"),
            (name = "Links", description = "Ad-hoc link classification"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "linktrack=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(?cfg, "Starting link tracking service");

    let url_normalizer: Arc<dyn UrlNormalizer> =
        Arc::new(SiteUrlNormalizer::new(cfg.site_base_url.as_deref())?);
    let schema = SchemaRegistry::default();

    // Storage
    let (pool, services) = match &cfg.database_url {
        Some(database_url) => {
            let pool = linktrack::infrastructure::db::connect_pool(
                database_url,
                cfg.database_max_connections,
            )
            .await?;
            linktrack::infrastructure::db::migrate(&pool).await?;
            let services = AppServices::new(
                Arc::new(SqlxPageRepository::new(pool.clone())),
                Arc::new(SqlxFilesRepository::new(pool.clone())),
                Arc::new(SqlxLinkTrackingRepository::new(pool.clone())),
                url_normalizer,
                schema,
            );
            (Some(pool), services)
        }
        None => {
            warn!("DATABASE_URL not set; pages and tracking edges live in memory only");
            let store = Arc::new(InMemoryStore::default());
            (None, AppServices::in_memory(store, url_normalizer, schema))
        }
    };

    let ctx = AppContext::new(cfg.clone(), services);

    // Build CORS
    let methods = [
        http::Method::GET,
        http::Method::POST,
        http::Method::PUT,
        http::Method::DELETE,
        http::Method::OPTIONS,
    ];
    let cors = match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers([http::header::CONTENT_TYPE]),
        _ if cfg.is_production => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(HeaderValue::from_static(
                "http://invalid",
            )))
            .allow_methods(methods)
            .allow_headers([http::header::CONTENT_TYPE]),
        _ => CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(methods)
            .allow_headers([http::header::CONTENT_TYPE]),
    };

    // Build API router
    let app = Router::new()
        .nest("/api", linktrack::presentation::http::health::routes(pool))
        .nest("/api", linktrack::presentation::http::pages::routes(ctx.clone()))
        .nest("/api", linktrack::presentation::http::files::routes(ctx.clone()))
        .nest("/api", linktrack::presentation::http::reports::routes(ctx.clone()))
        .nest("/api", linktrack::presentation::http::links::routes(ctx.clone()))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;

    let api_handle: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!(?e, "Failed to listen for shutdown signal");
                }
            })
            .await?;
        Ok(())
    });

    match api_handle.await {
        Ok(Ok(())) => info!("HTTP API stopped"),
        Ok(Err(e)) => error!(?e, "API server task failed"),
        Err(e) => error!(?e, "API server task panicked"),
    }
    Ok(())
}
