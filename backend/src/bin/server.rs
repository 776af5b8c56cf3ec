#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), forbid(clippy::expect_used))]
//! HTTP entry-point: serves the résumé analysis endpoint (C4) plus health
//! probes and, in debug builds, Swagger UI.

#[cfg(feature = "metrics")]
use actix_service::{
    Service, Transform,
    boxed::{self, BoxService},
};
#[cfg(feature = "metrics")]
use actix_web::body::BoxBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
#[cfg(feature = "metrics")]
use actix_web::middleware::{Compat, Identity};
use actix_web::{App, HttpServer, web};
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
#[cfg(feature = "metrics")]
use futures_util::future::LocalBoxFuture;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::domain::llm_dispatcher::{Dispatcher, TokioSleeper};
use backend::domain::ports::{NoOpDispatcherMetrics, NoOpMatcherMetrics};
use backend::domain::resume_analyzer::ResumeAnalyzer;
use backend::domain::vector_matcher::VectorMatcher;
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::resume::analyze_resume;
use backend::inbound::http::state::HttpState;
use backend::outbound::llm::ReqwestLlmClient;
use backend::outbound::persistence::{DbPool, DieselJobRepository, PoolConfig};
use backend::server::ServerConfig;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .app_data(http_state)
        .service(analyze_resume);

    let app = App::new()
        .app_data(health_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app =
        app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

#[cfg(feature = "metrics")]
fn make_metrics() -> Result<actix_web_prom::PrometheusMetrics, Box<dyn std::error::Error + Send + Sync>>
{
    PrometheusMetricsBuilder::new("dispatch_core")
        .endpoint("/metrics")
        .build()
}

#[cfg(feature = "metrics")]
fn initialize_metrics<F, E>(make: F) -> Option<actix_web_prom::PrometheusMetrics>
where
    F: FnOnce() -> Result<actix_web_prom::PrometheusMetrics, E>,
    E: std::fmt::Display,
{
    match make() {
        Ok(metrics) => Some(metrics),
        Err(error) => {
            warn!(
                error = %error,
                "failed to initialize Prometheus metrics; continuing without metrics"
            );
            None
        }
    }
}

/// Wire the dispatcher, repository, and matcher into an [`HttpState`].
///
/// # Errors
/// Returns an error if the database pool cannot be established.
async fn build_http_state(
    config: &ServerConfig,
) -> Result<web::Data<HttpState>, backend::outbound::persistence::PoolError> {
    let llm_client = Arc::new(ReqwestLlmClient::new(
        reqwest::Client::new(),
        config.llm_base_url.clone(),
    ));
    let dispatcher = Arc::new(Dispatcher::new(
        config.dispatcher.clone(),
        llm_client,
        Arc::new(NoOpDispatcherMetrics),
        Arc::new(mockable::DefaultClock),
        Arc::new(TokioSleeper),
    ));

    let db_pool = DbPool::new(PoolConfig::new(config.database_url.clone())).await?;
    let repository = Arc::new(DieselJobRepository::new(db_pool));
    let matcher = Arc::new(VectorMatcher::new(
        repository.clone(),
        Arc::new(NoOpMatcherMetrics),
        config.dispatcher.embedding_dim,
    ));
    let resume_analyzer = Arc::new(ResumeAnalyzer::new(dispatcher, matcher, repository));

    Ok(web::Data::new(HttpState { resume_analyzer }))
}

#[cfg(feature = "metrics")]
#[derive(Clone)]
enum MetricsLayer {
    Enabled(Arc<actix_web_prom::PrometheusMetrics>),
    Disabled,
}

#[cfg(feature = "metrics")]
impl MetricsLayer {
    fn from_option(metrics: Option<actix_web_prom::PrometheusMetrics>) -> Self {
        match metrics {
            Some(metrics) => Self::Enabled(Arc::new(metrics)),
            None => Self::Disabled,
        }
    }
}

#[cfg(feature = "metrics")]
impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        match self.clone() {
            Self::Enabled(metrics) => {
                let fut = Compat::new((*metrics).clone()).new_transform(service);
                Box::pin(async move {
                    let svc = fut.await?;
                    Ok(boxed::service(svc))
                })
            }
            Self::Disabled => {
                let fut = Compat::new(Identity::default()).new_transform(service);
                Box::pin(async move {
                    let svc = fut.await?;
                    Ok(boxed::service(svc))
                })
            }
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = ServerConfig::from_env().map_err(std::io::Error::other)?;
    let bind_addr = config.bind_addr;
    let health_state = web::Data::new(HealthState::new());
    let http_state = build_http_state(&config)
        .await
        .map_err(std::io::Error::other)?;

    #[cfg(feature = "metrics")]
    let prometheus = initialize_metrics(make_metrics);

    let server = create_server(
        health_state.clone(),
        http_state,
        bind_addr,
        #[cfg(feature = "metrics")]
        prometheus,
    )?;
    server.await
}

#[cfg(feature = "metrics")]
fn create_server(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    bind_addr: std::net::SocketAddr,
    prometheus: Option<actix_web_prom::PrometheusMetrics>,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let app = build_app(server_health_state.clone(), http_state.clone());
        let middleware = MetricsLayer::from_option(prometheus.clone());
        app.wrap(middleware)
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(not(feature = "metrics"))]
fn create_server(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    bind_addr: std::net::SocketAddr,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let server =
        HttpServer::new(move || build_app(server_health_state.clone(), http_state.clone()))
            .bind(bind_addr)?
            .run();

    health_state.mark_ready();
    Ok(server)
}
