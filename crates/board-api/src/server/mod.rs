//! Server setup and initialization
//!
//! Provides the application builder, dependency wiring and the server runner.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use board_common::{AppConfig, AppError, AppResult, JwtService};
use board_core::SnowflakeGenerator;
use board_db::{
    create_pool, run_migrations, PgCommentRepository, PgFollowRepository, PgPostRepository,
    PgTopicRepository, PgUserRepository,
};
use board_service::services::UserService;
use board_service::{AgentController, GeminiGenerator, ServiceContextBuilder};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::{apply_middleware, apply_rate_limit};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> AppResult<Router> {
    let config = state.config();
    let api = apply_rate_limit(create_router(), &config.rate_limit)?;
    let router = apply_middleware(
        api.merge(health_routes()),
        &config.cors,
        config.app.env.is_production(),
    );
    Ok(router.with_state(state))
}

/// Connect to the store, apply migrations and wire every dependency
///
/// The agent is created only when it is enabled and has an API key; it is
/// returned stopped.
pub async fn create_app_state(config: AppConfig) -> AppResult<AppState> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&board_db::DatabaseConfig::from(&config.database))
        .await
        .map_err(AppError::database)?;
    run_migrations(&pool)
        .await
        .map_err(AppError::database)?;
    info!("PostgreSQL connection established");

    let jwt_service = Arc::new(JwtService::new(&config.jwt.secret, config.jwt.token_expiry));
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    let user_repo = Arc::new(PgUserRepository::new(pool.clone()));
    let post_repo = Arc::new(PgPostRepository::new(pool.clone()));
    let comment_repo = Arc::new(PgCommentRepository::new(pool.clone()));
    let topic_repo = Arc::new(PgTopicRepository::new(pool.clone()));
    let follow_repo = Arc::new(PgFollowRepository::new(pool.clone()));

    let mut builder = ServiceContextBuilder::new()
        .user_repo(user_repo)
        .post_repo(post_repo.clone())
        .comment_repo(comment_repo.clone())
        .topic_repo(topic_repo)
        .follow_repo(follow_repo)
        .jwt_service(jwt_service)
        .snowflake_generator(snowflake_generator.clone())
        .interactions_limit(config.notifications.interactions_limit);

    if config.agent.is_active() {
        let generator = GeminiGenerator::new(&config.agent).map_err(AppError::config)?;
        let agent = AgentController::new(
            &config.agent,
            post_repo,
            comment_repo,
            Arc::new(generator),
            snowflake_generator,
        );
        info!(
            persona_id = config.agent.persona.id,
            model = %config.agent.model,
            "Persona agent configured"
        );
        builder = builder.agent(Arc::new(agent));
    } else {
        warn!("Persona agent disabled (AGENT_ENABLED is false or GEMINI_API_KEY is unset)");
    }

    let service_context = builder.build().map_err(AppError::config)?;

    if service_context.agent().is_some() {
        UserService::new(&service_context)
            .ensure_persona(&config.agent.persona)
            .await
            .map_err(AppError::database)?;
    }

    Ok(AppState::new(service_context, config, pool))
}

/// Run the HTTP server until a shutdown signal arrives
pub async fn run_server(app: Router, addr: SocketAddr) -> AppResult<()> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> AppResult<()> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address: {e}")))?;

    let state = create_app_state(config).await?;
    let agent = state.service_context().agent().cloned();
    let app = create_app(state)?;

    let polling = agent.as_ref().and_then(AgentController::start);

    let result = run_server(app, addr).await;

    if let Some(agent) = agent {
        agent.stop();
    }
    if let Some(handle) = polling {
        if let Err(e) = handle.await {
            warn!(error = %e, "Agent task ended abnormally");
        }
    }

    info!("Server stopped");
    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
