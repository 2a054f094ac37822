use std::{process, sync::Arc};

use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;
use vireo::{
    application::{
        comments::CommentService,
        error::AppError,
        feed::FeedService,
        follows::FollowService,
        identity::{IdentityResolver, StoreIdentity},
        posts::PostService,
        repos::{CommentsRepo, FollowsRepo, GroupsRepo, HealthRepo, PostsRepo, PostsWriteRepo, UsersRepo},
    },
    cache::{CacheState, FeedCache},
    config,
    infra::{db::PostgresRepositories, error::InfraError, http, telemetry},
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let repositories = init_repositories(&settings).await?;
    let state = build_http_state(repositories, &settings);

    serve_http(&settings, state).await
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_http_state(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> http::HttpState {
    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let groups_repo: Arc<dyn GroupsRepo> = repositories.clone();
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = repositories.clone();
    let comments_repo: Arc<dyn CommentsRepo> = repositories.clone();
    let follows_repo: Arc<dyn FollowsRepo> = repositories.clone();
    let health_repo: Arc<dyn HealthRepo> = repositories.clone();

    let cache = Arc::new(FeedCache::new(settings.cache.clone()));
    let cache_state = settings
        .cache
        .enabled
        .then(|| CacheState {
            store: cache.clone(),
        });

    let feed = Arc::new(FeedService::new(
        users_repo.clone(),
        groups_repo.clone(),
        posts_repo.clone(),
        comments_repo.clone(),
        follows_repo.clone(),
        settings.feed.page_size,
    ));
    let posts = Arc::new(PostService::new(
        posts_repo.clone(),
        posts_write_repo,
        groups_repo,
        cache,
    ));
    let comments = Arc::new(CommentService::new(posts_repo, comments_repo));
    let follows = Arc::new(FollowService::new(users_repo.clone(), follows_repo));
    let identity: Arc<dyn IdentityResolver> = Arc::new(StoreIdentity::new(users_repo));

    http::HttpState {
        feed,
        posts,
        comments,
        follows,
        identity,
        health: health_repo,
        cache: cache_state,
    }
}

async fn serve_http(settings: &config::Settings, state: http::HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(addr = %settings.server.public_addr, "listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
}
