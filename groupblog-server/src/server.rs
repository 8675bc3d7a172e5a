use std::sync::Arc;
use std::time::Duration;

use crate::application::feed_service::FeedService;
use crate::application::follow_service::FollowService;
use crate::application::group_service::GroupService;
use crate::application::pagination::Paginator;
use crate::application::post_service::PostService;
use crate::application::user_service::UserService;
use crate::data::comment_repository::{CommentRepository, PostgresCommentRepository};
use crate::data::follow_repository::{FollowRepository, PostgresFollowRepository};
use crate::data::group_repository::{GroupRepository, PostgresGroupRepository};
use crate::data::post_repository::{PostRepository, PostgresPostRepository};
use crate::data::user_repository::{PostgresUserRepository, UserRepository};
use crate::infrastructure::cache::ListingCache;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::handlers;
use crate::presentation::middleware::{JwtAuthMiddleware, RequestIdMiddleware, TimingMiddleware};
use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            groups: Arc::new(PostgresGroupRepository::new(pool.clone())),
            posts: Arc::new(PostgresPostRepository::new(pool.clone())),
            comments: Arc::new(PostgresCommentRepository::new(pool.clone())),
            follows: Arc::new(PostgresFollowRepository::new(pool)),
        }
    }
}

/// Everything the HTTP layer needs, cloned into each worker.
#[derive(Clone)]
pub struct AppServices {
    pub feed: FeedService,
    pub posts: PostService,
    pub follows: FollowService,
    pub groups: GroupService,
    pub users: UserService,
    pub keys: JwtKeys,
}

impl AppServices {
    pub fn new(
        repos: Repositories,
        paginator: Paginator,
        cache: Arc<ListingCache>,
        cache_ttl: Duration,
        keys: JwtKeys,
    ) -> Self {
        Self {
            feed: FeedService::new(
                Arc::clone(&repos.posts),
                paginator,
                cache,
                cache_ttl,
            ),
            posts: PostService::new(
                Arc::clone(&repos.posts),
                Arc::clone(&repos.groups),
                Arc::clone(&repos.comments),
            ),
            follows: FollowService::new(Arc::clone(&repos.users), Arc::clone(&repos.follows)),
            groups: GroupService::new(Arc::clone(&repos.groups)),
            users: UserService::new(repos.users),
            keys,
        }
    }
}

/// Registers application state and the `/api` routes. Public routes come
/// first; everything else sits behind [`JwtAuthMiddleware`].
pub fn configure(cfg: &mut web::ServiceConfig, services: &AppServices) {
    cfg.app_data(web::Data::new(services.feed.clone()))
        .app_data(web::Data::new(services.posts.clone()))
        .app_data(web::Data::new(services.follows.clone()))
        .app_data(web::Data::new(services.groups.clone()))
        .app_data(web::Data::new(services.users.clone()))
        .app_data(web::Data::new(services.keys.clone()))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health))
                .service(handlers::feed::index)
                .service(handlers::feed::group_posts)
                .service(handlers::feed::profile)
                .service(handlers::post::post_detail)
                .service(handlers::group::list_groups)
                .service(
                    web::scope("")
                        .wrap(JwtAuthMiddleware::new(services.keys.clone()))
                        .service(handlers::post::create_post)
                        .service(handlers::post::update_post)
                        .service(handlers::post::add_comment)
                        .service(handlers::group::create_group)
                        .service(handlers::feed::follow_index)
                        .service(handlers::follow::profile_follow)
                        .service(handlers::follow::profile_unfollow),
                ),
        );
}

pub async fn start_rest_server(config: AppConfig, services: AppServices) -> anyhow::Result<()> {
    let bind_address = (config.host.clone(), config.port);

    info!(
        host = %bind_address.0,
        port = bind_address.1,
        "HTTP server starting"
    );

    HttpServer::new(move || {
        let cors = build_cors(&config);

        App::new()
            .wrap(Logger::default())
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    .add(("Permissions-Policy", "geolocation=()"))
                    .add(("Cross-Origin-Opener-Policy", "same-origin")),
            )
            .wrap(cors)
            .configure(|cfg| configure(cfg, &services))
    })
    .bind(bind_address)?
    .run()
    .await
    .map_err(anyhow::Error::new)?;

    Ok(())
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .supports_credentials()
        .max_age(3600);

    for origin in &config.cors_origins {
        cors = if origin == "*" {
            cors.allow_any_origin()
        } else {
            cors.allowed_origin(origin)
        };
    }

    cors
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}
