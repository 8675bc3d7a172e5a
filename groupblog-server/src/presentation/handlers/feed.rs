use crate::application::feed_service::{FeedHeader, FeedScope, FeedService};
use crate::application::follow_service::FollowService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{PageQuery, ProfileResponse};
use crate::presentation::utils::{AuthenticatedUser, OptionalUser, request_id};
use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, get, web};
use tracing::info;

#[get("/posts")]
async fn index(
    req: HttpRequest,
    feed: web::Data<FeedService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let rendered = feed.index(query.page_request()).await?;

    info!(request_id = %request_id(&req), "index served");

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(rendered))
}

#[get("/groups/{slug}/posts")]
async fn group_posts(
    req: HttpRequest,
    feed: web::Data<FeedService>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let slug = path.into_inner();
    let page = feed
        .build(FeedScope::Group(slug.clone()), query.page_request())
        .await?;

    info!(
        request_id = %request_id(&req),
        slug = %slug,
        page = page.page.number,
        "group feed served"
    );

    Ok(HttpResponse::Ok().json(page))
}

#[get("/profiles/{username}")]
async fn profile(
    req: HttpRequest,
    viewer: OptionalUser,
    feed: web::Data<FeedService>,
    follows: web::Data<FollowService>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let username = path.into_inner();
    let page = feed
        .build(FeedScope::Author(username.clone()), query.page_request())
        .await?;
    let following = match (viewer.0, &page.header) {
        (Some(viewer_id), FeedHeader::Author { author }) => {
            follows.is_following(viewer_id, author.id).await?
        }
        _ => false,
    };

    info!(
        request_id = %request_id(&req),
        username = %username,
        following,
        "profile served"
    );

    Ok(HttpResponse::Ok().json(ProfileResponse {
        feed: page,
        following,
    }))
}

#[get("/follow")]
async fn follow_index(
    req: HttpRequest,
    user: AuthenticatedUser,
    feed: web::Data<FeedService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let page = feed
        .build(FeedScope::FollowedBy(user.id), query.page_request())
        .await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        "follow feed served"
    );

    Ok(HttpResponse::Ok().json(page))
}
