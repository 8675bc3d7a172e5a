use crate::application::follow_service::FollowService;
use crate::domain::error::DomainError;
use crate::presentation::dto::FollowResponse;
use crate::presentation::utils::{AuthenticatedUser, request_id};
use actix_web::{HttpRequest, HttpResponse, delete, post, web};
use tracing::info;

#[post("/profiles/{username}/follow")]
async fn profile_follow(
    req: HttpRequest,
    user: AuthenticatedUser,
    follows: web::Data<FollowService>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    let author = follows.resolve_author(&path.into_inner()).await?;
    let edge = follows.follow(user.id, author.id).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        author = %author.username,
        "follow requested"
    );

    Ok(HttpResponse::Ok().json(FollowResponse {
        author: author.username,
        following: edge.is_some(),
        edge,
    }))
}

#[delete("/profiles/{username}/follow")]
async fn profile_unfollow(
    req: HttpRequest,
    user: AuthenticatedUser,
    follows: web::Data<FollowService>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    let author = follows.resolve_author(&path.into_inner()).await?;
    follows.unfollow(user.id, author.id).await?;
    let following = follows.is_following(user.id, author.id).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        author = %author.username,
        "unfollow requested"
    );

    Ok(HttpResponse::Ok().json(FollowResponse {
        author: author.username,
        following,
        edge: None,
    }))
}
