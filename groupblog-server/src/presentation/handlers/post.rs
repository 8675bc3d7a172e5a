use crate::application::post_service::PostService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{CreateCommentRequest, CreatePostRequest, UpdatePostRequest};
use crate::presentation::utils::{AuthenticatedUser, request_id};
use actix_web::{HttpRequest, HttpResponse, get, post, put, web};
use tracing::info;
use uuid::Uuid;

#[get("/posts/{id}")]
async fn post_detail(
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let detail = posts.post_detail(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[post("/posts")]
async fn create_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    payload: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, DomainError> {
    let CreatePostRequest { text, group, image } = payload.into_inner();
    let post = posts.create_post(user.id, text, group, image).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id = %post.id,
        "post created"
    );

    Ok(HttpResponse::Created().json(post))
}

#[put("/posts/{id}")]
async fn update_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
    payload: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let UpdatePostRequest { text, group, image } = payload.into_inner();
    let post = posts
        .edit_post(user.id, post_id, text, group, image)
        .await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id = %post_id,
        "post updated"
    );

    Ok(HttpResponse::Ok().json(post))
}

#[post("/posts/{id}/comments")]
async fn add_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
    payload: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let comment = posts
        .add_comment(user.id, post_id, payload.into_inner().text)
        .await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id = %post_id,
        "comment added"
    );

    Ok(HttpResponse::Created().json(comment))
}
