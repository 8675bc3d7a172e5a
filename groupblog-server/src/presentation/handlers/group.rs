use crate::application::group_service::GroupService;
use crate::domain::error::DomainError;
use crate::presentation::dto::CreateGroupRequest;
use crate::presentation::utils::{AuthenticatedUser, request_id};
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::info;

#[get("/groups")]
async fn list_groups(groups: web::Data<GroupService>) -> Result<HttpResponse, DomainError> {
    let groups = groups.list_groups().await?;
    Ok(HttpResponse::Ok().json(groups))
}

#[post("/groups")]
async fn create_group(
    req: HttpRequest,
    user: AuthenticatedUser,
    groups: web::Data<GroupService>,
    payload: web::Json<CreateGroupRequest>,
) -> Result<HttpResponse, DomainError> {
    let CreateGroupRequest {
        title,
        slug,
        description,
    } = payload.into_inner();
    let group = groups.create_group(title, slug, description).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        slug = %group.slug,
        "group created"
    );

    Ok(HttpResponse::Created().json(group))
}
