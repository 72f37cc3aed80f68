use crate::api::{u2output, CurrentUser, UserOutput, API};
use crate::db_conn::Db;
use crate::entity::EntityKind;
use crate::models::*;
use crate::pagination::{Page, Paginated};
use chrono::{offset::Utc, DateTime};
use log::info;
use rocket::form::Form;
use rocket::serde::{json::Json, Serialize};

const COMMENTS_PER_PAGE: i64 = 10;

#[derive(FromForm)]
pub struct CommentInput {
    #[field(validate = len(1..4097))]
    comment: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct CommentOutput {
    id: i32,
    comment: String,
    entity: EntityKind,
    entity_id: i32,
    commenter: UserOutput,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub fn c2output((c, u): &CommentRow) -> CommentOutput {
    let target = c.target();
    CommentOutput {
        id: c.id,
        comment: c.comment.to_string(),
        entity: target.kind(),
        entity_id: target.id(),
        commenter: u2output(u),
        created_at: c.created_at,
        updated_at: c.updated_at,
    }
}

#[get("/comments/<entity>/<id>?<page>")]
pub async fn get_comments(
    entity: EntityKind,
    id: i32,
    page: Option<&str>,
    db: Db,
) -> API<Paginated<CommentOutput>> {
    let target = entity.with_id(id);
    let count = Comment::count_by_target(&db, target).await?;
    let page = Page::resolve(page, count, COMMENTS_PER_PAGE);
    let rows = Comment::gets_by_target(&db, target, page).await?;
    Ok(page.wrap(rows).map(|r| c2output(&r)))
}

#[post("/comments/<entity>/<id>", data = "<ci>")]
pub async fn add_comment(
    entity: EntityKind,
    id: i32,
    ci: Form<CommentInput>,
    user: CurrentUser,
    db: Db,
) -> API<Json<CommentOutput>> {
    let target = entity.with_id(id);
    // the target must exist; comments carry no foreign key
    target.owner_id(&db).await?;
    let c = Comment::create(
        &db,
        NewComment {
            comment: ci.into_inner().comment,
            entity: target.kind(),
            entity_id: target.id(),
            commenter_id: user.id,
        },
    )
    .await?;
    info!("user {} commented on {} {}", user.username, entity, id);
    let commenter = User::get(&db, user.id).await?;
    Ok(Json(c2output(&(c, commenter))))
}
