use crate::api::{CurrentUser, API};
use crate::db_conn::Db;
use crate::entity::{EntityKind, EntityRef};
use crate::models::Upvote;
use rocket::serde::json::{json, Value};

async fn upvote_state(db: &Db, target: EntityRef, upvoted: bool) -> API<Value> {
    let n = Upvote::count(db, target).await?;
    Ok(json!({
        "upvoted": upvoted,
        "n_upvotes": n,
    }))
}

#[get("/upvote/<entity>/<id>")]
pub async fn get_upvote(entity: EntityKind, id: i32, user: CurrentUser, db: Db) -> API<Value> {
    let target = entity.with_id(id);
    let upvoted = Upvote::has(&db, target, user.id).await?;
    upvote_state(&db, target, upvoted).await
}

#[post("/upvote/<entity>/<id>")]
pub async fn toggle_upvote(entity: EntityKind, id: i32, user: CurrentUser, db: Db) -> API<Value> {
    let target = entity.with_id(id);
    target.owner_id(&db).await?;
    let upvoted = Upvote::toggle(&db, target, user.id).await?;
    upvote_state(&db, target, upvoted).await
}
