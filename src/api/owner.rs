use crate::api::{CurrentUser, API};
use crate::db_conn::Db;
use crate::entity::EntityKind;
use rocket::serde::json::{json, Value};

#[get("/check-owner/<entity>/<id>")]
pub async fn check_owner(entity: EntityKind, id: i32, user: CurrentUser, db: Db) -> API<Value> {
    let owner = entity.with_id(id).owner_id(&db).await?;
    Ok(json!({
        "own": owner == user.id,
    }))
}
