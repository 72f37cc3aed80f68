use crate::api::API;
use crate::db_conn::Db;
use crate::models::Criterion;
use chrono::{offset::Utc, DateTime};
use rocket::serde::{json::Json, Serialize};

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct CriterionOutput {
    id: i32,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[get("/criteria")]
pub async fn get_list(db: Db) -> API<Json<Vec<CriterionOutput>>> {
    let cs = Criterion::get_all(&db).await?;
    Ok(Json(
        cs.into_iter()
            .map(|c| CriterionOutput {
                id: c.id,
                description: c.description,
                created_at: c.created_at,
                updated_at: c.updated_at,
            })
            .collect(),
    ))
}
