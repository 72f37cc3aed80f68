use crate::api::school::{s2output, SchoolOutput};
use crate::api::{u2output, CurrentUser, UserOutput, API, RECENT_DAYS, TOP_LIMIT};
use crate::db_conn::Db;
use crate::models::*;
use chrono::{offset::Utc, DateTime};
use log::info;
use rocket::form::Form;
use rocket::serde::{json::Json, Serialize};

#[derive(FromForm)]
pub struct ReviewInput {
    school: i32,
    #[field(validate = len(1..10001))]
    content: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ReviewOutput {
    id: i32,
    school: SchoolOutput,
    content: String,
    reviewer: UserOutput,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub fn rv2output((r, s, u): &ReviewRow) -> ReviewOutput {
    ReviewOutput {
        id: r.id,
        school: s2output(s),
        content: r.content.to_string(),
        reviewer: u2output(u),
        created_at: r.created_at,
        updated_at: r.updated_at,
    }
}

#[get("/review/<id>")]
pub async fn get_one(id: i32, db: Db) -> API<Json<ReviewOutput>> {
    let row = Review::get_row(&db, id).await?;
    Ok(Json(rv2output(&row)))
}

#[get("/reviews/top")]
pub async fn get_top(db: Db) -> API<Json<Vec<ReviewOutput>>> {
    let rows = Review::gets_recent(&db, RECENT_DAYS, TOP_LIMIT).await?;
    Ok(Json(rows.iter().map(rv2output).collect()))
}

#[post("/reviews", data = "<ri>")]
pub async fn add_review(ri: Form<ReviewInput>, user: CurrentUser, db: Db) -> API<Json<ReviewOutput>> {
    let ri = ri.into_inner();
    let r = Review::upsert(
        &db,
        NewReview {
            content: ri.content,
            school_id: ri.school,
            reviewer_id: user.id,
        },
    )
    .await?;
    info!("user {} reviewed school {}", user.username, r.school_id);
    let row = Review::get_row(&db, r.id).await?;
    Ok(Json(rv2output(&row)))
}
