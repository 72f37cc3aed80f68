use crate::api::school::{s2output, SchoolOutput};
use crate::api::{u2output, CurrentUser, UserOutput, API, RECENT_DAYS, TOP_LIMIT};
use crate::db_conn::Db;
use crate::models::*;
use chrono::{offset::Utc, DateTime};
use log::info;
use rocket::form::Form;
use rocket::serde::{json::Json, Serialize};

#[derive(FromForm)]
pub struct ReportInput {
    school: i32,
    #[field(validate = len(1..10001))]
    content: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ReportOutput {
    id: i32,
    school: SchoolOutput,
    content: String,
    reporter: UserOutput,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub fn rp2output((r, s, u): &ReportRow) -> ReportOutput {
    ReportOutput {
        id: r.id,
        school: s2output(s),
        content: r.content.to_string(),
        reporter: u2output(u),
        created_at: r.created_at,
        updated_at: r.updated_at,
    }
}

#[get("/report/<id>")]
pub async fn get_one(id: i32, db: Db) -> API<Json<ReportOutput>> {
    let row = Report::get_row(&db, id).await?;
    Ok(Json(rp2output(&row)))
}

#[get("/reports/top")]
pub async fn get_top(db: Db) -> API<Json<Vec<ReportOutput>>> {
    let rows = Report::gets_recent(&db, RECENT_DAYS, TOP_LIMIT).await?;
    Ok(Json(rows.iter().map(rp2output).collect()))
}

#[post("/reports", data = "<rpi>")]
pub async fn add_report(rpi: Form<ReportInput>, user: CurrentUser, db: Db) -> API<Json<ReportOutput>> {
    let rpi = rpi.into_inner();
    let r = Report::upsert(
        &db,
        NewReport {
            content: rpi.content,
            school_id: rpi.school,
            reporter_id: user.id,
        },
    )
    .await?;
    info!("user {} reported on school {}", user.username, r.school_id);
    let row = Report::get_row(&db, r.id).await?;
    Ok(Json(rp2output(&row)))
}
