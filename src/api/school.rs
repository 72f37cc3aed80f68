use crate::api::report::{rp2output, ReportOutput};
use crate::api::review::{rv2output, ReviewOutput};
use crate::api::API;
use crate::db_conn::Db;
use crate::models::*;
use crate::pagination::{Page, Paginated};
use chrono::{offset::Utc, DateTime};
use rocket::serde::{json::Json, Serialize};

const REVIEWS_PER_PAGE: i64 = 1;
const REPORTS_PER_PAGE: i64 = 10;
const SRHI_PER_PAGE: i64 = 20;

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SchoolOutput {
    id: i32,
    name: String,
    description: String,
    location: String,
    website: String,
    rating: f64,
    rank: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SchoolBrief {
    id: i32,
    name: String,
    created_at: DateTime<Utc>,
}

pub fn s2output(s: &School) -> SchoolOutput {
    SchoolOutput {
        id: s.id,
        name: s.name.to_string(),
        description: s.description.to_string(),
        location: s.location.to_string(),
        website: s.website.to_string(),
        rating: s.rating,
        rank: s.rank,
        created_at: s.created_at,
        updated_at: s.updated_at,
    }
}

fn ss2outputs(ss: &[School]) -> Vec<SchoolOutput> {
    ss.iter().map(s2output).collect()
}

#[get("/school/<id>")]
pub async fn get_one(id: i32, db: Db) -> API<Json<SchoolOutput>> {
    let s = School::get(&db, id).await?;
    Ok(Json(s2output(&s)))
}

#[get("/school/<id>/reviews?<page>")]
pub async fn get_reviews(id: i32, page: Option<&str>, db: Db) -> API<Paginated<ReviewOutput>> {
    let count = Review::count_by_school(&db, id).await?;
    let page = Page::resolve(page, count, REVIEWS_PER_PAGE);
    let rows = Review::gets_by_school(&db, id, page).await?;
    Ok(page.wrap(rows).map(|r| rv2output(&r)))
}

#[get("/school/<id>/reports?<page>")]
pub async fn get_reports(id: i32, page: Option<&str>, db: Db) -> API<Paginated<ReportOutput>> {
    let count = Report::count_by_school(&db, id).await?;
    let page = Page::resolve(page, count, REPORTS_PER_PAGE);
    let rows = Report::gets_by_school(&db, id, page).await?;
    Ok(page.wrap(rows).map(|r| rp2output(&r)))
}

#[get("/schools")]
pub async fn get_list(db: Db) -> API<Json<Vec<SchoolBrief>>> {
    let ss = School::get_all(&db).await?;
    Ok(Json(
        ss.into_iter()
            .map(|s| SchoolBrief {
                id: s.id,
                name: s.name,
                created_at: s.created_at,
            })
            .collect(),
    ))
}

/// First schools by id, not by rank.
#[get("/schools/top")]
pub async fn get_top(db: Db) -> API<Json<Vec<SchoolOutput>>> {
    let ss = School::get_top(&db, super::TOP_LIMIT).await?;
    Ok(Json(ss2outputs(&ss)))
}

#[get("/srhi?<page>")]
pub async fn get_srhi(page: Option<&str>, db: Db) -> API<Paginated<SchoolOutput>> {
    let count = School::count(&db).await?;
    let page = Page::resolve(page, count, SRHI_PER_PAGE);
    let ss = School::gets_by_rank(&db, page).await?;
    Ok(page.wrap(ss).map(|s| s2output(&s)))
}

#[get("/school/<school_id>/rated-higher")]
pub async fn get_rated_higher(school_id: i32, db: Db) -> API<Json<Vec<SchoolOutput>>> {
    let s = School::get(&db, school_id).await?;
    let ss = School::rated_lower_than(&db, s.rating).await?;
    Ok(Json(ss2outputs(&ss)))
}
