use crate::db_conn::Db;
use crate::models::{SaveError, User, ValidationError};
use chrono::{offset::Utc, DateTime};
use diesel::result::{DatabaseErrorKind, Error as DbError};
use log::error;
use rocket::http::Status;
use rocket::request::{self, FromRequest, Request};
use rocket::response::{self, Responder};
use rocket::serde::json::{json, Value};
use rocket::serde::Serialize;

pub const TOP_LIMIT: i64 = 5;
pub const RECENT_DAYS: i64 = 90;

#[catch(401)]
pub fn catch_401_error() -> Value {
    json!({
        "code": -1,
        "msg": "authentication credentials were not provided or are invalid"
    })
}

#[catch(404)]
pub fn catch_404_error() -> Value {
    json!({
        "code": -1,
        "msg": "not found"
    })
}

#[catch(422)]
pub fn catch_422_error() -> Value {
    json!({
        "code": -1,
        "msg": "malformed request"
    })
}

/// The authenticated caller, resolved from `Authorization: Token <key>`.
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    pub token: String,
}

fn token_from_header(header: &str) -> Option<&str> {
    header
        .strip_prefix("Token ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = ();
    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let token = match request
            .headers()
            .get_one("Authorization")
            .and_then(token_from_header)
        {
            Some(t) => t.to_string(),
            None => return request::Outcome::Failure((Status::Unauthorized, ())),
        };
        let db = match request.guard::<Db>().await {
            request::Outcome::Success(db) => db,
            _ => return request::Outcome::Failure((Status::ServiceUnavailable, ())),
        };
        match User::get_by_token(&db, token.clone()).await {
            Ok(Some(u)) => request::Outcome::Success(CurrentUser {
                id: u.id,
                username: u.username,
                token,
            }),
            Ok(None) => request::Outcome::Failure((Status::Unauthorized, ())),
            Err(e) => {
                error!("token lookup failed: {}", e);
                request::Outcome::Failure((Status::InternalServerError, ()))
            }
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct UserOutput {
    id: i32,
    username: String,
    email: String,
    date_joined: DateTime<Utc>,
    is_active: bool,
    last_login: Option<DateTime<Utc>>,
}

pub fn u2output(u: &User) -> UserOutput {
    UserOutput {
        id: u.id,
        username: u.username.to_string(),
        email: u.email.to_string(),
        date_joined: u.date_joined,
        is_active: u.is_active,
        last_login: u.last_login,
    }
}

#[derive(Debug)]
pub enum PolicyError {
    Invalid(ValidationError),
    MalformedPayload,
    UsernameTaken,
    BadCredentials,
}

#[derive(Debug)]
pub enum APIError {
    DbError(DbError),
    PcError(PolicyError),
}

impl From<DbError> for APIError {
    fn from(err: DbError) -> APIError {
        APIError::DbError(err)
    }
}

impl From<PolicyError> for APIError {
    fn from(err: PolicyError) -> APIError {
        APIError::PcError(err)
    }
}

impl From<ValidationError> for APIError {
    fn from(err: ValidationError) -> APIError {
        APIError::PcError(PolicyError::Invalid(err))
    }
}

impl From<SaveError> for APIError {
    fn from(err: SaveError) -> APIError {
        match err {
            SaveError::Invalid(e) => e.into(),
            SaveError::Db(e) => e.into(),
        }
    }
}

impl APIError {
    fn status_and_msg(&self) -> (Status, String) {
        match self {
            APIError::DbError(DbError::NotFound) => (Status::NotFound, "not found".to_string()),
            APIError::DbError(DbError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => (
                Status::NotFound,
                "referenced record does not exist".to_string(),
            ),
            APIError::DbError(e) => (Status::InternalServerError, e.to_string()),
            APIError::PcError(e) => match e {
                PolicyError::Invalid(v) => (Status::BadRequest, v.to_string()),
                PolicyError::MalformedPayload => {
                    (Status::BadRequest, "malformed payload".to_string())
                }
                PolicyError::UsernameTaken => {
                    (Status::BadRequest, "username already exists".to_string())
                }
                PolicyError::BadCredentials => (
                    Status::BadRequest,
                    "unable to log in with provided credentials".to_string(),
                ),
            },
        }
    }
}

impl<'r> Responder<'r, 'static> for APIError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let (status, msg) = self.status_and_msg();
        if status == Status::InternalServerError {
            error!("{} {}: {}", req.method(), req.uri(), msg);
        }
        (
            status,
            json!({
                "code": -1,
                "msg": msg
            }),
        )
            .respond_to(req)
    }
}

pub type API<T> = Result<T, APIError>;

pub mod comment;
pub mod criterion;
pub mod owner;
pub mod rating;
pub mod report;
pub mod review;
pub mod school;
pub mod upvote;
