use crate::api::{APIError, CurrentUser, PolicyError::*, API};
use crate::db_conn::Db;
use crate::models::{AuthToken, NewUser, User};
use diesel::result::{DatabaseErrorKind, Error as DbError};
use log::{info, warn};
use rocket::form::Form;
use rocket::http::Status;
use rocket::serde::json::{json, Value};

#[derive(FromForm)]
pub struct RegisterInput<'r> {
    #[field(validate = len(1..151))]
    username: &'r str,
    #[field(validate = len(..255))]
    email: &'r str,
    #[field(validate = len(8..))]
    password: &'r str,
}

#[derive(FromForm)]
pub struct LoginInput<'r> {
    username: &'r str,
    password: &'r str,
}

#[post("/register", data = "<ri>")]
pub async fn register(ri: Form<RegisterInput<'_>>, db: Db) -> API<Value> {
    let new_user = NewUser::with_password(ri.username, ri.email, ri.password);
    let (user, token) = User::create_with_token(&db, new_user)
        .await
        .map_err(|e| match e {
            DbError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                APIError::PcError(UsernameTaken)
            }
            e => APIError::DbError(e),
        })?;
    info!("registered user {}", user.username);
    Ok(json!({
        "token": token,
    }))
}

#[post("/login", data = "<li>")]
pub async fn login(li: Form<LoginInput<'_>>, db: Db) -> API<Value> {
    let user = User::get_by_username(&db, li.username.to_string())
        .await?
        .filter(|u| u.is_active && u.check_password(li.password))
        .ok_or_else(|| {
            warn!("failed login for {}", li.username);
            BadCredentials
        })?;
    let token = AuthToken::get_or_issue(&db, user.id).await?;
    user.touch_login(&db).await?;
    info!("user {} logged in", user.username);
    Ok(json!({
        "token": token,
    }))
}

#[get("/logout")]
pub async fn logout(user: CurrentUser, db: Db) -> API<Status> {
    AuthToken::revoke(&db, user.token).await?;
    info!("user {} logged out", user.username);
    Ok(Status::Ok)
}
