use log::error;
use rocket::fairing;
use rocket::{Build, Rocket};
use rocket_sync_db_pools::{database, diesel};

pub type Conn = diesel::PgConnection;

#[database("school_db")]
pub struct Db(Conn);

embed_migrations!();

pub async fn run_migrations(rocket: Rocket<Build>) -> fairing::Result {
    let db = match Db::get_one(&rocket).await {
        Some(db) => db,
        None => {
            error!("no database connection available for migrations");
            return Err(rocket);
        }
    };
    match db.run(|c| embedded_migrations::run(c)).await {
        Ok(()) => Ok(rocket),
        Err(e) => {
            error!("failed to run migrations: {}", e);
            Err(rocket)
        }
    }
}
