#[macro_use]
extern crate rocket;

#[macro_use]
extern crate diesel;

#[macro_use]
extern crate diesel_migrations;

mod api;
mod cors;
mod db_conn;
mod entity;
mod login;
mod matching;
mod models;
mod pagination;
mod random_hasher;
mod schema;

use db_conn::{run_migrations, Db};
use rocket::fairing::AdHoc;
use std::env;

#[launch]
fn rocket() -> _ {
    load_env();
    env_logger::init();
    rocket::build()
        .mount(
            "/api",
            routes![
                api::school::get_one,
                api::school::get_reviews,
                api::school::get_reports,
                api::school::get_list,
                api::school::get_top,
                api::school::get_srhi,
                api::school::get_rated_higher,
                api::review::get_one,
                api::review::get_top,
                api::review::add_review,
                api::report::get_one,
                api::report::get_top,
                api::report::add_report,
                api::comment::get_comments,
                api::comment::add_comment,
                api::criterion::get_list,
                api::rating::suggested_matches,
                api::rating::submit_ratings,
                api::upvote::get_upvote,
                api::upvote::toggle_upvote,
                api::owner::check_owner,
                login::register,
                login::login,
                login::logout,
                cors::options_handler,
            ],
        )
        .register(
            "/api",
            catchers![
                api::catch_401_error,
                api::catch_404_error,
                api::catch_422_error
            ],
        )
        .attach(Db::fairing())
        .attach(AdHoc::try_on_ignite("Diesel Migrations", run_migrations))
        .attach(cors::Cors::from_list(
            &env::var("FRONTEND_WHITELIST").unwrap_or_default(),
        ))
}

fn load_env() {
    match dotenv::dotenv() {
        Ok(path) => eprintln!("Configuration read from {}", path.display()),
        Err(ref e) if e.not_found() => eprintln!("Warning: no .env was found"),
        Err(e) => eprintln!("Warning: failed to read .env: {}", e),
    }
}
