use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::{Request, Response};
use std::path::PathBuf;

/// Sent alongside the echoed origin. The token travels in `Authorization`
/// and list endpoints report paging through the `X-Has-*` headers.
const FIXED_HEADERS: &[(&str, &str)] = &[
    ("Access-Control-Allow-Methods", "POST, GET, OPTIONS"),
    ("Access-Control-Allow-Credentials", "true"),
    ("Access-Control-Allow-Headers", "Authorization, Content-Type"),
    ("Access-Control-Expose-Headers", "X-Has-Previous, X-Has-Next"),
];

/// Response fairing echoing whitelisted origins; configured from
/// `FRONTEND_WHITELIST`.
pub struct Cors {
    pub whitelist: Vec<String>,
}

impl Cors {
    pub fn from_list(list: &str) -> Self {
        Cors {
            whitelist: list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    fn allows(&self, origin: &str) -> bool {
        self.whitelist.iter().any(|o| o == origin)
    }
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let origin = match request.headers().get_one("Origin") {
            Some(origin) if self.allows(origin) => origin.to_string(),
            _ => return,
        };
        response.set_header(Header::new("Access-Control-Allow-Origin", origin));
        for (name, value) in FIXED_HEADERS {
            response.set_header(Header::new(*name, *value));
        }
    }
}

#[options("/<_path..>")]
pub async fn options_handler(_path: PathBuf) {}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::http::Status;
    use rocket::local::blocking::Client;

    #[get("/ping")]
    fn ping() -> &'static str {
        "pong"
    }

    fn client() -> Client {
        let rocket = rocket::build()
            .mount("/", routes![ping, options_handler])
            .attach(Cors::from_list("http://localhost:3000, https://example.org"));
        Client::tracked(rocket).expect("valid rocket instance")
    }

    #[test]
    fn whitelisted_origin_gets_headers() {
        let client = client();
        let res = client
            .get("/ping")
            .header(Header::new("Origin", "https://example.org"))
            .dispatch();
        assert_eq!(
            res.headers().get_one("Access-Control-Allow-Origin"),
            Some("https://example.org")
        );
        assert_eq!(
            res.headers().get_one("Access-Control-Expose-Headers"),
            Some("X-Has-Previous, X-Has-Next")
        );
        assert_eq!(
            res.headers().get_one("Access-Control-Allow-Headers"),
            Some("Authorization, Content-Type")
        );
    }

    #[test]
    fn whitelist_ignores_blank_entries() {
        let cors = Cors::from_list(" http://a.example ,, ");
        assert_eq!(cors.whitelist, vec!["http://a.example".to_string()]);
        assert!(cors.allows("http://a.example"));
        assert!(!cors.allows(""));
    }

    #[test]
    fn other_origins_get_nothing() {
        let client = client();
        let res = client
            .get("/ping")
            .header(Header::new("Origin", "https://evil.example"))
            .dispatch();
        assert!(res.headers().get_one("Access-Control-Allow-Origin").is_none());
    }

    #[test]
    fn preflight_is_answered() {
        let client = client();
        let res = client
            .options("/api/ratings")
            .header(Header::new("Origin", "http://localhost:3000"))
            .dispatch();
        assert_eq!(res.status(), Status::Ok);
        assert_eq!(
            res.headers().get_one("Access-Control-Allow-Origin"),
            Some("http://localhost:3000")
        );
    }
}
