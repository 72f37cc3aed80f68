//! Polymorphic targets of comments and upvotes.
//!
//! Rows store a text tag plus an id; in code the pair is always an
//! [`EntityRef`], so an unknown tag can only show up as a parse error.

use diesel::deserialize::{self, FromSql};
use diesel::pg::Pg;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use rocket::request::FromParam;
use rocket::serde::Serialize;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, AsExpression, FromSqlRow)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
#[sql_type = "Text"]
pub enum EntityKind {
    Review,
    Report,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::Report => "report",
        }
    }

    pub fn with_id(self, id: i32) -> EntityRef {
        match self {
            Self::Review => EntityRef::Review(id),
            Self::Report => EntityRef::Report(id),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownEntity(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "review" => Ok(Self::Review),
            "report" => Ok(Self::Report),
            _ => Err(UnknownEntity(s.to_string())),
        }
    }
}

impl<'a> FromParam<'a> for EntityKind {
    type Error = UnknownEntity;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse()
    }
}

impl ToSql<Text, Pg> for EntityKind {
    fn to_sql<W: Write>(&self, out: &mut Output<W, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for EntityKind {
    fn from_sql(bytes: Option<&[u8]>) -> deserialize::Result<Self> {
        match not_none!(bytes) {
            b"review" => Ok(Self::Review),
            b"report" => Ok(Self::Report),
            other => Err(format!(
                "unrecognized entity tag: {}",
                String::from_utf8_lossy(other)
            )
            .into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Review(i32),
    Report(i32),
}

impl EntityRef {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Review(_) => EntityKind::Review,
            Self::Report(_) => EntityKind::Report,
        }
    }

    pub fn id(&self) -> i32 {
        match *self {
            Self::Review(id) | Self::Report(id) => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tags() {
        assert_eq!("review".parse::<EntityKind>(), Ok(EntityKind::Review));
        assert_eq!("report".parse::<EntityKind>(), Ok(EntityKind::Report));
    }

    #[test]
    fn rejects_unknown_tags() {
        assert!("comment".parse::<EntityKind>().is_err());
        assert!("Review".parse::<EntityKind>().is_err());
        assert!(EntityKind::from_param("").is_err());
    }

    #[test]
    fn ref_keeps_kind_and_id() {
        let r = EntityKind::Report.with_id(7);
        assert_eq!(r, EntityRef::Report(7));
        assert_eq!(r.kind(), EntityKind::Report);
        assert_eq!(r.id(), 7);
        assert_eq!(EntityRef::Review(3).kind().to_string(), "review");
    }
}
