#![allow(clippy::all)]

use chrono::{offset::Utc, DateTime, Duration};
use diesel::{insert_into, Connection, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};
use std::fmt;

use crate::db_conn::{Conn, Db};
use crate::entity::{EntityKind, EntityRef};
use crate::pagination::Page;
use crate::random_hasher;
use crate::schema::*;

type MR<T> = Result<T, diesel::result::Error>;

macro_rules! get {
    ($table:ident) => {
        pub async fn get(db: &Db, id: i32) -> MR<Self> {
            db.run(move |c| $table::table.find(id).first(c)).await
        }
    };
}

macro_rules! get_all {
    ($table:ident) => {
        pub async fn get_all(db: &Db) -> MR<Vec<Self>> {
            db.run(move |c| $table::table.order($table::id).load(c)).await
        }
    };
}

#[derive(Queryable, Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Insertable)]
#[table_name = "users"]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
}

impl NewUser {
    pub fn with_password(username: &str, email: &str, password: &str) -> Self {
        let salt = random_hasher::new_salt();
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: random_hasher::hash_with_salt(password, &salt),
            salt,
        }
    }
}

impl User {
    get!(users);

    pub fn check_password(&self, password: &str) -> bool {
        random_hasher::verify(password, &self.salt, &self.password_hash)
    }

    pub async fn get_by_token(db: &Db, token: String) -> MR<Option<Self>> {
        db.run(move |c| {
            auth_tokens::table
                .inner_join(users::table)
                .filter(auth_tokens::key.eq(token))
                .filter(users::is_active.eq(true))
                .select(users::all_columns)
                .first(c)
                .optional()
        })
        .await
    }

    pub async fn get_by_username(db: &Db, username: String) -> MR<Option<Self>> {
        db.run(move |c| {
            users::table
                .filter(users::username.eq(username))
                .first(c)
                .optional()
        })
        .await
    }

    /// Inserts the user and its first token in one transaction.
    pub async fn create_with_token(db: &Db, new_user: NewUser) -> MR<(Self, String)> {
        db.run(move |c| {
            let conn: &Conn = c;
            conn.transaction(|| {
                let user: User = insert_into(users::table)
                    .values(&new_user)
                    .get_result(conn)?;
                let key = AuthToken::issue(conn, user.id)?;
                Ok((user, key))
            })
        })
        .await
    }

    pub async fn touch_login(&self, db: &Db) -> MR<()> {
        let id = self.id;
        db.run(move |c| {
            diesel::update(users::table.find(id))
                .set(users::last_login.eq(Some(Utc::now())))
                .execute(c)
        })
        .await?;
        Ok(())
    }
}

#[derive(Queryable, Debug)]
pub struct AuthToken {
    pub key: String,
    pub user_id: i32,
    pub created: DateTime<Utc>,
}

impl AuthToken {
    fn issue(conn: &Conn, user_id: i32) -> MR<String> {
        let key = random_hasher::new_token();
        insert_into(auth_tokens::table)
            .values((auth_tokens::key.eq(&key), auth_tokens::user_id.eq(user_id)))
            .execute(conn)?;
        Ok(key)
    }

    /// Returns the user's current token, creating one if there is none.
    pub async fn get_or_issue(db: &Db, user_id: i32) -> MR<String> {
        db.run(move |c| {
            let conn: &Conn = c;
            conn.transaction(|| {
                let existing = auth_tokens::table
                    .filter(auth_tokens::user_id.eq(user_id))
                    .select(auth_tokens::key)
                    .first::<String>(conn)
                    .optional()?;
                match existing {
                    Some(key) => Ok(key),
                    None => Self::issue(conn, user_id),
                }
            })
        })
        .await
    }

    pub async fn revoke(db: &Db, key: String) -> MR<usize> {
        db.run(move |c| {
            diesel::delete(auth_tokens::table.filter(auth_tokens::key.eq(key))).execute(c)
        })
        .await
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct School {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub location: String,
    pub website: String,
    pub rating: f64,
    pub rank: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl School {
    get!(schools);

    get_all!(schools);

    pub async fn get_top(db: &Db, limit: i64) -> MR<Vec<Self>> {
        db.run(move |c| schools::table.order(schools::id).limit(limit).load(c))
            .await
    }

    pub async fn count(db: &Db) -> MR<i64> {
        db.run(move |c| schools::table.count().get_result(c)).await
    }

    pub async fn gets_by_rank(db: &Db, page: Page) -> MR<Vec<Self>> {
        db.run(move |c| {
            schools::table
                .order((schools::rank, schools::id))
                .offset(page.offset())
                .limit(page.limit())
                .load(c)
        })
        .await
    }

    pub async fn rated_lower_than(db: &Db, rating: f64) -> MR<Vec<Self>> {
        db.run(move |c| {
            schools::table
                .filter(schools::rating.lt(rating))
                .order((schools::rank, schools::id))
                .load(c)
        })
        .await
    }

    pub async fn get_names(db: &Db) -> MR<Vec<(i32, String)>> {
        db.run(move |c| {
            schools::table
                .select((schools::id, schools::name))
                .order(schools::id)
                .load(c)
        })
        .await
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct Criterion {
    pub id: i32,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Criterion {
    get_all!(criteria);
}

#[derive(Queryable, Debug, Clone)]
pub struct Review {
    pub id: i32,
    pub content: String,
    pub school_id: i32,
    pub reviewer_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[table_name = "reviews"]
pub struct NewReview {
    pub content: String,
    pub school_id: i32,
    pub reviewer_id: i32,
}

pub type ReviewRow = (Review, School, User);

impl Review {
    get!(reviews);

    pub async fn get_row(db: &Db, id: i32) -> MR<ReviewRow> {
        db.run(move |c| {
            reviews::table
                .inner_join(schools::table)
                .inner_join(users::table)
                .filter(reviews::id.eq(id))
                .first(c)
        })
        .await
    }

    pub async fn count_by_school(db: &Db, school_id: i32) -> MR<i64> {
        db.run(move |c| {
            reviews::table
                .filter(reviews::school_id.eq(school_id))
                .count()
                .get_result(c)
        })
        .await
    }

    pub async fn gets_by_school(db: &Db, school_id: i32, page: Page) -> MR<Vec<ReviewRow>> {
        db.run(move |c| {
            reviews::table
                .inner_join(schools::table)
                .inner_join(users::table)
                .filter(reviews::school_id.eq(school_id))
                .order((reviews::updated_at.desc(), reviews::id.desc()))
                .offset(page.offset())
                .limit(page.limit())
                .load(c)
        })
        .await
    }

    pub async fn gets_recent(db: &Db, days: i64, limit: i64) -> MR<Vec<ReviewRow>> {
        let since = Utc::now() - Duration::days(days);
        db.run(move |c| {
            reviews::table
                .inner_join(schools::table)
                .inner_join(users::table)
                .filter(reviews::created_at.gt(since))
                .order(reviews::id)
                .limit(limit)
                .load(c)
        })
        .await
    }

    /// One review per (school, reviewer); posting again replaces the content.
    pub async fn upsert(db: &Db, new_review: NewReview) -> MR<Self> {
        db.run(move |c| {
            insert_into(reviews::table)
                .values(&new_review)
                .on_conflict((reviews::school_id, reviews::reviewer_id))
                .do_update()
                .set((
                    reviews::content.eq(&new_review.content),
                    reviews::updated_at.eq(Utc::now()),
                ))
                .get_result(c)
        })
        .await
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct Report {
    pub id: i32,
    pub content: String,
    pub school_id: i32,
    pub reporter_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[table_name = "reports"]
pub struct NewReport {
    pub content: String,
    pub school_id: i32,
    pub reporter_id: i32,
}

pub type ReportRow = (Report, School, User);

impl Report {
    get!(reports);

    pub async fn get_row(db: &Db, id: i32) -> MR<ReportRow> {
        db.run(move |c| {
            reports::table
                .inner_join(schools::table)
                .inner_join(users::table)
                .filter(reports::id.eq(id))
                .first(c)
        })
        .await
    }

    pub async fn count_by_school(db: &Db, school_id: i32) -> MR<i64> {
        db.run(move |c| {
            reports::table
                .filter(reports::school_id.eq(school_id))
                .count()
                .get_result(c)
        })
        .await
    }

    pub async fn gets_by_school(db: &Db, school_id: i32, page: Page) -> MR<Vec<ReportRow>> {
        db.run(move |c| {
            reports::table
                .inner_join(schools::table)
                .inner_join(users::table)
                .filter(reports::school_id.eq(school_id))
                .order((reports::updated_at.desc(), reports::id.desc()))
                .offset(page.offset())
                .limit(page.limit())
                .load(c)
        })
        .await
    }

    pub async fn gets_recent(db: &Db, days: i64, limit: i64) -> MR<Vec<ReportRow>> {
        let since = Utc::now() - Duration::days(days);
        db.run(move |c| {
            reports::table
                .inner_join(schools::table)
                .inner_join(users::table)
                .filter(reports::created_at.gt(since))
                .order(reports::id)
                .limit(limit)
                .load(c)
        })
        .await
    }

    pub async fn upsert(db: &Db, new_report: NewReport) -> MR<Self> {
        db.run(move |c| {
            insert_into(reports::table)
                .values(&new_report)
                .on_conflict((reports::school_id, reports::reporter_id))
                .do_update()
                .set((
                    reports::content.eq(&new_report.content),
                    reports::updated_at.eq(Utc::now()),
                ))
                .get_result(c)
        })
        .await
    }
}

impl EntityRef {
    /// Author of the referenced review or report.
    pub async fn owner_id(&self, db: &Db) -> MR<i32> {
        match *self {
            EntityRef::Review(id) => Review::get(db, id).await.map(|r| r.reviewer_id),
            EntityRef::Report(id) => Report::get(db, id).await.map(|r| r.reporter_id),
        }
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct Comment {
    pub id: i32,
    pub comment: String,
    pub entity: EntityKind,
    pub entity_id: i32,
    pub commenter_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[table_name = "comments"]
pub struct NewComment {
    pub comment: String,
    pub entity: EntityKind,
    pub entity_id: i32,
    pub commenter_id: i32,
}

pub type CommentRow = (Comment, User);

impl Comment {
    pub fn target(&self) -> EntityRef {
        self.entity.with_id(self.entity_id)
    }

    pub async fn count_by_target(db: &Db, target: EntityRef) -> MR<i64> {
        db.run(move |c| {
            comments::table
                .filter(comments::entity.eq(target.kind()))
                .filter(comments::entity_id.eq(target.id()))
                .count()
                .get_result(c)
        })
        .await
    }

    pub async fn gets_by_target(db: &Db, target: EntityRef, page: Page) -> MR<Vec<CommentRow>> {
        db.run(move |c| {
            comments::table
                .inner_join(users::table)
                .filter(comments::entity.eq(target.kind()))
                .filter(comments::entity_id.eq(target.id()))
                .order(comments::id)
                .offset(page.offset())
                .limit(page.limit())
                .load(c)
        })
        .await
    }

    pub async fn create(db: &Db, new_comment: NewComment) -> MR<Self> {
        db.run(move |c| {
            insert_into(comments::table)
                .values(&new_comment)
                .get_result(c)
        })
        .await
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct Upvote {
    pub id: i32,
    pub entity: EntityKind,
    pub entity_id: i32,
    pub upvoter_id: i32,
    pub created_at: DateTime<Utc>,
}

impl Upvote {
    pub async fn count(db: &Db, target: EntityRef) -> MR<i64> {
        db.run(move |c| {
            upvotes::table
                .filter(upvotes::entity.eq(target.kind()))
                .filter(upvotes::entity_id.eq(target.id()))
                .count()
                .get_result(c)
        })
        .await
    }

    pub async fn has(db: &Db, target: EntityRef, upvoter_id: i32) -> MR<bool> {
        db.run(move |c| {
            diesel::select(diesel::dsl::exists(
                upvotes::table
                    .filter(upvotes::entity.eq(target.kind()))
                    .filter(upvotes::entity_id.eq(target.id()))
                    .filter(upvotes::upvoter_id.eq(upvoter_id)),
            ))
            .get_result(c)
        })
        .await
    }

    /// Adds the upvote if absent, removes it otherwise. Returns the new state.
    pub async fn toggle(db: &Db, target: EntityRef, upvoter_id: i32) -> MR<bool> {
        db.run(move |c| {
            let conn: &Conn = c;
            conn.transaction(|| {
                let removed = diesel::delete(
                    upvotes::table
                        .filter(upvotes::entity.eq(target.kind()))
                        .filter(upvotes::entity_id.eq(target.id()))
                        .filter(upvotes::upvoter_id.eq(upvoter_id)),
                )
                .execute(conn)?;
                if removed > 0 {
                    return Ok(false);
                }
                insert_into(upvotes::table)
                    .values((
                        upvotes::entity.eq(target.kind()),
                        upvotes::entity_id.eq(target.id()),
                        upvotes::upvoter_id.eq(upvoter_id),
                    ))
                    .execute(conn)?;
                Ok(true)
            })
        })
        .await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    SameSchool,
    ChoiceOutsidePair,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SameSchool => "a school cannot be compared with itself",
            Self::ChoiceOutsidePair => "choice must be one of the compared schools",
        })
    }
}

#[derive(Debug)]
pub enum SaveError {
    Invalid(ValidationError),
    Db(diesel::result::Error),
}

impl From<ValidationError> for SaveError {
    fn from(e: ValidationError) -> Self {
        SaveError::Invalid(e)
    }
}

impl From<diesel::result::Error> for SaveError {
    fn from(e: diesel::result::Error) -> Self {
        SaveError::Db(e)
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct Comparison {
    pub id: i32,
    pub criterion_id: i32,
    pub school1_id: i32,
    pub school2_id: i32,
    pub choice_id: i32,
    pub comparer_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone, PartialEq, Eq)]
#[table_name = "comparisons"]
pub struct NewComparison {
    pub criterion_id: i32,
    pub school1_id: i32,
    pub school2_id: i32,
    pub choice_id: i32,
    pub comparer_id: i32,
}

impl NewComparison {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.school1_id == self.school2_id {
            return Err(ValidationError::SameSchool);
        }
        if self.choice_id != self.school1_id && self.choice_id != self.school2_id {
            return Err(ValidationError::ChoiceOutsidePair);
        }
        Ok(())
    }
}

impl Comparison {
    /// Every pair this user has compared, as stored.
    pub async fn pairs_by_comparer(db: &Db, comparer_id: i32) -> MR<Vec<(i32, i32)>> {
        db.run(move |c| {
            comparisons::table
                .filter(comparisons::comparer_id.eq(comparer_id))
                .select((comparisons::school1_id, comparisons::school2_id))
                .distinct()
                .load(c)
        })
        .await
    }

    pub fn upsert(conn: &Conn, new: &NewComparison) -> Result<usize, SaveError> {
        new.validate()?;
        let n = insert_into(comparisons::table)
            .values(new)
            .on_conflict((
                comparisons::criterion_id,
                comparisons::school1_id,
                comparisons::school2_id,
                comparisons::comparer_id,
            ))
            .do_update()
            .set((
                comparisons::choice_id.eq(new.choice_id),
                comparisons::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;
        Ok(n)
    }

    /// Saves a whole submission or nothing.
    pub async fn save_all(db: &Db, items: Vec<NewComparison>) -> Result<usize, SaveError> {
        db.run(move |c| {
            let conn: &Conn = c;
            conn.transaction::<_, SaveError, _>(|| {
                let mut n = 0;
                for item in &items {
                    n += Self::upsert(conn, item)?;
                }
                Ok(n)
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison(s1: i32, s2: i32, choice: i32) -> NewComparison {
        NewComparison {
            criterion_id: 1,
            school1_id: s1,
            school2_id: s2,
            choice_id: choice,
            comparer_id: 1,
        }
    }

    #[test]
    fn distinct_schools_pass() {
        assert_eq!(comparison(1, 2, 1).validate(), Ok(()));
        assert_eq!(comparison(9, 4, 4).validate(), Ok(()));
    }

    #[test]
    fn same_school_is_rejected() {
        assert_eq!(
            comparison(3, 3, 3).validate(),
            Err(ValidationError::SameSchool)
        );
    }

    #[test]
    fn choice_must_be_in_pair() {
        assert_eq!(
            comparison(1, 2, 5).validate(),
            Err(ValidationError::ChoiceOutsidePair)
        );
    }

    #[test]
    fn new_user_password_is_salted() {
        let a = NewUser::with_password("alice", "a@example.com", "correct horse");
        let b = NewUser::with_password("bob", "b@example.com", "correct horse");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.password_hash, b.password_hash);
        assert!(random_hasher::verify("correct horse", &a.salt, &a.password_hash));
    }
}
