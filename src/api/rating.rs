use crate::api::{CurrentUser, PolicyError::*, API};
use crate::db_conn::Db;
use crate::matching::{ordered, suggest_matches, Match, MAX_SUGGESTIONS};
use crate::models::*;
use log::{info, warn};
use rand::thread_rng;
use rocket::form::Form;
use rocket::http::Status;
use rocket::serde::json::{serde_json, Json};
use rocket::serde::Deserialize;

#[derive(FromForm)]
pub struct RatingForm<'r> {
    data: &'r str,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct SchoolPair {
    school1_id: i32,
    school2_id: i32,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct ChoiceInput {
    criterion_id: i32,
    choice: i32,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct RatingInput {
    schools: SchoolPair,
    choices: Vec<ChoiceInput>,
}

impl RatingInput {
    /// One comparison per choice, with the smaller school id as `school1`.
    pub fn into_comparisons(self, comparer_id: i32) -> Result<Vec<NewComparison>, ValidationError> {
        let SchoolPair {
            school1_id,
            school2_id,
        } = self.schools;
        if school1_id == school2_id {
            return Err(ValidationError::SameSchool);
        }
        let (school1_id, school2_id) = ordered(school1_id, school2_id);
        self.choices
            .into_iter()
            .map(|c| {
                let new = NewComparison {
                    criterion_id: c.criterion_id,
                    school1_id,
                    school2_id,
                    choice_id: c.choice,
                    comparer_id,
                };
                new.validate()?;
                Ok(new)
            })
            .collect()
    }
}

#[get("/matches/suggested")]
pub async fn suggested_matches(user: CurrentUser, db: Db) -> API<Json<Vec<Match>>> {
    let schools = School::get_names(&db).await?;
    let compared = Comparison::pairs_by_comparer(&db, user.id).await?;
    Ok(Json(suggest_matches(
        &schools,
        &compared,
        MAX_SUGGESTIONS,
        &mut thread_rng(),
    )))
}

#[post("/ratings", data = "<rf>")]
pub async fn submit_ratings(rf: Form<RatingForm<'_>>, user: CurrentUser, db: Db) -> API<Status> {
    let input: RatingInput = serde_json::from_str(rf.data).map_err(|e| {
        warn!("malformed rating payload from {}: {}", user.username, e);
        MalformedPayload
    })?;
    let comparisons = input.into_comparisons(user.id).map_err(|e| {
        warn!("rejected rating from {}: {}", user.username, e);
        e
    })?;
    let n = Comparison::save_all(&db, comparisons).await?;
    info!("saved {} comparisons for {}", n, user.username);
    Ok(Status::Created)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &str) -> RatingInput {
        serde_json::from_str(data).expect("valid payload")
    }

    #[test]
    fn swaps_pair_so_smaller_id_is_first() {
        let input = parse(
            r#"{"schools": {"school1_id": 9, "school2_id": 4},
                "choices": [{"criterion_id": 1, "choice": 9}, {"criterion_id": 2, "choice": 4}]}"#,
        );
        let cs = input.into_comparisons(7).expect("valid comparisons");
        assert_eq!(cs.len(), 2);
        for c in &cs {
            assert_eq!((c.school1_id, c.school2_id), (4, 9));
            assert_eq!(c.comparer_id, 7);
        }
        assert_eq!(cs[0].choice_id, 9);
        assert_eq!(cs[1].choice_id, 4);
    }

    #[test]
    fn keeps_already_ordered_pair() {
        let input = parse(
            r#"{"schools": {"school1_id": 1, "school2_id": 2},
                "choices": [{"criterion_id": 3, "choice": 2}]}"#,
        );
        let cs = input.into_comparisons(1).expect("valid comparisons");
        assert_eq!(
            cs,
            vec![NewComparison {
                criterion_id: 3,
                school1_id: 1,
                school2_id: 2,
                choice_id: 2,
                comparer_id: 1,
            }]
        );
    }

    #[test]
    fn same_school_produces_nothing() {
        let input = parse(
            r#"{"schools": {"school1_id": 5, "school2_id": 5},
                "choices": [{"criterion_id": 1, "choice": 5}]}"#,
        );
        assert_eq!(input.into_comparisons(1), Err(ValidationError::SameSchool));
    }

    #[test]
    fn choice_outside_pair_rejects_batch() {
        let input = parse(
            r#"{"schools": {"school1_id": 1, "school2_id": 2},
                "choices": [{"criterion_id": 1, "choice": 1}, {"criterion_id": 2, "choice": 3}]}"#,
        );
        assert_eq!(
            input.into_comparisons(1),
            Err(ValidationError::ChoiceOutsidePair)
        );
    }

    #[test]
    fn missing_fields_fail_to_parse() {
        assert!(serde_json::from_str::<RatingInput>(r#"{"schools": {"school1_id": 1}}"#).is_err());
    }
}
