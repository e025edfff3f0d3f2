//! Publishing event results and moving ratings accordingly.
//!
//! A submission replaces whatever results the event had before. All of it
//! happens in one transaction holding the event row lock: the optional
//! revert of earlier deltas, the result rows, the new ratings and the ledger
//! entries either all land or none of them do.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::results::ResultEntry;
use crate::error::{Result, StorageError};
use crate::models::{EventResult, ParticipantType};
use crate::repository::event::lock_event;
use crate::repository::rating::{append_history, lock_rating, set_rating};
use crate::repository::results::{delete_results, existing_results, insert_result};
use crate::services::rating::{RatingStrategy, Standing};

/// What happens to the deltas of earlier results when an event is resubmitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResubmissionPolicy {
    /// New deltas land on top of the current rating
    #[default]
    Compound,
    /// Earlier deltas are reverted through the ledger first
    Revert,
}

impl FromStr for ResubmissionPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compound" => Ok(Self::Compound),
            "revert" => Ok(Self::Revert),
            other => Err(format!(
                "Unknown resubmission policy '{}': expected compound or revert",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResultsSettings {
    pub strategy: RatingStrategy,
    pub resubmission: ResubmissionPolicy,
}

/// One result row as it will be written
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedResult {
    pub entry: ResultEntry,
    pub old_rating: i32,
    pub change: i32,
}

impl PlannedResult {
    pub fn new_rating(&self) -> i32 {
        self.old_rating + self.change
    }
}

pub fn placement_reason(place: i32, title: &str) -> String {
    format!("Place {} in \"{}\"", place, title)
}

pub fn revert_reason(place: i32, title: &str) -> String {
    format!("Reverted place {} in \"{}\"", place, title)
}

/// Places must be exactly 1..=N and nobody may be listed twice
pub fn validate_results(entries: &[ResultEntry]) -> Result<()> {
    if entries.is_empty() {
        return Err(StorageError::InvalidResultsFormat(
            "results must not be empty".to_string(),
        ));
    }

    let n = entries.len();
    let mut seen_places = vec![false; n];
    for entry in entries {
        let slot = usize::try_from(entry.place)
            .ok()
            .filter(|p| (1..=n).contains(p))
            .ok_or_else(|| {
                StorageError::InvalidResultsFormat(format!(
                    "place {} is outside 1..{}",
                    entry.place, n
                ))
            })?;
        if std::mem::replace(&mut seen_places[slot - 1], true) {
            return Err(StorageError::InvalidResultsFormat(format!(
                "place {} is assigned more than once",
                entry.place
            )));
        }
    }

    for entry in entries {
        check_score(entry)?;
    }

    let mut seen_participants = HashSet::with_capacity(n);
    for entry in entries {
        if !seen_participants.insert((entry.participant_type, entry.participant_id)) {
            return Err(StorageError::InvalidResultsFormat(format!(
                "{} {} is listed more than once",
                entry.participant_type, entry.participant_id
            )));
        }
    }

    Ok(())
}

/// Scores are stored as NUMERIC(12, 3)
const SCORE_SCALE: u32 = 3;
const SCORE_LIMIT: i64 = 1_000_000_000;

fn check_score(entry: &ResultEntry) -> Result<()> {
    if entry.score.abs() >= Decimal::from(SCORE_LIMIT) {
        return Err(StorageError::InvalidResultsFormat(format!(
            "score {} of place {} must be below {} in absolute value",
            entry.score, entry.place, SCORE_LIMIT
        )));
    }
    if entry.score.normalize().scale() > SCORE_SCALE {
        return Err(StorageError::InvalidResultsFormat(format!(
            "score {} of place {} has more than {} decimal places",
            entry.score, entry.place, SCORE_SCALE
        )));
    }
    Ok(())
}

/// Pair each entry with its current rating and the change the strategy
/// assigns; `ratings` is parallel to `entries`
pub fn plan_results(
    strategy: &RatingStrategy,
    entries: &[ResultEntry],
    ratings: &[i32],
) -> Vec<PlannedResult> {
    let standings: Vec<Standing> = entries
        .iter()
        .zip(ratings)
        .map(|(entry, rating)| Standing {
            place: entry.place,
            rating: *rating,
        })
        .collect();

    strategy
        .rating_changes(&standings)
        .into_iter()
        .zip(entries.iter().zip(ratings))
        .map(|(change, (entry, rating))| PlannedResult {
            entry: entry.clone(),
            old_rating: *rating,
            change,
        })
        .collect()
}

/// Replace the results of an event and apply the resulting rating changes.
/// Only the event owner may submit.
pub async fn submit_results(
    pool: &PgPool,
    settings: &ResultsSettings,
    event_id: Uuid,
    requester_id: Uuid,
    entries: &[ResultEntry],
) -> Result<Vec<EventResult>> {
    let mut tx = pool.begin().await?;

    let event = lock_event(&mut tx, event_id).await?;
    if !event.is_owned_by(requester_id) {
        tracing::warn!(
            "User {} tried to submit results for event {} they do not own",
            requester_id,
            event_id
        );
        return Err(StorageError::NotAuthorized(
            "Only the event owner can submit results".to_string(),
        ));
    }

    validate_results(entries)?;

    let previous: Vec<EventResult> = if settings.resubmission == ResubmissionPolicy::Revert {
        existing_results(&mut tx, event_id)
            .await?
            .into_iter()
            .filter(|r| r.rating_change != 0)
            .collect()
    } else {
        Vec::new()
    };

    let subjects = previous
        .iter()
        .map(|r| (r.participant_type, r.participant_id))
        .chain(entries.iter().map(|e| (e.participant_type, e.participant_id)));
    let mut current = lock_ratings(&mut tx, subjects).await?;

    revert_previous_results(&mut tx, event_id, &event.title, &previous, &mut current).await?;
    let replaced = delete_results(&mut tx, event_id).await?;

    let ratings = entries
        .iter()
        .map(|e| {
            current
                .get(&(e.participant_type, e.participant_id))
                .copied()
                .ok_or(StorageError::ParticipantNotFound {
                    participant_type: e.participant_type,
                    participant_id: e.participant_id,
                })
        })
        .collect::<Result<Vec<i32>>>()?;
    let plan = plan_results(&settings.strategy, entries, &ratings);

    let mut results = Vec::with_capacity(plan.len());
    for planned in &plan {
        let entry = &planned.entry;
        let result = insert_result(
            &mut tx,
            event_id,
            entry.participant_type,
            entry.participant_id,
            entry.place,
            entry.score,
            planned.change,
        )
        .await?;

        set_rating(
            &mut tx,
            entry.participant_type,
            entry.participant_id,
            planned.new_rating(),
        )
        .await?;
        append_history(
            &mut tx,
            entry.participant_type,
            entry.participant_id,
            event_id,
            planned.old_rating,
            planned.new_rating(),
            &placement_reason(entry.place, &event.title),
        )
        .await?;

        results.push(result);
    }

    tx.commit().await?;

    tracing::info!(
        "Published {} results for event {} (replaced {})",
        results.len(),
        event_id,
        replaced
    );
    Ok(results)
}

/// Lock the rating rows of `subjects` in one pass sorted by (type, id).
///
/// Both the revert step and the new results touch rows from this single
/// pass, so concurrent submissions always acquire row locks in the same
/// order. Subjects without a row are left out of the map.
async fn lock_ratings(
    conn: &mut PgConnection,
    subjects: impl Iterator<Item = (ParticipantType, Uuid)>,
) -> Result<HashMap<(ParticipantType, Uuid), i32>> {
    let mut subjects: Vec<(ParticipantType, Uuid)> = subjects.collect();
    sort_subjects(&mut subjects);

    let mut current = HashMap::with_capacity(subjects.len());
    for (participant_type, participant_id) in subjects {
        if let Some(rating) = lock_rating(&mut *conn, participant_type, participant_id).await? {
            current.insert((participant_type, participant_id), rating);
        }
    }

    Ok(current)
}

fn sort_subjects(subjects: &mut Vec<(ParticipantType, Uuid)>) {
    subjects.sort_by_key(|(kind, id)| (kind.as_str(), *id));
    subjects.dedup();
}

/// Undo the deltas of the event's previous results through new ledger
/// entries. Rows must already be locked and present in `current`.
async fn revert_previous_results(
    conn: &mut PgConnection,
    event_id: Uuid,
    title: &str,
    previous: &[EventResult],
    current: &mut HashMap<(ParticipantType, Uuid), i32>,
) -> Result<()> {
    for result in previous {
        let key = (result.participant_type, result.participant_id);
        // the subject may have been deleted since
        let Some(rating) = current.get(&key).copied() else {
            continue;
        };

        let reverted = rating - result.rating_change;
        set_rating(
            &mut *conn,
            result.participant_type,
            result.participant_id,
            reverted,
        )
        .await?;
        append_history(
            &mut *conn,
            result.participant_type,
            result.participant_id,
            event_id,
            rating,
            reverted,
            &revert_reason(result.place, title),
        )
        .await?;
        current.insert(key, reverted);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(place: i32) -> ResultEntry {
        ResultEntry {
            participant_type: ParticipantType::User,
            participant_id: Uuid::new_v4(),
            place,
            score: Decimal::ZERO,
        }
    }

    #[test]
    fn test_valid_permutation_accepted() {
        let entries = vec![entry(2), entry(1), entry(3)];
        assert!(validate_results(&entries).is_ok());
    }

    #[test]
    fn test_empty_results_rejected() {
        let err = validate_results(&[]).unwrap_err();
        assert!(matches!(err, StorageError::InvalidResultsFormat(_)));
    }

    #[test]
    fn test_gap_in_places_rejected() {
        let err = validate_results(&[entry(1), entry(3)]).unwrap_err();
        assert!(matches!(err, StorageError::InvalidResultsFormat(_)));
    }

    #[test]
    fn test_shared_place_rejected() {
        let err = validate_results(&[entry(1), entry(1)]).unwrap_err();
        assert!(matches!(err, StorageError::InvalidResultsFormat(_)));
    }

    #[test]
    fn test_zero_and_negative_places_rejected() {
        assert!(validate_results(&[entry(0)]).is_err());
        assert!(validate_results(&[entry(-1), entry(1)]).is_err());
    }

    #[test]
    fn test_duplicate_participant_rejected() {
        let first = entry(1);
        let mut second = entry(2);
        second.participant_id = first.participant_id;
        let err = validate_results(&[first, second]).unwrap_err();
        assert!(matches!(err, StorageError::InvalidResultsFormat(_)));
    }

    #[test]
    fn test_score_must_fit_the_column() {
        let mut big = entry(1);
        big.score = Decimal::from(1_000_000_000_000i64);
        let err = validate_results(&[big]).unwrap_err();
        assert!(matches!(err, StorageError::InvalidResultsFormat(_)));

        let mut negative = entry(1);
        negative.score = Decimal::from(-1_000_000_000i64);
        assert!(validate_results(&[negative]).is_err());

        let mut largest = entry(1);
        largest.score = Decimal::new(999_999_999_999, 3);
        assert!(validate_results(&[largest]).is_ok());
    }

    #[test]
    fn test_score_scale_is_limited() {
        let mut precise = entry(1);
        precise.score = Decimal::new(12_345, 4);
        let err = validate_results(&[precise]).unwrap_err();
        assert!(matches!(err, StorageError::InvalidResultsFormat(_)));

        let mut padded = entry(1);
        padded.score = Decimal::new(15_000, 4);
        assert!(validate_results(&[padded]).is_ok());
    }

    #[test]
    fn test_lock_order_is_type_then_id() {
        let low = Uuid::from_u128(1);
        let high = Uuid::from_u128(2);
        let mut subjects = vec![
            (ParticipantType::User, high),
            (ParticipantType::Team, high),
            (ParticipantType::User, low),
            (ParticipantType::User, high),
            (ParticipantType::Team, low),
        ];
        sort_subjects(&mut subjects);
        assert_eq!(
            subjects,
            vec![
                (ParticipantType::Team, low),
                (ParticipantType::Team, high),
                (ParticipantType::User, low),
                (ParticipantType::User, high),
            ]
        );
    }

    #[test]
    fn test_same_id_different_type_is_distinct() {
        let first = entry(1);
        let mut second = entry(2);
        second.participant_id = first.participant_id;
        second.participant_type = ParticipantType::Team;
        assert!(validate_results(&[first, second]).is_ok());
    }

    #[test]
    fn test_first_publication_of_single_winner() {
        let entries = vec![entry(1)];
        let plan = plan_results(&RatingStrategy::Placement, &entries, &[1000]);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].change, 20);
        assert_eq!(plan[0].new_rating(), 1020);
        assert_eq!(placement_reason(1, "Spring Cup"), "Place 1 in \"Spring Cup\"");
    }

    #[test]
    fn test_resubmission_compounds_on_current_rating() {
        let entries = vec![entry(1)];
        let plan = plan_results(&RatingStrategy::Placement, &entries, &[1020]);
        assert_eq!(plan[0].old_rating, 1020);
        assert_eq!(plan[0].new_rating(), 1040);
    }

    #[test]
    fn test_plan_keeps_entry_order() {
        let entries = vec![entry(3), entry(1), entry(2), entry(4)];
        let plan = plan_results(&RatingStrategy::Placement, &entries, &[1000; 4]);
        let changes: Vec<i32> = plan.iter().map(|p| p.change).collect();
        assert_eq!(changes, vec![0, 20, 10, -10]);
        assert_eq!(plan[3].new_rating(), 990);
    }

    #[test]
    fn test_revert_reason() {
        assert_eq!(
            revert_reason(2, "Autumn Open"),
            "Reverted place 2 in \"Autumn Open\""
        );
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("compound".parse::<ResubmissionPolicy>(), Ok(ResubmissionPolicy::Compound));
        assert_eq!(" Revert ".parse::<ResubmissionPolicy>(), Ok(ResubmissionPolicy::Revert));
        assert!("replace".parse::<ResubmissionPolicy>().is_err());
        assert_eq!(ResubmissionPolicy::default(), ResubmissionPolicy::Compound);
    }
}
