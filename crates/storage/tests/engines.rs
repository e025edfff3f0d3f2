//! Database-backed checks of the participation and results engines.
//!
//! These need a PostgreSQL server: `DATABASE_URL=... cargo test -- --ignored`.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use storage::StorageError;
use storage::dto::event::CreateEventRequest;
use storage::dto::results::ResultEntry;
use storage::dto::team::{AddMemberRequest, CreateTeamRequest};
use storage::dto::user::RegisterUserRequest;
use storage::models::{EventFormat, FishingEvent, ParticipantType, User};
use storage::repository::event::EventRepository;
use storage::repository::rating::RatingRepository;
use storage::repository::results::ResultsRepository;
use storage::repository::team::TeamRepository;
use storage::repository::user::UserRepository;
use storage::services::participation;
use storage::services::rating::rebuild_ratings;
use storage::services::results::{ResubmissionPolicy, ResultsSettings, submit_results};

async fn user(pool: &PgPool, email: &str) -> User {
    UserRepository::new(pool)
        .create(&RegisterUserRequest {
            name: None,
            email: email.to_string(),
        })
        .await
        .unwrap()
}

async fn event(
    pool: &PgPool,
    owner: &User,
    format: EventFormat,
    max_participants: Option<i32>,
) -> FishingEvent {
    event_starting(pool, owner, format, max_participants, Utc::now() + Duration::days(7)).await
}

async fn event_starting(
    pool: &PgPool,
    owner: &User,
    format: EventFormat,
    max_participants: Option<i32>,
    start_date: DateTime<Utc>,
) -> FishingEvent {
    EventRepository::new(pool)
        .create(
            owner.user_id,
            &CreateEventRequest {
                title: "Spring Cup".to_string(),
                description: None,
                latitude: 55.75,
                longitude: 37.61,
                start_date,
                end_date: None,
                fish_types: Some("pike, perch".to_string()),
                weather: None,
                format,
                max_participants,
            },
        )
        .await
        .unwrap()
}

async fn team(pool: &PgPool, owner: &User, others: &[&User]) -> Uuid {
    TeamRepository::new(pool)
        .create(
            owner.user_id,
            &CreateTeamRequest {
                name: format!("Team of {}", owner.email),
                description: None,
                member_ids: others.iter().map(|u| u.user_id).collect(),
            },
        )
        .await
        .unwrap()
        .team
        .team_id
}

fn first_place(user: &User) -> Vec<ResultEntry> {
    vec![ResultEntry {
        participant_type: ParticipantType::User,
        participant_id: user.user_id,
        place: 1,
        score: Decimal::new(4250, 3),
    }]
}

fn standings(users: &[&User]) -> Vec<ResultEntry> {
    users
        .iter()
        .zip(1..)
        .map(|(u, place)| ResultEntry {
            participant_type: ParticipantType::User,
            participant_id: u.user_id,
            place,
            score: Decimal::ZERO,
        })
        .collect()
}

async fn teams_holding(pool: &PgPool, event_id: Uuid, user: &User) -> i64 {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM team_participations tp
        INNER JOIN team_members tm ON tm.team_id = tp.team_id
        WHERE tp.event_id = $1 AND tm.user_id = $2
        "#,
    )
    .bind(event_id)
    .bind(user.user_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn rating_of(pool: &PgPool, user: &User) -> i32 {
    UserRepository::new(pool)
        .find_by_id(user.user_id)
        .await
        .unwrap()
        .rating
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_capacity_is_enforced(pool: PgPool) {
    let owner = user(&pool, "owner@example.com").await;
    let first = user(&pool, "u1@example.com").await;
    let second = user(&pool, "u2@example.com").await;
    let e = event(&pool, &owner, EventFormat::Solo, Some(1)).await;

    participation::register_individual(&pool, e.event_id, first.user_id, None)
        .await
        .unwrap();
    let err = participation::register_individual(&pool, e.event_id, second.user_id, None)
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::CapacityReached));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_registrations_respect_capacity(pool: PgPool) {
    let owner = user(&pool, "owner@example.com").await;
    let event_id = event(&pool, &owner, EventFormat::Solo, Some(2)).await.event_id;

    let mut handles = Vec::new();
    for i in 0..6 {
        let u = user(&pool, &format!("angler{}@example.com", i)).await;
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            participation::register_individual(&pool, event_id, u.user_id, None).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(err) => assert!(matches!(err, StorageError::CapacityReached)),
        }
    }
    assert_eq!(accepted, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_double_registration_rejected(pool: PgPool) {
    let owner = user(&pool, "owner@example.com").await;
    let angler = user(&pool, "angler@example.com").await;
    let e = event(&pool, &owner, EventFormat::Solo, None).await;

    let participant = participation::register_individual(&pool, e.event_id, angler.user_id, Some("boat"))
        .await
        .unwrap();
    assert_eq!(participant.name, "angler@example.com");
    assert_eq!(participant.contact, "angler@example.com");

    let err = participation::register_individual(&pool, e.event_id, angler.user_id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::AlreadyRegistered));

    participation::unregister_individual(&pool, e.event_id, angler.user_id)
        .await
        .unwrap();
    let err = participation::unregister_individual(&pool, e.event_id, angler.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotRegistered));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_member_cannot_join_two_registered_teams(pool: PgPool) {
    let owner = user(&pool, "owner@example.com").await;
    let a = user(&pool, "a@example.com").await;
    let b = user(&pool, "b@example.com").await;
    let c = user(&pool, "c@example.com").await;
    let e = event(&pool, &owner, EventFormat::Team2, None).await;

    let first_team = team(&pool, &a, &[&b]).await;
    let second_team = team(&pool, &c, &[&b]).await;

    participation::register_team(&pool, e.event_id, first_team, a.user_id, None)
        .await
        .unwrap();
    let err = participation::register_team(&pool, e.event_id, second_team, c.user_id, None)
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::MemberConflict(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_roster_frozen_while_registered_for_upcoming_event(pool: PgPool) {
    let owner = user(&pool, "owner@example.com").await;
    let a = user(&pool, "a@example.com").await;
    let b = user(&pool, "b@example.com").await;
    let c = user(&pool, "c@example.com").await;
    let d = user(&pool, "d@example.com").await;
    let e = event(&pool, &owner, EventFormat::Team2, None).await;

    let first_team = team(&pool, &a, &[&b]).await;
    let second_team = team(&pool, &c, &[&d]).await;
    participation::register_team(&pool, e.event_id, first_team, a.user_id, None)
        .await
        .unwrap();
    participation::register_team(&pool, e.event_id, second_team, c.user_id, None)
        .await
        .unwrap();

    let err = TeamRepository::new(&pool)
        .add_member(
            second_team,
            c.user_id,
            &AddMemberRequest {
                email: "a@example.com".to_string(),
                role: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::TeamBusy(_)));
    assert_eq!(teams_holding(&pool, e.event_id, &a).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_new_member_cannot_duplicate_past_registration(pool: PgPool) {
    let owner = user(&pool, "owner@example.com").await;
    let a = user(&pool, "a@example.com").await;
    let b = user(&pool, "b@example.com").await;
    let c = user(&pool, "c@example.com").await;
    let d = user(&pool, "d@example.com").await;
    let e = event_starting(
        &pool,
        &owner,
        EventFormat::Team2,
        None,
        Utc::now() - Duration::days(30),
    )
    .await;

    let first_team = team(&pool, &a, &[&b]).await;
    let second_team = team(&pool, &c, &[&d]).await;
    participation::register_team(&pool, e.event_id, first_team, a.user_id, None)
        .await
        .unwrap();
    participation::register_team(&pool, e.event_id, second_team, c.user_id, None)
        .await
        .unwrap();

    let err = TeamRepository::new(&pool)
        .add_member(
            second_team,
            c.user_id,
            &AddMemberRequest {
                email: "A@example.com".to_string(),
                role: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::MemberConflict(_)));
    assert_eq!(teams_holding(&pool, e.event_id, &a).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_team_size_must_match_format(pool: PgPool) {
    let owner = user(&pool, "owner@example.com").await;
    let a = user(&pool, "a@example.com").await;
    let b = user(&pool, "b@example.com").await;
    let e = event(&pool, &owner, EventFormat::Team3, None).await;
    let pair = team(&pool, &a, &[&b]).await;

    let err = participation::register_team(&pool, e.event_id, pair, a.user_id, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::TeamSizeMismatch {
            team_size: 2,
            required: 3
        }
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_results_compound_on_resubmission(pool: PgPool) {
    let owner = user(&pool, "owner@example.com").await;
    let winner = user(&pool, "winner@example.com").await;
    let e = event(&pool, &owner, EventFormat::Solo, None).await;
    let settings = ResultsSettings::default();

    submit_results(&pool, &settings, e.event_id, owner.user_id, &first_place(&winner))
        .await
        .unwrap();
    assert_eq!(rating_of(&pool, &winner).await, 1020);

    let history = RatingRepository::new(&pool)
        .history(ParticipantType::User, winner.user_id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].old_rating, 1000);
    assert_eq!(history[0].new_rating, 1020);
    assert_eq!(history[0].reason, "Place 1 in \"Spring Cup\"");

    submit_results(&pool, &settings, e.event_id, owner.user_id, &first_place(&winner))
        .await
        .unwrap();
    assert_eq!(rating_of(&pool, &winner).await, 1040);

    let results = ResultsRepository::new(&pool)
        .list_for_event(e.event_id)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].rating_change, 20);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_revert_policy_makes_resubmission_idempotent(pool: PgPool) {
    let owner = user(&pool, "owner@example.com").await;
    let winner = user(&pool, "winner@example.com").await;
    let e = event(&pool, &owner, EventFormat::Solo, None).await;
    let settings = ResultsSettings {
        resubmission: ResubmissionPolicy::Revert,
        ..ResultsSettings::default()
    };

    for _ in 0..2 {
        submit_results(&pool, &settings, e.event_id, owner.user_id, &first_place(&winner))
            .await
            .unwrap();
        assert_eq!(rating_of(&pool, &winner).await, 1020);
    }

    let history = RatingRepository::new(&pool)
        .history(ParticipantType::User, winner.user_id)
        .await
        .unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[1].reason, "Reverted place 1 in \"Spring Cup\"");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_revert_resubmissions_complete(pool: PgPool) {
    let owner = user(&pool, "owner@example.com").await;
    let u1 = user(&pool, "u1@example.com").await;
    let u2 = user(&pool, "u2@example.com").await;
    let first = event(&pool, &owner, EventFormat::Solo, None).await.event_id;
    let second = event(&pool, &owner, EventFormat::Solo, None).await.event_id;
    let settings = ResultsSettings {
        resubmission: ResubmissionPolicy::Revert,
        ..ResultsSettings::default()
    };

    // same pair ranked in opposite orders, so prior results list them reversed
    let first_order = standings(&[&u1, &u2]);
    let second_order = standings(&[&u2, &u1]);
    submit_results(&pool, &settings, first, owner.user_id, &first_order)
        .await
        .unwrap();
    submit_results(&pool, &settings, second, owner.user_id, &second_order)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        for (event_id, entries) in [(first, first_order.clone()), (second, second_order.clone())] {
            let pool = pool.clone();
            let owner_id = owner.user_id;
            handles.push(tokio::spawn(async move {
                submit_results(&pool, &settings, event_id, owner_id, &entries).await
            }));
        }
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // each event nets +20 for first place and +10 for second
    assert_eq!(rating_of(&pool, &u1).await, 1030);
    assert_eq!(rating_of(&pool, &u2).await, 1030);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_failed_submission_leaves_state_untouched(pool: PgPool) {
    let owner = user(&pool, "owner@example.com").await;
    let winner = user(&pool, "winner@example.com").await;
    let e = event(&pool, &owner, EventFormat::Solo, None).await;
    let settings = ResultsSettings::default();

    submit_results(&pool, &settings, e.event_id, owner.user_id, &first_place(&winner))
        .await
        .unwrap();

    let mut entries = first_place(&winner);
    entries.push(ResultEntry {
        participant_type: ParticipantType::User,
        participant_id: Uuid::new_v4(),
        place: 2,
        score: Decimal::ZERO,
    });
    let err = submit_results(&pool, &settings, e.event_id, owner.user_id, &entries)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::ParticipantNotFound { .. }));

    assert_eq!(rating_of(&pool, &winner).await, 1020);
    let results = ResultsRepository::new(&pool)
        .list_for_event(e.event_id)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_only_owner_submits_results(pool: PgPool) {
    let owner = user(&pool, "owner@example.com").await;
    let other = user(&pool, "other@example.com").await;
    let e = event(&pool, &owner, EventFormat::Solo, None).await;

    let err = submit_results(
        &pool,
        &ResultsSettings::default(),
        e.event_id,
        other.user_id,
        &first_place(&other),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, StorageError::NotAuthorized(_)));
    assert_eq!(rating_of(&pool, &other).await, 1000);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_ratings_match_ledger_after_rebuild(pool: PgPool) {
    let owner = user(&pool, "owner@example.com").await;
    let a = user(&pool, "a@example.com").await;
    let b = user(&pool, "b@example.com").await;
    let e = event(&pool, &owner, EventFormat::Solo, None).await;

    let entries = vec![
        ResultEntry {
            participant_type: ParticipantType::User,
            participant_id: b.user_id,
            place: 1,
            score: Decimal::ZERO,
        },
        ResultEntry {
            participant_type: ParticipantType::User,
            participant_id: a.user_id,
            place: 2,
            score: Decimal::ZERO,
        },
    ];
    submit_results(&pool, &ResultsSettings::default(), e.event_id, owner.user_id, &entries)
        .await
        .unwrap();

    sqlx::query("UPDATE users SET rating = 0")
        .execute(&pool)
        .await
        .unwrap();
    let summary = rebuild_ratings(&pool).await.unwrap();
    assert_eq!(summary.users_updated, 3);

    assert_eq!(rating_of(&pool, &a).await, 1010);
    assert_eq!(rating_of(&pool, &b).await, 1020);
    assert_eq!(rating_of(&pool, &owner).await, 1000);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_format_locked_once_registered(pool: PgPool) {
    let owner = user(&pool, "owner@example.com").await;
    let angler = user(&pool, "angler@example.com").await;
    let e = event(&pool, &owner, EventFormat::Solo, None).await;

    participation::register_individual(&pool, e.event_id, angler.user_id, None)
        .await
        .unwrap();

    let err = EventRepository::new(&pool)
        .update(
            e.event_id,
            owner.user_id,
            &storage::dto::event::UpdateEventRequest {
                format: Some(EventFormat::Team2),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::FormatLocked));
}
