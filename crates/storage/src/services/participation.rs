//! Registration of users and teams for fishing events.
//!
//! Every mutation runs in its own transaction that starts by locking the
//! event row, so registrations for one event never interleave. The rule
//! checks are plain functions over what was read inside that transaction.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{EventFormat, FishingEvent, FishingParticipant, TeamParticipation};
use crate::repository::event::lock_event;
use crate::repository::participation::{
    count_participants, count_team_participations, delete_participant, delete_team_participation,
    in_registered_team, individually_registered_among, insert_participant,
    insert_team_participation, participant_exists, registered_in_other_teams,
    team_participation_exists,
};
use crate::repository::team::{fetch_team, fetch_team_members};
use crate::repository::user::fetch_user;

/// Everything an individual registration is decided on
#[derive(Debug, Clone, Copy)]
pub struct IndividualRegistrationSnapshot<'a> {
    pub event: &'a FishingEvent,
    pub already_registered: bool,
    pub registered_count: i64,
    pub in_registered_team: bool,
}

/// Everything a team registration is decided on, once the event format has
/// been accepted and the team has been found
#[derive(Debug, Clone)]
pub struct TeamRegistrationSnapshot<'a> {
    pub event: &'a FishingEvent,
    pub requester_id: Uuid,
    pub member_ids: Vec<Uuid>,
    pub already_registered: bool,
    pub registered_teams: i64,
    pub individually_registered: Vec<Uuid>,
    pub in_other_teams: Vec<Uuid>,
}

pub fn check_individual_registration(snapshot: &IndividualRegistrationSnapshot<'_>) -> Result<()> {
    let event = snapshot.event;

    if event.format != EventFormat::Solo {
        return Err(StorageError::WrongFormat(format!(
            "Event uses the {} format, register a team instead",
            event.format
        )));
    }

    if snapshot.already_registered {
        return Err(StorageError::AlreadyRegistered);
    }

    if !event.has_capacity_for(snapshot.registered_count) {
        return Err(StorageError::CapacityReached);
    }

    if snapshot.in_registered_team {
        return Err(StorageError::MemberConflict(
            "You are already registered with a team for this event".to_string(),
        ));
    }

    Ok(())
}

/// Team size required by the event, or `WrongFormat` for solo events
pub fn ensure_team_format(event: &FishingEvent) -> Result<usize> {
    event.format.team_size().ok_or_else(|| {
        StorageError::WrongFormat("Event is for individual participants only".to_string())
    })
}

pub fn check_team_registration(snapshot: &TeamRegistrationSnapshot<'_>) -> Result<()> {
    let required = ensure_team_format(snapshot.event)?;

    if !snapshot.member_ids.contains(&snapshot.requester_id) {
        return Err(StorageError::NotTeamMember);
    }

    if snapshot.member_ids.len() != required {
        return Err(StorageError::TeamSizeMismatch {
            team_size: snapshot.member_ids.len(),
            required,
        });
    }

    if snapshot.already_registered {
        return Err(StorageError::AlreadyRegistered);
    }

    if !snapshot.event.has_capacity_for(snapshot.registered_teams) {
        return Err(StorageError::CapacityReached);
    }

    if !snapshot.individually_registered.is_empty() {
        return Err(StorageError::MemberConflict(format!(
            "{} team member(s) already registered individually for this event",
            snapshot.individually_registered.len()
        )));
    }

    if !snapshot.in_other_teams.is_empty() {
        return Err(StorageError::MemberConflict(format!(
            "{} team member(s) already registered with another team for this event",
            snapshot.in_other_teams.len()
        )));
    }

    Ok(())
}

/// A team member or the event owner may withdraw a team registration
pub fn check_team_unregistration(
    event: &FishingEvent,
    requester_id: Uuid,
    member_ids: &[Uuid],
    registered: bool,
) -> Result<()> {
    if !member_ids.contains(&requester_id) && !event.is_owned_by(requester_id) {
        return Err(StorageError::NotAuthorized(
            "Only team members or the event owner can unregister a team".to_string(),
        ));
    }

    if !registered {
        return Err(StorageError::NotRegistered);
    }

    Ok(())
}

pub async fn register_individual(
    pool: &PgPool,
    event_id: Uuid,
    user_id: Uuid,
    notes: Option<&str>,
) -> Result<FishingParticipant> {
    let mut tx = pool.begin().await?;

    let event = lock_event(&mut tx, event_id).await?;
    let user = fetch_user(&mut tx, user_id)
        .await?
        .ok_or(StorageError::NotAuthenticated)?;

    let snapshot = IndividualRegistrationSnapshot {
        event: &event,
        already_registered: participant_exists(&mut tx, event_id, user_id).await?,
        registered_count: count_participants(&mut tx, event_id).await?,
        in_registered_team: in_registered_team(&mut tx, event_id, user_id).await?,
    };
    check_individual_registration(&snapshot)?;

    let participant = insert_participant(&mut tx, event_id, &user, notes)
        .await
        .map_err(|e| e.on_unique_violation(StorageError::AlreadyRegistered))?;

    tx.commit().await?;

    tracing::info!("User {} registered for event {}", user_id, event_id);
    Ok(participant)
}

pub async fn unregister_individual(pool: &PgPool, event_id: Uuid, user_id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;

    lock_event(&mut tx, event_id).await?;
    if delete_participant(&mut tx, event_id, user_id).await? == 0 {
        return Err(StorageError::NotRegistered);
    }

    tx.commit().await?;

    tracing::info!("User {} unregistered from event {}", user_id, event_id);
    Ok(())
}

pub async fn register_team(
    pool: &PgPool,
    event_id: Uuid,
    team_id: Uuid,
    requester_id: Uuid,
    notes: Option<&str>,
) -> Result<TeamParticipation> {
    let mut tx = pool.begin().await?;

    let event = lock_event(&mut tx, event_id).await?;
    ensure_team_format(&event)?;

    if fetch_team(&mut tx, team_id).await?.is_none() {
        return Err(StorageError::TeamNotFound);
    }
    let member_ids: Vec<Uuid> = fetch_team_members(&mut tx, team_id)
        .await?
        .into_iter()
        .map(|m| m.user_id)
        .collect();

    let snapshot = TeamRegistrationSnapshot {
        event: &event,
        requester_id,
        already_registered: team_participation_exists(&mut tx, event_id, team_id).await?,
        registered_teams: count_team_participations(&mut tx, event_id).await?,
        individually_registered: individually_registered_among(&mut tx, event_id, &member_ids)
            .await?,
        in_other_teams: registered_in_other_teams(&mut tx, event_id, team_id, &member_ids).await?,
        member_ids,
    };
    if let Err(err) = check_team_registration(&snapshot) {
        if matches!(err, StorageError::NotTeamMember) {
            tracing::warn!(
                "User {} tried to register team {} without being a member",
                requester_id,
                team_id
            );
        }
        return Err(err);
    }

    let participation = insert_team_participation(&mut tx, event_id, team_id, notes)
        .await
        .map_err(|e| e.on_unique_violation(StorageError::AlreadyRegistered))?;

    tx.commit().await?;

    tracing::info!("Team {} registered for event {}", team_id, event_id);
    Ok(participation)
}

pub async fn unregister_team(
    pool: &PgPool,
    event_id: Uuid,
    team_id: Uuid,
    requester_id: Uuid,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    let event = lock_event(&mut tx, event_id).await?;
    if fetch_team(&mut tx, team_id).await?.is_none() {
        return Err(StorageError::TeamNotFound);
    }
    let member_ids: Vec<Uuid> = fetch_team_members(&mut tx, team_id)
        .await?
        .into_iter()
        .map(|m| m.user_id)
        .collect();
    let registered = team_participation_exists(&mut tx, event_id, team_id).await?;

    if let Err(err) = check_team_unregistration(&event, requester_id, &member_ids, registered) {
        if matches!(err, StorageError::NotAuthorized(_)) {
            tracing::warn!(
                "User {} tried to unregister team {} from event {}",
                requester_id,
                team_id,
                event_id
            );
        }
        return Err(err);
    }

    delete_team_participation(&mut tx, event_id, team_id).await?;
    tx.commit().await?;

    tracing::info!("Team {} unregistered from event {}", team_id, event_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(format: EventFormat, max_participants: Option<i32>) -> FishingEvent {
        let now = Utc::now();
        FishingEvent {
            event_id: Uuid::new_v4(),
            title: "Spring Cup".to_string(),
            description: None,
            latitude: 55.75,
            longitude: 37.61,
            start_date: now,
            end_date: None,
            fish_types: None,
            weather: None,
            format,
            max_participants,
            owner_id: Uuid::new_v4(),
            created_at: now,
        }
    }

    fn solo_snapshot(event: &FishingEvent) -> IndividualRegistrationSnapshot<'_> {
        IndividualRegistrationSnapshot {
            event,
            already_registered: false,
            registered_count: 0,
            in_registered_team: false,
        }
    }

    fn team_snapshot(event: &FishingEvent, members: Vec<Uuid>) -> TeamRegistrationSnapshot<'_> {
        TeamRegistrationSnapshot {
            event,
            requester_id: members[0],
            member_ids: members,
            already_registered: false,
            registered_teams: 0,
            individually_registered: Vec::new(),
            in_other_teams: Vec::new(),
        }
    }

    #[test]
    fn test_solo_registration_accepted() {
        let e = event(EventFormat::Solo, None);
        assert!(check_individual_registration(&solo_snapshot(&e)).is_ok());
    }

    #[test]
    fn test_individual_rejected_for_team_event() {
        let e = event(EventFormat::Team2, None);
        let err = check_individual_registration(&solo_snapshot(&e)).unwrap_err();
        assert!(matches!(err, StorageError::WrongFormat(_)));
    }

    #[test]
    fn test_second_registration_rejected() {
        let e = event(EventFormat::Solo, None);
        let snapshot = IndividualRegistrationSnapshot {
            already_registered: true,
            registered_count: 1,
            ..solo_snapshot(&e)
        };
        let err = check_individual_registration(&snapshot).unwrap_err();
        assert!(matches!(err, StorageError::AlreadyRegistered));
    }

    #[test]
    fn test_capacity_reached_on_last_seat_taken() {
        // Scenario: max 1, first user registered, second user is refused
        let e = event(EventFormat::Solo, Some(1));
        assert!(check_individual_registration(&solo_snapshot(&e)).is_ok());

        let snapshot = IndividualRegistrationSnapshot {
            registered_count: 1,
            ..solo_snapshot(&e)
        };
        let err = check_individual_registration(&snapshot).unwrap_err();
        assert!(matches!(err, StorageError::CapacityReached));
    }

    #[test]
    fn test_team_registration_accepted_when_size_matches() {
        let e = event(EventFormat::Team2, None);
        let snapshot = team_snapshot(&e, vec![Uuid::new_v4(), Uuid::new_v4()]);
        assert!(check_team_registration(&snapshot).is_ok());
    }

    #[test]
    fn test_team_size_mismatch() {
        let e = event(EventFormat::Team2, None);
        let snapshot = team_snapshot(&e, vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()]);
        let err = check_team_registration(&snapshot).unwrap_err();
        assert!(matches!(
            err,
            StorageError::TeamSizeMismatch {
                team_size: 3,
                required: 2
            }
        ));
    }

    #[test]
    fn test_team_rejected_for_solo_event() {
        let e = event(EventFormat::Solo, None);
        assert!(matches!(
            ensure_team_format(&e).unwrap_err(),
            StorageError::WrongFormat(_)
        ));
        assert_eq!(ensure_team_format(&event(EventFormat::Team3, None)).unwrap(), 3);
    }

    #[test]
    fn test_non_member_cannot_register_team() {
        let e = event(EventFormat::Team2, None);
        let mut snapshot = team_snapshot(&e, vec![Uuid::new_v4(), Uuid::new_v4()]);
        snapshot.requester_id = Uuid::new_v4();
        let err = check_team_registration(&snapshot).unwrap_err();
        assert!(matches!(err, StorageError::NotTeamMember));
    }

    #[test]
    fn test_member_registered_individually_conflicts() {
        let e = event(EventFormat::Team2, None);
        let members = vec![Uuid::new_v4(), Uuid::new_v4()];
        let mut snapshot = team_snapshot(&e, members.clone());
        snapshot.individually_registered = vec![members[1]];
        let err = check_team_registration(&snapshot).unwrap_err();
        assert!(matches!(err, StorageError::MemberConflict(_)));
    }

    #[test]
    fn test_member_in_other_registered_team_conflicts() {
        // Scenario: A and B registered as team one, B and C try as team two
        let e = event(EventFormat::Team2, None);
        let (b, c) = (Uuid::new_v4(), Uuid::new_v4());
        let mut snapshot = team_snapshot(&e, vec![c, b]);
        snapshot.in_other_teams = vec![b];
        let err = check_team_registration(&snapshot).unwrap_err();
        assert!(matches!(err, StorageError::MemberConflict(_)));
    }

    #[test]
    fn test_team_capacity_counts_teams() {
        let e = event(EventFormat::Team3, Some(2));
        let mut snapshot = team_snapshot(&e, vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()]);
        snapshot.registered_teams = 2;
        let err = check_team_registration(&snapshot).unwrap_err();
        assert!(matches!(err, StorageError::CapacityReached));
    }

    #[test]
    fn test_team_already_registered() {
        let e = event(EventFormat::Team2, None);
        let mut snapshot = team_snapshot(&e, vec![Uuid::new_v4(), Uuid::new_v4()]);
        snapshot.already_registered = true;
        let err = check_team_registration(&snapshot).unwrap_err();
        assert!(matches!(err, StorageError::AlreadyRegistered));
    }

    #[test]
    fn test_event_owner_can_unregister_any_team() {
        let e = event(EventFormat::Team2, None);
        let members = [Uuid::new_v4(), Uuid::new_v4()];
        assert!(check_team_unregistration(&e, e.owner_id, &members, true).is_ok());
        assert!(check_team_unregistration(&e, members[1], &members, true).is_ok());
    }

    #[test]
    fn test_outsider_cannot_unregister_team() {
        let e = event(EventFormat::Team2, None);
        let members = [Uuid::new_v4(), Uuid::new_v4()];
        let err = check_team_unregistration(&e, Uuid::new_v4(), &members, true).unwrap_err();
        assert!(matches!(err, StorageError::NotAuthorized(_)));
    }

    #[test]
    fn test_unregister_requires_registration() {
        let e = event(EventFormat::Team2, None);
        let members = [Uuid::new_v4(), Uuid::new_v4()];
        let err = check_team_unregistration(&e, members[0], &members, false).unwrap_err();
        assert!(matches!(err, StorageError::NotRegistered));
    }
}
