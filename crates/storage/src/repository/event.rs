use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::event::{
    CreateEventRequest, EventDetailResponse, UpdateEventRequest, check_date_order,
};
use crate::dto::user::UserSummary;
use crate::error::{Result, StorageError};
use crate::models::FishingEvent;
use crate::repository::catch::CatchRepository;
use crate::repository::participation::{self, ParticipationRepository};

const SELECT_EVENT: &str = r#"
    SELECT event_id, title, description, latitude, longitude, start_date, end_date,
           fish_types, weather, format, max_participants, owner_id, created_at
    FROM fishing_events
"#;

/// Repository for FishingEvent database operations
pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all events, latest start first
    pub async fn list(&self) -> Result<Vec<FishingEvent>> {
        let sql = format!("{SELECT_EVENT} ORDER BY start_date DESC, created_at DESC");
        let events = sqlx::query_as::<_, FishingEvent>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(events)
    }

    pub async fn find_by_id(&self, event_id: Uuid) -> Result<FishingEvent> {
        let mut conn = self.pool.acquire().await?;
        fetch_event(&mut conn, event_id)
            .await?
            .ok_or(StorageError::EventNotFound)
    }

    /// Event with owner, registrations and catches
    pub async fn find_detailed(&self, event_id: Uuid) -> Result<EventDetailResponse> {
        let event = self.find_by_id(event_id).await?;

        let owner = sqlx::query_as::<_, UserSummary>(
            "SELECT user_id, name, email FROM users WHERE user_id = $1",
        )
        .bind(event.owner_id)
        .fetch_one(self.pool)
        .await?;

        let participations = ParticipationRepository::new(self.pool);
        let participants = participations.list_participants(event_id).await?;
        let teams = participations.list_team_participations(event_id).await?;
        let catches = CatchRepository::new(self.pool).list_for_event(event_id).await?;

        Ok(EventDetailResponse {
            event,
            owner,
            participants,
            teams,
            catches,
        })
    }

    /// Create a new event owned by `owner_id`
    pub async fn create(&self, owner_id: Uuid, req: &CreateEventRequest) -> Result<FishingEvent> {
        let event = sqlx::query_as::<_, FishingEvent>(
            r#"
            INSERT INTO fishing_events (
                title, description, latitude, longitude, start_date, end_date,
                fish_types, weather, format, max_participants, owner_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING event_id, title, description, latitude, longitude, start_date, end_date,
                      fish_types, weather, format, max_participants, owner_id, created_at
            "#,
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(&req.fish_types)
        .bind(&req.weather)
        .bind(req.format)
        .bind(req.max_participants)
        .bind(owner_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            // token subject without a profile
            let err = StorageError::from(e);
            if err.is_foreign_key_violation() {
                StorageError::NotAuthenticated
            } else {
                err
            }
        })?;

        Ok(event)
    }

    /// Apply a partial update. Only the owner may update; anyone else sees
    /// `NotFound`. The format is frozen once somebody has registered.
    pub async fn update(
        &self,
        event_id: Uuid,
        requester_id: Uuid,
        req: &UpdateEventRequest,
    ) -> Result<FishingEvent> {
        let mut tx = self.pool.begin().await?;

        let existing = lock_event(&mut tx, event_id).await?;
        if !existing.is_owned_by(requester_id) {
            return Err(StorageError::NotFound);
        }

        if req.changes_format_of(&existing) {
            let (individuals, teams) = participation::count_registrations(&mut tx, event_id).await?;
            if individuals + teams > 0 {
                return Err(StorageError::FormatLocked);
            }
        }

        let merged = req.apply_to(&existing);
        check_date_order(merged.start_date, merged.end_date)
            .map_err(|msg| StorageError::Validation(msg.to_string()))?;

        let updated = sqlx::query_as::<_, FishingEvent>(
            r#"
            UPDATE fishing_events
            SET
                title = $2,
                description = $3,
                latitude = $4,
                longitude = $5,
                start_date = $6,
                end_date = $7,
                fish_types = $8,
                weather = $9,
                format = $10,
                max_participants = $11
            WHERE event_id = $1
            RETURNING event_id, title, description, latitude, longitude, start_date, end_date,
                      fish_types, weather, format, max_participants, owner_id, created_at
            "#,
        )
        .bind(event_id)
        .bind(&merged.title)
        .bind(&merged.description)
        .bind(merged.latitude)
        .bind(merged.longitude)
        .bind(merged.start_date)
        .bind(merged.end_date)
        .bind(&merged.fish_types)
        .bind(&merged.weather)
        .bind(merged.format)
        .bind(merged.max_participants)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Delete an event owned by `requester_id`; registrations, results and
    /// catches go with it
    pub async fn delete(&self, event_id: Uuid, requester_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM fishing_events
            WHERE event_id = $1 AND owner_id = $2
            "#,
        )
        .bind(event_id)
        .bind(requester_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

pub(crate) async fn fetch_event(
    conn: &mut PgConnection,
    event_id: Uuid,
) -> Result<Option<FishingEvent>> {
    let sql = format!("{SELECT_EVENT} WHERE event_id = $1");
    let event = sqlx::query_as::<_, FishingEvent>(&sql)
        .bind(event_id)
        .fetch_optional(conn)
        .await?;

    Ok(event)
}

/// Load the event and hold its row lock until the transaction ends.
///
/// Every registration and results submission for an event goes through this
/// lock, so their read-then-write sequences run one at a time per event.
pub(crate) async fn lock_event(conn: &mut PgConnection, event_id: Uuid) -> Result<FishingEvent> {
    let sql = format!("{SELECT_EVENT} WHERE event_id = $1 FOR UPDATE");
    sqlx::query_as::<_, FishingEvent>(&sql)
        .bind(event_id)
        .fetch_optional(conn)
        .await?
        .ok_or(StorageError::EventNotFound)
}
