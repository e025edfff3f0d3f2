use anyhow::Context;
use storage::Database;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod extract;
mod features;
mod middleware;
mod routes;
mod state;

use config::Config;
use features::{admin, events, participation, ratings, results, teams, users};
use middleware::auth::{ApiKeys, AuthKeys};
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        events::handlers::list_events,
        events::handlers::get_event,
        events::handlers::create_event,
        events::handlers::update_event,
        events::handlers::delete_event,
        events::handlers::record_catch,
        participation::handlers::list_participants,
        participation::handlers::register_individual,
        participation::handlers::unregister_individual,
        participation::handlers::list_team_participations,
        participation::handlers::register_team,
        participation::handlers::unregister_team,
        results::handlers::list_results,
        results::handlers::submit_results,
        ratings::handlers::list_user_ratings,
        ratings::handlers::list_team_ratings,
        ratings::handlers::user_rating_history,
        ratings::handlers::team_rating_history,
        users::handlers::register_user,
        users::handlers::current_user,
        teams::handlers::list_my_teams,
        teams::handlers::create_team,
        teams::handlers::get_team,
        teams::handlers::update_team,
        teams::handlers::delete_team,
        teams::handlers::list_members,
        teams::handlers::add_member,
        teams::handlers::remove_member,
        admin::handlers::rebuild_ratings,
    ),
    components(
        schemas(
            storage::dto::event::CreateEventRequest,
            storage::dto::event::UpdateEventRequest,
            storage::dto::event::EventDetailResponse,
            storage::dto::catch::RecordCatchRequest,
            storage::dto::catch::CatchResponse,
            storage::dto::participation::RegisterIndividualRequest,
            storage::dto::participation::RegisterTeamRequest,
            storage::dto::participation::TeamMemberInfo,
            storage::dto::participation::TeamParticipationDetail,
            storage::dto::results::ResultEntry,
            storage::dto::results::SubmitResultsRequest,
            storage::dto::results::SubmitResultsResponse,
            storage::dto::ratings::RatingSort,
            storage::dto::ratings::UserRatingEntry,
            storage::dto::ratings::TeamRatingEntry,
            storage::dto::ratings::RatingRebuildSummary,
            storage::dto::team::CreateTeamRequest,
            storage::dto::team::UpdateTeamRequest,
            storage::dto::team::AddMemberRequest,
            storage::dto::team::TeamDetailResponse,
            storage::dto::user::RegisterUserRequest,
            storage::dto::user::UserSummary,
            storage::dto::common::PaginationMeta,
            storage::dto::common::SuccessResponse,
            storage::models::User,
            storage::models::Team,
            storage::models::TeamRole,
            storage::models::FishingEvent,
            storage::models::EventFormat,
            storage::models::FishingParticipant,
            storage::models::TeamParticipation,
            storage::models::EventResult,
            storage::models::ParticipantType,
            storage::models::RatingHistory,
            storage::models::Catch,
        )
    ),
    tags(
        (name = "events", description = "Fishing events and catches"),
        (name = "participation", description = "Individual and team registration"),
        (name = "results", description = "Event results"),
        (name = "ratings", description = "Ratings and rating history"),
        (name = "users", description = "User profiles"),
        (name = "teams", description = "Team management"),
        (name = "admin", description = "Maintenance endpoints"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            );
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting fishing events API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");
    tracing::info!(
        "Rating strategy: {:?}, resubmission: {:?}",
        config.results.strategy,
        config.results.resubmission
    );

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::with_max_connections(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let state = AppState {
        db,
        results: config.results,
        auth: AuthKeys::from_secret(config.jwt_secret.as_bytes()),
        api_keys: ApiKeys::from_comma_separated(&config.api_keys),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    let app = routes::configure(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, app).await?;

    Ok(())
}
