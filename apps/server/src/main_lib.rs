use std::sync::Arc;

use crate::config::{Config, LogFormat};
use crate::events::TracingDomainEventSink;
use mindquest_core::{
    clock::{Clock, SystemClock},
    events::DomainEventSink,
    goals::{GoalService, GoalServiceTrait},
    rewards::{RewardService, RewardServiceTrait},
    therapists::{TherapistRewardService, TherapistRewardServiceTrait},
};
use mindquest_storage_sqlite::{
    db::{self, write_actor},
    goals::GoalRepository,
    patients::PatientProgressionRepository,
    practice::PracticeFactsRepository,
    therapists::TherapistProgressionRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub reward_service: Arc<dyn RewardServiceTrait>,
    pub therapist_service: Arc<dyn TherapistRewardServiceTrait>,
    pub goal_service: Arc<dyn GoalServiceTrait>,
    pub practice_repository: Arc<PracticeFactsRepository>,
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.timezone));
    let event_sink: Arc<dyn DomainEventSink> = Arc::new(TracingDomainEventSink);
    tracing::info!("Civil timezone: {}", config.timezone);

    let patient_repository = Arc::new(PatientProgressionRepository::new(
        pool.clone(),
        writer.clone(),
    ));
    let reward_service = Arc::new(RewardService::new(
        patient_repository,
        clock.clone(),
        event_sink.clone(),
    ));

    let therapist_repository = Arc::new(TherapistProgressionRepository::new(
        pool.clone(),
        writer.clone(),
    ));
    let therapist_service: Arc<dyn TherapistRewardServiceTrait> =
        Arc::new(TherapistRewardService::new(
            therapist_repository,
            clock.clone(),
            event_sink.clone(),
        ));

    let practice_repository = Arc::new(PracticeFactsRepository::new(pool.clone(), writer.clone()));
    let goal_repository = Arc::new(GoalRepository::new(pool.clone(), writer.clone()));
    let goal_service = Arc::new(GoalService::new(
        goal_repository,
        practice_repository.clone(),
        therapist_service.clone(),
        clock,
        event_sink,
    ));

    Ok(Arc::new(AppState {
        reward_service,
        therapist_service,
        goal_service,
        practice_repository,
    }))
}
