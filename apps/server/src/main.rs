use mindquest_server::{
    api::app_router, build_state, config::Config, init_tracing,
    scheduler::start_goal_recalc_scheduler,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);
    let state = build_state(&config).await?;

    if let Some(every) = config.goal_recalc_interval {
        start_goal_recalc_scheduler(state.clone(), every);
    }

    let router = app_router(state, &config);
    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
