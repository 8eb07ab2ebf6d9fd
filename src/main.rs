use balance_digest::{
    config::default_schedules, health, FirestoreStore, ReportJob, Result, Scheduler, Settings,
    TelegramNotifier,
};
use dotenv::dotenv;
use log::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let settings = Settings::from_env().inspect_err(|err| {
        error!("Startup aborted: {}", err);
    })?;

    let store = FirestoreStore::new(
        settings.firestore_project_id.clone(),
        settings.firestore_api_key.clone(),
    );
    let notifier = TelegramNotifier::new(settings.bot_token.clone());
    let job = ReportJob::new(store, notifier, settings.usdt_rate);

    let schedules = default_schedules();
    info!("Reporting bot starting with {} schedule(s)", schedules.len());
    let scheduler = Scheduler::new(job, schedules)?;

    let health_server = tokio::spawn(health::serve(settings.port));

    scheduler
        .run_until_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    health_server.abort();
    Ok(())
}
