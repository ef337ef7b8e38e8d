//! End-to-end lifecycle scenarios through the service layer.

mod support;

use std::sync::Arc;

use chrono::Duration;
use tokio::sync::Barrier;

use magic_incubator::db::repositories::LocalRepository;
use magic_incubator::db::repository::{RepositoryError, ScheduleRepository};
use magic_incubator::db::services::{self, ServiceError};
use magic_incubator::db::{FullRepository, JsonFileConfig, JsonFileRepository, SmcFilter};
use magic_incubator::lifecycle::{DaysSinceActivity, LifecycleError};
use magic_incubator::models::{
    BookingStatus, RevenueEntry, SmcSchedule, Stage, StartupId, StartupStatus, TimeSlot,
};
use support::{date, now, profile};

fn lifecycle_err(err: ServiceError) -> LifecycleError {
    match err {
        ServiceError::Lifecycle(e) => e,
        other => panic!("expected lifecycle error, got {:?}", other),
    }
}

async fn register<R>(repo: &R, company: &str) -> StartupId
where
    R: FullRepository + ?Sized,
{
    services::register_startup(repo, profile(company), None, now())
        .await
        .unwrap()
        .id
        .unwrap()
}

/// Walk a startup through `n` completed SMC pitches.
async fn advance(repo: &LocalRepository, id: StartupId, n: u32) {
    for i in 0..n {
        let schedule = services::schedule_smc(repo, id, date(2025, 11, 3 + i), TimeSlot::TenAm, now())
            .await
            .unwrap();
        services::complete_smc(repo, schedule.id.unwrap(), "Dr. X", "Good", now())
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_fourth_registration_gets_magic004() {
    let repo = LocalRepository::new();
    for company in ["One", "Two", "Three"] {
        register(&repo, company).await;
    }

    let mut acme = profile("Acme");
    acme.email = "a@x.com".to_string();
    let startup = services::register_startup(&repo, acme, None, now()).await.unwrap();

    assert_eq!(startup.magic_code, "MAGIC004");
    assert_eq!(startup.stage, Stage::S0);
    assert_eq!(startup.status, StartupStatus::Active);
}

#[tokio::test]
async fn test_second_booking_of_slot_conflicts() {
    let repo = LocalRepository::new();
    let first = register(&repo, "Acme").await;
    let second = register(&repo, "Beta").await;

    services::schedule_smc(&repo, first, date(2025, 12, 6), TimeSlot::TenAm, now())
        .await
        .unwrap();
    let err = services::schedule_smc(&repo, second, date(2025, 12, 6), TimeSlot::TenAm, now())
        .await
        .unwrap_err();

    assert_eq!(lifecycle_err(err).code(), "SLOT_CONFLICT");
}

const RACERS: usize = 8;

/// Run `task` for every startup on its own task, released together.
async fn race<R, F, Fut, T>(repo: Arc<R>, ids: Vec<StartupId>, task: F) -> Vec<T>
where
    R: FullRepository + 'static,
    F: Fn(Arc<R>, StartupId) -> Fut,
    Fut: std::future::Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let barrier = Arc::new(Barrier::new(ids.len()));
    let handles: Vec<_> = ids
        .into_iter()
        .map(|id| {
            let barrier = Arc::clone(&barrier);
            let work = task(Arc::clone(&repo), id);
            tokio::spawn(async move {
                barrier.wait().await;
                work.await
            })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    results
}

async fn register_racers<R: FullRepository>(repo: &R) -> Vec<StartupId> {
    let mut ids = Vec::new();
    for n in 0..RACERS {
        ids.push(register(repo, &format!("Startup {}", n)).await);
    }
    ids
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_exactly_one_wins() {
    let repo = Arc::new(LocalRepository::new());
    let ids = register_racers(repo.as_ref()).await;

    let results = race(Arc::clone(&repo), ids, |repo, id| async move {
        services::schedule_smc(repo.as_ref(), id, date(2025, 12, 6), TimeSlot::TwoPm, now()).await
    })
    .await;

    let mut won = 0;
    for result in results {
        match result {
            Ok(_) => won += 1,
            Err(err) => assert!(matches!(
                lifecycle_err(err),
                LifecycleError::SlotConflict { slot: TimeSlot::TwoPm, .. }
            )),
        }
    }
    assert_eq!(won, 1);

    let booked = services::list_smc(
        repo.as_ref(),
        &SmcFilter {
            date: Some(date(2025, 12, 6)),
            status: Some(BookingStatus::Scheduled),
            startup_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(booked.len(), 1);
}

fn raw_booking(startup_id: StartupId) -> SmcSchedule {
    SmcSchedule {
        id: None,
        startup_id,
        date: date(2025, 12, 13),
        time_slot: TimeSlot::ElevenAm,
        status: BookingStatus::Scheduled,
        panelist_name: String::new(),
        feedback: String::new(),
        completed_at: None,
        created_at: now(),
    }
}

/// Races inserts straight into the store, with no read-side pre-check, so
/// only the store's own slot check can turn the losers away.
async fn assert_store_admits_one_booking<R: FullRepository + 'static>(repo: Arc<R>) {
    let ids = register_racers(repo.as_ref()).await;

    let results = race(Arc::clone(&repo), ids, |repo, id| async move {
        repo.insert_smc_schedule(raw_booking(id)).await
    })
    .await;

    let won = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(won, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, RepositoryError::ConflictError { .. })));

    let stored = repo
        .list_smc_schedules(&SmcFilter::default())
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_local_store_slot_check_under_contention() {
    assert_store_admits_one_booking(Arc::new(LocalRepository::new())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_json_store_slot_check_under_contention() {
    let dir = tempfile::tempdir().unwrap();
    let config = JsonFileConfig::new(dir.path().join("incubator.json"));
    let repo = Arc::new(JsonFileRepository::open(&config).await.unwrap());
    assert_store_admits_one_booking(Arc::clone(&repo)).await;

    let reopened = JsonFileRepository::open(&config).await.unwrap();
    assert_eq!(
        reopened
            .list_smc_schedules(&SmcFilter::default())
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_get_distinct_codes() {
    let repo = Arc::new(LocalRepository::new());
    let barrier = Arc::new(Barrier::new(RACERS));

    let handles: Vec<_> = (0..RACERS)
        .map(|n| {
            let repo = Arc::clone(&repo);
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                services::register_startup(repo.as_ref(), profile(&format!("Racer {}", n)), None, now())
                    .await
            })
        })
        .collect();

    let mut codes = Vec::new();
    for handle in handles {
        codes.push(handle.await.unwrap().unwrap().magic_code);
    }
    codes.sort();
    let expected: Vec<String> = (1..=RACERS).map(|n| format!("MAGIC{:03}", n)).collect();
    assert_eq!(codes, expected);
}

#[tokio::test]
async fn test_completed_pitch_moves_s0_to_s1() {
    let repo = LocalRepository::new();
    let id = register(&repo, "Acme").await;
    let schedule = services::schedule_smc(&repo, id, date(2025, 12, 6), TimeSlot::TenAm, now())
        .await
        .unwrap();

    let (_, startup) = services::complete_smc(&repo, schedule.id.unwrap(), "Dr. X", "Good", now())
        .await
        .unwrap();

    assert_eq!(startup.stage, Stage::S1);
    assert_eq!(startup.pitch_history.len(), 1);
    assert_eq!(startup.pitch_history[0].stage, Stage::S1);
    assert_eq!(startup.pitch_history[0].time, "10 AM");
}

#[tokio::test]
async fn test_stage_stops_at_s3() {
    let repo = LocalRepository::new();
    let id = register(&repo, "Acme").await;
    advance(&repo, id, 3).await;

    let startup = services::get_startup(&repo, id).await.unwrap();
    assert_eq!(startup.stage, Stage::S3);

    let err = services::schedule_smc(&repo, id, date(2025, 12, 20), TimeSlot::TenAm, now())
        .await
        .unwrap_err();
    assert_eq!(lifecycle_err(err).code(), "INVALID_STAGE");
}

#[tokio::test]
async fn test_reject_requires_remark_and_records_stage() {
    let repo = LocalRepository::new();
    let id = register(&repo, "Acme").await;
    advance(&repo, id, 2).await;

    let err = services::reject_startup(&repo, id, "", now()).await.unwrap_err();
    assert_eq!(lifecycle_err(err).code(), "VALIDATION_ERROR");
    assert_eq!(
        services::get_startup(&repo, id).await.unwrap().status,
        StartupStatus::Active
    );

    let rejected = services::reject_startup(&repo, id, "Not viable", now())
        .await
        .unwrap();
    assert_eq!(rejected.status, StartupStatus::Rejected);
    assert_eq!(rejected.rejected_from_stage, Some(Stage::S2));
    assert_eq!(rejected.stage, Stage::S2);
}

#[tokio::test]
async fn test_onboarded_revenue_totals() {
    let repo = LocalRepository::new();
    let id = register(&repo, "Acme").await;
    services::onboard_startup(&repo, id, now()).await.unwrap();

    for (amount, source) in [(5000.0, "Sales"), (3000.0, "Grant")] {
        let entry = RevenueEntry {
            id: source.to_lowercase(),
            amount,
            source: source.to_string(),
            date: None,
            description: String::new(),
        };
        services::add_revenue(&repo, id, entry).await.unwrap();
    }

    let startup = services::get_startup(&repo, id).await.unwrap();
    assert_eq!(startup.total_revenue, 8000.0);
    assert_eq!(startup.revenue_history.len(), 2);
}

#[tokio::test]
async fn test_graduating_active_startup_is_invalid_status() {
    let repo = LocalRepository::new();
    let id = register(&repo, "Acme").await;

    let err = services::graduate_startup(&repo, id, now()).await.unwrap_err();
    assert_eq!(lifecycle_err(err).code(), "INVALID_STATUS");
}

#[tokio::test]
async fn test_inactivity_forty_days_after_smc() {
    let repo = LocalRepository::new();
    let id = register(&repo, "Acme").await;
    let schedule = services::schedule_smc(&repo, id, date(2025, 12, 1), TimeSlot::ElevenAm, now())
        .await
        .unwrap();
    services::complete_smc(&repo, schedule.id.unwrap(), "Dr. X", "Good", now())
        .await
        .unwrap();

    let as_of = now() + Duration::days(40);
    let report = services::startup_inactivity(&repo, id, as_of)
        .await
        .unwrap()
        .unwrap();
    assert!(report.is_inactive);
    assert_eq!(report.days_since_activity, DaysSinceActivity::Days(40));
}

#[tokio::test]
async fn test_json_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = JsonFileConfig::new(dir.path().join("incubator.json"));

    let id = {
        let repo = JsonFileRepository::open(&config).await.unwrap();
        let id = register(&repo, "Acme").await;
        let schedule = services::schedule_smc(&repo, id, date(2025, 12, 6), TimeSlot::TenAm, now())
            .await
            .unwrap();
        services::complete_smc(&repo, schedule.id.unwrap(), "Dr. X", "Good", now())
            .await
            .unwrap();
        services::delete_startup(&repo, register(&repo, "Beta").await)
            .await
            .unwrap();
        id
    };

    let reopened = JsonFileRepository::open(&config).await.unwrap();
    let startup = services::get_startup(&reopened, id).await.unwrap();
    assert_eq!(startup.stage, Stage::S1);
    assert_eq!(startup.pitch_history.len(), 1);

    let next = services::register_startup(&reopened, profile("Gamma"), None, now())
        .await
        .unwrap();
    assert_eq!(next.magic_code, "MAGIC003");
    assert!(next.id.unwrap() > id);
}
