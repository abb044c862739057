//! End-to-end service tests over the in-process workbook backend.

use std::sync::Arc;

use fleet_dispatch::error::ServiceError;
use fleet_dispatch::model::JobStatus;
use fleet_dispatch::service::drivers::DriverFields;
use fleet_dispatch::service::jobs::JobFields;
use fleet_dispatch::service::{auth, drivers, jobs};
use fleet_dispatch::store::{memory, Workbook, Worksheet};

async fn sheets() -> (Arc<dyn Worksheet>, Arc<dyn Worksheet>) {
    let workbook = memory::seeded("Jobs", "Drivers");
    let jobs_sheet = workbook.worksheet("Jobs").await.unwrap();
    let drivers_sheet = workbook.worksheet("Drivers").await.unwrap();
    (jobs_sheet, drivers_sheet)
}

fn job_fields(name: &str, driver_id: &str, driver_name: &str) -> JobFields {
    JobFields {
        job_name: name.to_string(),
        driver_id: driver_id.to_string(),
        driver_name: driver_name.to_string(),
        pickup_time: "08:00".to_string(),
    }
}

fn driver_fields(username: &str, password: &str, full_name: &str) -> DriverFields {
    DriverFields {
        username: username.to_string(),
        password: password.to_string(),
        full_name: full_name.to_string(),
        id_card: "1100200334455".to_string(),
        license_plate: "2AB-991".to_string(),
        phone: "555-0123".to_string(),
    }
}

fn route(stops: &[&str]) -> Vec<serde_json::Value> {
    stops.iter().map(|s| serde_json::json!(s)).collect()
}

#[tokio::test]
async fn test_login_requires_exact_match() {
    let (_, drivers_sheet) = sheets().await;
    drivers::add(
        drivers_sheet.as_ref(),
        driver_fields("alice", "secret", "Alice Smith"),
    )
    .await
    .unwrap();

    let identity = auth::login(drivers_sheet.as_ref(), "alice", "secret")
        .await
        .unwrap();
    assert_eq!(identity.id, "DRV-001");
    assert_eq!(identity.full_name, "Alice Smith");
    assert_eq!(identity.role, "driver");

    let wrong_password = auth::login(drivers_sheet.as_ref(), "alice", "Secret").await;
    assert!(matches!(wrong_password, Err(ServiceError::Unauthorized)));

    let wrong_user = auth::login(drivers_sheet.as_ref(), "bob", "secret").await;
    assert!(matches!(wrong_user, Err(ServiceError::Unauthorized)));
}

#[tokio::test]
async fn test_login_on_empty_sheet_fails_cleanly() {
    let (_, drivers_sheet) = sheets().await;
    let result = auth::login(drivers_sheet.as_ref(), "anyone", "anything").await;
    assert!(matches!(result, Err(ServiceError::Unauthorized)));
}

#[tokio::test]
async fn test_created_job_listed_first() {
    let (jobs_sheet, _) = sheets().await;

    let first = jobs::create(
        jobs_sheet.as_ref(),
        job_fields("First", "DRV-001", "Alice"),
        route(&["A"]),
    )
    .await
    .unwrap();
    let second = jobs::create(
        jobs_sheet.as_ref(),
        job_fields("Second", "DRV-001", "Alice"),
        route(&["B"]),
    )
    .await
    .unwrap();

    assert_eq!(first, "JOB-1");
    assert_eq!(second, "JOB-2");

    let listing = jobs::list(jobs_sheet.as_ref()).await.unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].job_id, "JOB-2");
    assert_eq!(listing[1].job_id, "JOB-1");
    assert_eq!(listing[0].status, JobStatus::Pending);
    assert_eq!(listing[0].current_step_index, 0);
}

#[tokio::test]
async fn test_driver_filter_preserves_order() {
    let (jobs_sheet, _) = sheets().await;

    for (name, driver) in [
        ("J1", "DRV-001"),
        ("J2", "DRV-002"),
        ("J3", "DRV-001"),
        ("J4", "DRV-001"),
    ] {
        jobs::create(
            jobs_sheet.as_ref(),
            job_fields(name, driver, "Someone"),
            route(&["A"]),
        )
        .await
        .unwrap();
    }

    let mine = jobs::list_for_driver(jobs_sheet.as_ref(), "DRV-001")
        .await
        .unwrap();
    let names: Vec<&str> = mine.iter().map(|j| j.job_name.as_str()).collect();
    assert_eq!(names, ["J4", "J3", "J1"]);

    let none = jobs::list_for_driver(jobs_sheet.as_ref(), "DRV-009")
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_accept_only_from_pending() {
    let (jobs_sheet, _) = sheets().await;
    let job_id = jobs::create(
        jobs_sheet.as_ref(),
        job_fields("Run", "DRV-001", "Alice"),
        route(&["A", "B"]),
    )
    .await
    .unwrap();

    jobs::accept(jobs_sheet.as_ref(), &job_id).await.unwrap();
    let listing = jobs::list(jobs_sheet.as_ref()).await.unwrap();
    assert_eq!(listing[0].status, JobStatus::Active);

    let again = jobs::accept(jobs_sheet.as_ref(), &job_id).await;
    assert!(matches!(again, Err(ServiceError::InvalidTransition(_))));

    let missing = jobs::accept(jobs_sheet.as_ref(), "JOB-99").await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_progress_completes_at_final_waypoint() {
    let (jobs_sheet, _) = sheets().await;
    let job_id = jobs::create(
        jobs_sheet.as_ref(),
        job_fields("Delivery", "DRV-001", "Alice"),
        route(&["A", "B", "C"]),
    )
    .await
    .unwrap();
    jobs::accept(jobs_sheet.as_ref(), &job_id).await.unwrap();

    let status = jobs::update_progress(jobs_sheet.as_ref(), &job_id, 3, "13.75", "100.50")
        .await
        .unwrap();
    assert_eq!(status, JobStatus::Completed);

    let job = &jobs::list(jobs_sheet.as_ref()).await.unwrap()[0];
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.current_step_index, 3);
    assert_eq!(job.last_known_location, "13.75,100.50");
    assert!(!job.last_update_timestamp.is_empty());
}

#[tokio::test]
async fn test_partial_progress_keeps_job_active() {
    let (jobs_sheet, _) = sheets().await;
    let job_id = jobs::create(
        jobs_sheet.as_ref(),
        job_fields("Delivery", "DRV-001", "Alice"),
        route(&["A", "B", "C"]),
    )
    .await
    .unwrap();
    jobs::accept(jobs_sheet.as_ref(), &job_id).await.unwrap();

    let status = jobs::update_progress(jobs_sheet.as_ref(), &job_id, 1, "13.75", "100.50")
        .await
        .unwrap();
    assert_eq!(status, JobStatus::Active);

    let job = &jobs::list(jobs_sheet.as_ref()).await.unwrap()[0];
    assert_eq!(job.status, JobStatus::Active);
    assert_eq!(job.current_step_index, 1);
}

#[tokio::test]
async fn test_progress_rejected_unless_active() {
    let (jobs_sheet, _) = sheets().await;
    let job_id = jobs::create(
        jobs_sheet.as_ref(),
        job_fields("Delivery", "DRV-001", "Alice"),
        route(&["A"]),
    )
    .await
    .unwrap();

    // Still pending: nobody accepted it.
    let on_pending = jobs::update_progress(jobs_sheet.as_ref(), &job_id, 1, "0", "0").await;
    assert!(matches!(on_pending, Err(ServiceError::InvalidTransition(_))));

    jobs::accept(jobs_sheet.as_ref(), &job_id).await.unwrap();
    jobs::update_progress(jobs_sheet.as_ref(), &job_id, 1, "0", "0")
        .await
        .unwrap();

    // Completed is terminal.
    let on_completed = jobs::update_progress(jobs_sheet.as_ref(), &job_id, 1, "0", "0").await;
    assert!(matches!(
        on_completed,
        Err(ServiceError::InvalidTransition(_))
    ));
}

#[tokio::test]
async fn test_progress_step_out_of_range() {
    let (jobs_sheet, _) = sheets().await;
    let job_id = jobs::create(
        jobs_sheet.as_ref(),
        job_fields("Delivery", "DRV-001", "Alice"),
        route(&["A", "B"]),
    )
    .await
    .unwrap();
    jobs::accept(jobs_sheet.as_ref(), &job_id).await.unwrap();

    let result = jobs::update_progress(jobs_sheet.as_ref(), &job_id, 3, "0", "0").await;
    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));

    // The rejected update must not have touched the row.
    let job = &jobs::list(jobs_sheet.as_ref()).await.unwrap()[0];
    assert_eq!(job.status, JobStatus::Active);
    assert_eq!(job.current_step_index, 0);
}

#[tokio::test]
async fn test_deleted_job_yields_not_found() {
    let (jobs_sheet, _) = sheets().await;
    let job_id = jobs::create(
        jobs_sheet.as_ref(),
        job_fields("Gone", "DRV-001", "Alice"),
        route(&["A"]),
    )
    .await
    .unwrap();

    jobs::delete(jobs_sheet.as_ref(), &job_id).await.unwrap();
    assert!(jobs::list(jobs_sheet.as_ref()).await.unwrap().is_empty());

    let edit = jobs::edit(
        jobs_sheet.as_ref(),
        &job_id,
        job_fields("Renamed", "DRV-001", "Alice"),
    )
    .await;
    assert!(matches!(edit, Err(ServiceError::NotFound(_))));

    let delete_again = jobs::delete(jobs_sheet.as_ref(), &job_id).await;
    assert!(matches!(delete_again, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_edit_leaves_progress_untouched() {
    let (jobs_sheet, _) = sheets().await;
    let job_id = jobs::create(
        jobs_sheet.as_ref(),
        job_fields("Original", "DRV-001", "Alice"),
        route(&["A", "B", "C"]),
    )
    .await
    .unwrap();
    jobs::accept(jobs_sheet.as_ref(), &job_id).await.unwrap();
    jobs::update_progress(jobs_sheet.as_ref(), &job_id, 1, "13.7", "100.5")
        .await
        .unwrap();

    jobs::edit(
        jobs_sheet.as_ref(),
        &job_id,
        JobFields {
            job_name: "Renamed".to_string(),
            driver_id: "DRV-002".to_string(),
            driver_name: "Bob".to_string(),
            pickup_time: "14:00".to_string(),
        },
    )
    .await
    .unwrap();

    let job = &jobs::list(jobs_sheet.as_ref()).await.unwrap()[0];
    assert_eq!(job.job_name, "Renamed");
    assert_eq!(job.driver_id, "DRV-002");
    assert_eq!(job.driver_name, "Bob");
    assert_eq!(job.pickup_time, "14:00");
    // Untouched by edit:
    assert_eq!(job.status, JobStatus::Active);
    assert_eq!(job.current_step_index, 1);
    assert_eq!(job.waypoints.len(), 3);
}

#[tokio::test]
async fn test_job_ids_stay_monotonic_after_delete() {
    let (jobs_sheet, _) = sheets().await;
    let fields = || job_fields("Run", "DRV-001", "Alice");

    let first = jobs::create(jobs_sheet.as_ref(), fields(), route(&["A"]))
        .await
        .unwrap();
    let second = jobs::create(jobs_sheet.as_ref(), fields(), route(&["A"]))
        .await
        .unwrap();
    assert_eq!((first.as_str(), second.as_str()), ("JOB-1", "JOB-2"));

    jobs::delete(jobs_sheet.as_ref(), "JOB-2").await.unwrap();

    // The freed suffix is not reused.
    let third = jobs::create(jobs_sheet.as_ref(), fields(), route(&["A"]))
        .await
        .unwrap();
    assert_eq!(third, "JOB-3");
}

#[tokio::test]
async fn test_driver_lifecycle() {
    let (_, drivers_sheet) = sheets().await;

    let first = drivers::add(
        drivers_sheet.as_ref(),
        driver_fields("alice", "pw1", "Alice Smith"),
    )
    .await
    .unwrap();
    let second = drivers::add(
        drivers_sheet.as_ref(),
        driver_fields("bob", "pw2", "Bob Jones"),
    )
    .await
    .unwrap();
    assert_eq!(first, "DRV-001");
    assert_eq!(second, "DRV-002");

    let listing = drivers::list(drivers_sheet.as_ref()).await.unwrap();
    assert_eq!(listing.len(), 2);
    // Insertion order, not reversed.
    assert_eq!(listing[0].driver_id, "DRV-001");
    assert_eq!(listing[1].username, "bob");
    assert_eq!(listing[1].role, "driver");

    drivers::edit(
        drivers_sheet.as_ref(),
        "DRV-002",
        driver_fields("bobby", "pw3", "Bob Jones"),
    )
    .await
    .unwrap();
    let listing = drivers::list(drivers_sheet.as_ref()).await.unwrap();
    assert_eq!(listing[1].username, "bobby");
    assert_eq!(listing[1].password, "pw3");
    assert_eq!(listing[1].driver_id, "DRV-002");

    drivers::delete(drivers_sheet.as_ref(), "DRV-001")
        .await
        .unwrap();
    let listing = drivers::list(drivers_sheet.as_ref()).await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].driver_id, "DRV-002");

    let missing = drivers::delete(drivers_sheet.as_ref(), "DRV-001").await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));

    // Ids remain monotonic after the delete.
    let third = drivers::add(
        drivers_sheet.as_ref(),
        driver_fields("carol", "pw4", "Carol White"),
    )
    .await
    .unwrap();
    assert_eq!(third, "DRV-003");
}

#[tokio::test]
async fn test_malformed_rows_are_skipped_in_listing() {
    let (jobs_sheet, _) = sheets().await;
    jobs::create(
        jobs_sheet.as_ref(),
        job_fields("Good", "DRV-001", "Alice"),
        route(&["A"]),
    )
    .await
    .unwrap();

    // A row with an unknown status, written behind the service's back.
    jobs_sheet
        .append_row(vec![
            "JOB-X".to_string(),
            "2024-01-01".to_string(),
            "Corrupt".to_string(),
            "Archived".to_string(),
        ])
        .await
        .unwrap();

    let listing = jobs::list(jobs_sheet.as_ref()).await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].job_name, "Good");
}

/// The walkthrough from the behavior sheet: three stops, accept, report the
/// final stop, job completes; a second job stays active after one stop.
#[tokio::test]
async fn test_delivery_walkthrough() {
    let (jobs_sheet, drivers_sheet) = sheets().await;

    drivers::add(
        drivers_sheet.as_ref(),
        driver_fields("alice", "secret", "Alice Smith"),
    )
    .await
    .unwrap();
    let identity = auth::login(drivers_sheet.as_ref(), "alice", "secret")
        .await
        .unwrap();

    let job_id = jobs::create(
        jobs_sheet.as_ref(),
        job_fields("Three stop run", &identity.id, &identity.full_name),
        route(&["Warehouse", "Depot", "Customer"]),
    )
    .await
    .unwrap();

    jobs::accept(jobs_sheet.as_ref(), &job_id).await.unwrap();
    let status = jobs::update_progress(jobs_sheet.as_ref(), &job_id, 3, "13.75", "100.50")
        .await
        .unwrap();
    assert_eq!(status, JobStatus::Completed);

    let fresh_id = jobs::create(
        jobs_sheet.as_ref(),
        job_fields("Fresh run", &identity.id, &identity.full_name),
        route(&["A", "B", "C"]),
    )
    .await
    .unwrap();
    jobs::accept(jobs_sheet.as_ref(), &fresh_id).await.unwrap();
    let status = jobs::update_progress(jobs_sheet.as_ref(), &fresh_id, 1, "13.70", "100.49")
        .await
        .unwrap();
    assert_eq!(status, JobStatus::Active);

    let mine = jobs::list_for_driver(jobs_sheet.as_ref(), &identity.id)
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].job_id, fresh_id);
    assert_eq!(mine[0].status, JobStatus::Active);
    assert_eq!(mine[1].status, JobStatus::Completed);
}
