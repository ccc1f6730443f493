use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use cycle_tracker::store::MemoryStore;
use cycle_tracker::{app, AppState};

fn test_app() -> Router {
    app(AppState::new(Arc::new(MemoryStore::new())))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn configure(app: &Router, user: Uuid) {
    let (status, _) = send(
        app,
        Method::PUT,
        "/profile",
        Some(json!({
            "user_id": user,
            "last_period_start": "2024-01-01",
            "cycle_length": 28,
            "period_length": 5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_responds() {
    let app = test_app();
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn summary_without_profile_fails_soft() {
    let app = test_app();
    let user = Uuid::new_v4();

    let (status, body) = send(&app, Method::GET, &format!("/cycle?user_id={user}&date=2024-03-01"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["configured"], false);
    assert_eq!(body["current_phase"], "follicular");
    assert_eq!(body["current_day"], 1);
    assert!(body["next_period_date"].is_null());
    assert!(body["ovulation_date"].is_null());
    assert!(body["fertile_window_start"].is_null());
    assert!(body["days_until_next_period"].is_null());
    assert_eq!(body["in_fertile_window"], false);
    assert_eq!(body["is_period_day"], false);
}

#[tokio::test]
async fn summary_for_configured_profile() {
    let app = test_app();
    let user = Uuid::new_v4();
    configure(&app, user).await;

    let (status, body) = send(&app, Method::GET, &format!("/cycle?user_id={user}&date=2024-01-01"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["configured"], true);
    assert_eq!(body["current_day"], 1);
    assert_eq!(body["current_phase"], "menstrual");
    assert_eq!(body["next_period_date"], "2024-01-29");
    assert_eq!(body["ovulation_date"], "2024-01-15");
    assert_eq!(body["fertile_window_start"], "2024-01-10");
    assert_eq!(body["fertile_window_end"], "2024-01-16");
    assert_eq!(body["days_until_next_period"], 28);
    assert_eq!(body["is_period_day"], true);
    assert_eq!(body["in_fertile_window"], false);
}

#[tokio::test]
async fn profile_rejects_non_positive_lengths() {
    let app = test_app();
    let user = Uuid::new_v4();

    let (status, body) = send(
        &app,
        Method::PUT,
        "/profile",
        Some(json!({ "user_id": user, "cycle_length": 0 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("cycle_length"));
}

#[tokio::test]
async fn profile_update_is_partial() {
    let app = test_app();
    let user = Uuid::new_v4();
    configure(&app, user).await;

    let (_, body) = send(
        &app,
        Method::PUT,
        "/profile",
        Some(json!({ "user_id": user, "cycle_length": 30 })),
    )
    .await;
    assert_eq!(body["cycle_length"], 30);
    assert_eq!(body["period_length"], 5);
    assert_eq!(body["last_period_start"], "2024-01-01");

    let (_, body) = send(&app, Method::GET, &format!("/profile?user_id={user}"), None).await;
    assert_eq!(body["cycle_length"], 30);
}

#[tokio::test]
async fn new_cycle_advances_period_start() {
    let app = test_app();
    let user = Uuid::new_v4();
    configure(&app, user).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/cycle",
        Some(json!({ "user_id": user, "start_date": "2024-01-30" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, profile) = send(&app, Method::GET, &format!("/profile?user_id={user}"), None).await;
    assert_eq!(profile["last_period_start"], "2024-01-30");

    // Back-filling an older cycle leaves the latest start alone.
    send(
        &app,
        Method::POST,
        "/cycle",
        Some(json!({ "user_id": user, "start_date": "2023-12-03" })),
    )
    .await;
    let (_, profile) = send(&app, Method::GET, &format!("/profile?user_id={user}"), None).await;
    assert_eq!(profile["last_period_start"], "2024-01-30");

    let (status, _) = send(
        &app,
        Method::POST,
        "/cycle",
        Some(json!({ "user_id": user, "start_date": "2024-01-30" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_period_starts_keep_the_latest() {
    let app = test_app();
    let user = Uuid::new_v4();

    let handles: Vec<_> = ["2024-03-01", "2024-02-01", "2024-01-01", "2024-02-15"]
        .into_iter()
        .map(|start| {
            let app = app.clone();
            tokio::spawn(async move {
                send(&app, Method::POST, "/cycle", Some(json!({ "user_id": user, "start_date": start })))
                    .await
                    .0
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::CREATED);
    }

    let (_, profile) = send(&app, Method::GET, &format!("/profile?user_id={user}"), None).await;
    assert_eq!(profile["last_period_start"], "2024-03-01");
}

#[tokio::test]
async fn profile_update_and_period_start_do_not_clobber() {
    let app = test_app();
    let user = Uuid::new_v4();
    configure(&app, user).await;

    let (created, updated) = tokio::join!(
        send(&app, Method::POST, "/cycle", Some(json!({ "user_id": user, "start_date": "2024-01-29" }))),
        send(&app, Method::PUT, "/profile", Some(json!({ "user_id": user, "cycle_length": 30 }))),
    );
    assert_eq!(created.0, StatusCode::CREATED);
    assert_eq!(updated.0, StatusCode::OK);

    let (_, profile) = send(&app, Method::GET, &format!("/profile?user_id={user}"), None).await;
    assert_eq!(profile["last_period_start"], "2024-01-29");
    assert_eq!(profile["cycle_length"], 30);
    assert_eq!(profile["period_length"], 5);
}

#[tokio::test]
async fn cycle_management_lifecycle() {
    let app = test_app();
    let user = Uuid::new_v4();
    let other = Uuid::new_v4();

    let (_, first) = send(&app, Method::POST, "/cycle", Some(json!({ "user_id": user, "start_date": "2024-01-01" }))).await;
    let (_, second) = send(&app, Method::POST, "/cycle", Some(json!({ "user_id": user, "start_date": "2024-01-29" }))).await;
    let first_id = first["id"].as_str().unwrap().to_string();
    let second_id = second["id"].as_str().unwrap().to_string();
    assert!(first["end_date"].is_null());

    let (status, ended) = send(
        &app,
        Method::PUT,
        &format!("/cycle/{first_id}"),
        Some(json!({ "user_id": user, "end_date": "2024-01-05", "notes": "heavy first day" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ended["end_date"], "2024-01-05");
    assert_eq!(ended["period_length"], 5);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/cycle/{second_id}"),
        Some(json!({ "user_id": user, "end_date": "2024-01-28" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/cycle/{second_id}"),
        Some(json!({ "user_id": other, "end_date": "2024-01-31" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    send(
        &app,
        Method::PUT,
        &format!("/cycle/{second_id}"),
        Some(json!({ "user_id": user, "end_date": "2024-01-31" })),
    )
    .await;

    let (status, fetched) = send(&app, Method::GET, &format!("/cycle/{first_id}?user_id={user}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["notes"], "heavy first day");
    let (status, _) = send(&app, Method::GET, &format!("/cycle/{first_id}?user_id={other}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, cycles) = send(&app, Method::GET, &format!("/cycles?user_id={user}"), None).await;
    let cycles = cycles.as_array().unwrap();
    assert_eq!(cycles.len(), 2);
    assert_eq!(cycles[0]["start_date"], "2024-01-29");

    // periods of 5 and 3 days, 28 days apart
    let (_, profile) = send(&app, Method::GET, &format!("/profile?user_id={user}"), None).await;
    assert_eq!(profile["averages"], json!({ "cycle_length": 28, "period_length": 4 }));

    let (status, _) = send(&app, Method::DELETE, &format!("/cycle/{second_id}?user_id={user}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("/cycle/{second_id}?user_id={user}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, profile) = send(&app, Method::GET, &format!("/profile?user_id={user}"), None).await;
    assert_eq!(profile["averages"], json!({ "cycle_length": 28, "period_length": 5 }));
}

#[tokio::test]
async fn current_cycle_reports_activity() {
    let app = test_app();
    let user = Uuid::new_v4();

    let (status, _) = send(&app, Method::GET, &format!("/cycle/current?user_id={user}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    configure(&app, user).await;
    send(&app, Method::POST, "/cycle", Some(json!({ "user_id": user, "start_date": "2024-01-01" }))).await;

    let (status, current) = send(
        &app,
        Method::GET,
        &format!("/cycle/current?user_id={user}&date=2024-01-10"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current["start_date"], "2024-01-01");
    assert_eq!(current["is_active"], true);
    assert_eq!(current["day_of_cycle"], 10);

    let (_, current) = send(
        &app,
        Method::GET,
        &format!("/cycle/current?user_id={user}&date=2024-01-29"),
        None,
    )
    .await;
    assert_eq!(current["is_active"], false);
    assert!(current["day_of_cycle"].is_null());
}

#[tokio::test]
async fn monthly_insights_by_phase() {
    let app = test_app();
    let user = Uuid::new_v4();
    configure(&app, user).await;

    for (day, kind) in [("2024-01-02", "cramps"), ("2024-01-03", "cramps"), ("2024-01-25", "headache")] {
        send(
            &app,
            Method::POST,
            "/symptom",
            Some(json!({ "user_id": user, "logged_at": day, "symptom_type": kind })),
        )
        .await;
    }
    send(
        &app,
        Method::POST,
        "/mood",
        Some(json!({ "user_id": user, "logged_at": "2024-01-10", "mood": "happy" })),
    )
    .await;

    let (status, insights) = send(
        &app,
        Method::GET,
        &format!("/insights?user_id={user}&year=2024&month=1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(insights["active_days"], 4);
    assert_eq!(insights["phases"][0]["phase"], "menstrual");
    assert_eq!(insights["phases"][0]["symptom_count"], 2);
    assert_eq!(insights["phases"][0]["common_symptoms"], json!(["cramps"]));
    assert_eq!(insights["phases"][1]["common_moods"], json!(["happy"]));
    assert_eq!(insights["phases"][3]["common_symptoms"], json!(["headache"]));
    assert_eq!(insights["most_common_symptoms"][0], json!({ "name": "cramps", "count": 2 }));

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/insights?user_id={user}&year=2024&month=0"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn calendar_month_annotations() {
    let app = test_app();
    let user = Uuid::new_v4();
    configure(&app, user).await;

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/calendar?user_id={user}&year=2024&month=1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let days = body.as_array().unwrap();
    assert_eq!(days.len(), 31);
    assert_eq!(days[0]["is_period_day"], true);
    assert_eq!(days[14]["is_ovulation_day"], true);
    assert_eq!(days[14]["phase"], "ovulatory");
    assert_eq!(days.iter().filter(|d| d["is_fertile_day"] == true).count(), 7);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/calendar?user_id={user}&year=2024&month=13"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn symptoms_lifecycle() {
    let app = test_app();
    let user = Uuid::new_v4();
    configure(&app, user).await;

    let (status, logged) = send(
        &app,
        Method::POST,
        "/symptom",
        Some(json!({
            "user_id": user,
            "logged_at": "2024-01-03",
            "symptom_type": "Cramps",
            "intensity": "high"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(logged["symptom_type"], "cramps");
    assert_eq!(logged["cycle_day"], 3);

    send(
        &app,
        Method::POST,
        "/symptom",
        Some(json!({ "user_id": user, "logged_at": "2024-01-03", "symptom_type": "headache" })),
    )
    .await;
    send(
        &app,
        Method::POST,
        "/symptom",
        Some(json!({ "user_id": user, "logged_at": "2024-01-05", "symptom_type": "acne" })),
    )
    .await;

    let (_, grouped) = send(&app, Method::GET, &format!("/symptoms?user_id={user}"), None).await;
    let grouped = grouped.as_array().unwrap();
    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped[0]["logged_at"], "2024-01-05");
    assert_eq!(grouped[1]["symptoms"].as_array().unwrap().len(), 2);

    let delete = json!({ "user_id": user.to_string(), "logged_at": "2024-01-03", "symptom_type": "cramps" });
    let (status, _) = send(&app, Method::DELETE, "/symptom", Some(delete.clone())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, "/symptom", Some(delete)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/symptom",
        Some(json!({ "user_id": "nope", "logged_at": "2024-01-03", "symptom_type": "cramps" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, flat) = send(&app, Method::GET, &format!("/symptom/all?user_id={user}"), None).await;
    assert_eq!(flat.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn moods_lifecycle() {
    let app = test_app();
    let user = Uuid::new_v4();

    let (status, mood) = send(
        &app,
        Method::POST,
        "/mood",
        Some(json!({ "user_id": user, "logged_at": "2024-01-02", "mood": "Calm" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(mood["energy"], 3);
    assert!(mood["cycle_day"].is_null());

    let (status, _) = send(
        &app,
        Method::POST,
        "/mood",
        Some(json!({ "user_id": user, "logged_at": "2024-01-02", "mood": "wired", "energy": 9 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, moods) = send(&app, Method::GET, &format!("/moods?user_id={user}"), None).await;
    assert_eq!(moods.as_array().unwrap().len(), 1);

    let id = mood["id"].as_str().unwrap();
    let other = Uuid::new_v4();
    let (status, _) = send(&app, Method::DELETE, &format!("/mood/{id}?user_id={other}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &format!("/mood/{id}?user_id={user}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn bleeding_history_and_stats() {
    let app = test_app();
    let user = Uuid::new_v4();

    for start in ["2024-01-01", "2024-01-29"] {
        send(&app, Method::POST, "/cycle", Some(json!({ "user_id": user, "start_date": start }))).await;
    }
    for day in ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-29", "2024-01-30"] {
        send(
            &app,
            Method::POST,
            "/symptom",
            Some(json!({ "user_id": user, "logged_at": day, "symptom_type": "bleeding", "intensity": "light" })),
        )
        .await;
    }

    let (status, history) = send(&app, Method::GET, &format!("/bleeding-history?user_id={user}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["start_date"], "2024-01-01");
    assert_eq!(history[0]["end_date"], "2024-01-03");
    assert_eq!(history[1]["days"].as_array().unwrap().len(), 2);

    let (status, stats) = send(&app, Method::GET, &format!("/cycle-stats?user_id={user}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["average_cycle_length"], 28);
    assert_eq!(stats["cycle_stats"][0]["period_length"], 3);
    assert_eq!(stats["cycle_stats"][1]["period_length"], 2);
    assert!(stats["cycle_stats"][1]["cycle_length"].is_null());
}

#[tokio::test]
async fn recommendations_match_keywords() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/recommendations",
        Some(json!({ "user_input": "I have awful cramps", "current_phase": "menstrual" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["recommendation"]["concern"], "pain");
    assert_eq!(body["recommendation"]["phase"], "menstrual");
    assert_eq!(body["recommendation"]["category"], "self-care");
    assert_eq!(body["recommendation"]["user_input"], "I have awful cramps");

    let (status, _) = send(
        &app,
        Method::POST,
        "/recommendations",
        Some(json!({ "user_input": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn recommendation_phase_defaults_without_profile() {
    let app = test_app();
    let (_, body) = send(
        &app,
        Method::POST,
        "/recommendations",
        Some(json!({ "user_input": "any tips?", "user_id": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(body["recommendation"]["phase"], "follicular");
    assert_eq!(body["recommendation"]["concern"], "general");
}
