//! Table gateway integration tests against a mock backend.

use chrono::NaiveDate;
use gastro_model::{InsightType, MealType, NewMealRecord, NewSymptomRecord, ProfileUpdate, SafetyLevel};
use gastro_store::{BackendConfig, DataGateway, StoreError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer, token: Option<&str>) -> DataGateway {
    DataGateway::new(BackendConfig {
        url: server.uri(),
        anon_key: "anon-key".to_string(),
        access_token: token.map(str::to_string),
        timeout_secs: 5,
    })
    .expect("valid config")
}

fn symptom_row(id: &str, pain: u8, recorded_at: &str) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": "u1",
        "recorded_at": recorded_at,
        "pain_level": pain,
        "throat_discomfort": false,
        "bloating": false,
        "acid_reflux": false,
        "nausea": false,
        "appetite_level": 3,
        "triggers": [],
        "created_at": recorded_at
    })
}

fn food_row(id: &str, name: &str, level: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "category": "staple",
        "safety_level": level,
        "for_throat_discomfort": false,
        "created_at": "2026-01-01T00:00:00Z"
    })
}

#[tokio::test]
async fn test_symptom_history_query_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/symptom_records"))
        .and(query_param("select", "*"))
        .and(query_param("user_id", "eq.u1"))
        .and(query_param("order", "recorded_at.desc"))
        .and(query_param("limit", "14"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer session-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            symptom_row("b", 7, "2026-10-15T09:00:00Z"),
            symptom_row("a", 2, "2026-10-14T09:00:00Z"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let records = gateway(&server, Some("session-jwt"))
        .symptoms()
        .get_by_user("u1", 14)
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "b");
    assert_eq!(records[0].pain_level, 7);
}

#[tokio::test]
async fn test_null_array_columns_do_not_fail_the_page() {
    let server = MockServer::start().await;
    let mut nullable = symptom_row("n", 5, "2026-10-15T09:00:00Z");
    nullable["triggers"] = serde_json::Value::Null;
    nullable["notes"] = serde_json::Value::Null;
    Mock::given(method("GET"))
        .and(path("/rest/v1/symptom_records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            nullable,
            symptom_row("a", 2, "2026-10-14T09:00:00Z"),
        ])))
        .mount(&server)
        .await;

    let records = gateway(&server, None).symptoms().get_by_user("u1", 14).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[0].triggers.is_empty());
    assert!(records[0].notes.is_none());
}

#[tokio::test]
async fn test_null_profile_lists_read_as_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "email": "u1@example.com",
            "has_intestinal_metaplasia": null,
            "medications": null,
            "allergies": null,
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        })))
        .mount(&server)
        .await;

    let profile = gateway(&server, None).profiles().get("u1").await.unwrap().unwrap();
    assert!(profile.medications.is_empty());
    assert!(profile.allergies.is_empty());
    assert!(!profile.has_intestinal_metaplasia);
}

#[tokio::test]
async fn test_anon_key_used_as_bearer_without_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/foods"))
        .and(header("authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let foods = gateway(&server, None).foods().get_all().await.unwrap();
    assert!(foods.is_empty());
}

#[tokio::test]
async fn test_today_without_rows_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/symptom_records"))
        .and(header("accept", "application/vnd.pgrst.object+json"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(406).set_body_json(json!({
            "code": "PGRST116",
            "message": "JSON object requested, multiple (or no) rows returned",
            "details": "The result contains 0 rows"
        })))
        .mount(&server)
        .await;

    let today = gateway(&server, None).symptoms().get_today("u1").await.unwrap();
    assert!(today.is_none());
}

#[tokio::test]
async fn test_today_returns_single_row() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/symptom_records"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(symptom_row("t", 4, "2026-10-16T08:00:00Z")),
        )
        .mount(&server)
        .await;

    let today = gateway(&server, None).symptoms().get_today("u1").await.unwrap();
    assert_eq!(today.map(|r| r.id), Some("t".to_string()));
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": "XX000",
            "message": "internal error"
        })))
        .mount(&server)
        .await;

    let err = gateway(&server, None).profiles().get("u1").await.unwrap_err();
    match err {
        StoreError::Backend { status, code, message } => {
            assert_eq!(status, 500);
            assert_eq!(code, "XX000");
            assert_eq!(message, "internal error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_search_orders_by_safety() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/foods"))
        .and(query_param("name", "ilike.%rice%"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            food_row("1", "fried rice", "avoid"),
            food_row("2", "rice congee", "safe"),
            food_row("3", "rice cake", "caution"),
            food_row("4", "rice porridge", "safe"),
        ])))
        .mount(&server)
        .await;

    let foods = gateway(&server, None).foods().search("rice").await.unwrap();
    let levels: Vec<SafetyLevel> = foods.iter().map(|f| f.safety_level).collect();
    assert_eq!(
        levels,
        vec![SafetyLevel::Safe, SafetyLevel::Safe, SafetyLevel::Caution, SafetyLevel::Avoid]
    );
    assert_eq!(foods[0].name, "rice congee");
    assert_eq!(foods[1].name, "rice porridge");
}

#[tokio::test]
async fn test_safe_foods_for_throat() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/foods"))
        .and(query_param("safety_level", "eq.safe"))
        .and(query_param("for_throat_discomfort", "eq.true"))
        .and(query_param("order", "name.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([food_row("1", "congee", "safe")])))
        .expect(1)
        .mount(&server)
        .await;

    let foods = gateway(&server, None).foods().get_safe(true).await.unwrap();
    assert_eq!(foods.len(), 1);
}

#[tokio::test]
async fn test_create_symptom_returns_stored_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/symptom_records"))
        .and(header("prefer", "return=representation"))
        .and(body_partial_json(json!({ "user_id": "u1", "pain_level": 6, "acid_reflux": true })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(symptom_row("new-id", 6, "2026-10-16T08:00:00Z")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let new = NewSymptomRecord::new("u1", 6, 3).with_acid_reflux(true);
    let stored = gateway(&server, None).symptoms().create(&new).await.unwrap();
    assert_eq!(stored.id, "new-id");
}

#[tokio::test]
async fn test_invalid_symptom_never_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = gateway(&server, None)
        .symptoms()
        .create(&NewSymptomRecord::new("u1", 11, 3))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn test_profile_update_missing_row() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", "eq.ghost"))
        .respond_with(ResponseTemplate::new(406).set_body_json(json!({
            "code": "PGRST116",
            "message": "JSON object requested, multiple (or no) rows returned"
        })))
        .mount(&server)
        .await;

    let update = ProfileUpdate {
        full_name: Some("Li".to_string()),
        ..Default::default()
    };
    let err = gateway(&server, None).profiles().update("ghost", &update).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { table: "profiles" }));
}

#[tokio::test]
async fn test_meals_sorted_by_day_then_slot() {
    let server = MockServer::start().await;
    let meal = |id: &str, date: &str, slot: &str| {
        json!({
            "id": id,
            "user_id": "u1",
            "meal_date": date,
            "meal_type": slot,
            "foods": [],
            "created_at": "2026-10-16T08:00:00Z"
        })
    };
    Mock::given(method("GET"))
        .and(path("/rest/v1/meal_records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            meal("1", "2026-10-15", "dinner"),
            meal("2", "2026-10-16", "lunch"),
            meal("3", "2026-10-16", "breakfast"),
        ])))
        .mount(&server)
        .await;

    let meals = gateway(&server, None).meals().get_by_user("u1", 30).await.unwrap();
    let ids: Vec<&str> = meals.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "2", "1"]);
}

#[tokio::test]
async fn test_meal_create_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/meal_records"))
        .and(body_partial_json(json!({ "meal_type": "lunch", "meal_date": "2026-10-16" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "m1",
            "user_id": "u1",
            "meal_date": "2026-10-16",
            "meal_type": "lunch",
            "foods": [{ "food_id": "f1", "amount": 200.0, "unit": "g" }],
            "created_at": "2026-10-16T12:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/meal_records"))
        .and(query_param("id", "eq.m1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let meals = gateway(&server, None).meals();
    let new = NewMealRecord::new(
        "u1",
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        MealType::Lunch,
    );
    let stored = meals.create(&new).await.unwrap();
    assert_eq!(stored.foods.len(), 1);
    meals.delete(&stored.id).await.unwrap();
}

#[tokio::test]
async fn test_insights_by_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/health_insights"))
        .and(query_param("type", "eq.weekly"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "i1",
            "user_id": "u1",
            "insight_date": "2026-10-12",
            "type": "weekly",
            "metrics": { "avg_pain": 3.5 },
            "recommendations": ["Keep meals warm"],
            "risk_level": "medium",
            "created_at": "2026-10-12T00:00:00Z"
        }])))
        .mount(&server)
        .await;

    let insights = gateway(&server, None)
        .insights()
        .get_by_type("u1", InsightType::Weekly, 10)
        .await
        .unwrap();
    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].metrics.number("avg_pain"), Some(3.5));
}
