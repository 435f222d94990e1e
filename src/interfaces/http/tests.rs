use super::*;
use crate::domain::user::UserRecord;
use crate::infrastructure::db::users::UserStore;
use actix_web::http::header;
use actix_web::test as actix_test;
use serde_json::{json, Value};

const BOUNDARY: &str = "user-import-test-boundary";

async fn test_state(max_upload_bytes: usize) -> (web::Data<HttpState>, Arc<UserRepository>) {
    let repository = Arc::new(UserRepository::in_memory().await.unwrap());
    let state = HttpState::new(
        repository.clone(),
        Arc::new(Mutex::new(Vec::new())),
        max_upload_bytes,
    );
    (web::Data::new(state), repository)
}

fn multipart_body(field: &str, filename: Option<&str>, content: &[u8]) -> Vec<u8> {
    let disposition = match filename {
        Some(filename) => format!("form-data; name=\"{field}\"; filename=\"{filename}\""),
        None => format!("form-data; name=\"{field}\""),
    };
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: {disposition}\r\nContent-Type: text/csv\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(filename: &str, content: &[u8]) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri("/api/upload-csv")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_body(FILE_FIELD, Some(filename), content))
}

#[actix_web::test]
async fn test_upload_valid_csv() {
    let (state, repository) = test_state(1024 * 1024).await;
    let app = actix_test::init_service(App::new().app_data(state).configure(configure_api)).await;

    let req = upload_request(
        "test.csv",
        b"name,email,age\nJohn Doe,john@example.com,30\nJane Smith,jane@example.com,25",
    )
    .to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({ "successful_records": 2, "rejected_records": 0, "errors": [] })
    );
    assert_eq!(repository.count_users().await.unwrap(), 2);
}

#[actix_web::test]
async fn test_upload_invalid_csv() {
    let (state, repository) = test_state(1024 * 1024).await;
    let app = actix_test::init_service(App::new().app_data(state).configure(configure_api)).await;

    let req = upload_request(
        "test.csv",
        b"name,email,age\nJohn Doe,invalid-email,200\n,jane@example.com,25",
    )
    .to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body["successful_records"], 0);
    assert_eq!(body["rejected_records"], 2);
    assert_eq!(
        body["errors"],
        json!([
            { "row": 2, "errors": { "age": ["Age must be an integer between 0 and 120"] } },
            { "row": 3, "errors": { "name": ["Name cannot be empty"] } }
        ])
    );
    assert_eq!(repository.count_users().await.unwrap(), 0);
}

#[actix_web::test]
async fn test_upload_non_csv_file() {
    let (state, repository) = test_state(1024 * 1024).await;
    let app = actix_test::init_service(App::new().app_data(state).configure(configure_api)).await;

    let req = upload_request("test.txt", b"This is not a CSV file").to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "File must have .csv extension" }));
    assert_eq!(repository.count_users().await.unwrap(), 0);
}

#[actix_web::test]
async fn test_duplicate_email() {
    let (state, repository) = test_state(1024 * 1024).await;
    repository
        .insert(&UserRecord::from_validated(
            "Existing User".to_string(),
            "existing@example.com".to_string(),
            40,
        ))
        .await
        .unwrap();
    let app = actix_test::init_service(App::new().app_data(state).configure(configure_api)).await;

    let req = upload_request(
        "test.csv",
        b"name,email,age\nDuplicate User,existing@example.com,35",
    )
    .to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "successful_records": 0,
            "rejected_records": 1,
            "errors": [{ "row": 2, "errors": "Email already exists" }]
        })
    );
    assert_eq!(repository.count_users().await.unwrap(), 1);
}

#[actix_web::test]
async fn test_missing_file_field() {
    let (state, _repository) = test_state(1024 * 1024).await;
    let app = actix_test::init_service(App::new().app_data(state).configure(configure_api)).await;

    let req = actix_test::TestRequest::post()
        .uri("/api/upload-csv")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_body("note", None, b"hello"))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "No file provided" }));
}

#[actix_web::test]
async fn test_empty_filename_counts_as_no_file() {
    let (state, repository) = test_state(1024 * 1024).await;
    let app = actix_test::init_service(App::new().app_data(state).configure(configure_api)).await;

    let req = upload_request("", b"name,email,age\nJohn Doe,john@example.com,30").to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "No file provided" }));
    assert_eq!(repository.count_users().await.unwrap(), 0);
}

#[actix_web::test]
async fn test_non_multipart_request_has_no_file() {
    let (state, _repository) = test_state(1024 * 1024).await;
    let app = actix_test::init_service(App::new().app_data(state).configure(configure_api)).await;

    let req = actix_test::TestRequest::post()
        .uri("/api/upload-csv")
        .set_json(json!({ "file": "name,email,age" }))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "No file provided" }));
}

#[actix_web::test]
async fn test_file_over_limit_is_rejected() {
    let (state, repository) = test_state(16).await;
    let app = actix_test::init_service(App::new().app_data(state).configure(configure_api)).await;

    let req = upload_request(
        "test.csv",
        b"name,email,age\nJohn Doe,john@example.com,30",
    )
    .to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(repository.count_users().await.unwrap(), 0);
}

#[actix_web::test]
async fn test_invalid_utf8_is_a_client_error() {
    let (state, repository) = test_state(1024 * 1024).await;
    let app = actix_test::init_service(App::new().app_data(state).configure(configure_api)).await;

    let req = upload_request("test.csv", &[b'n', b'a', 0xff, b'\n']).to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(repository.count_users().await.unwrap(), 0);
}

#[actix_web::test]
async fn test_store_failure_is_a_server_error() {
    let (state, repository) = test_state(1024 * 1024).await;
    repository.close().await;
    let app = actix_test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(configure_api),
    )
    .await;

    let req = upload_request(
        "test.csv",
        b"name,email,age\nJohn Doe,john@example.com,30",
    )
    .to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = actix_test::read_body_json(resp).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Database error:"));

    let logs = state.logs.lock().unwrap();
    assert_eq!(logs.last().unwrap().level, "ERROR");
}

#[actix_web::test]
async fn test_list_users_after_upload() {
    let (state, _repository) = test_state(1024 * 1024).await;
    let app = actix_test::init_service(App::new().app_data(state).configure(configure_api)).await;

    let req = upload_request(
        "users.csv",
        b"name,email,age\nJohn Doe,john@example.com,30\nJane Smith,jane@example.com,25",
    )
    .to_request();
    assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = actix_test::TestRequest::get()
        .uri("/api/users?limit=1&offset=1")
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["total"], 2);
    assert_eq!(body["users"].as_array().unwrap().len(), 1);
    assert_eq!(body["users"][0]["email"], "jane@example.com");
    assert_eq!(body["users"][0]["age"], 25);
}

#[actix_web::test]
async fn test_health() {
    let (state, repository) = test_state(1024 * 1024).await;
    let app = actix_test::init_service(App::new().app_data(state).configure(configure_api)).await;

    let req = actix_test::TestRequest::get().uri("/api/health").to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body, json!({ "status": "ok" }));

    repository.close().await;
    let req = actix_test::TestRequest::get().uri("/api/health").to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn test_logs_record_uploads() {
    let (state, _repository) = test_state(1024 * 1024).await;
    let app = actix_test::init_service(App::new().app_data(state).configure(configure_api)).await;

    let req = upload_request("test.txt", b"nope").to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = actix_test::TestRequest::get().uri("/api/logs").to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["level"], "WARN");
    assert_eq!(entries[0]["source"], "Upload");
}

#[test]
fn test_log_buffer_is_bounded() {
    let logs = Mutex::new(Vec::new());
    for i in 0..(MAX_LOG_ENTRIES + 5) {
        add_log(&logs, "INFO", "Test", &format!("entry {i}"));
    }
    let logs = logs.lock().unwrap();
    assert_eq!(logs.len(), MAX_LOG_ENTRIES);
    assert_eq!(logs[0].message, "entry 5");
}
