use chirpy_server::error::ErrorResponse;
use chirpy_server::routes::health::health_check;
use chirpy_server::test_support::TestRocketBuilder;
use rocket::http::{ContentType, Status};
use rocket::routes;

#[test]
fn health_endpoint_returns_plain_ok() {
    let client = TestRocketBuilder::new()
        .mount_api_routes(routes![health_check])
        .blocking_client();

    let response = client.get("/api/healthz").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::Plain));
    assert_eq!(response.into_string().as_deref(), Some("OK"));
}

#[test]
fn unknown_route_returns_json_error() {
    let client = TestRocketBuilder::new()
        .mount_api_routes(routes![health_check])
        .blocking_client();

    let response = client.get("/api/nope").dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let payload: ErrorResponse = response.into_json().expect("valid JSON payload");
    assert_eq!(payload.error, "NotFound");
}
