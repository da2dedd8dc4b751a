use std::path::PathBuf;

use chirpy_server::routes::admin::metrics;
use chirpy_server::routes::health::health_check;
use chirpy_server::test_support::TestRocketBuilder;
use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use rocket::routes;

fn client() -> Client {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static");

    TestRocketBuilder::new()
        .mount_api_routes(routes![health_check])
        .mount_admin_routes(routes![metrics])
        .mount_app_files(root)
        .count_hits()
        .blocking_client()
}

fn metrics_page(client: &Client) -> String {
    let response = client.get("/admin/metrics").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::HTML));
    response.into_string().expect("metrics body")
}

#[test]
fn app_serves_the_index_page() {
    let client = client();

    let response = client.get("/app/").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().expect("index body");
    assert!(body.contains("Welcome to Chirpy"));

    let response = client.get("/app/index.html").dispatch();
    assert_eq!(response.status(), Status::Ok);
}

#[test]
fn every_app_request_is_counted() {
    let client = client();
    assert!(metrics_page(&client).contains("visited 0 times"));

    client.get("/app/").dispatch();
    client.get("/app/index.html").dispatch();
    let response = client.get("/app/missing.png").dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let page = metrics_page(&client);
    assert!(page.contains("Welcome, Chirpy Admin"));
    assert!(page.contains("visited 3 times"));
}

#[test]
fn other_paths_are_not_counted() {
    let client = client();

    client.get("/api/healthz").dispatch();
    client.get("/application").dispatch();
    client.get("/admin/metrics").dispatch();

    assert!(metrics_page(&client).contains("visited 0 times"));
}
