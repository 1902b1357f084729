use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use client::{ApiClient, ProtocolState};

async fn mount_login_form(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("csrftoken={token}; Path=/").as_str())
                .set_body_json(serde_json::json!({ "login_form": "CSRF token issued." })),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_walks_through_token_then_session() {
    let server = MockServer::start().await;
    mount_login_form(&server, "abc").await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(header("X-CSRFToken", "abc"))
        .and(header("cookie", "csrftoken=abc"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sessionid=xyz; Path=/; HttpOnly")
                .set_body_json(serde_json::json!({ "login": "Login successful." })),
        )
        .mount(&server)
        .await;

    let mut client = ApiClient::new();
    assert_eq!(client.session.state(), ProtocolState::Anonymous);

    client
        .login(&server.uri(), "student1", "pw123456")
        .await
        .unwrap();

    assert_eq!(client.session.state(), ProtocolState::Authenticated);
    assert_eq!(
        client.session.cookie_header(),
        "csrftoken=abc; sessionid=xyz"
    );
}

#[tokio::test]
async fn failed_login_drops_back_to_anonymous() {
    let server = MockServer::start().await;
    mount_login_form(&server, "abc").await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "Login failed, please ensure you are using a valid username and password."
        })))
        .mount(&server)
        .await;

    let mut client = ApiClient::new();
    let result = client.login(&server.uri(), "student1", "wrong").await;

    assert!(result.is_err());
    assert_eq!(client.session.state(), ProtocolState::Anonymous);
    assert!(client.session.csrf_token.is_none());
}

#[tokio::test]
async fn rate_fails_locally_when_not_authenticated() {
    // no server: the guard must reject before any request is attempted
    let mut client = ApiClient::new();
    let result = client.rate("P001", "CS101", "2024", "1", "5").await;

    let message = result.unwrap_err().to_string();
    assert_eq!(message, "User must be logged in to use the rating service.");
}

#[tokio::test]
async fn rate_sends_both_tokens() {
    let server = MockServer::start().await;
    mount_login_form(&server, "abc").await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sessionid=xyz; Path=/; HttpOnly")
                .set_body_json(serde_json::json!({ "login": "Login successful." })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/ratings"))
        .and(header("X-CSRFToken", "abc"))
        .and(header("cookie", "csrftoken=abc; sessionid=xyz"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "rating_created": "Rating successfully added to system."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = ApiClient::new();
    client
        .login(&server.uri(), "student1", "pw123456")
        .await
        .unwrap();

    let message = client.rate("P001", "CS101", "2024", "1", "5").await.unwrap();
    assert_eq!(message, "Rating successfully added to system.");
}

#[tokio::test]
async fn register_fetches_a_token_when_none_is_held() {
    let server = MockServer::start().await;
    mount_login_form(&server, "abc").await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/register"))
        .and(header("X-CSRFToken", "abc"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "register_user": "User registered successfully."
        })))
        .mount(&server)
        .await;

    let mut client = ApiClient::new();
    client.session.set_base_url(&server.uri());

    let message = client
        .register("student1", "student1@example.com", "pw123456")
        .await
        .unwrap();
    assert_eq!(message, "User registered successfully.");
    assert_eq!(client.session.state(), ProtocolState::TokenAcquired);
}

#[tokio::test]
async fn api_errors_surface_the_error_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/professor-module-rating/P002/CS101"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": "Professor P002 does not teach Module CS101"
        })))
        .mount(&server)
        .await;

    let mut client = ApiClient::new();
    client.session.set_base_url(&server.uri());

    let message = client
        .professor_module_rating("P002", "CS101")
        .await
        .unwrap_err()
        .to_string();
    assert_eq!(message, "Professor P002 does not teach Module CS101");
}
