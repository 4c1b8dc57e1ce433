//! Integration tests for the route guard on top of a real resolver.

#![allow(clippy::unwrap_used)]

use ajaxtreon_client::guard::{LOGIN_PATH, landing_after_login};
use ajaxtreon_client::{Navigation, RouteGuard};
use ajaxtreon_integration_tests::{
    ADMIN_TOKEN, MockBackend, PASSWORD, SELLER_EMAIL, SELLER_TOKEN, TestClient,
};
use secrecy::SecretString;

fn redirect(path: &str) -> Navigation {
    Navigation::Redirect(path.to_string())
}

#[tokio::test]
async fn test_public_paths_never_resolve() {
    let backend = MockBackend::start().await;
    let client = TestClient::with_stored_token(&backend, SELLER_TOKEN);
    let guard = RouteGuard::new(client.resolver.clone());

    assert_eq!(guard.check("/").await, Navigation::Allow);
    assert_eq!(guard.check("/auth/login").await, Navigation::Allow);
    assert_eq!(guard.check("/auth/register").await, Navigation::Allow);

    assert!(backend.requests().is_empty());
    assert!(!client.resolver.reader().is_ready());
}

#[tokio::test]
async fn test_signed_out_goes_to_login() {
    let backend = MockBackend::start().await;
    let client = TestClient::new(&backend);
    let guard = RouteGuard::new(client.resolver.clone());

    assert_eq!(guard.check("/admin/dashboard").await, redirect(LOGIN_PATH));
    assert_eq!(guard.check("/reports").await, redirect(LOGIN_PATH));
}

#[tokio::test]
async fn test_seller_kept_out_of_admin_area() {
    let backend = MockBackend::start().await;
    let client = TestClient::with_stored_token(&backend, SELLER_TOKEN);
    let guard = RouteGuard::new(client.resolver.clone());

    assert_eq!(
        guard.check("/admin/users").await,
        redirect("/seller/dashboard")
    );
    assert_eq!(
        guard.check("/customer/dashboard").await,
        redirect("/seller/dashboard")
    );
    assert_eq!(guard.check("/seller/products").await, Navigation::Allow);
    // Shared pages outside every area stay open.
    assert_eq!(guard.check("/profile").await, Navigation::Allow);

    // The first check resolved the session; later checks reuse it.
    assert_eq!(backend.hits("/auth/me"), 1);
}

#[tokio::test]
async fn test_admin_kept_out_of_seller_area() {
    let backend = MockBackend::start().await;
    let client = TestClient::with_stored_token(&backend, ADMIN_TOKEN);
    let guard = RouteGuard::new(client.resolver.clone());

    assert_eq!(
        guard.check("/seller/dashboard").await,
        redirect("/admin/dashboard")
    );
    assert_eq!(guard.check("/admin/users").await, Navigation::Allow);
}

#[tokio::test]
async fn test_login_then_navigate() {
    let backend = MockBackend::start().await;
    let client = TestClient::new(&backend);
    let guard = RouteGuard::new(client.resolver.clone());

    assert_eq!(guard.check("/seller/orders").await, redirect(LOGIN_PATH));

    let user = client
        .resolver
        .login(SELLER_EMAIL, &SecretString::from(PASSWORD.to_string()))
        .await
        .unwrap();
    assert_eq!(landing_after_login(&user), "/seller/dashboard");
    assert_eq!(guard.check("/seller/orders").await, Navigation::Allow);

    // Calls after login carry the token the backend just issued.
    client.api().leads().list().await.unwrap();
    let listed = backend
        .requests()
        .into_iter()
        .find(|r| r.path == "/leads")
        .unwrap();
    assert_eq!(listed.authorization.as_deref(), Some("Bearer token-seller"));

    client.resolver.logout().await;
    assert_eq!(guard.check("/seller/orders").await, redirect(LOGIN_PATH));
}
