#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{Failure, FakeKeystone};
use identity_sdk::{FetchError, Grant, IdentityError, ResourceKind, Role};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

fn role_ids(roles: &HashSet<Role>) -> Vec<&str> {
    let mut ids: Vec<_> = roles.iter().map(|r| r.id.as_str()).collect();
    ids.sort_unstable();
    ids
}

fn with_grants(max_page: usize) -> Arc<FakeKeystone> {
    let keystone = FakeKeystone::new(max_page);
    keystone.add_user("u1", "alice");
    keystone.add_user("u2", "bob");
    keystone.add_tenant("t1", "admin");
    keystone.add_tenant("t2", "demo");
    keystone.grant("u1", "t1", "r-admin", "admin");
    keystone.grant("u1", "t1", "r-member", "member");
    keystone.grant("u1", "t2", "r-member", "member");
    keystone.grant("u2", "t2", "r-reader", "reader");
    keystone
}

#[tokio::test]
async fn roles_of_user_are_deduplicated() {
    let keystone = with_grants(10);
    let client = keystone.client(None);

    let roles = client.roles().list_roles_of_user("u1").await.unwrap();

    assert_eq!(role_ids(&roles), ["r-admin", "r-member"]);
    assert!(roles.iter().all(|r| !r.id.is_empty()));
}

#[tokio::test]
async fn roles_on_tenant_are_scoped() {
    let keystone = with_grants(10);
    let client = keystone.client(None);

    let on_t1 = client.roles().list_roles_of_user_on_tenant("u1", "t1").await.unwrap();
    let on_t2 = client.roles().list_roles_of_user_on_tenant("u1", "t2").await.unwrap();
    let none = client.roles().list_roles_of_user_on_tenant("u2", "t1").await.unwrap();

    assert_eq!(role_ids(&on_t1), ["r-admin", "r-member"]);
    assert_eq!(role_ids(&on_t2), ["r-member"]);
    assert!(none.is_empty());
    assert_eq!(
        keystone.gets_of("tenants/t1/users/u1/roles").len(),
        1,
        "one request per lookup"
    );
}

#[tokio::test]
async fn paginated_role_listings_are_complete() {
    let keystone = with_grants(1);
    let client = keystone.client(None);

    let roles = client.roles().list_roles_of_user("u1").await.unwrap();

    assert_eq!(role_ids(&roles), ["r-admin", "r-member"]);
    assert_eq!(keystone.gets_of("users/u1/roles").len(), 3);
    let markers: Vec<_> = keystone
        .gets_of("users/u1/roles")
        .iter()
        .map(|r| r.query_param("marker").map(str::to_owned))
        .collect();
    assert_eq!(markers, [None, Some("1".to_owned()), Some("2".to_owned())]);
}

#[tokio::test]
async fn role_without_identifier_fails_validation() {
    let keystone = with_grants(10);
    keystone.grant_raw("u2", "t1", json!({"id": null, "name": "ghost"}));
    keystone.grant_raw("u2", "t2", json!({"name": "phantom"}));
    let client = keystone.client(None);

    let err = client.roles().list_roles_of_user("u2").await.unwrap_err();
    assert!(matches!(err, IdentityError::Validation(_)));

    let err = client
        .roles()
        .list_roles_of_user_on_tenant("u2", "t2")
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::Validation(ref msg) if msg.contains("phantom")));
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let keystone = with_grants(10);
    let client = keystone.client(None);

    let err = client.roles().list_roles_of_user("ghost").await.unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn grant_scan_covers_every_pair() {
    let keystone = with_grants(1);
    let client = keystone.client(None);

    let grants = client.scan_grants().await.unwrap();

    let grant = |user: &str, tenant: &str, role: &str, name: &str| Grant {
        user_id: user.to_owned(),
        tenant_id: tenant.to_owned(),
        role: Role::new(role, name),
    };
    let expected: HashSet<_> = [
        grant("u1", "t1", "r-admin", "admin"),
        grant("u1", "t1", "r-member", "member"),
        grant("u1", "t2", "r-member", "member"),
        grant("u2", "t2", "r-reader", "reader"),
    ]
    .into_iter()
    .collect();
    assert_eq!(grants, expected);

    let pair_lookups = keystone
        .requests()
        .iter()
        .filter(|r| r.path.len() == 5 && r.query_param("marker").is_none())
        .count();
    assert_eq!(pair_lookups, 4);
}

#[tokio::test]
async fn grant_scan_stops_on_first_failure() {
    let keystone = with_grants(10);
    keystone.fail_when(|request| {
        (request.path.join("/") == "tenants/t2/users/u2/roles").then_some(Failure::Status(500))
    });
    let client = keystone.client(None);

    let err = client.scan_grants().await.unwrap_err();

    assert!(matches!(
        err,
        IdentityError::Fetch(FetchError::Status { status: 500, .. })
    ));
}

#[tokio::test]
async fn blank_ids_in_role_lookups_are_not_found() {
    let keystone = with_grants(10);
    let client = keystone.client(None);

    let err = client.roles().list_roles_of_user("").await.unwrap_err();
    assert!(err.is_not_found());

    let err = client
        .roles()
        .list_roles_of_user_on_tenant("u1", " ")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IdentityError::NotFound { kind: ResourceKind::Role, .. }
    ));
    assert!(keystone.requests().is_empty());
}
