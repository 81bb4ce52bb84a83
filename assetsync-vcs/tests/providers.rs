//! GitLab and GitHub providers against a stub host.

mod common;

use assetsync_core::{Revision, Vcs};
use assetsync_vcs::{http, VcsError, VcsRegistry};
use common::{StubResponse, StubServer};
use serde_json::json;

fn vcs(value: serde_json::Value) -> Vcs {
    Vcs::new(value.as_object().cloned().unwrap())
}

const SHA_A: &str = "a91957a858320c0e17f3a0eca7cfacbff50ea29a";
const SHA_B: &str = "b83d6e391c22777fca1ed3012fce84f633d7fed0";

// ---------------------------------------------------------------------------
// GitLab
// ---------------------------------------------------------------------------

fn gitlab(server: &StubServer) -> Box<dyn assetsync_vcs::VcsProvider> {
    VcsRegistry::with_defaults(http::agent())
        .for_vcs(&vcs(json!({
            "type": "gitlab",
            "base-url": server.url(""),
            "project-id": "group/web",
            "access-token": "glpat-secret",
            "environment": "fe-login",
        })))
        .expect("bind gitlab")
}

#[test]
fn gitlab_latest_revision_queries_successful_deployments() {
    let server = StubServer::start(|req| {
        if req.path.contains("status=success") {
            StubResponse::json(200, json!([{"id": 2, "sha": SHA_A}, {"id": 1, "sha": SHA_B}]))
        } else {
            StubResponse::json(200, json!([]))
        }
    });
    let provider = gitlab(&server);

    let revision = provider.latest_revision(None).expect("revision");
    assert_eq!(revision.as_str(), SHA_A);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.path.starts_with("/api/v4/projects/group%2Fweb/deployments?"));
    assert!(request.path.contains("environment=fe-login"));
    assert!(request.path.contains("order_by=updated_at&sort=desc"));
    assert_eq!(request.header("PRIVATE-TOKEN"), Some("glpat-secret"));
}

#[test]
fn gitlab_latest_revision_swallows_failures() {
    let server = StubServer::start(|_| StubResponse::text(500, "boom"));
    assert!(gitlab(&server).latest_revision(Some("latest")).is_none());
}

#[test]
fn gitlab_has_revision_maps_404_to_false() {
    let server = StubServer::start(|req| {
        if req.path.ends_with(SHA_A) {
            StubResponse::json(200, json!({"id": SHA_A}))
        } else {
            StubResponse::json(404, json!({"message": "404 Commit Not Found"}))
        }
    });
    let provider = gitlab(&server);
    assert!(provider.has_revision(&Revision::new(SHA_A).unwrap()).unwrap());
    assert!(!provider.has_revision(&Revision::new(SHA_B).unwrap()).unwrap());
}

#[test]
fn gitlab_active_deployments_cover_unfinished_statuses() {
    let server = StubServer::start(|req| {
        if req.path.contains("status=running") {
            StubResponse::json(
                200,
                json!([{"id": 5, "sha": SHA_B, "deployable": {"web_url": "https://ci/jobs/5"}}]),
            )
        } else {
            StubResponse::json(200, json!([]))
        }
    });
    let deployments = gitlab(&server).active_deployments().unwrap();
    assert_eq!(deployments.len(), 1);
    assert_eq!(deployments[0].uri, "https://ci/jobs/5");
    assert_eq!(deployments[0].revision.as_str(), SHA_B);
    assert_eq!(server.requests().len(), 3);
}

#[test]
fn gitlab_unauthorized_is_a_status_error() {
    let server = StubServer::start(|_| StubResponse::json(401, json!({"message": "401 Unauthorized"})));
    let err = gitlab(&server).active_deployments().unwrap_err();
    assert!(matches!(err, VcsError::Status { status: 401, .. }));
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

fn github(server: &StubServer) -> Box<dyn assetsync_vcs::VcsProvider> {
    VcsRegistry::with_defaults(http::agent())
        .for_vcs(&vcs(json!({
            "type": "github",
            "api-url": server.url("/graphql"),
            "repository": "acme/web",
            "access-token": "ghp_secret",
            "environment": "stable",
        })))
        .expect("bind github")
}

fn nodes(nodes: serde_json::Value) -> StubResponse {
    StubResponse::json(
        200,
        json!({"data": {"repository": {"deployments": {"nodes": nodes}}}}),
    )
}

#[test]
fn github_latest_revision_skips_unsuccessful_deployments() {
    let server = StubServer::start(|_| {
        nodes(json!([
            {"commitOid": SHA_B, "latestStatus": {"state": "FAILURE", "logUrl": null}},
            {"commitOid": SHA_A, "latestStatus": {"state": "SUCCESS", "logUrl": null}}
        ]))
    });
    let provider = github(&server);
    assert_eq!(provider.latest_revision(None).unwrap().as_str(), SHA_A);

    let request = &server.requests()[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.header("Authorization"), Some("bearer ghp_secret"));
    let payload: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(payload["variables"]["owner"], "acme");
    assert_eq!(payload["variables"]["environments"], json!(["stable"]));
    assert!(payload["query"].as_str().unwrap().contains("first: 30"));
}

#[test]
fn github_active_deployments_map_in_progress_states() {
    let server = StubServer::start(|_| {
        nodes(json!([
            {"commitOid": SHA_A, "latestStatus": {"state": "QUEUED", "logUrl": "https://ci/run/1"}},
            {"commitOid": SHA_B, "latestStatus": {"state": "SUCCESS", "logUrl": "https://ci/run/0"}}
        ]))
    });
    let deployments = github(&server).active_deployments().unwrap();
    assert_eq!(deployments.len(), 1);
    assert_eq!(deployments[0].uri, "https://ci/run/1");
}

#[test]
fn github_has_revision_checks_object() {
    let server = StubServer::start(|req| {
        if req.body.contains(SHA_A) {
            StubResponse::json(200, json!({"data": {"repository": {"object": {"oid": SHA_A}}}}))
        } else {
            StubResponse::json(200, json!({"data": {"repository": {"object": null}}}))
        }
    });
    let provider = github(&server);
    assert!(provider.has_revision(&Revision::new(SHA_A).unwrap()).unwrap());
    assert!(!provider.has_revision(&Revision::new(SHA_B).unwrap()).unwrap());
}

#[test]
fn github_graphql_errors_are_invalid_responses() {
    let server = StubServer::start(|_| {
        StubResponse::json(200, json!({"errors": [{"message": "Could not resolve to a Repository"}]}))
    });
    let err = github(&server).active_deployments().unwrap_err();
    assert!(matches!(err, VcsError::InvalidResponse { .. }));
    assert!(github(&server).latest_revision(None).is_none());
}
