//! GitHub GraphQL backend.

use serde::Deserialize;
use serde_json::{json, Value};

use assetsync_core::definition::{KEY_ENVIRONMENT, KEY_REPOSITORY};
use assetsync_core::{CoreError, Revision, Vcs};

use crate::deployment::Deployment;
use crate::error::VcsError;
use crate::provider::VcsProvider;

pub const DEFAULT_API_URL: &str = "https://api.github.com/graphql";
pub const DEFAULT_WEB_URL: &str = "https://github.com";

/// Config key overriding [`DEFAULT_API_URL`].
pub const KEY_API_URL: &str = "api-url";

pub const SUCCESS_STATE: &str = "SUCCESS";

/// Deployment states GitHub reports for unfinished deployments.
pub const ACTIVE_STATES: &[&str] = &["PENDING", "QUEUED", "IN_PROGRESS", "WAITING"];

const DEPLOYMENTS_QUERY: &str = r#"query ($owner: String!, $name: String!, $environments: [String!]) {
  repository(owner: $owner, name: $name) {
    deployments(environments: $environments, first: 30, orderBy: {field: CREATED_AT, direction: DESC}) {
      nodes { commitOid latestStatus { state logUrl } }
    }
  }
}"#;

const OBJECT_QUERY: &str = r#"query ($owner: String!, $name: String!, $oid: GitObjectID!) {
  repository(owner: $owner, name: $name) {
    object(oid: $oid) { oid }
  }
}"#;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentNode {
    pub commit_oid: Option<String>,
    pub latest_status: Option<DeploymentStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatus {
    pub state: String,
    pub log_url: Option<String>,
}

impl DeploymentNode {
    fn state(&self) -> Option<&str> {
        self.latest_status.as_ref().map(|s| s.state.as_str())
    }

    fn revision(&self) -> Option<Revision> {
        self.commit_oid.as_deref().and_then(|oid| Revision::new(oid).ok())
    }
}

#[derive(Debug, Clone)]
pub struct GithubVcsProvider {
    agent: ureq::Agent,
    api_url: String,
    repository: Option<(String, String)>,
    access_token: Option<String>,
    environment: Option<String>,
}

impl GithubVcsProvider {
    /// Unbound template.
    pub fn new(agent: ureq::Agent) -> Self {
        Self {
            agent,
            api_url: DEFAULT_API_URL.to_string(),
            repository: None,
            access_token: None,
            environment: None,
        }
    }

    fn repository(&self) -> Result<(&str, &str), VcsError> {
        self.repository
            .as_ref()
            .map(|(owner, name)| (owner.as_str(), name.as_str()))
            .ok_or_else(|| missing(KEY_REPOSITORY))
    }

    fn query(&self, query: &str, variables: Value) -> Result<Value, VcsError> {
        let url = self.api_url.as_str();
        let mut request = self.agent.post(url).set("Accept", "application/json");
        if let Some(token) = &self.access_token {
            request = request.set("Authorization", &format!("bearer {token}"));
        }
        let response = request
            .send_json(json!({ "query": query, "variables": variables }))
            .map_err(|e| VcsError::from_ureq(url, e))?;
        let body: Value = response
            .into_json()
            .map_err(|e| VcsError::invalid_response(url, e))?;
        parse_graphql(url, body)
    }

    fn deployments(&self, environment: &str) -> Result<Vec<DeploymentNode>, VcsError> {
        let (owner, name) = self.repository()?;
        let data = self.query(
            DEPLOYMENTS_QUERY,
            json!({ "owner": owner, "name": name, "environments": [environment] }),
        )?;
        parse_deployment_nodes(&data).map_err(|e| VcsError::invalid_response(&self.api_url, e))
    }

    fn environment<'a>(&'a self, environment: Option<&'a str>) -> Result<&'a str, VcsError> {
        environment
            .or(self.environment.as_deref())
            .ok_or_else(|| missing(KEY_ENVIRONMENT))
    }
}

fn missing(key: &str) -> VcsError {
    VcsError::Core(CoreError::MissingConfiguration {
        definition: "vcs",
        key: key.to_string(),
    })
}

/// `data` of a GraphQL response, or the first reported error.
pub fn parse_graphql(url: &str, mut body: Value) -> Result<Value, VcsError> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        if let Some(first) = errors.first() {
            let message = first
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown GraphQL error");
            return Err(VcsError::invalid_response(url, message));
        }
    }
    match body.get_mut("data").map(Value::take) {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(VcsError::invalid_response(url, "missing 'data'")),
    }
}

/// `repository.deployments.nodes` of a deployments query result.
pub fn parse_deployment_nodes(data: &Value) -> Result<Vec<DeploymentNode>, serde_json::Error> {
    let nodes = data
        .pointer("/repository/deployments/nodes")
        .cloned()
        .unwrap_or(Value::Array(vec![]));
    serde_json::from_value(nodes)
}

fn split_repository(repository: &str) -> Result<(String, String), VcsError> {
    match repository.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner.to_string(), name.to_string()))
        }
        _ => Err(missing(KEY_REPOSITORY)),
    }
}

impl VcsProvider for GithubVcsProvider {
    fn name(&self) -> &'static str {
        "github"
    }

    fn source_url(&self) -> String {
        match &self.repository {
            Some((owner, name)) => format!("{DEFAULT_WEB_URL}/{owner}/{name}"),
            None => DEFAULT_WEB_URL.to_string(),
        }
    }

    fn latest_revision(&self, environment: Option<&str>) -> Option<Revision> {
        let result = self
            .environment(environment)
            .and_then(|env| self.deployments(env));
        match result {
            Ok(nodes) => nodes
                .iter()
                .filter(|node| node.state() == Some(SUCCESS_STATE))
                .find_map(DeploymentNode::revision),
            Err(err) => {
                tracing::warn!("github: latest revision lookup failed: {err}");
                None
            }
        }
    }

    fn has_revision(&self, revision: &Revision) -> Result<bool, VcsError> {
        let (owner, name) = self.repository()?;
        let data = self.query(
            OBJECT_QUERY,
            json!({ "owner": owner, "name": name, "oid": revision.as_str() }),
        )?;
        Ok(data
            .pointer("/repository/object")
            .is_some_and(|object| !object.is_null()))
    }

    fn active_deployments(&self) -> Result<Vec<Deployment>, VcsError> {
        let environment = self.environment(None)?;
        let nodes = self.deployments(environment)?;
        Ok(nodes
            .iter()
            .filter(|node| node.state().is_some_and(|s| ACTIVE_STATES.contains(&s)))
            .filter_map(|node| {
                let revision = node.revision()?;
                let uri = node
                    .latest_status
                    .as_ref()
                    .and_then(|s| s.log_url.clone())
                    .unwrap_or_else(|| self.source_url());
                Some(Deployment { uri, revision })
            })
            .collect())
    }

    fn with_vcs(&self, vcs: &Vcs) -> Result<Box<dyn VcsProvider>, VcsError> {
        let mut bound = self.clone();
        bound.repository = Some(split_repository(vcs.repository()?)?);
        bound.access_token = vcs.access_token().map(str::to_string);
        bound.environment = vcs.environment().map(str::to_string);
        if let Some(api_url) = vcs.str(KEY_API_URL) {
            bound.api_url = api_url.to_string();
        }
        Ok(Box::new(bound))
    }
}
