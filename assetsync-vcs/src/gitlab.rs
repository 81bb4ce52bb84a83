//! GitLab REST backend.
//!
//! | Query               | Endpoint                                                          |
//! |---------------------|-------------------------------------------------------------------|
//! | latest revision     | `GET /projects/{id}/deployments?environment=&status=success&order_by=updated_at&sort=desc` |
//! | revision existence  | `GET /projects/{id}/repository/commits/{sha}`                     |
//! | active deployments  | deployments query once per status in [`ACTIVE_STATUSES`]          |

use serde::Deserialize;

use assetsync_core::definition::KEY_ENVIRONMENT;
use assetsync_core::{Revision, Vcs};

use crate::deployment::Deployment;
use crate::error::VcsError;
use crate::provider::VcsProvider;

pub const DEFAULT_BASE_URL: &str = "https://gitlab.com";

/// Deployment statuses GitLab reports for unfinished deployments.
pub const ACTIVE_STATUSES: &[&str] = &["created", "running", "blocked"];

#[derive(Debug, Clone, Deserialize)]
pub struct GitlabDeployment {
    pub id: u64,
    pub sha: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub deployable: Option<GitlabDeployable>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitlabDeployable {
    #[serde(default)]
    pub web_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GitlabVcsProvider {
    agent: ureq::Agent,
    base_url: String,
    project_id: Option<String>,
    access_token: Option<String>,
    environment: Option<String>,
}

impl GitlabVcsProvider {
    /// Unbound template.
    pub fn new(agent: ureq::Agent) -> Self {
        Self {
            agent,
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: None,
            access_token: None,
            environment: None,
        }
    }

    fn project_id(&self) -> Result<&str, VcsError> {
        self.project_id.as_deref().ok_or_else(|| {
            VcsError::Core(assetsync_core::CoreError::MissingConfiguration {
                definition: "vcs",
                key: "project-id".to_string(),
            })
        })
    }

    fn api_url(&self, path: &str) -> Result<String, VcsError> {
        Ok(format!(
            "{}/api/v4/projects/{}{path}",
            self.base_url,
            urlencoding::encode(self.project_id()?)
        ))
    }

    fn get(&self, url: &str) -> Result<ureq::Response, VcsError> {
        let mut request = self.agent.get(url).set("Accept", "application/json");
        if let Some(token) = &self.access_token {
            request = request.set("PRIVATE-TOKEN", token);
        }
        request.call().map_err(|e| VcsError::from_ureq(url, e))
    }

    fn deployments(&self, environment: &str, status: &str) -> Result<Vec<GitlabDeployment>, VcsError> {
        let url = format!(
            "{}?environment={}&status={}&order_by=updated_at&sort=desc",
            self.api_url("/deployments")?,
            urlencoding::encode(environment),
            urlencoding::encode(status),
        );
        let body = self
            .get(&url)?
            .into_string()
            .map_err(|e| VcsError::invalid_response(&url, e))?;
        parse_deployments(&body).map_err(|e| VcsError::invalid_response(&url, e))
    }

    fn environment<'a>(&'a self, environment: Option<&'a str>) -> Result<&'a str, VcsError> {
        environment
            .or(self.environment.as_deref())
            .ok_or_else(|| {
                VcsError::Core(assetsync_core::CoreError::MissingConfiguration {
                    definition: "vcs",
                    key: KEY_ENVIRONMENT.to_string(),
                })
            })
    }
}

/// Parse a deployments listing.
pub fn parse_deployments(body: &str) -> Result<Vec<GitlabDeployment>, serde_json::Error> {
    serde_json::from_str(body)
}

fn to_deployment(base: &str, project_id: &str, deployment: GitlabDeployment) -> Option<Deployment> {
    let revision = Revision::new(&deployment.sha).ok()?;
    let uri = deployment
        .deployable
        .and_then(|d| d.web_url)
        .unwrap_or_else(|| {
            format!(
                "{base}/api/v4/projects/{}/deployments/{}",
                urlencoding::encode(project_id),
                deployment.id
            )
        });
    Some(Deployment { uri, revision })
}

impl VcsProvider for GitlabVcsProvider {
    fn name(&self) -> &'static str {
        "gitlab"
    }

    fn source_url(&self) -> String {
        self.api_url("").unwrap_or_else(|_| self.base_url.clone())
    }

    fn latest_revision(&self, environment: Option<&str>) -> Option<Revision> {
        let result = self
            .environment(environment)
            .and_then(|env| self.deployments(env, "success"));
        match result {
            Ok(deployments) => deployments
                .into_iter()
                .find_map(|d| Revision::new(&d.sha).ok()),
            Err(err) => {
                tracing::warn!("gitlab: latest revision lookup failed: {err}");
                None
            }
        }
    }

    fn has_revision(&self, revision: &Revision) -> Result<bool, VcsError> {
        let url = self.api_url(&format!(
            "/repository/commits/{}",
            urlencoding::encode(revision.as_str())
        ))?;
        match self.get(&url) {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn active_deployments(&self) -> Result<Vec<Deployment>, VcsError> {
        let environment = self.environment(None)?;
        let project_id = self.project_id()?;
        let mut active = Vec::new();
        for status in ACTIVE_STATUSES {
            for deployment in self.deployments(environment, status)? {
                active.extend(to_deployment(&self.base_url, project_id, deployment));
            }
        }
        Ok(active)
    }

    fn with_vcs(&self, vcs: &Vcs) -> Result<Box<dyn VcsProvider>, VcsError> {
        let mut bound = self.clone();
        bound.project_id = Some(vcs.project_id()?);
        bound.access_token = vcs.access_token().map(str::to_string);
        bound.environment = vcs.environment().map(str::to_string);
        if let Some(base_url) = vcs.base_url() {
            bound.base_url = base_url.trim_end_matches('/').to_string();
        }
        Ok(Box::new(bound))
    }
}
