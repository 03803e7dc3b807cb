//! GitHub REST implementation of [`CodeHost`].

use super::rate_limit::ensure_core_capacity;
use super::{CodeHost, CreatedPullRequest, HostError, NewPullRequest, OpenPullRequest};
use crate::repository::Repository;
use async_trait::async_trait;
use octocrab::params::State;
use octocrab::Octocrab;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Maximum page size of the pull request listing.
const PULLS_PER_PAGE: u8 = 100;

/// GitHub client authenticating with each repository's own token.
#[derive(Default)]
pub struct GitHubHost {
    clients: Mutex<HashMap<String, (String, Octocrab)>>,
}

impl GitHubHost {
    /// Creates a host with an empty client cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a client for the repository's token, reusing a cached one
    /// while the token is unchanged.
    fn client(&self, repository: &Repository) -> Result<Octocrab, HostError> {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((token, client)) = clients.get(&repository.id) {
            if *token == repository.access_token {
                return Ok(client.clone());
            }
        }

        let client = Octocrab::builder()
            .personal_token(repository.access_token.clone())
            .build()?;
        clients.insert(
            repository.id.clone(),
            (repository.access_token.clone(), client.clone()),
        );
        Ok(client)
    }
}

#[async_trait]
impl CodeHost for GitHubHost {
    async fn open_pull_requests(&self, repository: &Repository) -> Result<Vec<OpenPullRequest>, HostError> {
        let (owner, name) = repository.split_full_name()?;
        let octocrab = self.client(repository)?;

        ensure_core_capacity(&octocrab).await?;
        let first_page = octocrab
            .pulls(owner, name)
            .list()
            .state(State::Open)
            .per_page(PULLS_PER_PAGE)
            .send()
            .await?;
        let pulls = octocrab.all_pages(first_page).await?;

        debug!(repo = %repository.full_name, count = pulls.len(), "Listed open pull requests");

        Ok(pulls
            .into_iter()
            .map(|pr| OpenPullRequest {
                number: pr.number,
                title: pr.title.unwrap_or_default(),
                body: pr.body.unwrap_or_default(),
            })
            .collect())
    }

    async fn create_pull_request(
        &self,
        repository: &Repository,
        pull_request: &NewPullRequest,
    ) -> Result<CreatedPullRequest, HostError> {
        let (owner, name) = repository.split_full_name()?;
        let octocrab = self.client(repository)?;

        ensure_core_capacity(&octocrab).await?;
        let pr = octocrab
            .pulls(owner, name)
            .create(&pull_request.title, &pull_request.head, &pull_request.base)
            .body(&pull_request.body)
            .send()
            .await?;

        let url = pr
            .html_url
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_else(|| format!("https://github.com/{}/pull/{}", repository.full_name, pr.number));

        Ok(CreatedPullRequest {
            number: pr.number,
            url,
        })
    }

    async fn fetch_file(
        &self,
        repository: &Repository,
        path: &str,
        reference: Option<&str>,
    ) -> Result<Option<String>, HostError> {
        let (owner, name) = repository.split_full_name()?;
        let octocrab = self.client(repository)?;

        ensure_core_capacity(&octocrab).await?;
        let repos = octocrab.repos(owner, name);
        let mut request = repos.get_content().path(path);
        if let Some(reference) = reference {
            request = request.r#ref(reference);
        }

        match request.send().await {
            Ok(mut contents) => Ok(contents.take_items().into_iter().next().and_then(|c| c.decoded_content())),
            Err(octocrab::Error::GitHub { source, .. }) if source.status_code.as_u16() == 404 => {
                debug!(repo = %repository.full_name, path, "File not found");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
