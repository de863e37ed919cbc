pub mod issue;
pub mod label;
pub mod stats;

use crate::config::Context;
use crate::error::Result;
use crate::github::GithubClient;
use crate::mux::GitHubMux;
use tracing::debug;

/// Builds the API client and resolves the organization every command works on.
pub async fn connect(ctx: &Context) -> Result<GitHubMux<GithubClient>> {
    debug!(
        org = %ctx.organization,
        exclude = ?ctx.exclude.iter().collect::<Vec<_>>(),
        "connecting"
    );
    let client = GithubClient::new(&ctx.token)?;
    GitHubMux::connect(client, &ctx.organization, ctx.exclude.clone()).await
}
