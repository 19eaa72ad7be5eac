use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};

pub(crate) fn github_client(github_token: &SecretString) -> Result<octocrab::Octocrab> {
    Ok(octocrab::Octocrab::builder()
        // https://github.com/XAMPPRocky/octocrab/issues/594
        .personal_token(github_token.expose_secret().to_owned())
        .build()?)
}
