mod octocrab_utils;
mod parser;
mod tracing;

pub(crate) use octocrab_utils::github_client;
pub(crate) use parser::Cli;
pub(crate) use self::tracing::init as init_tracing;
