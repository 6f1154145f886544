pub mod github;
pub use github::{github_webhook, GitHubEvent};
