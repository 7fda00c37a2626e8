//! API services, one per resource family.

pub mod actions;
pub mod commits;
pub mod pull_requests;
pub mod repositories;
pub mod search;

pub use actions::ActionsService;
pub use commits::CommitsService;
pub use pull_requests::{PullRequestsService, StateFilter};
pub use repositories::RepositoriesService;
pub use search::SearchService;
