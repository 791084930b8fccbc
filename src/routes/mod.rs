pub mod auth;

pub mod results;

pub mod scores;

pub use auth::configure_auth_routes;
pub use results::configure_results_routes;
pub use scores::configure_scores_routes;
