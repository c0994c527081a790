//! Custom request extractors.

mod query;
mod session;
mod validated_json;

pub use query::QueryParams;
pub use session::MaybePlayer;
pub use validated_json::ValidatedJson;
