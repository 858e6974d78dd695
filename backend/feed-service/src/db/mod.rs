//! Postgres-backed store implementations
//!
//! One module per collaborator store. All of them share the service's
//! `sqlx::PgPool`; none of them writes (the feed path is read-only).

pub mod content_store;
pub mod graph_store;
pub mod interaction_store;
pub mod profile_store;

pub use content_store::PgContentStore;
pub use graph_store::PgSocialGraphStore;
pub use interaction_store::PgInteractionStore;
pub use profile_store::PgProfileStore;
