// Infrastructure: dependency container, trait abstractions for the
// external collaborators, and their production adapters.

pub mod deps;
pub mod google_identity;
pub mod member_store;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use google_identity::GoogleIdentityGateway;
pub use member_store::FirestoreMemberStore;
pub use traits::{BaseIdentityGateway, BaseMemberStore, IdentityProfile, StoreError};
