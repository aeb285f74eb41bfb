//! One repository per entity kind (spec.md §3), mirroring the teacher's
//! one-repository-per-aggregate layout. Each repository exposes `pool()` for
//! transaction composition and an `upsert_with_executor` overload so batch
//! writes can share one `Transaction` (§4.2).

pub mod account;
pub mod embedding;
pub mod ledger;
pub mod outbox;
pub mod redirect;
pub mod relation;
pub mod source_ref;
pub mod user_state;
pub mod work;

pub use account::{CategoryRepository, SourceAccountRepository, WorkCategoryRefRepository};
pub use embedding::WorkEmbeddingRepository;
pub use ledger::{CheckpointRepository, FingerprintRepository, IngestLedgerRepository};
pub use outbox::CloudOutboxRepository;
pub use redirect::WorkRedirectRepository;
pub use relation::WorkRelationRepository;
pub use source_ref::{WorkSourceRefRepository, WorkVariantRepository};
pub use user_state::{
    ProfileRepository, ProfileRuleRepository, ProfileUsageRepository, WorkRuntimeStateRepository,
    WorkUserStateRepository,
};
pub use work::WorkRepository;
