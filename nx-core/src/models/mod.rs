pub mod account;
pub mod embedding;
pub mod events;
pub mod ledger;
pub mod raw;
pub mod redirect;
pub mod outbox;
pub mod source_ref;
pub mod user_state;
pub mod work;

pub use account::{Category, SourceAccount, SourceCapabilities, WorkCategoryRef};
pub use embedding::WorkEmbedding;
pub use events::{Phase, ScanCounts, ScanEvent, SyncStatus};
pub use ledger::{Checkpoint, FingerprintEntry, IngestDecision, IngestLedgerEntry, ReasonCode};
pub use outbox::CloudOutboxEvent;
pub use raw::{ExternalIds, NormalizedRecord, PlaybackHints, RawRecord, RawRecordCommon};
pub use redirect::WorkRedirect;
pub use source_ref::{PlaybackMethod, WorkSourceRef, WorkVariant};
pub use user_state::{
    Availability, Profile, ProfileKind, ProfileRule, ProfileUsage, RuleKind, WorkRuntimeState,
    WorkUserState,
};
pub use work::{AuthorityRefs, RelationKind, Work, WorkRelation};
