//! Convenient imports for common functionality.
//!
//! Re-exports the pool handle, the unit of work, the error type, and every
//! entity repository with its models and input structs.

pub use crate::db::{Db, PgSettings, UnitOfWork};
pub use crate::error::StoreError;
pub use crate::geo::GeoPoint;
pub use crate::value::{Setter, SqlValue};

pub use crate::repo::{
    InsertPetitionInput, InsertPetitionSignatureInput, InsertPollInput, InsertPollOptionInput,
    InsertPollVoteInput, InsertProposalInput, InsertProposalVoteInput, PetitionModel,
    PetitionSignature, PetitionSignaturesQ, PetitionsQ, PollModel, PollOption, PollOptionsQ,
    PollVoteModel, PollVotesQ, PollsQ, Proposal, ProposalVoteModel, ProposalVotesQ, ProposalsQ,
    UpdatePetitionInput, UpdatePollInput, UpdatePollVoteInput, UpdateProposalInput,
    UpdateProposalVoteInput,
};
