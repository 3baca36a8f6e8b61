pub mod mapping;
pub mod record;

pub use mapping::ResultMapping;
pub use record::{CandidateBatch, CandidateRecord, RawCandidate};
