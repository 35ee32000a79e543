// Classification rules: the `SdsRules` contract in engine.rs and one
// implementation per supplier family.

pub mod engine;
pub mod sigma_aldrich;

pub use engine::{matches_at_start, SdsRules, SubsectionRules};
pub use sigma_aldrich::SigmaAldrichRules;
