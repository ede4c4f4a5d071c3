pub mod ledger;
pub mod model;

pub use ledger::{apply, apply_accepted, apply_at, correct_proficiency, SkillDelta};
pub use model::{normalize_key, SkillMap, SkillMatrix, SkillRecord, MAX_PROFICIENCY, MIN_PROFICIENCY};
