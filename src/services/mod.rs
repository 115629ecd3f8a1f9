pub mod judge;
pub mod progress_store;
pub mod rewriter;

pub use judge::{parse_score, Evaluation, Judge, FALLBACK_SCORE};
pub use progress_store::{resume_offset, save_json, ProgressStore};
pub use rewriter::{Rewriter, VARIANTS_PER_ITEM};
