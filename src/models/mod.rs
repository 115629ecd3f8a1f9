pub mod loaders;
pub mod score;
pub mod work_item;

pub use loaders::{load_json, load_work_items};
pub use score::{EvalReport, ScoreResult};
pub use work_item::{RewriteResult, WorkItem};
