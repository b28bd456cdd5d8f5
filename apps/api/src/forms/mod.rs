// Live intake forms: one FormSession per form, held in an in-memory FormStore.
// Persistence is external; GET /record hands out the flattened record.

pub mod handlers;
pub mod session;
pub mod store;

pub use session::{run_extract, ExtractOutcome, ExtractSettings, FormSession};
pub use store::FormStore;
