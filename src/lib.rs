pub mod app;
pub mod duration;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod seed;
pub mod stats;
pub mod storage;
pub mod state;
pub mod tasks;
pub mod ticker;

pub use app::router;
pub use state::AppState;
pub use storage::{load_data, resolve_data_path};
