use crate::storage::StoreData;
use crate::tasks::TaskBoard;
use crate::ticker::Ticker;
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<StoreData>>,
    /// In-memory calendar tasks; intentionally not persisted.
    pub tasks: Arc<Mutex<TaskBoard>>,
    /// One live-elapsed ticker per active session, keyed by session id.
    pub tickers: Arc<Mutex<HashMap<Uuid, Ticker>>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: StoreData) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            tasks: Arc::new(Mutex::new(TaskBoard::default())),
            tickers: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}
