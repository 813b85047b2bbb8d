use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::correspondence::CorrespondenceView;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub password_rounds: u32,
    pub view: CorrespondenceView,
}

impl AppState {
    pub fn new(password_rounds: u32) -> Self {
        Self {
            workspace: None,
            db: None,
            password_rounds,
            view: CorrespondenceView::default(),
        }
    }
}
