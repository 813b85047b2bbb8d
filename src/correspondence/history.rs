use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::model::Remark;

pub const EMPTY_HISTORY_MESSAGE: &str = "No correspondence found for this record.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub index: usize,
    pub date: String,
    pub remark: String,
    pub author: Option<String>,
}

/// Result of "View History": the entries, an explicit empty message, or
/// `Failed` when the store lookup errored (a failure notice is queued too).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum HistoryPanel {
    Entries { entries: Vec<HistoryEntry> },
    Empty { message: &'static str },
    Failed,
}

/// Short US-style date, as the desk staff read it: `M/D/YYYY`.
pub fn short_date(at: &DateTime<Utc>) -> String {
    format!("{}/{}/{}", at.month(), at.day(), at.year())
}

pub fn build_panel(mut remarks: Vec<Remark>) -> HistoryPanel {
    if remarks.is_empty() {
        return HistoryPanel::Empty {
            message: EMPTY_HISTORY_MESSAGE,
        };
    }
    // The store already orders by creation time; a stable sort keeps ties
    // in store order.
    remarks.sort_by_key(|r| r.created_at);
    let entries = remarks
        .into_iter()
        .enumerate()
        .map(|(i, r)| HistoryEntry {
            index: i + 1,
            date: short_date(&r.created_at),
            remark: r.remark,
            author: r.author.name,
        })
        .collect();
    HistoryPanel::Entries { entries }
}
