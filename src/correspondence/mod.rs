//! Correspondence screen state: which collection is loaded, how it is
//! filtered and paged, and the add-note / view-history actions.
//!
//! The front-end renders snapshots of this controller and forwards operator
//! actions to it. Store failures never become request errors: a failed load
//! leaves an empty table and a failed history lookup raises a notice.

mod composer;
mod history;
mod notice;

pub use composer::ComposerError;
pub use history::HistoryPanel;
pub use notice::{Notice, NoticeKind};

use serde::Serialize;
use tracing::{debug, warn};

use crate::filter::{filter_records, FilterCriteria};
use crate::model::{level_label, Category, Record, RemarkAuthor};
use crate::paginate::{total_pages, Paginator};
use crate::store::{RecordStore, StoreResult};
#[cfg(test)]
use composer::ComposerState;
use composer::{NoteComposer, SubmitStart};
use notice::NoticeQueue;

const NOTE_REQUIRED: &str = "Please enter a note";
const NOTE_ADDED: &str = "Correspondence added successfully";
const NOTE_FAILED: &str = "Failed to add correspondence. Please try again.";
const HISTORY_FAILED: &str = "Failed to fetch correspondence history.";

/// Issued by `begin_load`; only the most recently issued ticket may
/// replace the loaded records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    token: u64,
    category: Category,
}

impl LoadTicket {
    pub fn category(&self) -> Category {
        self.category
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SubmitOutcome {
    Rejected,
    Saved,
    Failed,
}

#[derive(Debug)]
pub struct CorrespondenceView {
    category: Category,
    records: Vec<Record>,
    loading: bool,
    latest_token: u64,
    criteria: FilterCriteria,
    pager: Paginator,
    composer: NoteComposer,
    notices: NoticeQueue,
}

impl Default for CorrespondenceView {
    fn default() -> Self {
        Self {
            category: Category::Enquiry,
            records: Vec::new(),
            loading: false,
            latest_token: 0,
            criteria: FilterCriteria::default(),
            pager: Paginator::default(),
            composer: NoteComposer::default(),
            notices: NoticeQueue::default(),
        }
    }
}

impl CorrespondenceView {
    pub fn category(&self) -> Category {
        self.category
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn page(&self) -> usize {
        self.pager.page()
    }

    #[cfg(test)]
    pub fn composer(&self) -> &ComposerState {
        self.composer.state()
    }

    #[cfg(test)]
    pub fn pending_notices(&self) -> &[Notice] {
        self.notices.peek()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_token += 1;
        self.loading = true;
        LoadTicket {
            token: self.latest_token,
            category: self.category,
        }
    }

    /// Applies a finished load. Returns `false` when the ticket was
    /// superseded by a later load and the result was dropped.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: StoreResult<Vec<Record>>) -> bool {
        if ticket.token != self.latest_token {
            debug!(
                token = ticket.token,
                latest = self.latest_token,
                "dropping stale record load"
            );
            return false;
        }
        self.records = match result {
            Ok(records) => records,
            Err(e) => {
                warn!(category = ticket.category.as_str(), error = %e, "record load failed");
                Vec::new()
            }
        };
        self.loading = false;
        true
    }

    pub fn reload(&mut self, store: &dyn RecordStore) {
        let ticket = self.begin_load();
        let result = store.list_records(ticket.category());
        self.finish_load(ticket, result);
    }

    pub fn set_category(&mut self, category: Category, store: &dyn RecordStore) {
        self.category = category;
        self.pager.reset();
        self.reload(store);
    }

    pub fn set_search(&mut self, search: &str) {
        self.criteria.search = search.to_string();
        self.pager.reset();
    }

    pub fn set_min_level(&mut self, min_level: Option<i64>) {
        self.criteria.min_level = min_level;
        self.pager.reset();
    }

    pub fn filtered(&self) -> Vec<&Record> {
        filter_records(&self.records, &self.criteria)
    }

    pub fn next_page(&mut self) -> bool {
        let total = self.filtered().len();
        self.pager.next(total)
    }

    pub fn prev_page(&mut self) -> bool {
        self.pager.prev()
    }

    pub fn go_to_page(&mut self, page: usize) -> bool {
        let total = self.filtered().len();
        self.pager.go_to(page, total)
    }

    fn find_record(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Opens the add-note composer for a loaded record.
    pub fn open_note(&mut self, record_id: &str) -> Result<bool, ComposerError> {
        if self.find_record(record_id).is_none() {
            return Ok(false);
        }
        self.composer.open(record_id)?;
        Ok(true)
    }

    pub fn edit_note(&mut self, text: &str) -> Result<(), ComposerError> {
        self.composer.edit(text)
    }

    pub fn cancel_note(&mut self) -> Result<(), ComposerError> {
        self.composer.cancel()
    }

    pub fn submit_note(
        &mut self,
        store: &dyn RecordStore,
        author: &RemarkAuthor,
    ) -> Result<SubmitOutcome, ComposerError> {
        let submission = match self.composer.begin_submit()? {
            SubmitStart::Empty => {
                self.notices.push(NoticeKind::Warning, NOTE_REQUIRED);
                return Ok(SubmitOutcome::Rejected);
            }
            SubmitStart::Ready(s) => s,
        };

        let accepted = match store.append_remark(&submission.target, &submission.text, author) {
            Ok(ack) => ack,
            Err(e) => {
                warn!(record_id = %submission.target, error = %e, "remark append failed");
                false
            }
        };
        self.composer.finish_submit(accepted)?;

        if accepted {
            self.notices.push(NoticeKind::Success, NOTE_ADDED);
            Ok(SubmitOutcome::Saved)
        } else {
            self.notices.push(NoticeKind::Failure, NOTE_FAILED);
            Ok(SubmitOutcome::Failed)
        }
    }

    /// Fetches a record's notes on demand. Nothing is cached.
    pub fn view_history(&mut self, store: &dyn RecordStore, record_id: &str) -> HistoryPanel {
        match store.list_remarks(record_id) {
            Ok(remarks) => history::build_panel(remarks),
            Err(e) => {
                warn!(record_id = %record_id, error = %e, "remark history fetch failed");
                self.notices.push(NoticeKind::Failure, HISTORY_FAILED);
                HistoryPanel::Failed
            }
        }
    }

    /// Renders the current state and hands pending notices to the caller.
    pub fn snapshot(&mut self) -> ViewSnapshot {
        let filtered = self.filtered();
        let total_items = filtered.len();
        let rows = self
            .pager
            .window(&filtered)
            .iter()
            .map(|r| RecordRow::from_record(r))
            .collect();
        let composer = self.composer.view();
        let composer = ComposerSnapshot {
            state: composer.state,
            target_id: composer.target_id.map(str::to_string),
            buffer: composer.buffer.map(str::to_string),
        };

        ViewSnapshot {
            category: self.category(),
            loading: self.is_loading(),
            search: self.criteria.search.clone(),
            min_level: self.criteria.min_level,
            page: self.page(),
            total_pages: total_pages(total_items),
            total_items,
            has_prev: self.pager.has_prev(),
            has_next: self.pager.has_next(total_items),
            rows,
            composer,
            notices: self.notices.drain(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRow {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub level: i64,
    pub level_label: String,
}

impl RecordRow {
    fn from_record(r: &Record) -> Self {
        let level = r.resolved_level();
        Self {
            id: r.id.clone(),
            display_name: r.display_name(),
            email: r.email.clone(),
            phone_number: r.phone_number.clone(),
            level,
            level_label: level_label(level),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerSnapshot {
    pub state: &'static str,
    pub target_id: Option<String>,
    pub buffer: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub category: Category,
    pub loading: bool,
    pub search: String,
    pub min_level: Option<i64>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub rows: Vec<RecordRow>,
    pub composer: ComposerSnapshot,
    pub notices: Vec<Notice>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correspondence::history::EMPTY_HISTORY_MESSAGE;
    use crate::model::{sample_record, Remark};
    use crate::store::StoreError;
    use chrono::{TimeZone, Utc};
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct ScriptedStore {
        enquiries: Vec<Record>,
        students: Vec<Record>,
        fail_lists: Cell<bool>,
        ack: Cell<Option<bool>>,
        appended: RefCell<Vec<(String, String)>>,
        remarks: Vec<Remark>,
        fail_remarks: bool,
    }

    impl RecordStore for ScriptedStore {
        fn list_records(&self, category: Category) -> StoreResult<Vec<Record>> {
            if self.fail_lists.get() {
                return Err(StoreError::NotFound("records"));
            }
            Ok(match category {
                Category::Enquiry => self.enquiries.clone(),
                Category::Student => self.students.clone(),
            })
        }

        fn append_remark(
            &self,
            record_id: &str,
            text: &str,
            _author: &RemarkAuthor,
        ) -> StoreResult<bool> {
            self.appended
                .borrow_mut()
                .push((record_id.to_string(), text.to_string()));
            match self.ack.get() {
                Some(ack) => Ok(ack),
                None => Err(StoreError::Conflict("rejected".into())),
            }
        }

        fn list_remarks(&self, record_id: &str) -> StoreResult<Vec<Remark>> {
            if self.fail_remarks {
                return Err(StoreError::NotFound("record"));
            }
            Ok(self
                .remarks
                .iter()
                .filter(|r| r.record_id == record_id)
                .cloned()
                .collect())
        }
    }

    fn many(prefix: &str, n: usize, level: i64) -> Vec<Record> {
        (0..n)
            .map(|i| sample_record(&format!("{prefix}{i}"), &format!("Name{i}"), Some(level)))
            .collect()
    }

    fn store_with(enquiries: Vec<Record>) -> ScriptedStore {
        ScriptedStore {
            enquiries,
            ack: Cell::new(Some(true)),
            ..ScriptedStore::default()
        }
    }

    #[test]
    fn loads_filters_and_pages() {
        let mut records = many("e", 23, 2);
        records.extend(many("h", 3, 5));
        let store = store_with(records);
        let mut view = CorrespondenceView::default();
        view.reload(&store);

        let snap = view.snapshot();
        assert_eq!(snap.total_items, 26);
        assert_eq!(snap.total_pages, 3);
        assert_eq!(snap.rows.len(), 10);
        assert!(!snap.has_prev);
        assert!(snap.has_next);

        assert!(view.go_to_page(3));
        let snap = view.snapshot();
        assert_eq!(snap.rows.len(), 6);
        assert!(!snap.has_next);
        assert!(!view.next_page());

        view.set_min_level(Some(5));
        let snap = view.snapshot();
        assert_eq!(snap.page, 1);
        assert_eq!(snap.total_items, 3);
        assert_eq!(snap.rows[0].level_label, "Level 5 - Admitted Student");
    }

    #[test]
    fn criteria_and_category_changes_reset_page() {
        let store = ScriptedStore {
            students: many("s", 15, 1),
            ..store_with(many("e", 30, 1))
        };
        let mut view = CorrespondenceView::default();
        view.reload(&store);

        view.go_to_page(3);
        view.set_search("name");
        assert_eq!(view.page(), 1);

        view.go_to_page(2);
        view.set_min_level(None);
        assert_eq!(view.page(), 1);

        view.go_to_page(3);
        view.set_category(Category::Student, &store);
        assert_eq!(view.page(), 1);
        assert_eq!(view.snapshot().total_items, 15);
    }

    #[test]
    fn failed_load_yields_empty_table() {
        let store = store_with(many("e", 4, 1));
        let mut view = CorrespondenceView::default();
        view.reload(&store);
        assert_eq!(view.filtered().len(), 4);

        store.fail_lists.set(true);
        view.reload(&store);
        assert!(!view.is_loading());
        let snap = view.snapshot();
        assert_eq!(snap.total_items, 0);
        assert_eq!(snap.total_pages, 0);
        assert!(snap.notices.is_empty());
    }

    #[test]
    fn stale_load_is_ignored() {
        let mut view = CorrespondenceView::default();
        let first = view.begin_load();
        view.category = Category::Student;
        let second = view.begin_load();

        assert!(view.finish_load(second, Ok(many("s", 2, 1))));
        assert!(!view.finish_load(first, Ok(many("e", 7, 1))));
        assert_eq!(view.filtered().len(), 2);
        assert_eq!(second.category(), Category::Student);
    }

    #[test]
    fn loading_flag_tracks_latest_ticket() {
        let mut view = CorrespondenceView::default();
        let first = view.begin_load();
        let second = view.begin_load();
        view.finish_load(first, Ok(Vec::new()));
        assert!(view.is_loading());
        view.finish_load(second, Ok(Vec::new()));
        assert!(!view.is_loading());
    }

    #[test]
    fn blank_note_never_reaches_store() {
        let store = store_with(many("e", 1, 1));
        let mut view = CorrespondenceView::default();
        view.reload(&store);
        assert_eq!(view.open_note("e0"), Ok(true));
        view.edit_note("   ").expect("edit");
        assert_eq!(
            view.submit_note(&store, &RemarkAuthor::default()),
            Ok(SubmitOutcome::Rejected)
        );
        assert!(store.appended.borrow().is_empty());
        assert!(matches!(view.composer(), ComposerState::Composing { .. }));
        assert_eq!(view.pending_notices()[0].kind, NoticeKind::Warning);
    }

    #[test]
    fn saved_note_closes_composer() {
        let store = store_with(many("e", 1, 1));
        let mut view = CorrespondenceView::default();
        view.reload(&store);
        view.open_note("e0").expect("open");
        view.edit_note("  Called father, will visit Monday ").expect("edit");
        assert_eq!(
            view.submit_note(&store, &RemarkAuthor::default()),
            Ok(SubmitOutcome::Saved)
        );
        assert_eq!(
            store.appended.borrow().as_slice(),
            &[("e0".to_string(), "Called father, will visit Monday".to_string())]
        );
        let snap = view.snapshot();
        assert_eq!(snap.composer.state, "idle");
        assert_eq!(snap.composer.buffer, None);
        assert_eq!(snap.notices[0].kind, NoticeKind::Success);
        assert!(view.snapshot().notices.is_empty());
    }

    #[test]
    fn failed_note_keeps_buffer_for_retry() {
        let store = store_with(many("e", 1, 1));
        store.ack.set(None);
        let mut view = CorrespondenceView::default();
        view.reload(&store);
        view.open_note("e0").expect("open");
        view.edit_note("draft").expect("edit");
        assert_eq!(
            view.submit_note(&store, &RemarkAuthor::default()),
            Ok(SubmitOutcome::Failed)
        );
        assert_eq!(
            view.composer(),
            &ComposerState::Composing {
                target: "e0".into(),
                buffer: "draft".into()
            }
        );

        store.ack.set(Some(false));
        assert_eq!(
            view.submit_note(&store, &RemarkAuthor::default()),
            Ok(SubmitOutcome::Failed)
        );

        store.ack.set(Some(true));
        assert_eq!(
            view.submit_note(&store, &RemarkAuthor::default()),
            Ok(SubmitOutcome::Saved)
        );
        assert_eq!(store.appended.borrow().len(), 3);
        let kinds: Vec<_> = view.snapshot().notices.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![NoticeKind::Failure, NoticeKind::Failure, NoticeKind::Success]
        );
    }

    #[test]
    fn cancel_discards_without_store_call() {
        let store = store_with(many("e", 1, 1));
        let mut view = CorrespondenceView::default();
        view.reload(&store);
        view.open_note("e0").expect("open");
        view.edit_note("never sent").expect("edit");
        view.cancel_note().expect("cancel");
        assert_eq!(view.composer(), &ComposerState::Idle);
        assert!(store.appended.borrow().is_empty());
        assert_eq!(view.open_note("missing"), Ok(false));
    }

    #[test]
    fn history_lists_or_reports_empty() {
        let mut store = store_with(many("e", 2, 1));
        store.remarks = vec![Remark {
            id: "n1".into(),
            record_id: "e0".into(),
            remark: "Sent fee schedule".into(),
            author: RemarkAuthor::default(),
            created_at: Utc.with_ymd_and_hms(2025, 8, 14, 10, 0, 0).unwrap(),
        }];
        let mut view = CorrespondenceView::default();
        view.reload(&store);

        let HistoryPanel::Entries { entries } = view.view_history(&store, "e0") else {
            panic!("expected entries");
        };
        assert_eq!(entries[0].index, 1);
        assert_eq!(entries[0].date, "8/14/2025");

        assert_eq!(
            view.view_history(&store, "e1"),
            HistoryPanel::Empty {
                message: EMPTY_HISTORY_MESSAGE
            }
        );
        assert!(view.snapshot().notices.is_empty());
    }

    #[test]
    fn history_failure_becomes_notice() {
        let store = ScriptedStore {
            fail_remarks: true,
            ..store_with(many("e", 1, 1))
        };
        let mut view = CorrespondenceView::default();
        assert_eq!(view.view_history(&store, "e0"), HistoryPanel::Failed);
        let notices = view.snapshot().notices;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Failure);
    }
}
