use crate::ipc::error::{err, ok, store_err};
use crate::ipc::types::{AppState, Request};
use crate::model::RemarkAuthor;
use crate::store::{RecordStore, SqliteStore};
use serde_json::json;

fn student_id(req: &Request) -> Result<String, serde_json::Value> {
    match req.params.get("studentId").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(err(&req.id, "bad_params", "missing studentId", None)),
    }
}

pub(crate) fn author_from(params: &serde_json::Value) -> RemarkAuthor {
    let text = |key: &str| {
        params
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    RemarkAuthor {
        id: text("authorId"),
        name: text("authorName"),
    }
}

fn handle_remarks_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let student_id = match student_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(remark) = req.params.get("remark").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing remark", None);
    };

    let store = SqliteStore::new(conn, state.password_rounds);
    match store.append_remark(&student_id, remark, &author_from(&req.params)) {
        Ok(success) => ok(&req.id, json!({ "success": success })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_remarks_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let student_id = match student_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let store = SqliteStore::new(conn, state.password_rounds);
    match store.list_remarks(&student_id) {
        Ok(remarks) => ok(&req.id, json!({ "remarks": remarks })),
        Err(e) => store_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "remarks.add" => Some(handle_remarks_add(state, req)),
        "remarks.list" => Some(handle_remarks_list(state, req)),
        _ => None,
    }
}
