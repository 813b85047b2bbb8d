use crate::ipc::error::{err, ok, store_err};
use crate::ipc::types::{AppState, Request};
use crate::model::Category;
use crate::store::{NewRecord, RecordPatch, RecordStore, SqliteStore};
use serde_json::json;

fn record_id(req: &Request) -> Result<String, serde_json::Value> {
    match req.params.get("id").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(err(&req.id, "bad_params", "missing id", None)),
    }
}

fn handle_records_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let category = match req.params.get("category").and_then(|v| v.as_str()) {
        None => Category::Enquiry,
        Some(s) => match Category::parse(s) {
            Some(c) => c,
            None => {
                return err(
                    &req.id,
                    "bad_params",
                    format!("unknown category: {s}"),
                    Some(json!({ "allowed": ["enquiry", "student"] })),
                )
            }
        },
    };

    let store = SqliteStore::new(conn, state.password_rounds);
    match store.list_records(category) {
        Ok(records) => ok(
            &req.id,
            json!({ "category": category, "records": records }),
        ),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_records_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let id = match record_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let store = SqliteStore::new(conn, state.password_rounds);
    match store.get_record(&id) {
        Ok(rec) => {
            let status = rec.account_status();
            ok(
                &req.id,
                json!({ "record": rec, "accountStatus": status }),
            )
        }
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_records_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let new: NewRecord = match serde_json::from_value(req.params.clone()) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "bad_params", e.to_string(), None),
    };
    let store = SqliteStore::new(conn, state.password_rounds);
    match store.create_record(new) {
        Ok(rec) => ok(&req.id, json!({ "record": rec })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_records_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let id = match record_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patch_value = req.params.get("patch").cloned().unwrap_or_else(|| json!({}));
    let patch: RecordPatch = match serde_json::from_value(patch_value) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "bad_params", e.to_string(), None),
    };
    let store = SqliteStore::new(conn, state.password_rounds);
    match store.update_record(&id, patch) {
        Ok(rec) => ok(&req.id, json!({ "record": rec })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_records_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let id = match record_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let store = SqliteStore::new(conn, state.password_rounds);
    match store.delete_record(&id) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_records_verify_password(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let id = match record_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(candidate) = req.params.get("password").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing password", None);
    };
    let store = SqliteStore::new(conn, state.password_rounds);
    match store.verify_password(&id, candidate) {
        Ok(matches) => ok(&req.id, json!({ "matches": matches })),
        Err(e) => store_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "records.list" => Some(handle_records_list(state, req)),
        "records.get" => Some(handle_records_get(state, req)),
        "records.create" => Some(handle_records_create(state, req)),
        "records.update" => Some(handle_records_update(state, req)),
        "records.delete" => Some(handle_records_delete(state, req)),
        "records.verifyPassword" => Some(handle_records_verify_password(state, req)),
        _ => None,
    }
}
