use crate::filter::parse_level_threshold;
use crate::ipc::error::{composer_err, err, ok};
use crate::ipc::handlers::remarks::author_from;
use crate::ipc::types::{AppState, Request};
use crate::model::Category;
use crate::store::SqliteStore;
use serde_json::{json, Value};

fn with_view(state: &mut AppState, req: &Request, mut extra: Value) -> Value {
    extra["view"] = json!(state.view.snapshot());
    ok(&req.id, extra)
}

fn no_workspace(req: &Request) -> Value {
    err(&req.id, "no_workspace", "select a workspace first", None)
}

fn handle_state(state: &mut AppState, req: &Request) -> Value {
    with_view(state, req, json!({}))
}

fn handle_set_category(state: &mut AppState, req: &Request) -> Value {
    let Some(raw) = req.params.get("category").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing category", None);
    };
    let Some(category) = Category::parse(raw) else {
        return err(
            &req.id,
            "bad_params",
            format!("unknown category: {raw}"),
            Some(json!({ "allowed": ["enquiry", "student"] })),
        );
    };
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(req);
    };
    let store = SqliteStore::new(conn, state.password_rounds);
    state.view.set_category(category, &store);
    with_view(state, req, json!({}))
}

fn handle_reload(state: &mut AppState, req: &Request) -> Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(req);
    };
    let store = SqliteStore::new(conn, state.password_rounds);
    state.view.reload(&store);
    with_view(state, req, json!({}))
}

fn handle_set_search(state: &mut AppState, req: &Request) -> Value {
    let search = match req.params.get("search") {
        None | Some(Value::Null) => "",
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return err(&req.id, "bad_params", "search must be a string", None),
    };
    state.view.set_search(search);
    with_view(state, req, json!({}))
}

fn handle_set_min_level(state: &mut AppState, req: &Request) -> Value {
    let min_level = match req.params.get("minLevel") {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => match n.as_i64() {
            Some(v) => Some(v),
            None => return err(&req.id, "bad_params", "minLevel must be an integer", None),
        },
        Some(Value::String(s)) => match parse_level_threshold(s) {
            Ok(v) => v,
            Err(bad) => {
                return err(
                    &req.id,
                    "bad_params",
                    format!("minLevel is not a number: {:?}", bad.0),
                    None,
                )
            }
        },
        Some(_) => return err(&req.id, "bad_params", "minLevel must be a string or integer", None),
    };
    state.view.set_min_level(min_level);
    with_view(state, req, json!({}))
}

fn handle_page_next(state: &mut AppState, req: &Request) -> Value {
    let moved = state.view.next_page();
    with_view(state, req, json!({ "moved": moved }))
}

fn handle_page_prev(state: &mut AppState, req: &Request) -> Value {
    let moved = state.view.prev_page();
    with_view(state, req, json!({ "moved": moved }))
}

fn handle_page_goto(state: &mut AppState, req: &Request) -> Value {
    let Some(page) = req.params.get("page").and_then(|v| v.as_u64()) else {
        return err(&req.id, "bad_params", "missing page", None);
    };
    let moved = state.view.go_to_page(page as usize);
    with_view(state, req, json!({ "moved": moved }))
}

fn record_id(req: &Request) -> Result<&str, Value> {
    req.params
        .get("recordId")
        .and_then(|v| v.as_str())
        .ok_or_else(|| err(&req.id, "bad_params", "missing recordId", None))
}

fn handle_note_open(state: &mut AppState, req: &Request) -> Value {
    let id = match record_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.view.open_note(id) {
        Ok(true) => with_view(state, req, json!({})),
        Ok(false) => err(
            &req.id,
            "not_found",
            "record is not in the current list",
            Some(json!({ "recordId": id })),
        ),
        Err(e) => composer_err(&req.id, e),
    }
}

fn handle_note_edit(state: &mut AppState, req: &Request) -> Value {
    let Some(text) = req.params.get("text").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "text must be a string", None);
    };
    match state.view.edit_note(text) {
        Ok(()) => with_view(state, req, json!({})),
        Err(e) => composer_err(&req.id, e),
    }
}

fn handle_note_cancel(state: &mut AppState, req: &Request) -> Value {
    match state.view.cancel_note() {
        Ok(()) => with_view(state, req, json!({})),
        Err(e) => composer_err(&req.id, e),
    }
}

fn handle_note_submit(state: &mut AppState, req: &Request) -> Value {
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(req);
    };
    let store = SqliteStore::new(conn, state.password_rounds);
    let author = author_from(&req.params);
    match state.view.submit_note(&store, &author) {
        Ok(outcome) => with_view(state, req, json!({ "outcome": outcome })),
        Err(e) => composer_err(&req.id, e),
    }
}

fn handle_history(state: &mut AppState, req: &Request) -> Value {
    let id = match record_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(conn) = state.db.as_ref() else {
        return no_workspace(req);
    };
    let store = SqliteStore::new(conn, state.password_rounds);
    let panel = state.view.view_history(&store, id);
    with_view(state, req, json!({ "history": panel }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "correspondence.state" => Some(handle_state(state, req)),
        "correspondence.setCategory" => Some(handle_set_category(state, req)),
        "correspondence.reload" => Some(handle_reload(state, req)),
        "correspondence.setSearch" => Some(handle_set_search(state, req)),
        "correspondence.setMinLevel" => Some(handle_set_min_level(state, req)),
        "correspondence.page.next" => Some(handle_page_next(state, req)),
        "correspondence.page.prev" => Some(handle_page_prev(state, req)),
        "correspondence.page.goto" => Some(handle_page_goto(state, req)),
        "correspondence.note.open" => Some(handle_note_open(state, req)),
        "correspondence.note.edit" => Some(handle_note_edit(state, req)),
        "correspondence.note.cancel" => Some(handle_note_cancel(state, req)),
        "correspondence.note.submit" => Some(handle_note_submit(state, req)),
        "correspondence.history" => Some(handle_history(state, req)),
        _ => None,
    }
}
