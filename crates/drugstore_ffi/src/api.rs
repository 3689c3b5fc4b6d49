//! FFI use-case API for the Flutter dispensary app.
//!
//! # Responsibility
//! - Expose one sync function per screen action to Dart via FRB.
//! - Translate core errors into plain response envelopes.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - IDs cross the boundary as UUID strings; categories as snake_case labels.

use drugstore_core::db::open_db;
use drugstore_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    DispensaryService, Drug, DrugForm, FilterState, Signature, SignatureService,
    SqliteDrugRepository, SqliteSignatureRepository, SqliteTodoRepository, Todo, TodoService,
};
use log::warn;
use rusqlite::Connection;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const DB_FILE_NAME: &str = "drugstore.sqlite3";
const DB_PATH_ENV: &str = "DRUGSTORE_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
/// Repeating the call with the same `level + log_dir` is a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One tile of the dispensary grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DispensaryItem {
    pub drug_id: String,
    pub title: String,
    pub dosage_unit: String,
    /// `injection|oral|oral_liquid|plaster`.
    pub form: String,
    pub stock_amount: f64,
    pub is_favorite: bool,
}

/// Dispensary list response.
#[derive(Debug, Clone, PartialEq)]
pub struct DispensaryListResponse {
    pub ok: bool,
    /// Items in display order; empty on failure.
    pub items: Vec<DispensaryItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub todo_id: String,
    pub text: String,
    pub is_checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListResponse {
    pub ok: bool,
    pub items: Vec<TodoItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureItem {
    pub signature_id: String,
    pub employee: String,
    pub signed_at_epoch_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureListResponse {
    pub ok: bool,
    pub items: Vec<SignatureItem>,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// ID of the created or affected record, when there is one.
    pub id: Option<String>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(action: &str, err: impl std::fmt::Display) -> Self {
        warn!("event=ffi_action module=ffi status=error action={action}");
        Self {
            ok: false,
            id: None,
            message: format!("{action} failed: {err}"),
        }
    }
}

/// Lists dispensary items for the given filter criteria.
///
/// Repeated form labels count once; unknown labels fail the call.
#[flutter_rust_bridge::frb(sync)]
pub fn dispensary_items(
    favorites_only: bool,
    forms: Vec<String>,
    search_term: String,
) -> DispensaryListResponse {
    let result = build_filter(favorites_only, &forms, search_term).and_then(|filter| {
        with_connection(|conn| {
            let service = DispensaryService::new(
                SqliteDrugRepository::try_new(conn).map_err(|err| err.to_string())?,
            );
            service
                .get_all_dispensary_items(&filter)
                .map_err(|err| err.to_string())
        })
    });

    match result {
        Ok(drugs) => {
            let items = drugs.into_iter().map(to_dispensary_item).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No items.".to_string()
            } else {
                format!("Found {} item(s).", items.len())
            };
            DispensaryListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => {
            warn!("event=ffi_action module=ffi status=error action=dispensary_items");
            DispensaryListResponse {
                ok: false,
                items: Vec::new(),
                message: format!("dispensary_items failed: {err}"),
            }
        }
    }
}

/// Adds a drug to the inventory.
#[flutter_rust_bridge::frb(sync)]
pub fn drug_create(
    title: String,
    dosage_unit: String,
    form: String,
    stock_amount: f64,
) -> ActionResponse {
    let Some(form) = DrugForm::parse(form.trim()) else {
        return ActionResponse::failure("drug_create", format!("unknown drug form `{form}`"));
    };
    let drug = Drug::new(title.trim(), dosage_unit.trim(), form).with_stock(stock_amount);
    let result = with_connection(|conn| {
        let service = DispensaryService::new(
            SqliteDrugRepository::try_new(conn).map_err(|err| err.to_string())?,
        );
        service.create_drug(&drug).map_err(|err| err.to_string())
    });
    match result {
        Ok(id) => ActionResponse::success("Drug created.", Some(id.to_string())),
        Err(err) => ActionResponse::failure("drug_create", err),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn dispensary_add_favorite(drug_id: String) -> ActionResponse {
    set_favorite("dispensary_add_favorite", drug_id, true)
}

#[flutter_rust_bridge::frb(sync)]
pub fn dispensary_remove_favorite(drug_id: String) -> ActionResponse {
    set_favorite("dispensary_remove_favorite", drug_id, false)
}

/// Records a dispensation from the dispense dialog input.
///
/// `dosage` is the raw text field content (`2.5` or `2,5`).
#[flutter_rust_bridge::frb(sync)]
pub fn dispensary_dispense(
    drug_id: String,
    employee: String,
    patient: String,
    dosage: String,
) -> ActionResponse {
    let result = parse_id(&drug_id).and_then(|drug_id| {
        with_connection(|conn| {
            let mut service = DispensaryService::new(
                SqliteDrugRepository::try_new(conn).map_err(|err| err.to_string())?,
            );
            service
                .dispense_drug(drug_id, &employee, &patient, &dosage)
                .map_err(|err| err.to_string())
        })
    });
    match result {
        Ok(dispensation) => {
            ActionResponse::success("Dispensed.", Some(dispensation.uuid.to_string()))
        }
        Err(err) => ActionResponse::failure("dispensary_dispense", err),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn todo_create(text: String) -> ActionResponse {
    match with_todo_service(|service| service.create_todo(&text).map_err(|err| err.to_string())) {
        Ok(todo) => ActionResponse::success("Todo created.", Some(todo.uuid.to_string())),
        Err(err) => ActionResponse::failure("todo_create", err),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn todo_list() -> TodoListResponse {
    match with_todo_service(|service| service.list_todos().map_err(|err| err.to_string())) {
        Ok(todos) => TodoListResponse {
            ok: true,
            message: format!("Found {} todo(s).", todos.len()),
            items: todos.into_iter().map(to_todo_item).collect(),
        },
        Err(err) => TodoListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("todo_list failed: {err}"),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn todo_toggle(todo_id: String) -> ActionResponse {
    let result = parse_id(&todo_id).and_then(|id| {
        with_todo_service(|service| service.toggle_todo(id).map_err(|err| err.to_string()))
    });
    match result {
        Ok(todo) => ActionResponse::success(
            if todo.is_checked {
                "Todo checked."
            } else {
                "Todo unchecked."
            },
            Some(todo.uuid.to_string()),
        ),
        Err(err) => ActionResponse::failure("todo_toggle", err),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn todo_delete(todo_id: String) -> ActionResponse {
    let result = parse_id(&todo_id).and_then(|id| {
        with_todo_service(|service| service.delete_todo(id).map_err(|err| err.to_string()))
            .map(|()| id)
    });
    match result {
        Ok(id) => ActionResponse::success("Todo deleted.", Some(id.to_string())),
        Err(err) => ActionResponse::failure("todo_delete", err),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn signature_create(employee: String) -> ActionResponse {
    match with_signature_service(|service| service.sign(&employee).map_err(|err| err.to_string()))
    {
        Ok(signature) => {
            ActionResponse::success("Signed.", Some(signature.uuid.to_string()))
        }
        Err(err) => ActionResponse::failure("signature_create", err),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn signatures_list() -> SignatureListResponse {
    match with_signature_service(|service| service.get_signatures().map_err(|err| err.to_string()))
    {
        Ok(signatures) => SignatureListResponse {
            ok: true,
            message: format!("Found {} signature(s).", signatures.len()),
            items: signatures.into_iter().map(to_signature_item).collect(),
        },
        Err(err) => SignatureListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("signatures_list failed: {err}"),
        },
    }
}

fn set_favorite(action: &str, drug_id: String, is_favorite: bool) -> ActionResponse {
    let result = parse_id(&drug_id).and_then(|id| {
        with_connection(|conn| {
            let service = DispensaryService::new(
                SqliteDrugRepository::try_new(conn).map_err(|err| err.to_string())?,
            );
            let updated = if is_favorite {
                service.add_to_favorites(id)
            } else {
                service.remove_from_favorites(id)
            };
            updated.map_err(|err| err.to_string()).map(|()| id)
        })
    });
    match result {
        Ok(id) => ActionResponse::success(
            if is_favorite {
                "Added to favorites."
            } else {
                "Removed from favorites."
            },
            Some(id.to_string()),
        ),
        Err(err) => ActionResponse::failure(action, err),
    }
}

fn build_filter(
    favorites_only: bool,
    forms: &[String],
    search_term: String,
) -> Result<FilterState<DrugForm>, String> {
    let mut parsed = BTreeSet::new();
    for label in forms {
        let form = DrugForm::parse(label.trim())
            .ok_or_else(|| format!("unknown drug form `{label}`"))?;
        parsed.insert(form);
    }

    let mut filter = FilterState::new();
    if favorites_only {
        filter.toggle_favorites();
    }
    for form in parsed {
        filter.toggle_filter(form);
    }
    filter.set_search_filter(search_term);
    Ok(filter)
}

fn parse_id(value: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value.trim()).map_err(|_| format!("invalid id `{value}`"))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_connection<T>(f: impl FnOnce(&mut Connection) -> Result<T, String>) -> Result<T, String> {
    let mut conn =
        open_db(resolve_db_path()).map_err(|err| format!("database open failed: {err}"))?;
    f(&mut conn)
}

fn with_todo_service<T>(
    f: impl FnOnce(&TodoService<SqliteTodoRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    with_connection(|conn| {
        let repo = SqliteTodoRepository::try_new(conn).map_err(|err| err.to_string())?;
        f(&TodoService::new(repo))
    })
}

fn with_signature_service<T>(
    f: impl FnOnce(&SignatureService<SqliteSignatureRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    with_connection(|conn| {
        let repo = SqliteSignatureRepository::try_new(conn).map_err(|err| err.to_string())?;
        f(&SignatureService::new(repo))
    })
}

fn to_dispensary_item(drug: Drug) -> DispensaryItem {
    DispensaryItem {
        drug_id: drug.uuid.to_string(),
        form: drug.form.as_str().to_string(),
        title: drug.title,
        dosage_unit: drug.dosage_unit,
        stock_amount: drug.stock_amount,
        is_favorite: drug.is_favorite,
    }
}

fn to_todo_item(todo: Todo) -> TodoItem {
    TodoItem {
        todo_id: todo.uuid.to_string(),
        text: todo.text,
        is_checked: todo.is_checked,
    }
}

fn to_signature_item(signature: Signature) -> SignatureItem {
    SignatureItem {
        signature_id: signature.uuid.to_string(),
        employee: signature.employee,
        signed_at_epoch_ms: signature.signed_at.timestamp_millis(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, dispensary_add_favorite, dispensary_dispense, dispensary_items,
        drug_create, init_logging, ping, signature_create, signatures_list, todo_create,
        todo_delete, todo_list, todo_toggle,
    };
    use drugstore_core::db::open_db;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn created_drug_is_listed_and_filterable() {
        let token = unique_token("Asp");
        let created = drug_create(format!("{token} Cardio"), "mg".into(), "oral".into(), 10.0);
        assert!(created.ok, "{}", created.message);
        let drug_id = created.id.expect("created drug should return id");

        let oral = dispensary_items(false, vec!["oral".into(), "oral".into()], token.clone());
        assert!(oral.ok, "{}", oral.message);
        assert_eq!(oral.items.len(), 1);
        assert_eq!(oral.items[0].drug_id, drug_id);
        assert_eq!(oral.items[0].form, "oral");

        let injection = dispensary_items(false, vec!["injection".into()], token.to_lowercase());
        assert!(injection.ok);
        assert!(injection.items.is_empty());

        let favorites = dispensary_items(true, Vec::new(), token.clone());
        assert!(favorites.items.is_empty());
        assert!(dispensary_add_favorite(drug_id.clone()).ok);
        let favorites = dispensary_items(true, Vec::new(), token);
        assert_eq!(favorites.items.len(), 1);
        assert!(favorites.items[0].is_favorite);
    }

    #[test]
    fn unknown_form_label_fails_the_query() {
        let response = dispensary_items(false, vec!["suppository".into()], String::new());
        assert!(!response.ok);
        assert!(response.message.contains("suppository"));
    }

    #[test]
    fn dispense_deducts_stock_and_rejects_bad_input() {
        let token = unique_token("Morphin");
        let created = drug_create(token.clone(), "mg".into(), "injection".into(), 10.0);
        let drug_id = created.id.expect("created drug should return id");

        let response =
            dispensary_dispense(drug_id.clone(), "A".into(), "Zimmer 3".into(), "2,5".into());
        assert!(response.ok, "{}", response.message);

        let conn = open_db(super::resolve_db_path()).expect("open db");
        let stock: f64 = conn
            .query_row(
                "SELECT stock_amount FROM drugs WHERE uuid = ?1",
                [drug_id.as_str()],
                |row| row.get(0),
            )
            .expect("query stock");
        assert_eq!(stock, 7.5);

        let bad = dispensary_dispense(drug_id, "A".into(), "P".into(), "viel".into());
        assert!(!bad.ok);
        assert!(bad.message.contains("invalid dosage"));

        let bad_id = dispensary_dispense("nope".into(), "A".into(), "P".into(), "1".into());
        assert!(!bad_id.ok);
    }

    #[test]
    fn todo_lifecycle_through_ffi() {
        let text = unique_token("todo");
        let created = todo_create(text.clone());
        assert!(created.ok, "{}", created.message);
        let todo_id = created.id.expect("todo id");

        let toggled = todo_toggle(todo_id.clone());
        assert!(toggled.ok);
        let listed = todo_list();
        assert!(listed
            .items
            .iter()
            .any(|item| item.todo_id == todo_id && item.is_checked && item.text == text));

        assert!(todo_delete(todo_id.clone()).ok);
        assert!(!todo_list().items.iter().any(|item| item.todo_id == todo_id));
        assert!(!todo_delete(todo_id).ok);
    }

    #[test]
    fn signature_is_listed_after_creation() {
        let employee = unique_token("employee");
        let created = signature_create(employee.clone());
        assert!(created.ok, "{}", created.message);
        let listed = signatures_list();
        assert!(listed.ok);
        assert!(listed.items.iter().any(|item| item.employee == employee));

        assert!(!signature_create("  ".into()).ok);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}{nanos}")
    }
}
