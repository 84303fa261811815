// src/store/sqlite_store.rs
//
// DocumentStore over the local `documents` table.
//
// RULES:
// - Bodies are JSON objects; predicates compile to json_extract / json_each
// - Type guards keep SQL comparisons in line with the in-memory semantics
// - Predicates that cannot be compiled are applied in Rust after the query
// - All blocking database work runs on the blocking pool

use async_trait::async_trait;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::Value;
use std::sync::Arc;

use crate::db::{get_connection, initialize_database, ConnectionPool};
use crate::error::{AppError, AppResult};
use crate::store::document::{
    apply_updates, merge_fields, preserved_created_at, server_timestamp, stamp_timestamps,
    FieldUpdate, Fields, Predicate, RawDocument, StoreQuery,
};
use crate::store::DocumentStore;

/// Sort rank by JSON type: missing/null, bool, number, text, array, object
const TYPE_RANK: &str = "CASE COALESCE(json_type(body, ?), 'null') \
     WHEN 'null' THEN 0 WHEN 'true' THEN 1 WHEN 'false' THEN 1 \
     WHEN 'integer' THEN 2 WHEN 'real' THEN 2 WHEN 'text' THEN 3 \
     WHEN 'array' THEN 4 ELSE 5 END";

pub struct SqliteDocumentStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteDocumentStore {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Initializes the schema, then wraps the pool
    pub fn open(pool: Arc<ConnectionPool>) -> AppResult<Self> {
        {
            let conn = get_connection(&pool)?;
            initialize_database(&conn)?;
        }
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn list_records(&self, query: &StoreQuery) -> AppResult<Vec<RawDocument>> {
        let pool = Arc::clone(&self.pool);
        let query = query.clone();
        tokio::task::spawn_blocking(move || list_blocking(&pool, &query)).await?
    }

    async fn get_document(&self, collection: &str, id: &str) -> AppResult<Option<RawDocument>> {
        let pool = Arc::clone(&self.pool);
        let (collection, id) = (collection.to_string(), id.to_string());
        tokio::task::spawn_blocking(move || -> AppResult<Option<RawDocument>> {
            let conn = get_connection(&pool)?;
            let body = load_body(&conn, &collection, &id)?;
            Ok(body.map(|fields| RawDocument::new(id, fields)))
        })
        .await?
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        merge: bool,
    ) -> AppResult<()> {
        let pool = Arc::clone(&self.pool);
        let (collection, id) = (collection.to_string(), id.to_string());
        tokio::task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = get_connection(&pool)?;
            let tx = conn.transaction()?;

            let existing = load_body(&tx, &collection, &id)?;
            let now = server_timestamp();
            let created_at = preserved_created_at(existing.as_ref(), &now);

            let mut body = match existing {
                Some(doc) if merge => doc,
                _ => Fields::new(),
            };
            merge_fields(&mut body, fields);
            stamp_timestamps(&mut body, &created_at, &now);

            write_body(&tx, &collection, &id, &body, &created_at, &now)?;
            tx.commit()?;
            Ok(())
        })
        .await?
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        updates: Vec<FieldUpdate>,
    ) -> AppResult<()> {
        let pool = Arc::clone(&self.pool);
        let (collection, id) = (collection.to_string(), id.to_string());
        tokio::task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = get_connection(&pool)?;
            let tx = conn.transaction()?;

            let mut body = load_body(&tx, &collection, &id)?.ok_or(AppError::NotFound)?;
            let now = server_timestamp();
            let created_at = preserved_created_at(Some(&body), &now);

            apply_updates(&mut body, &updates);
            stamp_timestamps(&mut body, &created_at, &now);

            write_body(&tx, &collection, &id, &body, &created_at, &now)?;
            tx.commit()?;
            Ok(())
        })
        .await?
    }

    async fn upsert_fields(
        &self,
        collection: &str,
        id: &str,
        updates: Vec<FieldUpdate>,
    ) -> AppResult<()> {
        let pool = Arc::clone(&self.pool);
        let (collection, id) = (collection.to_string(), id.to_string());
        tokio::task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = get_connection(&pool)?;
            let tx = conn.transaction()?;

            let existing = load_body(&tx, &collection, &id)?;
            let now = server_timestamp();
            let created_at = preserved_created_at(existing.as_ref(), &now);

            let mut body = existing.unwrap_or_default();
            apply_updates(&mut body, &updates);
            stamp_timestamps(&mut body, &created_at, &now);

            write_body(&tx, &collection, &id, &body, &created_at, &now)?;
            tx.commit()?;
            Ok(())
        })
        .await?
    }
}

// ============================================================================
// BLOCKING HELPERS
// ============================================================================

fn load_body(conn: &Connection, collection: &str, id: &str) -> AppResult<Option<Fields>> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
            |row| row.get(0),
        )
        .optional()?;

    match body {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

fn write_body(
    conn: &Connection,
    collection: &str,
    id: &str,
    body: &Fields,
    created_at: &str,
    updated_at: &str,
) -> AppResult<()> {
    let text = serde_json::to_string(body)?;
    conn.execute(
        "INSERT OR REPLACE INTO documents (collection, id, body, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![collection, id, text, created_at, updated_at],
    )?;
    Ok(())
}

fn list_blocking(pool: &ConnectionPool, query: &StoreQuery) -> AppResult<Vec<RawDocument>> {
    let mut sql = String::from("SELECT id, body FROM documents WHERE collection = ?");
    let mut values = vec![SqlValue::Text(query.collection.clone())];
    let mut residual: Vec<&Predicate> = Vec::new();

    for predicate in &query.predicates {
        match compile_predicate(predicate) {
            Some((clause, params)) => {
                sql.push_str(" AND (");
                sql.push_str(&clause);
                sql.push(')');
                values.extend(params);
            }
            None => residual.push(predicate),
        }
    }

    match &query.order_by {
        Some(order) => {
            let direction = if order.descending { "DESC" } else { "ASC" };
            let path = json_path(&order.field);
            sql.push_str(&format!(
                " ORDER BY {} {dir}, json_extract(body, ?) {dir}, id ASC",
                TYPE_RANK,
                dir = direction
            ));
            values.push(SqlValue::Text(path.clone()));
            values.push(SqlValue::Text(path));
        }
        None => sql.push_str(" ORDER BY id ASC"),
    }

    // A SQL LIMIT would cut rows before the residual filter runs
    if residual.is_empty() {
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            values.push(SqlValue::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        }
    }

    let conn = get_connection(pool)?;
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut documents = Vec::new();
    for row in rows {
        let (id, body) = row?;
        let fields: Fields = serde_json::from_str(&body)?;
        if residual.iter().all(|p| p.matches(&fields)) {
            documents.push(RawDocument::new(id, fields));
        }
    }

    if let Some(limit) = query.limit {
        documents.truncate(limit);
    }

    log::debug!(
        "{} documents from '{}' ({} residual predicates)",
        documents.len(),
        query.collection,
        residual.len()
    );
    Ok(documents)
}

// ============================================================================
// PREDICATE COMPILATION
// ============================================================================

type Clause = (String, Vec<SqlValue>);

fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field.replace('"', ""))
}

/// `None` means the predicate has to be evaluated in Rust
fn compile_predicate(predicate: &Predicate) -> Option<Clause> {
    let path = json_path(predicate.field());
    match predicate {
        Predicate::Equals { value, .. } => compile_equals(path, value),
        Predicate::ArrayContainsAny { values, .. } => compile_contains_any(path, values),
        Predicate::GreaterOrEqual { value, .. } => Some(compile_range(path, ">=", value)),
        Predicate::LessOrEqual { value, .. } => Some(compile_range(path, "<=", value)),
    }
}

fn compile_equals(path: String, value: &Value) -> Option<Clause> {
    match value {
        Value::Null => Some(("json_type(body, ?) = 'null'".into(), vec![SqlValue::Text(path)])),
        Value::Bool(flag) => Some((
            format!("json_type(body, ?) = '{}'", if *flag { "true" } else { "false" }),
            vec![SqlValue::Text(path)],
        )),
        Value::Number(number) => Some((
            "json_type(body, ?) IN ('integer', 'real') AND json_extract(body, ?) = ?".into(),
            vec![
                SqlValue::Text(path.clone()),
                SqlValue::Text(path),
                SqlValue::Real(number.as_f64()?),
            ],
        )),
        Value::String(text) => Some((
            "json_type(body, ?) = 'text' AND json_extract(body, ?) = ?".into(),
            vec![
                SqlValue::Text(path.clone()),
                SqlValue::Text(path),
                SqlValue::Text(text.clone()),
            ],
        )),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn compile_contains_any(path: String, values: &[Value]) -> Option<Clause> {
    if values.is_empty() {
        return Some(("0".into(), Vec::new()));
    }

    let mut alternatives = Vec::with_capacity(values.len());
    let mut params = vec![SqlValue::Text(path.clone()), SqlValue::Text(path)];
    for value in values {
        let (clause, extra) = compile_element(value)?;
        alternatives.push(clause);
        params.extend(extra);
    }

    Some((
        format!(
            "json_type(body, ?) = 'array' AND EXISTS \
             (SELECT 1 FROM json_each(body, ?) AS el WHERE {})",
            alternatives.join(" OR ")
        ),
        params,
    ))
}

fn compile_element(value: &Value) -> Option<Clause> {
    match value {
        Value::Null => Some(("el.type = 'null'".into(), Vec::new())),
        Value::Bool(flag) => Some((
            format!("el.type = '{}'", if *flag { "true" } else { "false" }),
            Vec::new(),
        )),
        Value::Number(number) => Some((
            "(el.type IN ('integer', 'real') AND el.value = ?)".into(),
            vec![SqlValue::Real(number.as_f64()?)],
        )),
        Value::String(text) => Some((
            "(el.type = 'text' AND el.value = ?)".into(),
            vec![SqlValue::Text(text.clone())],
        )),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn compile_range(path: String, op: &str, bound: &Value) -> Clause {
    match bound {
        Value::Number(number) => match number.as_f64() {
            Some(bound) => (
                format!(
                    "json_type(body, ?) IN ('integer', 'real') AND json_extract(body, ?) {} ?",
                    op
                ),
                vec![
                    SqlValue::Text(path.clone()),
                    SqlValue::Text(path),
                    SqlValue::Real(bound),
                ],
            ),
            None => ("0".into(), Vec::new()),
        },
        Value::String(text) => (
            format!(
                "json_type(body, ?) = 'text' AND json_extract(body, ?) {} ?",
                op
            ),
            vec![
                SqlValue::Text(path.clone()),
                SqlValue::Text(path),
                SqlValue::Text(text.clone()),
            ],
        ),
        // Other bound types never compare
        _ => ("0".into(), Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use crate::db::{create_connection_pool, create_memory_pool};
    use serde_json::json;

    fn store() -> SqliteDocumentStore {
        let pool = create_memory_pool().unwrap();
        SqliteDocumentStore::open(Arc::new(pool)).unwrap()
    }

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    async fn seeded() -> SqliteDocumentStore {
        let store = store();
        let docs = [
            ("a", json!({ "title": "Your Name", "year": 2016, "type": "anime",
                          "genres": ["Romance", "Drama"], "rating": 8.4 })),
            ("b", json!({ "title": "Berserk", "year": 1989, "type": "manga",
                          "genres": ["Action", "Dark Fantasy"], "rating": 9.4 })),
            ("c", json!({ "title": "Stringly", "year": "2012", "type": "anime",
                          "genres": "Drama", "rating": "9.9" })),
        ];
        for (id, body) in docs {
            store.set_document("media", id, fields(body), false).await.unwrap();
        }
        store
    }

    fn ids(docs: &[RawDocument]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_set_and_get_stamps_timestamps() {
        let store = store();
        store
            .set_document(
                "media",
                "x",
                fields(json!({ "title": "X", "created_at": "bogus" })),
                false,
            )
            .await
            .unwrap();

        let doc = store.get_document("media", "x").await.unwrap().unwrap();
        let created = doc.get("created_at").and_then(Value::as_str).unwrap();
        assert_ne!(created, "bogus");
        assert!(created.ends_with('Z'));
        assert!(doc.get("updated_at").is_some());

        assert!(store.get_document("media", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_number_predicates_skip_mistyped_fields() {
        let store = seeded().await;

        let query = StoreQuery::collection("media").filter(Predicate::greater_or_equal("rating", 9.0));
        assert_eq!(ids(&store.list_records(&query).await.unwrap()), vec!["b"]);

        let query = StoreQuery::collection("media")
            .filter(Predicate::greater_or_equal("year", 2010))
            .filter(Predicate::less_or_equal("year", 2020));
        assert_eq!(ids(&store.list_records(&query).await.unwrap()), vec!["a"]);

        let query = StoreQuery::collection("media").filter(Predicate::equals("year", 2016.0));
        assert_eq!(ids(&store.list_records(&query).await.unwrap()), vec!["a"]);
    }

    #[tokio::test]
    async fn test_text_and_array_predicates() {
        let store = seeded().await;

        let query = StoreQuery::collection("media").filter(Predicate::equals("type", "anime"));
        assert_eq!(ids(&store.list_records(&query).await.unwrap()), vec!["a", "c"]);

        let query = StoreQuery::collection("media")
            .filter(Predicate::array_contains_any("genres", ["Drama", "Horror"]));
        assert_eq!(ids(&store.list_records(&query).await.unwrap()), vec!["a"]);

        let query = StoreQuery::collection("media")
            .filter(Predicate::array_contains_any("genres", Vec::<String>::new()));
        assert!(store.list_records(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_order_puts_missing_values_last_when_descending() {
        let store = seeded().await;
        store
            .set_document("media", "d", fields(json!({ "title": "Unrated" })), false)
            .await
            .unwrap();

        let query = StoreQuery::collection("media").order_by("rating", true);
        let docs = store.list_records(&query).await.unwrap();
        // text ranks above numbers, missing ranks lowest
        assert_eq!(ids(&docs), vec!["c", "b", "a", "d"]);

        let limited = store.list_records(&query.limit(2)).await.unwrap();
        assert_eq!(ids(&limited), vec!["c", "b"]);
    }

    #[tokio::test]
    async fn test_residual_predicate_is_applied_before_limit() {
        let store = seeded().await;
        let query = StoreQuery::collection("media")
            .filter(Predicate::equals("genres", json!(["Action", "Dark Fantasy"])))
            .limit(1);

        let docs = store.list_records(&query).await.unwrap();
        assert_eq!(ids(&docs), vec!["b"]);
    }

    #[tokio::test]
    async fn test_update_fields_and_not_found() {
        let store = store();
        store
            .set_document("user_lists", "l1", fields(json!({ "name": "Watching" })), true)
            .await
            .unwrap();
        let before = store.get_document("user_lists", "l1").await.unwrap().unwrap();

        store
            .update_fields(
                "user_lists",
                "l1",
                vec![FieldUpdate::array_union("media_items", vec![json!("a"), json!("a")])],
            )
            .await
            .unwrap();
        store
            .update_fields(
                "user_lists",
                "l1",
                vec![FieldUpdate::array_remove("media_items", vec![json!("zzz")])],
            )
            .await
            .unwrap();

        let after = store.get_document("user_lists", "l1").await.unwrap().unwrap();
        assert_eq!(after.get("media_items"), Some(&json!(["a"])));
        assert_eq!(after.get("created_at"), before.get("created_at"));

        let missing = store
            .update_fields("user_lists", "ghost", vec![FieldUpdate::set("name", "x")])
            .await;
        assert!(matches!(missing, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_upsert_fields_creates_missing_document() {
        let store = store();
        let header = |member: &str| {
            vec![
                FieldUpdate::set("name", "Watching"),
                FieldUpdate::set("user_id", "u1"),
                FieldUpdate::array_union("media_items", vec![json!(member)]),
            ]
        };

        store.upsert_fields("user_lists", "l1", header("a")).await.unwrap();
        store.upsert_fields("user_lists", "l1", header("a")).await.unwrap();
        store.upsert_fields("user_lists", "l1", header("b")).await.unwrap();

        let doc = store.get_document("user_lists", "l1").await.unwrap().unwrap();
        assert_eq!(doc.get("media_items"), Some(&json!(["a", "b"])));
        assert_eq!(doc.get("user_id"), Some(&json!("u1")));
        assert!(doc.get("created_at").is_some());
    }

    #[tokio::test]
    async fn test_file_store_persists_across_pools() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig::default().with_database_path(dir.path().join("kuro.db"));

        {
            let pool = create_connection_pool(&config).unwrap();
            let store = SqliteDocumentStore::open(Arc::new(pool)).unwrap();
            store
                .set_document("media", "kept", fields(json!({ "title": "Mushishi" })), false)
                .await
                .unwrap();
        }

        let pool = create_connection_pool(&config).unwrap();
        let store = SqliteDocumentStore::open(Arc::new(pool)).unwrap();
        let doc = store.get_document("media", "kept").await.unwrap().unwrap();
        assert_eq!(doc.get("title"), Some(&json!("Mushishi")));
    }
}
