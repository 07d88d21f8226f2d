//! Handle lifecycle: file-backed open, PRAGMAs, transactions, convenience
//! getters and object writes.

use rowcast_sqlite::{
    ColumnEncodable, ColumnType, FieldDescriptor, Handle, NativeStatement, RowDecoder,
    RowcastConfig, RowcastError, RowcastResult, TableDecodable, TableEncodable, TableRecord,
    Value,
};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq)]
struct Task {
    id: i64,
    title: String,
    done: bool,
}

impl TableRecord for Task {
    fn fields() -> &'static [FieldDescriptor] {
        const FIELDS: &[FieldDescriptor] = &[
            FieldDescriptor::new("id", ColumnType::Integer64),
            FieldDescriptor::new("title", ColumnType::Text),
            FieldDescriptor::new("done", ColumnType::Integer32),
        ];
        FIELDS
    }
}

impl TableDecodable for Task {
    fn decode<S: NativeStatement>(row: &RowDecoder<'_, S>) -> RowcastResult<Self> {
        Ok(Self {
            id: row.decode("id")?,
            title: row.decode("title")?,
            done: row.decode_if_present("done")?.unwrap_or(false),
        })
    }
}

impl TableEncodable for Task {
    fn encode_field(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.archived_value()),
            "title" => Some(self.title.archived_value()),
            "done" => Some(self.done.archived_value()),
            _ => None,
        }
    }
}

fn temp_handle() -> (TempDir, Handle) {
    let dir = TempDir::new().unwrap();
    let handle = Handle::open(dir.path().join("nested/dir/tasks.db"), &RowcastConfig::default())
        .unwrap();
    handle
        .exec("CREATE TABLE tasks(id INTEGER PRIMARY KEY, title TEXT NOT NULL, done INTEGER)")
        .unwrap();
    (dir, handle)
}

fn tasks(n: i64) -> Vec<Task> {
    (1..=n)
        .map(|id| Task {
            id,
            title: format!("task {id}"),
            done: id % 2 == 0,
        })
        .collect()
}

#[test]
fn open_creates_parent_dirs_and_applies_pragmas() {
    let (dir, handle) = temp_handle();
    assert!(dir.path().join("nested/dir/tasks.db").exists());
    assert_eq!(handle.path(), Some(dir.path().join("nested/dir/tasks.db").as_path()));

    let mode = handle.get_value("PRAGMA journal_mode", &[]).unwrap();
    assert_eq!(mode.string_value().to_lowercase(), "wal");
    let fk = handle.get_value("PRAGMA foreign_keys", &[]).unwrap();
    assert_eq!(fk.int32_value(), 1);
    let timeout = handle.get_value("PRAGMA busy_timeout", &[]).unwrap();
    assert_eq!(timeout.int64_value(), 5000);
    assert!(!handle.is_readonly().unwrap());
}

#[test]
fn config_from_toml_drives_pragmas() {
    let config = RowcastConfig::from_toml(
        r#"
        [connection]
        journal_mode = "delete"
        foreign_keys = false
        "#,
    )
    .unwrap();
    let dir = TempDir::new().unwrap();
    let handle = Handle::open(dir.path().join("cfg.db"), &config).unwrap();
    let mode = handle.get_value("PRAGMA journal_mode", &[]).unwrap();
    assert_eq!(mode.string_value(), "delete");
    let fk = handle.get_value("PRAGMA foreign_keys", &[]).unwrap();
    assert_eq!(fk.int32_value(), 0);
}

#[test]
fn invalid_config_is_rejected_before_open() {
    let mut config = RowcastConfig::default();
    config.connection.journal_mode = "FAST".to_string();
    assert!(matches!(
        Handle::open_in_memory(&config),
        Err(RowcastError::Config(_))
    ));
}

#[test]
fn insert_and_read_objects() {
    let (_dir, handle) = temp_handle();
    handle.insert_objects("tasks", &tasks(5), None).unwrap();
    assert_eq!(handle.last_inserted_row_id(), 5);

    let all: Vec<Task> = handle.get_objects("tasks", None, None, &[]).unwrap();
    assert_eq!(all, tasks(5));

    let done: Vec<Task> = handle
        .get_objects("tasks", None, Some("done = ?1 ORDER BY id DESC"), &[Value::from(true)])
        .unwrap();
    assert_eq!(done.iter().map(|t| t.id).collect::<Vec<_>>(), vec![4, 2]);

    let missing: Option<Task> = handle
        .get_object("tasks", None, Some("id = ?1"), &[Value::from(99_i64)])
        .unwrap();
    assert_eq!(missing, None);
}

#[test]
fn partial_field_selection() {
    let (_dir, handle) = temp_handle();
    handle
        .insert_objects("tasks", &tasks(2), Some(&["id", "title"]))
        .unwrap();
    let done = handle.get_one_column("SELECT done FROM tasks", &[]).unwrap();
    assert!(done.iter().all(Value::is_null));

    let first: Option<Task> = handle
        .get_object("tasks", Some(&["id", "title"]), None, &[])
        .unwrap();
    assert_eq!(first.map(|t| t.done), Some(false));
}

#[test]
fn failed_insert_rolls_back_whole_batch() {
    let (_dir, handle) = temp_handle();
    let mut batch = tasks(3);
    batch[2].id = 1;
    let err = handle.insert_objects("tasks", &batch, None).unwrap_err();
    assert!(matches!(err, RowcastError::Sqlite { code: 19, .. }));
    assert!(!handle.is_in_transaction());
    assert_eq!(
        handle.get_value("SELECT count(*) FROM tasks", &[]).unwrap(),
        Value::Integer64(0)
    );
}

#[test]
fn convenience_getters_shape_results() {
    let (_dir, handle) = temp_handle();
    handle.insert_objects("tasks", &tasks(3), None).unwrap();

    let row = handle
        .get_one_row("SELECT id, title FROM tasks WHERE id = ?1", &[Value::from(2_i64)])
        .unwrap();
    assert_eq!(row, vec![Value::Integer64(2), Value::from("task 2")]);

    let ids = handle.get_one_column("SELECT id FROM tasks ORDER BY id", &[]).unwrap();
    assert_eq!(ids.len(), 3);

    let rows = handle.get_rows("SELECT id, done FROM tasks", &[]).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.len() == 2));
}

#[test]
fn transaction_commits_on_ok() {
    let (_dir, handle) = temp_handle();
    let inserted = handle
        .run_transaction(|h| {
            h.exec("INSERT INTO tasks(title) VALUES ('a')")?;
            h.exec("INSERT INTO tasks(title) VALUES ('b')")?;
            Ok(h.changes())
        })
        .unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(
        handle
            .get_value("SELECT count(*) FROM tasks", &[])
            .unwrap()
            .int64_value(),
        2
    );
}

#[test]
fn explicit_begin_and_rollback() {
    let (_dir, handle) = temp_handle();
    handle.begin().unwrap();
    assert!(handle.is_in_transaction());
    handle.exec("INSERT INTO tasks(title) VALUES ('temp')").unwrap();
    handle.rollback().unwrap();
    assert!(!handle.is_in_transaction());
    assert!(handle.get_rows("SELECT * FROM tasks", &[]).unwrap().is_empty());
}

#[test]
fn misuse_is_reported_before_touching_the_engine() {
    let (_dir, handle) = temp_handle();
    assert!(matches!(
        handle.get_objects::<Task>("", None, None, &[]),
        Err(RowcastError::Misuse { .. })
    ));
    assert!(matches!(
        handle.get_objects::<Task>("tasks", Some(&[]), None, &[]),
        Err(RowcastError::Misuse { .. })
    ));
    assert!(matches!(
        handle.insert_objects("tasks", &tasks(1), Some(&["priority"])),
        Err(RowcastError::Misuse { .. })
    ));
    assert!(matches!(
        handle.get_value("", &[]),
        Err(RowcastError::Misuse { .. })
    ));
}

#[test]
fn insert_joins_callers_transaction() {
    let (_dir, handle) = temp_handle();
    handle
        .run_transaction(|h| {
            h.insert_objects("tasks", &tasks(2), None)?;
            assert!(h.is_in_transaction());
            h.insert_objects("tasks", &tasks(3)[2..], None)
        })
        .unwrap();
    assert_eq!(
        handle.get_value("SELECT count(*) FROM tasks", &[]).unwrap(),
        Value::Integer64(3)
    );

    handle.begin().unwrap();
    handle.insert_objects("tasks", &tasks(5)[3..], None).unwrap();
    handle.rollback().unwrap();
    assert_eq!(
        handle.get_value("SELECT count(*) FROM tasks", &[]).unwrap(),
        Value::Integer64(3)
    );
}

#[test]
fn insert_or_replace_overwrites_conflicting_rows() {
    let (_dir, handle) = temp_handle();
    handle.insert_objects("tasks", &tasks(2), None).unwrap();
    let renamed = Task {
        id: 2,
        title: "renamed".to_string(),
        done: false,
    };
    assert!(matches!(
        handle.insert_objects("tasks", std::slice::from_ref(&renamed), None),
        Err(RowcastError::Sqlite { code: 19, .. })
    ));
    handle
        .insert_or_replace_objects("tasks", std::slice::from_ref(&renamed), None)
        .unwrap();

    let all: Vec<Task> = handle.get_objects("tasks", None, None, &[]).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1], renamed);
}

#[test]
fn update_object_sets_selected_fields() {
    let (_dir, handle) = temp_handle();
    handle.insert_objects("tasks", &tasks(3), None).unwrap();
    let patch = Task {
        id: 0,
        title: "patched".to_string(),
        done: true,
    };
    handle
        .update_object(
            "tasks",
            &patch,
            Some(&["title", "done"]),
            Some("id >= ?"),
            &[Value::from(2_i64)],
        )
        .unwrap();
    assert_eq!(handle.changes(), 2);

    let all: Vec<Task> = handle.get_objects("tasks", None, Some("1 ORDER BY id"), &[]).unwrap();
    assert_eq!(all[0], tasks(1)[0]);
    assert!(all[1..].iter().all(|t| t.title == "patched" && t.done));
    assert_eq!(all[2].id, 3);

    assert!(matches!(
        handle.update_object("tasks", &patch, Some(&[]), None, &[]),
        Err(RowcastError::Misuse { .. })
    ));
    assert!(matches!(
        handle.update_object(" ", &patch, None, None, &[]),
        Err(RowcastError::Misuse { .. })
    ));
}

#[test]
fn delete_with_and_without_condition() {
    let (_dir, handle) = temp_handle();
    handle.insert_objects("tasks", &tasks(4), None).unwrap();

    handle
        .delete("tasks", Some("done = ?1"), &[Value::from(true)])
        .unwrap();
    assert_eq!(handle.changes(), 2);
    let ids = handle.get_one_column("SELECT id FROM tasks ORDER BY id", &[]).unwrap();
    assert_eq!(ids, vec![Value::Integer64(1), Value::Integer64(3)]);

    handle.delete("tasks", None, &[]).unwrap();
    assert!(handle.get_rows("SELECT * FROM tasks", &[]).unwrap().is_empty());
    assert!(matches!(
        handle.delete("", None, &[]),
        Err(RowcastError::Misuse { .. })
    ));
}

#[test]
fn get_object_accepts_condition_with_limit() {
    let (_dir, handle) = temp_handle();
    handle.insert_objects("tasks", &tasks(4), None).unwrap();
    let third: Option<Task> = handle
        .get_object("tasks", None, Some("1 ORDER BY id LIMIT 1 OFFSET 2"), &[])
        .unwrap();
    assert_eq!(third.map(|t| t.id), Some(3));

    let last: Option<Task> = handle
        .get_object("tasks", None, Some("id > ?1 ORDER BY id DESC LIMIT 2"), &[Value::from(1_i64)])
        .unwrap();
    assert_eq!(last.map(|t| t.id), Some(4));
}
