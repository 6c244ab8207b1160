//! Integration tests for the rowbind-sqlite crate.

use rowbind_core::{
    Column, Delete, ForeignKey, PrimaryKey, Registry, SchemaError, Select, Set, Table, Update,
    Where, field,
};
use rowbind_sqlite::{Database, DatabaseConfig, DbError};

#[derive(Debug, Default, Clone, PartialEq)]
struct TestU {
    j: PrimaryKey,
    teddy: f64,
    i_teddy: i32,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct TestV {
    i: PrimaryKey,
    s: String,
    b: Vec<u8>,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct TestT {
    i: PrimaryKey,
    d: ForeignKey,
    v: ForeignKey,
    s: String,
}

/// The three-table schema used throughout: T references both U and V.
fn scenario_registry() -> Registry {
    Registry::builder()
        .table(
            Table::<TestU>::new("TestU")
                .column(Column::new("j", field!(TestU, j)).primary_key().auto_increment())
                .column(Column::new("teddy", field!(TestU, teddy)))
                .column(Column::new("iTeddy", field!(TestU, i_teddy))),
        )
        .table(
            Table::<TestV>::new("TestV")
                .column(Column::new("i", field!(TestV, i)).primary_key().auto_increment())
                .column(Column::new("s", field!(TestV, s)))
                .column(Column::new("b", field!(TestV, b))),
        )
        .table(
            Table::<TestT>::new("TestT")
                .column(Column::new("i", field!(TestT, i)).primary_key().auto_increment())
                .column(Column::new("d", field!(TestT, d)))
                .column(Column::new("v", field!(TestT, v)))
                .column(Column::new("s", field!(TestT, s)))
                .foreign_key(field!(TestT, d), field!(TestU, j))
                .foreign_key(field!(TestT, v), field!(TestV, i)),
        )
        .build()
        .unwrap()
}

fn memory_db() -> Database {
    Database::open(":memory:", scenario_registry()).unwrap()
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Person {
    id: PrimaryKey,
    name: String,
    age: i64,
    nickname: Option<String>,
}

fn person_registry(with_age: bool) -> Registry {
    let mut table = Table::<Person>::new("people")
        .column(Column::new("id", field!(Person, id)).primary_key().auto_increment())
        .column(Column::new("name", field!(Person, name)).not_null().default_value(String::new()))
        .column(Column::new("nickname", field!(Person, nickname)));
    if with_age {
        table = table.column(Column::new("age", field!(Person, age)).default_value(18i64));
    }
    Registry::builder().table(table).build().unwrap()
}

fn person(name: &str, age: i64) -> Person {
    Person {
        name: name.to_string(),
        age,
        ..Default::default()
    }
}

// ============================================================================
// Scenario
// ============================================================================

#[test]
fn test_concrete_scenario() {
    let db = memory_db();

    let v = TestV {
        s: String::new(),
        b: b"abc".to_vec(),
        ..Default::default()
    };
    assert_eq!(db.insert(&v).unwrap(), PrimaryKey(1));

    let t = TestT {
        s: "Test".to_string(),
        ..Default::default()
    };
    assert_eq!(db.insert(&t).unwrap(), PrimaryKey(1));

    let changed = db
        .update_all(Update::new(field!(TestT, d).assign(PrimaryKey(1))))
        .unwrap();
    assert_eq!(changed, 1);

    let fetched = db.get::<TestV>(PrimaryKey(1)).unwrap().unwrap();
    assert_eq!(fetched.i, PrimaryKey(1));
    assert_eq!(fetched.b, b"abc".to_vec());

    let stored = db.get::<TestT>(PrimaryKey(1)).unwrap().unwrap();
    assert_eq!(stored.d, ForeignKey(1));
    assert_eq!(stored.v, ForeignKey(0));
}

#[test]
fn test_scenario_tables_created_in_registration_order() {
    let db = memory_db();
    assert_eq!(
        db.migration_report().tables_created,
        vec!["TestU".to_string(), "TestV".to_string(), "TestT".to_string()]
    );
    assert_eq!(db.table_name::<TestU>().unwrap(), "TestU");
    assert_eq!(db.column_name(field!(TestU, i_teddy)).unwrap(), "iTeddy");

    let info = db.table_info::<TestT>().unwrap();
    let names: Vec<_> = info.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["i", "d", "v", "s"]);
    assert!(info[0].primary_key);
}

// ============================================================================
// Round trip and field order
// ============================================================================

#[test]
fn test_round_trip_preserves_non_key_fields() {
    let db = memory_db();
    let u = TestU {
        teddy: 2.5,
        i_teddy: -7,
        ..Default::default()
    };
    let key = db.insert(&u).unwrap();
    let back = db.get::<TestU>(key).unwrap().unwrap();
    assert_eq!(back, TestU { j: key, ..u });
}

#[test]
fn test_fields_read_back_in_declared_order() {
    let db = memory_db();
    let key = db
        .insert(&TestT {
            s: "Test".to_string(),
            ..Default::default()
        })
        .unwrap();
    let back = db.get::<TestT>(key).unwrap().unwrap();
    assert_eq!(back.s, "Test");
    assert_eq!(back.d, ForeignKey(0));
    assert_eq!(back.v, ForeignKey(0));
}

#[test]
fn test_text_with_quotes_and_empty_blob_round_trip() {
    let db = memory_db();
    let v = TestV {
        s: "it's \"quoted\"; DROP TABLE TestV".to_string(),
        b: Vec::new(),
        ..Default::default()
    };
    let key = db.insert(&v).unwrap();
    let back = db.get::<TestV>(key).unwrap().unwrap();
    assert_eq!(back.s, v.s);
    assert!(back.b.is_empty());
}

#[test]
fn test_optional_field_round_trip() {
    let db = Database::open(":memory:", person_registry(true)).unwrap();
    let mut p = person("ada", 36);
    p.nickname = Some("countess".to_string());
    let with = db.insert(&p).unwrap();
    let without = db.insert(&person("alan", 41)).unwrap();

    assert_eq!(
        db.get::<Person>(with).unwrap().unwrap().nickname.as_deref(),
        Some("countess")
    );
    assert_eq!(db.get::<Person>(without).unwrap().unwrap().nickname, None);
}

// ============================================================================
// Schema migration
// ============================================================================

#[test]
fn test_reopen_identical_schema_issues_no_alter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.db");

    let first = Database::open(&path, scenario_registry()).unwrap();
    assert_eq!(first.migration_report().tables_created.len(), 3);
    first.close().unwrap();

    let second = Database::open(&path, scenario_registry()).unwrap();
    let report = second.migration_report();
    assert!(report.is_unchanged());
    assert_eq!(report.alter_count(), 0);
    assert!(report.conflicts.is_empty());
}

#[test]
fn test_added_column_migrates_and_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.db");

    let old = Database::open(&path, person_registry(false)).unwrap();
    let ada = old.insert(&person("ada", 0)).unwrap();
    let alan = old.insert(&person("alan", 0)).unwrap();
    old.close().unwrap();

    let new = Database::open(&path, person_registry(true)).unwrap();
    let report = new.migration_report();
    assert_eq!(report.alter_count(), 1);
    assert_eq!(report.columns_added[0].table, "people");
    assert_eq!(report.columns_added[0].column.name, "age");

    let rows = new.get_all(Select::<Person>::new()).unwrap();
    assert_eq!(rows.len(), 2);
    let ada_row = new.get::<Person>(ada).unwrap().unwrap();
    assert_eq!(ada_row.name, "ada");
    assert_eq!(ada_row.age, 18);
    assert_eq!(new.get::<Person>(alan).unwrap().unwrap().name, "alan");

    assert!(new.update_schema().unwrap().is_unchanged());
}

#[test]
fn test_conflicting_live_column_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conflict.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"CREATE TABLE "people" ("id" INTEGER PRIMARY KEY AUTOINCREMENT, "name" TEXT NOT NULL DEFAULT '', "nickname" BLOB);"#,
        )
        .unwrap();
    }

    let db = Database::open(&path, person_registry(false)).unwrap();
    let report = db.migration_report();
    assert_eq!(report.alter_count(), 0);
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].conflict.declared.name, "nickname");
    assert_eq!(db.table_info::<Person>().unwrap()[2].sql_type, "BLOB");
}

#[test]
fn test_failed_migration_aborts_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("strict.db");
    let db = Database::open(&path, person_registry(false)).unwrap();
    let ada = db.insert(&person("ada", 0)).unwrap();
    db.close().unwrap();

    let strict = Registry::builder()
        .table(
            Table::<Person>::new("people")
                .column(Column::new("id", field!(Person, id)).primary_key().auto_increment())
                .column(Column::new("name", field!(Person, name)).not_null().default_value(String::new()))
                .column(Column::new("nickname", field!(Person, nickname)))
                .column(Column::new("age", field!(Person, age)).not_null()),
        )
        .build()
        .unwrap();

    let result = Database::open(&path, strict);
    assert!(matches!(result, Err(DbError::Migration { ref table, .. }) if table == "people"));

    let db = Database::open(&path, person_registry(false)).unwrap();
    assert!(db.migration_report().is_unchanged());
    assert_eq!(db.get::<Person>(ada).unwrap().unwrap().name, "ada");
}

// ============================================================================
// Predicates and bulk operations
// ============================================================================

fn seeded_people() -> Database {
    let db = Database::open(":memory:", person_registry(true)).unwrap();
    for (name, age) in [("ada", 36), ("alan", 41), ("grace", 85), ("linus", 21)] {
        db.insert(&person(name, age)).unwrap();
    }
    db
}

fn names(rows: &[Person]) -> Vec<&str> {
    let mut names: Vec<_> = rows.iter().map(|p| p.name.as_str()).collect();
    names.sort_unstable();
    names
}

#[test]
fn test_equality_filter_matches_only_equal_rows() {
    let db = seeded_people();
    let rows = db
        .get_all(Select::new().filter(field!(Person, name).eq("grace")))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].age, 85);
}

#[test]
fn test_get_all_without_filter_returns_every_row() {
    let db = seeded_people();
    assert_eq!(db.get_all(Select::<Person>::new()).unwrap().len(), 4);
}

#[test]
fn test_range_not_and_or_filters() {
    let db = seeded_people();
    let age = field!(Person, age);
    let name = field!(Person, name);

    let over_40 = db.get_all(Select::new().filter(age.gt(40i64))).unwrap();
    assert_eq!(names(&over_40), ["alan", "grace"]);

    let not_ada = db.get_all(Select::new().filter(!name.eq("ada"))).unwrap();
    assert_eq!(not_ada.len(), 3);

    let either = db
        .get_all(Select::new().filter(name.eq("ada").or(name.eq("linus"))))
        .unwrap();
    assert_eq!(names(&either), ["ada", "linus"]);

    // AND binds tighter: ada OR (age >= 40 AND age < 50)
    let mixed = db
        .get_all(Select::new().filter(name.eq("ada").or(age.ge(40i64)).and(age.lt(50i64))))
        .unwrap();
    assert_eq!(names(&mixed), ["ada", "alan"]);

    let conjoined = db
        .get_all(Select::new().filter(Where::new(age.ge(30i64)).and(age.le(41i64))))
        .unwrap();
    assert_eq!(names(&conjoined), ["ada", "alan"]);

    let grouped = db
        .get_all(
            Select::new().filter(Where::new(name.eq("ada").or(age.ge(40i64))).and(age.lt(50i64))),
        )
        .unwrap();
    assert_eq!(names(&grouped), ["ada", "alan"]);
}

#[test]
fn test_update_all_and_remove_all_report_counts() {
    let db = seeded_people();
    let age = field!(Person, age);

    let updated = db
        .update_all(
            Update::new(Set::new([age.assign(100i64), field!(Person, nickname).assign(Some("old".to_string()))]))
                .filter(age.gt(40i64)),
        )
        .unwrap();
    assert_eq!(updated, 2);
    let old = db.get_all(Select::new().filter(age.eq(100i64))).unwrap();
    assert!(old.iter().all(|p| p.nickname.as_deref() == Some("old")));

    let removed = db.remove_all(Delete::new().filter(age.eq(100i64))).unwrap();
    assert_eq!(removed, 2);
    assert_eq!(db.remove_all(Delete::<Person>::new()).unwrap(), 2);
    assert!(db.get_all(Select::<Person>::new()).unwrap().is_empty());
}

#[test]
fn test_update_writes_record_fields() {
    let db = seeded_people();
    let key = db.insert(&person("barbara", 30)).unwrap();
    let mut record = db.get::<Person>(key).unwrap().unwrap();
    record.age = 31;
    record.nickname = Some("babs".to_string());
    assert_eq!(db.update(&record).unwrap(), 1);
    assert_eq!(db.get::<Person>(key).unwrap().unwrap(), record);

    let ghost = Person {
        id: PrimaryKey(999),
        ..person("nobody", 1)
    };
    assert_eq!(db.update(&ghost).unwrap(), 0);
}

#[test]
fn test_remove_then_get_is_absent() {
    let db = seeded_people();
    let key = db.insert(&person("ken", 80)).unwrap();
    let record = db.get::<Person>(key).unwrap().unwrap();
    assert_eq!(db.remove(&record).unwrap(), 1);
    assert!(db.get::<Person>(key).unwrap().is_none());
    assert_eq!(db.remove(&record).unwrap(), 0);
}

// ============================================================================
// Foreign keys
// ============================================================================

#[test]
fn test_foreign_key_value_resolves_referenced_record() {
    let db = memory_db();
    let u = db
        .insert(&TestU {
            teddy: 1.0,
            i_teddy: 1,
            ..Default::default()
        })
        .unwrap();
    let v = db.insert(&TestV::default()).unwrap();
    let t = db
        .insert(&TestT {
            d: u.into(),
            v: v.into(),
            s: "linked".to_string(),
            ..Default::default()
        })
        .unwrap();

    let stored = db.get::<TestT>(t).unwrap().unwrap();
    let referenced = db.get::<TestU>(stored.d).unwrap().unwrap();
    assert_eq!(referenced.j, PrimaryKey::from(stored.d));
    assert_eq!(db.get::<TestV>(stored.v).unwrap().unwrap().i, v);

    let by_owner = db
        .get_all(Select::new().filter(field!(TestT, d).eq(u)))
        .unwrap();
    assert_eq!(by_owner.len(), 1);
}

#[test]
fn test_enforced_foreign_keys_reject_dangling_reference() {
    let config = DatabaseConfig::new(":memory:").with_foreign_keys(true);
    let db = Database::open_with(config, scenario_registry()).unwrap();
    let err = db
        .insert(&TestT {
            s: "orphan".to_string(),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, DbError::Engine(_)));
    assert_eq!(err.sqlite_code(), Some(787));

    // The instance stays usable after a failed statement.
    let u = db.insert(&TestU::default()).unwrap();
    let v = db.insert(&TestV::default()).unwrap();
    assert!(
        db.insert(&TestT {
            d: u.into(),
            v: v.into(),
            ..Default::default()
        })
        .is_ok()
    );
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Default)]
struct Unmapped {
    id: PrimaryKey,
}

#[derive(Debug, Default)]
struct Partial {
    id: PrimaryKey,
    kept: String,
    scratch: i32,
}

#[test]
fn test_unregistered_record_type_is_schema_error() {
    let db = memory_db();
    let err = db.insert(&Unmapped::default()).unwrap_err();
    assert!(matches!(err, DbError::Schema(SchemaError::UnregisteredType(_))));
    assert!(db.get::<Unmapped>(PrimaryKey(1)).is_err());
    assert!(db.table_name::<Unmapped>().is_err());
}

#[test]
fn test_filter_on_unmapped_field_fails_fast() {
    let registry = Registry::builder()
        .table(
            Table::<Partial>::new("partial")
                .column(Column::new("id", field!(Partial, id)).primary_key().auto_increment())
                .column(Column::new("kept", field!(Partial, kept))),
        )
        .build()
        .unwrap();
    let db = Database::open(":memory:", registry).unwrap();
    db.insert(&Partial {
        kept: "x".into(),
        scratch: 5,
        ..Default::default()
    })
    .unwrap();

    let err = db
        .get_all(Select::new().filter(field!(Partial, scratch).eq(5)))
        .unwrap_err();
    assert!(matches!(err, DbError::Schema(SchemaError::UnknownField { .. })));
    assert!(db.column_name(field!(Partial, scratch)).is_err());

    let back = db.get::<Partial>(PrimaryKey(1)).unwrap().unwrap();
    assert_eq!(back.kept, "x");
    assert_eq!(back.scratch, 0);
}

#[test]
fn test_get_missing_key_is_none() {
    let db = memory_db();
    assert!(db.get::<TestV>(PrimaryKey(42)).unwrap().is_none());
}

#[test]
fn test_open_in_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no/such/dir/db.sqlite");
    let err = Database::open(&path, scenario_registry()).unwrap_err();
    match err {
        DbError::Open { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_open_from_yaml_config() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("configured.db");
    let yaml_path = dir.path().join("db.yaml");
    DatabaseConfig::new(&db_path)
        .with_foreign_keys(true)
        .to_file(&yaml_path)
        .unwrap();

    let config = DatabaseConfig::from_file(&yaml_path).unwrap();
    let db = Database::open_with(config, scenario_registry()).unwrap();
    assert!(db.insert(&TestT::default()).is_err());
    db.close().unwrap();
    assert!(db_path.exists());
}
