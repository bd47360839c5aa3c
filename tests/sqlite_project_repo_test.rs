// ==========================================
// SqliteProjectRepository 集成测试
// ==========================================
// 测试目标: 快照存取、整体替换、删除、用户范围过滤、订阅推送
// ==========================================

mod helpers;

use std::sync::{Arc, Mutex};

use futures::StreamExt;
use helpers::{create_test_db, test_project};
use rusqlite::{params, Connection};
use transformer_test_sheet::db::open_sqlite_connection;
use transformer_test_sheet::domain::{RowId, TapRowData, TapRowId, TgDeltaRow, TgMode};
use transformer_test_sheet::repository::{
    ProjectRepository, RepositoryError, SqliteProjectRepository,
};

fn shared_repo(db_path: &str) -> (Arc<Mutex<Connection>>, SqliteProjectRepository) {
    let conn = Arc::new(Mutex::new(
        open_sqlite_connection(db_path).expect("Failed to open db"),
    ));
    let repo = SqliteProjectRepository::from_connection(conn.clone())
        .expect("Failed to create repository");
    (conn, repo)
}

#[tokio::test]
async fn test_put_and_get_roundtrip() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqliteProjectRepository::new(&db_path).expect("Failed to create repository");

    let mut project = test_project("P1", "alice");
    project.header_info.serial_number = "T-1".to_string();
    project.data.insert(
        TapRowId::for_position(-2),
        TapRowData {
            phase_a: "1,5".to_string(),
            ..TapRowData::default()
        },
    );
    let mut row = TgDeltaRow::empty(RowId::from("r1"));
    row.mode = TgMode::GstGround;
    project.tg_delta_data.push(row);

    repo.put(&project).await.unwrap();
    let loaded = repo.get("P1").await.unwrap().expect("project should exist");

    assert_eq!(loaded, project);
    assert_eq!(loaded.tg_delta_data[0].mode, TgMode::GstGround);
    assert!(repo.get("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_put_replaces_whole_snapshot() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqliteProjectRepository::new(&db_path).expect("Failed to create repository");

    let mut project = test_project("P1", "alice");
    project.tg_delta_data.push(TgDeltaRow::empty(RowId::from("r1")));
    repo.put(&project).await.unwrap();

    project.tg_delta_data.clear();
    project.header_info.client = "ACME".to_string();
    repo.put(&project).await.unwrap();

    let loaded = repo.get("P1").await.unwrap().unwrap();
    assert!(loaded.tg_delta_data.is_empty());
    assert_eq!(loaded.header_info.client, "ACME");
    assert_eq!(repo.list_by_owner("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqliteProjectRepository::new(&db_path).expect("Failed to create repository");

    repo.put(&test_project("P1", "alice")).await.unwrap();

    assert!(repo.delete("P1").await.unwrap());
    assert!(!repo.delete("P1").await.unwrap());
    assert!(repo.get("P1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_by_owner_filters_scope() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqliteProjectRepository::new(&db_path).expect("Failed to create repository");

    repo.put(&test_project("A1", "alice")).await.unwrap();
    repo.put(&test_project("A2", "alice")).await.unwrap();
    repo.put(&test_project("B1", "bob")).await.unwrap();

    let alice = repo.list_by_owner("alice").await.unwrap();
    let mut ids: Vec<&str> = alice.iter().map(|p| p.id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["A1", "A2"]);
    assert_eq!(repo.list_by_owner("bob").await.unwrap().len(), 1);
    assert!(repo.list_by_owner("carol").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_corrupt_snapshot_is_skipped_in_listing() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (conn, repo) = shared_repo(&db_path);

    repo.put(&test_project("GOOD", "alice")).await.unwrap();
    {
        let conn = conn.lock().unwrap();
        conn.execute(
            "INSERT INTO project (project_id, owner_id, last_modified, snapshot_json) VALUES (?1, ?2, ?3, ?4)",
            params!["BAD", "alice", "2024-01-01T00:00:00Z", "{not json"],
        )
        .unwrap();
    }

    let listed = repo.list_by_owner("alice").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "GOOD");

    let result = repo.get("BAD").await;
    assert!(matches!(result, Err(RepositoryError::CorruptSnapshot { .. })));
}

#[tokio::test]
async fn test_subscribe_emits_initial_and_changed_lists() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqliteProjectRepository::new(&db_path).expect("Failed to create repository");
    repo.put(&test_project("A1", "alice")).await.unwrap();

    let mut stream = repo.subscribe("alice");
    let initial = stream.next().await.unwrap().unwrap();
    assert_eq!(initial.len(), 1);

    // 其他用户范围的变更不推送
    repo.put(&test_project("B1", "bob")).await.unwrap();
    repo.put(&test_project("A2", "alice")).await.unwrap();
    let after_put = stream.next().await.unwrap().unwrap();
    assert_eq!(after_put.len(), 2);
    assert!(after_put.iter().all(|p| p.owner_id == "alice"));

    repo.delete("A1").await.unwrap();
    let after_delete = stream.next().await.unwrap().unwrap();
    assert_eq!(after_delete.len(), 1);
    assert_eq!(after_delete[0].id, "A2");
}
