//! Repository Integration Tests
//!
//! Tests for SqliteGateway with an in-memory SQLite database.

#[cfg(test)]
mod tests {
    use crate::domain::{normalize, DomainError, RecordId};
    use crate::repository::{EntityKind, Gateway, RowKey, SqliteGateway};
    use serde_json::json;
    use tempfile::TempDir;

    fn setup_test_db() -> (SqliteGateway, TempDir) {
        let blobs = tempfile::tempdir().expect("Failed to create blob dir");
        let gateway = SqliteGateway::in_memory(blobs.path().to_path_buf()).expect("Failed to init test DB");
        (gateway, blobs)
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let (db, _blobs) = setup_test_db();

        let created = db
            .insert(EntityKind::Inventory, json!({"name": "Kaffe", "type": "count", "min": 0, "max": 20, "qty": 8}))
            .await
            .expect("Failed to insert");

        assert!(created["id"].as_i64().unwrap() > 0);
        assert_eq!(created["name"], "Kaffe");
        assert_eq!(created["qty"], 8);
    }

    #[tokio::test]
    async fn test_list_in_insertion_order() {
        let (db, _blobs) = setup_test_db();

        db.insert_many(
            EntityKind::Leaderboard,
            vec![json!({"name": "erlend", "score": 0}), json!({"name": "oscar_gay", "score": 2})],
        )
        .await
        .unwrap();

        let rows = db.list(EntityKind::Leaderboard).await.expect("List failed");
        let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["erlend", "oscar_gay"]);
    }

    #[tokio::test]
    async fn test_update_by_id_and_by_name() {
        let (db, _blobs) = setup_test_db();

        let item = db
            .insert(EntityKind::Inventory, json!({"name": "Vaskemiddel", "type": "percent", "min": 0, "max": 100, "qty": 80}))
            .await
            .unwrap();
        let id = RecordId(item["id"].as_i64().unwrap());

        let updated = db
            .update(EntityKind::Inventory, RowKey::Id(id), json!({"qty": 10}))
            .await
            .expect("Update failed")
            .expect("Row should match");
        assert_eq!(updated["qty"], 10);
        assert_eq!(updated["name"], "Vaskemiddel");

        db.insert(EntityKind::Leaderboard, json!({"name": "erlend", "score": 2})).await.unwrap();
        let member = db
            .update(EntityKind::Leaderboard, RowKey::Name("erlend".into()), json!({"score": 3}))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(member["score"], 3);
    }

    #[tokio::test]
    async fn test_update_without_match_returns_none() {
        let (db, _blobs) = setup_test_db();
        let updated = db
            .update(EntityKind::Leaderboard, RowKey::Name("nobody".into()), json!({"score": 1}))
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_delete_row() {
        let (db, _blobs) = setup_test_db();

        let event = db
            .insert(EntityKind::Events, json!({"date": "2026-10-19", "title": "Husmote", "note": ""}))
            .await
            .unwrap();
        db.delete(EntityKind::Events, RecordId(event["id"].as_i64().unwrap()))
            .await
            .expect("Delete failed");

        assert!(db.list(EntityKind::Events).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_proofs_get_timestamp() {
        let (db, _blobs) = setup_test_db();

        let proof = db
            .insert(EntityKind::Proofs, json!({"user_name": "erlend", "task": "Støvsuget", "photo_url": "file:///x.jpg"}))
            .await
            .unwrap();

        let parsed: Vec<crate::domain::ProofRecord> = normalize::parse_rows("proofs", vec![proof]);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].task, "Støvsuget");
    }

    #[tokio::test]
    async fn test_malformed_rows_survive_normalization() {
        let (db, _blobs) = setup_test_db();

        db.insert(EntityKind::Inventory, json!({"name": "Rart", "type": "weird", "qty": "lots"}))
            .await
            .unwrap();

        let items = normalize::normalize_inventory(&db.list(EntityKind::Inventory).await.unwrap());
        assert_eq!(items.len(), 1);
        assert_eq!((items[0].min, items[0].max, items[0].qty), (0, 20, 20));
    }

    #[tokio::test]
    async fn test_blob_upload_refuses_overwrite() {
        let (db, blobs) = setup_test_db();

        let path = db.upload_blob("proofs", "1-a.jpg", b"one".to_vec(), "image/jpeg").await.unwrap();
        assert_eq!(path, "1-a.jpg");
        assert_eq!(std::fs::read(blobs.path().join("proofs/1-a.jpg")).unwrap(), b"one");

        let again = db.upload_blob("proofs", "1-a.jpg", b"two".to_vec(), "image/jpeg").await;
        assert!(matches!(again, Err(DomainError::Conflict(_))));

        let escape = db.upload_blob("proofs", "../evil.jpg", vec![], "image/jpeg").await;
        assert!(matches!(escape, Err(DomainError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_public_url_is_file_url() {
        let (db, _blobs) = setup_test_db();
        let url = db.public_url("proofs", "my photo.jpg");
        assert!(url.starts_with("file:///"));
        assert!(url.ends_with("/proofs/my%20photo.jpg"));
    }

    #[tokio::test]
    async fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data/kollektiv.db");
        {
            let db = SqliteGateway::open(&db_path, dir.path().join("blobs")).unwrap();
            db.insert(EntityKind::Events, json!({"date": "2026-10-20", "title": "Vask"})).await.unwrap();
        }
        let db = SqliteGateway::open(&db_path, dir.path().join("blobs")).unwrap();
        assert_eq!(db.list(EntityKind::Events).await.unwrap().len(), 1);
    }
}
