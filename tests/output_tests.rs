//! Tests for output writers (JSON snapshots, chat index, SQL)

use std::fs;

use chatvault::config::{ChatAttributes, ExtractConfig};
use chatvault::core::output::CHAT_INDEX_FILE;
use chatvault::core::{Dialect, Extraction, Pipeline, SqliteWriter, read_chat_index, to_json, update_chat_index, write_json};
use tempfile::tempdir;

const EXPORT: &str = r#"<html><body>
  <div class="page_header"><div class="text bold">Dev Team</div></div>
  <div class="message default" id="message1"><div class="body">
    <div class="pull_right date details" title="12.05.2023 09:00:00">09:00</div>
    <div class="from_name">Alice</div><div class="text">it's shipped</div></div></div>
  <div class="message default joined" id="message2"><div class="body">
    <div class="pull_right date details" title="whenever">??</div>
    <div class="media_wrap"><div class="media_voice_message"></div></div></div></div>
</body></html>"#;

fn extraction(attrs: &ChatAttributes) -> Extraction {
    Pipeline::new(ExtractConfig::default())
        .unwrap()
        .run(EXPORT.as_bytes(), attrs)
        .unwrap()
}

// ============================================================================
// JSON
// ============================================================================

mod json {
    use super::*;

    #[test]
    fn test_snapshot_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&to_json(&extraction(&ChatAttributes::default())).unwrap()).unwrap();

        assert_eq!(json["chat"]["slug"], "dev-team");
        assert_eq!(json["chat"]["title"], "Dev Team");
        assert_eq!(json["chat"]["is_active"], true);
        assert!(json["chat"]["id"].is_null());

        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["sequence_index"], 0);
        assert_eq!(messages[0]["msg_id"], 1);
        assert_eq!(messages[0]["timestamp"], "2023-05-12T09:00:00");
        assert_eq!(messages[0]["text"], "it's shipped");
        assert!(messages[0].get("media_type").is_none());

        // Degraded timestamp: explicit null plus the raw value
        assert!(messages[1]["timestamp"].is_null());
        assert_eq!(messages[1]["timestamp_raw"], "whenever");
        assert_eq!(messages[1]["sender_name"], "Alice");
        assert_eq!(messages[1]["media_type"], "voice_message");
    }

    #[test]
    fn test_write_json_round_trips() {
        let dir = tempdir().unwrap();
        let original = extraction(&ChatAttributes::new().with_id(7));

        let path = write_json(&original, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("dev-team.json"));
        assert!(!dir.path().join("dev-team.json.tmp").exists());

        let restored: Extraction = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_write_json_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("data").join("json");
        write_json(&extraction(&ChatAttributes::default()), &nested).unwrap();
        assert!(nested.join("dev-team.json").exists());
    }

    #[test]
    fn test_chat_index_upserts_by_slug() {
        let dir = tempdir().unwrap();
        assert!(read_chat_index(dir.path()).unwrap().is_empty());

        let active = extraction(&ChatAttributes::default()).chat;
        update_chat_index(dir.path(), &[active]).unwrap();

        let mut other = extraction(&ChatAttributes::default()).chat;
        other.slug = "ops".into();
        other.title = "Ops".into();
        update_chat_index(dir.path(), &[other]).unwrap();

        let retired = extraction(&ChatAttributes::new().with_active(false)).chat;
        let path = update_chat_index(dir.path(), &[retired]).unwrap();
        assert_eq!(path, dir.path().join(CHAT_INDEX_FILE));

        let index = read_chat_index(dir.path()).unwrap();
        let slugs: Vec<_> = index.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, ["dev-team", "ops"]);
        assert!(!index[0].is_active);
        assert_eq!(index[0].is_member, None);
    }

    #[test]
    fn test_corrupt_index_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CHAT_INDEX_FILE), "not json").unwrap();
        let err = update_chat_index(dir.path(), &[]).unwrap_err();
        assert!(!err.is_structural());
    }
}

// ============================================================================
// SQL
// ============================================================================

mod sql {
    use super::*;

    #[test]
    fn test_rendered_script_runs_in_sqlite() {
        let data = extraction(&ChatAttributes::new().with_id(1));
        let script = Dialect::Sqlite.render(std::slice::from_ref(&data));

        let writer = SqliteWriter::open_in_memory().unwrap();
        let conn = writer.connection();
        conn.execute_batch(&script).unwrap();
        // Running it twice changes nothing
        conn.execute_batch(&script).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM messages", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);

        let (raw, sent): (Option<String>, Option<String>) = conn
            .query_row(
                "SELECT sent_at_raw, sent_at FROM messages WHERE sequence_index = 1",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(raw.as_deref(), Some("whenever"));
        assert_eq!(sent, None);
    }

    #[test]
    fn test_script_and_writer_agree() {
        let data = extraction(&ChatAttributes::default());

        let mut direct = SqliteWriter::open_in_memory().unwrap();
        direct.write(&data).unwrap();

        let scripted = SqliteWriter::open_in_memory().unwrap();
        scripted
            .connection()
            .execute_batch(&Dialect::Sqlite.insert_script(&data))
            .unwrap();

        let dump = |writer: &SqliteWriter| -> Vec<(i64, String, String)> {
            let mut stmt = writer
                .connection()
                .prepare("SELECT sequence_index, sender_name, text FROM messages ORDER BY sequence_index")
                .unwrap();
            stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
                .unwrap()
                .map(|row| row.unwrap())
                .collect()
        };
        assert_eq!(dump(&direct), dump(&scripted));
    }

    #[test]
    fn test_postgres_script() {
        let sql = Dialect::Postgres.render(&[extraction(&ChatAttributes::default())]);
        assert!(sql.contains("chat_id BIGINT UNIQUE"));
        assert!(sql.contains("'dev-team', NULL, 'Dev Team', NULL, NULL, TRUE, TRUE, TRUE"));
        assert!(sql.contains("'it''s shipped'"));
    }

    #[test]
    fn test_sqlite_file_reimport() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("chats.sqlite");
        let data = extraction(&ChatAttributes::default());

        let first = SqliteWriter::open(&db).unwrap().write(&data).unwrap();
        let second = SqliteWriter::open(&db).unwrap().write(&data).unwrap();
        assert_eq!(first.inserted, 2);
        assert_eq!(second.inserted, 0);
        assert_eq!(second.skipped, 2);
    }
}
