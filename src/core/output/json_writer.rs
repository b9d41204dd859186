//! JSON snapshot writer.
//!
//! One pretty-printed `<slug>.json` per chat, holding the chat record and
//! its messages in `sequence_index` order, plus a `chats.json` index of every
//! chat written to the directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::Chat;
use crate::core::Extraction;
use crate::error::Result;

/// File name of the chat index.
pub const CHAT_INDEX_FILE: &str = "chats.json";

/// Serializes an extraction as pretty JSON.
///
/// # Format
/// ```json
/// {
///   "chat": {"id": null, "slug": "dev-team", "title": "Dev Team", ...},
///   "messages": [
///     {"sequence_index": 0, "sender_name": "Alice", "timestamp": "2023-05-12T09:00:00", ...}
///   ]
/// }
/// ```
pub fn to_json(extraction: &Extraction) -> Result<String> {
    Ok(serde_json::to_string_pretty(extraction)?)
}

/// Writes `<dir>/<slug>.json`, creating `dir` if needed. Returns the file path.
pub fn write_json(extraction: &Extraction, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let path = dir.join(format!("{}.json", extraction.chat.slug));
    write_atomic(&path, &to_json(extraction)?)?;
    tracing::debug!(path = %path.display(), "wrote chat snapshot");
    Ok(path)
}

/// Reads `<dir>/chats.json`; a missing index is an empty one.
pub fn read_chat_index(dir: impl AsRef<Path>) -> Result<Vec<Chat>> {
    let path = dir.as_ref().join(CHAT_INDEX_FILE);
    match fs::read_to_string(&path) {
        Ok(json) => Ok(serde_json::from_str(&json)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Upserts `chats` into `<dir>/chats.json`, keyed by slug.
///
/// Existing entries are replaced in place; new ones are appended in the
/// order given. Returns the index path.
pub fn update_chat_index(dir: impl AsRef<Path>, chats: &[Chat]) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut index = read_chat_index(dir)?;
    for chat in chats {
        match index.iter_mut().find(|existing| existing.slug == chat.slug) {
            Some(existing) => *existing = chat.clone(),
            None => index.push(chat.clone()),
        }
    }

    let path = dir.join(CHAT_INDEX_FILE);
    write_atomic(&path, &serde_json::to_string_pretty(&index)?)?;
    Ok(path)
}

/// Writes through a sibling temp file so readers never see a torn file.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Message;
    use crate::config::ChatAttributes;
    use crate::extract::ChatMetadata;
    use tempfile::TempDir;

    fn extraction(title: &str, slug: &str) -> Extraction {
        let metadata = ChatMetadata {
            title: title.to_string(),
            link: None,
            joined: None,
            anchor: "h1",
        };
        Extraction {
            chat: Chat::new(metadata, slug.to_string(), &ChatAttributes::default()),
            messages: vec![
                Message::new(0, "Alice", "hi"),
                Message::new(1, "Alice", "yo").with_timestamp_raw("never"),
            ],
        }
    }

    #[test]
    fn test_to_json_layout() {
        let json = to_json(&extraction("Dev Team", "dev-team")).unwrap();
        assert!(json.contains(r#""slug": "dev-team""#));
        assert!(json.contains(r#""sender_name": "Alice""#));
        assert!(json.contains(r#""timestamp": null"#));
        assert!(json.find("\"hi\"").unwrap() < json.find("\"yo\"").unwrap());
    }

    #[test]
    fn test_write_json_roundtrip() {
        let dir = TempDir::new().unwrap();
        let original = extraction("Dev Team", "dev-team");
        let path = write_json(&original, dir.path().join("nested")).unwrap();

        assert_eq!(path.file_name().unwrap(), "dev-team.json");
        let parsed: Extraction = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, original);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_chat_index_upsert() {
        let dir = TempDir::new().unwrap();
        assert!(read_chat_index(dir.path()).unwrap().is_empty());

        let a = extraction("A", "a").chat;
        let b = extraction("B", "b").chat;
        update_chat_index(dir.path(), &[a.clone(), b.clone()]).unwrap();

        let mut renamed = a.clone();
        renamed.title = "A renamed".into();
        update_chat_index(dir.path(), &[renamed]).unwrap();

        let index = read_chat_index(dir.path()).unwrap();
        let titles: Vec<_> = index.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["A renamed", "B"]);
    }

    #[test]
    fn test_corrupt_index_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CHAT_INDEX_FILE), "{not json").unwrap();
        let err = read_chat_index(dir.path()).unwrap_err();
        assert!(err.to_string().contains("JSON"));
    }
}
