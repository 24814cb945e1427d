use jtdownloads::model::DownloadedTrack;
use jtdownloads::DownloadDb;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn create_db() -> (TempDir, DownloadDb) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db = DownloadDb::init(&temp_dir.path().join("downloads.db")).unwrap();
    (temp_dir, db)
}

fn track(album_id: &str, number: u32, track_id: &str) -> DownloadedTrack {
    DownloadedTrack {
        track_id: track_id.to_string(),
        album_id: album_id.to_string(),
        album_name: format!("Album {}", album_id),
        artist_name: "Artist".to_string(),
        track_name: format!("Track {}", number),
        track_number: number,
        duration_secs: 180.5,
        file_size: 1024,
        file_path: PathBuf::from(format!("/downloads/audio/{}.flac", track_id)),
        completed_at: "2025-06-01T12:00:00Z".to_string(),
    }
}

#[test]
fn test_add_and_get() {
    let (_dir, db) = create_db();
    let original = track("a1", 1, "t1");

    db.add(&original).unwrap();
    let loaded = db.get("t1").unwrap();

    assert_eq!(loaded, original);
    assert_eq!(db.count().unwrap(), 1);
}

#[test]
fn test_add_is_upsert() {
    let (_dir, db) = create_db();
    db.add(&track("a1", 1, "t1")).unwrap();

    let mut updated = track("a1", 1, "t1");
    updated.file_size = 2048;
    db.add(&updated).unwrap();

    assert_eq!(db.count().unwrap(), 1);
    assert_eq!(db.get("t1").unwrap().file_size, 2048);
}

#[test]
fn test_get_by_album_sorted() {
    let (_dir, db) = create_db();
    db.add(&track("a1", 3, "t3")).unwrap();
    db.add(&track("a1", 1, "t1")).unwrap();
    db.add(&track("a2", 1, "x1")).unwrap();

    let tracks = db.get_by_album("a1").unwrap();
    let numbers: Vec<u32> = tracks.iter().map(|t| t.track_number).collect();
    assert_eq!(numbers, vec![1, 3]);
}

#[test]
fn test_delete() {
    let (_dir, db) = create_db();
    db.add(&track("a1", 1, "t1")).unwrap();

    db.delete("t1").unwrap();
    assert!(db.get("t1").is_err());

    // Supprimer une piste absente est un no-op
    db.delete("t1").unwrap();
}

#[test]
fn test_artwork_roundtrip() {
    let (_dir, db) = create_db();

    assert!(db.get_artwork("a1").unwrap().is_none());

    db.set_artwork("a1", Path::new("/downloads/artwork/a1.img"))
        .unwrap();
    assert_eq!(
        db.get_artwork("a1").unwrap(),
        Some(PathBuf::from("/downloads/artwork/a1.img"))
    );

    let all = db.get_all_artwork().unwrap();
    assert_eq!(all.len(), 1);

    db.delete_artwork("a1").unwrap();
    assert!(db.get_artwork("a1").unwrap().is_none());
}

#[test]
fn test_purge() {
    let (_dir, db) = create_db();
    db.add(&track("a1", 1, "t1")).unwrap();
    db.set_artwork("a1", Path::new("/downloads/artwork/a1.img"))
        .unwrap();

    db.purge().unwrap();

    assert_eq!(db.count().unwrap(), 0);
    assert!(db.get_artwork("a1").unwrap().is_none());
}

#[test]
fn test_index_survives_reopen() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("downloads.db");

    {
        let db = DownloadDb::init(&path).unwrap();
        db.add(&track("a1", 1, "t1")).unwrap();
    }

    let db = DownloadDb::init(&path).unwrap();
    assert_eq!(db.count().unwrap(), 1);
    assert_eq!(db.get("t1").unwrap().track_id, "t1");
}
