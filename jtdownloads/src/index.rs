//! Index persistant des téléchargements
//!
//! Base SQLite enregistrant les pistes complètes et l'artwork d'album
//! mis en cache. Une ligne `downloads` n'existe que si le fichier audio
//! correspondant est complet sur disque ; la réconciliation au
//! démarrage rétablit cet invariant après un crash.

use crate::model::DownloadedTrack;
use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Base de données SQLite des téléchargements
#[derive(Debug)]
pub struct DownloadDb {
    conn: Mutex<Connection>,
}

impl DownloadDb {
    /// Initialise la base de données (création des tables si besoin)
    pub fn init(path: &Path) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS downloads (
                track_id TEXT PRIMARY KEY,
                album_id TEXT NOT NULL,
                album_name TEXT NOT NULL,
                artist_name TEXT NOT NULL,
                track_name TEXT NOT NULL,
                track_number INTEGER NOT NULL,
                duration_secs REAL NOT NULL,
                file_size INTEGER NOT NULL,
                file_path TEXT NOT NULL,
                completed_at TEXT NOT NULL
            )",
            [],
        )?;

        // Index sur l'album pour les groupements
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_downloads_album
             ON downloads (album_id)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS album_artwork (
                album_id TEXT PRIMARY KEY,
                file_path TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Enregistre une piste complète (upsert)
    pub fn add(&self, track: &DownloadedTrack) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO downloads (track_id, album_id, album_name, artist_name,
                 track_name, track_number, duration_secs, file_size, file_path, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(track_id) DO UPDATE SET
                 album_id = excluded.album_id,
                 album_name = excluded.album_name,
                 artist_name = excluded.artist_name,
                 track_name = excluded.track_name,
                 track_number = excluded.track_number,
                 duration_secs = excluded.duration_secs,
                 file_size = excluded.file_size,
                 file_path = excluded.file_path,
                 completed_at = excluded.completed_at",
            params![
                track.track_id,
                track.album_id,
                track.album_name,
                track.artist_name,
                track.track_name,
                track.track_number,
                track.duration_secs,
                track.file_size,
                track.file_path.to_string_lossy(),
                track.completed_at,
            ],
        )?;
        Ok(())
    }

    /// Récupère une piste par identifiant
    pub fn get(&self, track_id: &str) -> rusqlite::Result<DownloadedTrack> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT track_id, album_id, album_name, artist_name, track_name,
                    track_number, duration_secs, file_size, file_path, completed_at
             FROM downloads WHERE track_id = ?1",
            [track_id],
            row_to_track,
        )
    }

    /// Récupère toutes les pistes enregistrées
    pub fn get_all(&self) -> rusqlite::Result<Vec<DownloadedTrack>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT track_id, album_id, album_name, artist_name, track_name,
                    track_number, duration_secs, file_size, file_path, completed_at
             FROM downloads",
        )?;
        let rows = stmt.query_map([], row_to_track)?;
        rows.collect()
    }

    /// Récupère les pistes d'un album, triées par numéro de piste
    pub fn get_by_album(&self, album_id: &str) -> rusqlite::Result<Vec<DownloadedTrack>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT track_id, album_id, album_name, artist_name, track_name,
                    track_number, duration_secs, file_size, file_path, completed_at
             FROM downloads WHERE album_id = ?1 ORDER BY track_number",
        )?;
        let rows = stmt.query_map([album_id], row_to_track)?;
        rows.collect()
    }

    /// Supprime une piste de l'index
    pub fn delete(&self, track_id: &str) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM downloads WHERE track_id = ?1", [track_id])?;
        Ok(())
    }

    /// Nombre de pistes enregistrées
    pub fn count(&self) -> rusqlite::Result<u32> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM downloads", [], |row| row.get(0))
    }

    /// Vide l'index (pistes et artwork)
    pub fn purge(&self) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM downloads", [])?;
        conn.execute("DELETE FROM album_artwork", [])?;
        Ok(())
    }

    /// Enregistre le chemin de l'artwork d'un album
    pub fn set_artwork(&self, album_id: &str, file_path: &Path) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO album_artwork (album_id, file_path)
             VALUES (?1, ?2)
             ON CONFLICT(album_id) DO UPDATE SET file_path = excluded.file_path",
            params![album_id, file_path.to_string_lossy()],
        )?;
        Ok(())
    }

    /// Récupère le chemin de l'artwork d'un album, si enregistré
    pub fn get_artwork(&self, album_id: &str) -> rusqlite::Result<Option<PathBuf>> {
        let conn = self.conn.lock().unwrap();
        let result = conn.query_row(
            "SELECT file_path FROM album_artwork WHERE album_id = ?1",
            [album_id],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(path) => Ok(Some(PathBuf::from(path))),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Récupère tout l'artwork enregistré
    pub fn get_all_artwork(&self) -> rusqlite::Result<Vec<(String, PathBuf)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT album_id, file_path FROM album_artwork")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                PathBuf::from(row.get::<_, String>(1)?),
            ))
        })?;
        rows.collect()
    }

    /// Supprime l'artwork d'un album de l'index
    pub fn delete_artwork(&self, album_id: &str) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM album_artwork WHERE album_id = ?1", [album_id])?;
        Ok(())
    }
}

fn row_to_track(row: &rusqlite::Row<'_>) -> rusqlite::Result<DownloadedTrack> {
    Ok(DownloadedTrack {
        track_id: row.get(0)?,
        album_id: row.get(1)?,
        album_name: row.get(2)?,
        artist_name: row.get(3)?,
        track_name: row.get(4)?,
        track_number: row.get(5)?,
        duration_secs: row.get(6)?,
        file_size: row.get::<_, i64>(7)? as u64,
        file_path: PathBuf::from(row.get::<_, String>(8)?),
        completed_at: row.get(9)?,
    })
}
