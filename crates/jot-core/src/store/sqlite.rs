//! SQLite-backed document collection.
//!
//! Documents are stored as JSON in a single table shared by all collections.
//! Writes run on tokio's blocking pool, so a locked database file never stalls
//! the task driving the screen. Commits made through this store are broadcast
//! immediately; commits made by other connections (another `jot` process, say)
//! are picked up by [`SqliteStore::poll_external_changes`].

use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OptionalExtension, Transaction};

use crate::error::{ChannelError, Error, Result};
use crate::models::{NoteDocument, NoteId};

use super::{lock, migrations, Listener, ListenerRegistry, RemoteStore, StoreEvent, Subscription};

/// A named collection inside a SQLite database file.
pub struct SqliteStore {
    shared: Arc<Shared>,
}

struct Shared {
    conn: Mutex<Connection>,
    collection: String,
    listeners: ListenerRegistry,
    data_version: Mutex<i64>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`.
    ///
    /// Runs migrations automatically.
    pub fn open(path: impl AsRef<Path>, collection: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        tracing::debug!("Opening document store at {}", path.display());
        Self::from_connection(Connection::open(path)?, collection.into())
    }

    /// Open an in-memory database (useful for testing)
    pub fn open_in_memory(collection: impl Into<String>) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, collection.into())
    }

    fn from_connection(conn: Connection, collection: String) -> Result<Self> {
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        migrations::run(&conn)?;
        let data_version = read_data_version(&conn)?;
        Ok(Self {
            shared: Arc::new(Shared {
                conn: Mutex::new(conn),
                collection,
                listeners: ListenerRegistry::new(),
                data_version: Mutex::new(data_version),
            }),
        })
    }

    pub fn collection(&self) -> &str {
        &self.shared.collection
    }

    /// Current contents ordered by document id.
    pub fn documents(&self) -> Result<Vec<NoteDocument>> {
        let conn = lock(&self.shared.conn);
        self.shared.read_snapshot(&conn)
    }

    /// Broadcast a fresh snapshot if another connection committed since the
    /// last check. Returns whether anything changed.
    pub fn poll_external_changes(&self) -> impl Future<Output = Result<bool>> + Send {
        self.run_blocking(Shared::poll_external_changes)
    }

    fn run_blocking<T, F>(&self, work: F) -> impl Future<Output = Result<T>> + Send
    where
        T: Send + 'static,
        F: FnOnce(&Shared) -> Result<T> + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        async move {
            tokio::task::spawn_blocking(move || work(&shared))
                .await
                .map_err(|error| Error::Unavailable(format!("store task failed: {error}")))?
        }
    }
}

impl Shared {
    fn poll_external_changes(&self) -> Result<bool> {
        let snapshot = {
            let conn = lock(&self.conn);
            let current = read_data_version(&conn)?;
            let mut seen = lock(&self.data_version);
            if *seen == current {
                return Ok(false);
            }
            *seen = current;
            self.read_snapshot(&conn)
        };

        tracing::debug!("Detected external commit on collection {}", self.collection);
        self.broadcast(snapshot);
        Ok(true)
    }

    fn read_snapshot(&self, conn: &Connection) -> Result<Vec<NoteDocument>> {
        let mut stmt =
            conn.prepare("SELECT data FROM documents WHERE collection = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![self.collection], |row| row.get::<_, String>(0))?;

        let mut documents = Vec::new();
        for data in rows {
            documents.push(serde_json::from_str(&data?)?);
        }
        Ok(documents)
    }

    fn broadcast(&self, snapshot: Result<Vec<NoteDocument>>) {
        let event = match snapshot {
            Ok(documents) => StoreEvent::Snapshot(documents),
            Err(error) => {
                tracing::warn!("Failed to read snapshot of {}: {error}", self.collection);
                StoreEvent::Error(ChannelError::from(&error))
            }
        };
        self.listeners.broadcast(&event);
    }

    /// Run `write` in a transaction, then push the committed snapshot.
    fn commit(&self, write: impl FnOnce(&Transaction<'_>) -> Result<()>) -> Result<()> {
        let snapshot = {
            let mut conn = lock(&self.conn);
            let tx = conn.transaction()?;
            write(&tx)?;
            tx.commit()?;
            self.read_snapshot(&conn)
        };
        self.broadcast(snapshot);
        Ok(())
    }

    fn write_document(&self, tx: &Transaction<'_>, document: &NoteDocument) -> Result<()> {
        let data = serde_json::to_string(document)?;
        tx.execute(
            "INSERT INTO documents (collection, id, data) VALUES (?1, ?2, ?3)
             ON CONFLICT (collection, id) DO UPDATE SET data = excluded.data",
            params![self.collection, document.id.as_str(), data],
        )?;
        Ok(())
    }
}

impl RemoteStore for SqliteStore {
    fn subscribe(&self, listener: Listener) -> Subscription {
        let subscription = self.shared.listeners.register(Arc::clone(&listener));
        let initial = match self.documents() {
            Ok(documents) => StoreEvent::Snapshot(documents),
            Err(error) => StoreEvent::Error(ChannelError::from(&error)),
        };
        listener(initial);
        subscription
    }

    fn put(&self, id: &NoteId, document: NoteDocument) -> impl Future<Output = Result<()>> + Send {
        let document = NoteDocument {
            id: id.clone(),
            ..document
        };
        self.run_blocking(move |shared| shared.commit(|tx| shared.write_document(tx, &document)))
    }

    fn update_field(
        &self,
        id: &NoteId,
        content: String,
    ) -> impl Future<Output = Result<()>> + Send {
        let id = id.clone();
        self.run_blocking(move |shared| {
            shared.commit(|tx| {
                let data: Option<String> = tx
                    .query_row(
                        "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
                        params![shared.collection, id.as_str()],
                        |row| row.get(0),
                    )
                    .optional()?;
                let data = data.ok_or_else(|| Error::NotFound(id.to_string()))?;

                let mut document: NoteDocument = serde_json::from_str(&data)?;
                document.content = content;
                shared.write_document(tx, &document)
            })
        })
    }

    fn delete(&self, id: &NoteId) -> impl Future<Output = Result<()>> + Send {
        let id = id.clone();
        self.run_blocking(move |shared| {
            shared.commit(|tx| {
                tx.execute(
                    "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                    params![shared.collection, id.as_str()],
                )?;
                Ok(())
            })
        })
    }
}

fn read_data_version(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("PRAGMA data_version", [], |row| row.get(0))?)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use pretty_assertions::assert_eq;

    use super::*;

    fn doc(id: &str, content: &str) -> NoteDocument {
        NoteDocument::new(NoteId::new(id), content)
    }

    #[tokio::test]
    async fn put_update_delete_roundtrip() {
        let store = SqliteStore::open_in_memory("Notes").unwrap();

        store.put(&NoteId::new("n2"), doc("n2", "two")).await.unwrap();
        store.put(&NoteId::new("n1"), doc("n1", "one")).await.unwrap();
        store
            .update_field(&NoteId::new("n2"), "deux".to_string())
            .await
            .unwrap();
        assert_eq!(
            store.documents().unwrap(),
            vec![doc("n1", "one"), doc("n2", "deux")]
        );

        store.delete(&NoteId::new("n1")).await.unwrap();
        assert_eq!(store.documents().unwrap(), vec![doc("n2", "deux")]);
    }

    #[tokio::test]
    async fn update_of_missing_document_fails_without_broadcast() {
        let store = SqliteStore::open_in_memory("Notes").unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let _subscription = store.subscribe(Arc::new(move |event| lock(&sink).push(event)));

        let error = store
            .update_field(&NoteId::new("ghost"), "boo".to_string())
            .await
            .unwrap_err();
        assert!(matches!(error, Error::NotFound(_)));
        assert_eq!(lock(&events).len(), 1);
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jot.db");
        let notes = SqliteStore::open(&path, "Notes").unwrap();
        let other = SqliteStore::open(&path, "Archive").unwrap();

        notes.put(&NoteId::new("n1"), doc("n1", "kept")).await.unwrap();
        assert!(other.documents().unwrap().is_empty());
        assert_eq!(notes.collection(), "Notes");
    }

    #[tokio::test]
    async fn external_commits_are_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jot.db");
        let watcher = SqliteStore::open(&path, "Notes").unwrap();
        let writer = SqliteStore::open(&path, "Notes").unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let _subscription = watcher.subscribe(Arc::new(move |event| lock(&sink).push(event)));
        assert!(!watcher.poll_external_changes().await.unwrap());

        writer.put(&NoteId::new("n1"), doc("n1", "from afar")).await.unwrap();
        assert!(watcher.poll_external_changes().await.unwrap());
        assert!(!watcher.poll_external_changes().await.unwrap());

        assert_eq!(
            lock(&events).last(),
            Some(&StoreEvent::Snapshot(vec![doc("n1", "from afar")]))
        );
    }

    #[tokio::test]
    async fn locked_database_does_not_block_the_caller() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jot.db");
        let store = SqliteStore::open(&path, "Notes").unwrap();
        let holder = Connection::open(&path).unwrap();
        holder.execute_batch("BEGIN EXCLUSIVE").unwrap();

        let started = Instant::now();
        let n1 = NoteId::new("n1");
        let put = store.put(&n1, doc("n1", "waiting"));
        tokio::pin!(put);
        tokio::select! {
            _ = &mut put => panic!("write finished while the database was locked"),
            () = tokio::time::sleep(Duration::from_millis(10)) => {}
        }
        assert!(started.elapsed() < Duration::from_secs(1));

        holder.execute_batch("COMMIT").unwrap();
        put.await.unwrap();
        assert_eq!(store.documents().unwrap(), vec![doc("n1", "waiting")]);
    }
}
