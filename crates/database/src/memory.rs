use crate::DbError;
use crate::repository::{MahasiswaRepository, QueryKind, record_query};
use async_trait::async_trait;
use core_types::{Mahasiswa, NewMahasiswa};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// A process-local record store with the same semantics as the
/// `mahasiswa` table: ids start at 1 and are never reused, and `nim`
/// is unique across live records.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i32,
    rows: BTreeMap<i32, Mahasiswa>,
}

impl MemoryState {
    fn nim_taken(&self, nim: &str, except: Option<i32>) -> bool {
        self.rows
            .values()
            .any(|row| row.nim == nim && Some(row.id) != except)
    }
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MahasiswaRepository for MemoryRepository {
    async fn list_mahasiswa(&self) -> Result<Vec<Mahasiswa>, DbError> {
        record_query(QueryKind::Select);
        let state = self.state.read().await;
        Ok(state.rows.values().cloned().collect())
    }

    async fn get_mahasiswa(&self, id: i32) -> Result<Mahasiswa, DbError> {
        record_query(QueryKind::Select);
        let state = self.state.read().await;
        state.rows.get(&id).cloned().ok_or(DbError::NotFound)
    }

    async fn create_mahasiswa(&self, new: &NewMahasiswa) -> Result<Mahasiswa, DbError> {
        record_query(QueryKind::Insert);
        let mut state = self.state.write().await;
        if state.nim_taken(&new.nim, None) {
            return Err(DbError::DuplicateNim);
        }
        state.last_id += 1;
        let row = new.clone().with_id(state.last_id);
        state.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_mahasiswa(&self, id: i32, update: &NewMahasiswa) -> Result<Mahasiswa, DbError> {
        record_query(QueryKind::Update);
        let mut state = self.state.write().await;
        if !state.rows.contains_key(&id) {
            return Err(DbError::NotFound);
        }
        if state.nim_taken(&update.nim, Some(id)) {
            return Err(DbError::DuplicateNim);
        }
        let row = update.clone().with_id(id);
        state.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn delete_mahasiswa(&self, id: i32) -> Result<Mahasiswa, DbError> {
        record_query(QueryKind::Delete);
        let mut state = self.state.write().await;
        state.rows.remove(&id).ok_or(DbError::NotFound)
    }
}
