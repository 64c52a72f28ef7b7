use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// One of `nim`, `nama`, `jurusan` or `angkatan` was absent or empty.
    #[error("All fields are required")]
    MissingFields,
}
