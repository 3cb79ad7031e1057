use burrow_core::StorageError;

pub use burrow_core::RegistryError;

/// Maps a store error that is not a put conflict onto the registry taxonomy.
///
/// Faults pass through untouched as [`RegistryError::Storage`].
pub(crate) fn from_storage(err: StorageError) -> RegistryError {
    match err {
        StorageError::NotFound(token) => RegistryError::NotFound(token),
        StorageError::Unauthorized(token) => RegistryError::Unauthorized(token),
        other => RegistryError::Storage(other),
    }
}
