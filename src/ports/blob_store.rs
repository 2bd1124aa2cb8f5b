//! Key-value blob storage port, used for caching fetched price series.

use crate::domain::error::DcaError;

pub trait BlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DcaError>;
    fn put(&self, key: &str, value: &[u8]) -> Result<(), DcaError>;
}
