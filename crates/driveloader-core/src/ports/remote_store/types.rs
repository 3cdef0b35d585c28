//! DTOs exchanged over the remote store port.

use bytes::Bytes;

/// One ranged read of an object's binary content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaChunk {
    /// Bytes returned for the requested range (may be shorter at EOF).
    pub data: Bytes,
    /// Total object size, when the store reported it.
    pub total_size: Option<u64>,
}

impl MediaChunk {
    pub fn new(data: impl Into<Bytes>, total_size: Option<u64>) -> Self {
        Self {
            data: data.into(),
            total_size,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
