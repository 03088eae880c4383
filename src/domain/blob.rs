use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;

/// Page-local, revocable handle to an in-memory blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlobUrl(u64);

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:compressor/{}", self.0)
    }
}

/// Owns every live encoded blob. A blob stays resolvable until revoked.
#[derive(Debug, Default)]
pub struct BlobRegistry {
    next_id: u64,
    blobs: HashMap<BlobUrl, Bytes>,
}

impl BlobRegistry {
    pub fn create(&mut self, data: Bytes) -> BlobUrl {
        self.next_id += 1;
        let url = BlobUrl(self.next_id);
        self.blobs.insert(url, data);
        url
    }

    pub fn resolve(&self, url: BlobUrl) -> Option<Bytes> {
        self.blobs.get(&url).cloned()
    }

    /// Releases everything, returning how many blobs were still live.
    pub fn revoke_all(&mut self) -> usize {
        let count = self.blobs.len();
        self.blobs.clear();
        count
    }

    pub fn live_count(&self) -> usize {
        self.blobs.len()
    }
}
