//! Deterministic chunk identifiers.

use md5::{Digest, Md5};

/// Builds the record identifier for a chunk: the first 8 hex characters of
/// the MD5 digest of the source URL, then the 0-based chunk index, as
/// `{url_hash}_chunk_{index}`.
///
/// Re-running the pipeline over the same URL with the same chunking
/// configuration reproduces identical identifiers, so upserts overwrite
/// rather than duplicate. The 8-character truncation keeps 32 bits of the
/// digest; distinct URLs can collide at large corpus sizes, which is
/// accepted for compatibility with existing stored records.
pub fn chunk_id(source_url: &str, chunk_index: usize) -> String {
    let digest = Md5::digest(source_url.as_bytes());
    let url_hash = hex::encode(digest);
    format!("{}_chunk_{chunk_index}", &url_hash[..8])
}
