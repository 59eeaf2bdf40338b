//! Snapshot encoding.
//!
//! Binary layout:
//!
//! ```text
//! +--------+---------+------------------------+
//! | "DADA" | version | postcard(WardrobeSnapshot) |
//! | 4 B    | u16 LE  | ...                    |
//! +--------+---------+------------------------+
//! ```
//!
//! Stores scan in id order, so encoding the same wardrobe twice yields the
//! same bytes.

use crate::error::{DadaError, Result};
use crate::store::IdCounters;
use crate::types::{ClothingItem, Comment, CommunityPost, OutfitLook, UserProfile};
use serde::{Deserialize, Serialize};

/// Magic bytes at the start of every binary snapshot.
pub const SNAPSHOT_MAGIC: &[u8; 4] = b"DADA";

/// Current binary snapshot version.
pub const SNAPSHOT_VERSION: u16 = 1;

const HEADER_LEN: usize = 6;

/// Everything a wardrobe holds, in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WardrobeSnapshot {
    pub counters: IdCounters,
    pub items: Vec<ClothingItem>,
    pub looks: Vec<OutfitLook>,
    pub profile: Option<UserProfile>,
    pub posts: Vec<CommunityPost>,
    pub comments: Vec<Comment>,
}

impl WardrobeSnapshot {
    /// Check whether the snapshot holds no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
            && self.looks.is_empty()
            && self.profile.is_none()
            && self.posts.is_empty()
            && self.comments.is_empty()
    }

    /// The snapshot's counters, raised past the highest id of each kind.
    ///
    /// Hand-edited JSON may carry counters that lag behind its records;
    /// restoring those as-is would hand out ids that are already taken.
    #[must_use]
    pub fn safe_counters(&self) -> IdCounters {
        fn past<I: Iterator<Item = u64>>(counter: u64, ids: I) -> u64 {
            ids.map(|id| id.saturating_add(1)).fold(counter.max(1), u64::max)
        }
        IdCounters {
            next_item: past(self.counters.next_item, self.items.iter().map(|i| i.id.0)),
            next_look: past(self.counters.next_look, self.looks.iter().map(|l| l.id.0)),
            next_post: past(self.counters.next_post, self.posts.iter().map(|p| p.id.0)),
            next_comment: past(
                self.counters.next_comment,
                self.comments.iter().map(|c| c.id.0),
            ),
        }
    }
}

/// Encode a snapshot to the binary format.
pub fn encode_snapshot(snapshot: &WardrobeSnapshot) -> Result<Vec<u8>> {
    let body = postcard::to_allocvec(snapshot)?;
    let mut out = Vec::with_capacity(HEADER_LEN.saturating_add(body.len()));
    out.extend_from_slice(SNAPSHOT_MAGIC);
    out.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}

/// Decode a binary snapshot, checking magic and version.
pub fn decode_snapshot(bytes: &[u8]) -> Result<WardrobeSnapshot> {
    if bytes.len() < HEADER_LEN {
        return Err(DadaError::InvalidFormat(format!(
            "snapshot too short: {} bytes",
            bytes.len()
        )));
    }
    let (header, body) = bytes.split_at(HEADER_LEN);
    if &header[..4] != SNAPSHOT_MAGIC {
        return Err(DadaError::InvalidFormat("bad snapshot magic".to_string()));
    }
    let version = u16::from_le_bytes([header[4], header[5]]);
    if version != SNAPSHOT_VERSION {
        return Err(DadaError::InvalidFormat(format!(
            "unsupported snapshot version {version} (expected {SNAPSHOT_VERSION})"
        )));
    }
    Ok(postcard::from_bytes(body)?)
}

/// Encode a snapshot as pretty-printed JSON.
pub fn snapshot_to_json(snapshot: &WardrobeSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Decode a JSON snapshot.
pub fn snapshot_from_json(text: &str) -> Result<WardrobeSnapshot> {
    Ok(serde_json::from_str(text)?)
}
