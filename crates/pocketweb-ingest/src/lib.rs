//! Tabular ingestion pipeline
//!
//! Turns an arbitrary delimited-text export (bank statement or brokerage
//! holdings) into typed records in three passes:
//! - decode: delimiter sniffing, quote-aware splitting, header location
//! - mapping: header keywords -> column indices (auto), or a caller mapping
//! - normalize: per-row extraction, validation, and duplicate suppression

pub mod decode;
pub mod error;
pub mod mapping;
pub mod normalize;

pub use decode::{decode, DataRow, DecodedTable};
pub use error::IngestError;
pub use mapping::{
    ColumnMapping, ColumnRef, HoldingMapping, ManualMapping, MappingProposal, SchemaKind,
    TransactionMapping,
};
pub use normalize::{
    is_valid_date, normalize_holdings, normalize_transactions, ExistingHolding,
    ExistingTransaction, HoldingDraft, HoldingOutcome, RecordType, RejectedRow, TransactionDraft,
    TransactionOutcome,
};

use std::sync::atomic::{AtomicU64, Ordering};

// ==================== Utility Functions ====================

/// Generate a short hash (8 characters) from content
pub fn short_hash(content: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let hash = hasher.finish();

    format!("{:016x}", hash)[..8].to_string()
}

static RECORD_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique record ID from a kind prefix and record content.
///
/// Combines a content hash with a timestamp and a process-wide counter so
/// that two identical rows in the same file still get distinct ids.
pub fn generate_record_id(kind: &str, content: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = RECORD_COUNTER.fetch_add(1, Ordering::Relaxed);
    let hash = short_hash(&format!("{}:{}:{}", content, nanos, seq));
    format!("{}-{}", kind, hash)
}
