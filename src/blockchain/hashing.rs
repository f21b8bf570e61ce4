use chrono::SecondsFormat;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::block::Block;
use super::transaction::TransactionRecord;

/// Computes the SHA-256 digest of a block's canonical form
///
/// # Arguments
///
/// * `block` - The block to hash
///
/// # Returns
///
/// The 256-bit digest as a lowercase hexadecimal string
pub fn digest(block: &Block) -> String {
    sha256_hex(&canonical_bytes(block))
}

/// Serializes a block into its canonical byte representation
///
/// The canonical form is compact JSON with object keys in lexicographic
/// order at every level, so the bytes depend only on field values. Keys are
/// inserted in sorted order.
pub fn canonical_bytes(block: &Block) -> Vec<u8> {
    let mut fields = Map::new();
    fields.insert("index".to_string(), Value::from(block.index));
    fields.insert("previous_hash".to_string(), Value::String(block.previous_hash.clone()));
    fields.insert("proof".to_string(), Value::from(block.proof));
    fields.insert(
        "timestamp".to_string(),
        Value::String(block.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
    );
    fields.insert(
        "transactions".to_string(),
        Value::Array(block.transactions.iter().map(canonical_transaction).collect()),
    );

    Value::Object(fields).to_string().into_bytes()
}

fn canonical_transaction(record: &TransactionRecord) -> Value {
    let mut fields = Map::new();
    fields.insert("amount".to_string(), Value::from(record.amount));
    fields.insert("recipient".to_string(), Value::String(record.recipient.0.clone()));
    fields.insert("sender".to_string(), Value::String(record.sender.0.clone()));
    Value::Object(fields)
}

/// Hashes arbitrary bytes with SHA-256 and hex-encodes the result
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
