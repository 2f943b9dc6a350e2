//! Snapshot integrity digest
//!
//! SHA-256 over the compact JSON form of everything in the snapshot except the
//! checksum itself. Rows are `BTreeMap`s and tables are keyed by an ordered
//! enum, so the serialized form is canonical for a given content.

use sha2::{Digest, Sha256};
use tinda_core::{Snapshot, SnapshotBody};

/// Digest of a snapshot body, as lowercase hex
pub fn compute(body: &SnapshotBody<'_>) -> serde_json::Result<String> {
    let bytes = serde_json::to_vec(body)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Recompute and store the checksum of a snapshot
pub fn seal(snapshot: &mut Snapshot) -> serde_json::Result<()> {
    snapshot.checksum = compute(&snapshot.body())?;
    Ok(())
}

/// Recompute the checksum and compare it with the stored one.
///
/// Returns the recomputed value on mismatch.
pub fn verify(snapshot: &Snapshot) -> serde_json::Result<Result<(), String>> {
    let computed = compute(&snapshot.body())?;
    if computed == snapshot.checksum {
        Ok(Ok(()))
    } else {
        Ok(Err(computed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use tinda_core::{row, ActorId, TableName, Value};

    fn snapshot() -> Snapshot {
        let mut tables = BTreeMap::new();
        tables.insert(
            TableName::Products,
            vec![row! { "product_id" => 1, "name" => "Coke", "unit_price" => 25.0 }],
        );
        let mut s = Snapshot {
            schema_version: 1,
            created_at: Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap(),
            created_by: ActorId::Id(1),
            created_by_name: "alice".into(),
            tables,
            checksum: String::new(),
        };
        seal(&mut s).unwrap();
        s
    }

    #[test]
    fn test_stable_across_runs() {
        let a = snapshot();
        let b = snapshot();
        assert_eq!(a.checksum, b.checksum);
        assert_eq!(a.checksum.len(), 64);
        assert!(verify(&a).unwrap().is_ok());
    }

    #[test]
    fn test_survives_json_round_trip() {
        let s = snapshot();
        let text = serde_json::to_string_pretty(&s).unwrap();
        let parsed: Snapshot = serde_json::from_str(&text).unwrap();
        assert!(verify(&parsed).unwrap().is_ok());
    }

    #[test]
    fn test_any_change_in_tables_is_detected() {
        let mut s = snapshot();
        s.tables.get_mut(&TableName::Products).unwrap()[0]
            .insert("unit_price".into(), Value::Real(25.000001));
        assert!(verify(&s).unwrap().is_err());
    }

    #[test]
    fn test_row_order_matters() {
        let mut s = snapshot();
        let products = s.tables.get_mut(&TableName::Products).unwrap();
        products.push(row! { "product_id" => 2, "name" => "Chips" });
        seal(&mut s).unwrap();
        let before = s.checksum.clone();

        s.tables.get_mut(&TableName::Products).unwrap().reverse();
        seal(&mut s).unwrap();
        assert_ne!(before, s.checksum);
    }

    #[test]
    fn test_metadata_is_covered() {
        let mut s = snapshot();
        s.created_by_name = "mallory".into();
        assert!(verify(&s).unwrap().is_err());
    }
}
