use common::{FieldValue, ListingRow, Security, Snapshot};

use crate::schema::{ResolvedField, MARKET_LABEL, SECTOR_LABEL};

/// Attach the optional fundamental fields of `row` to `snapshot`.
///
/// Unresolved fields and empty cells carry `FieldValue::NotAvailable`, so every
/// snapshot of a run has the same fields in the same order.
pub fn merge(mut snapshot: Snapshot, row: &ListingRow, fields: &[ResolvedField]) -> Snapshot {
    snapshot.fundamentals.extend(fields.iter().map(|field| {
        let value = field
            .column
            .as_deref()
            .and_then(|column| row.get(column));
        (field.label.clone(), FieldValue::from(value))
    }));
    snapshot
}

/// Append the security's sector and market segment after its fundamentals.
pub fn merge_metadata(mut snapshot: Snapshot, security: &Security) -> Snapshot {
    snapshot.fundamentals.extend([
        (SECTOR_LABEL.to_string(), FieldValue::from(security.sector.as_deref())),
        (MARKET_LABEL.to_string(), FieldValue::from(security.market.as_deref())),
    ]);
    snapshot
}
