use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TindaError;

/// The fixed set of tables held by the store.
///
/// Variants are declared in foreign-key dependency order: a table only
/// references tables declared before it. The derived `Ord` follows that
/// order, so a `BTreeMap<TableName, _>` iterates parents before children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    Users,
    Suppliers,
    Categories,
    Products,
    ProductUnits,
    Inventory,
    ResuppliedItems,
    Sales,
    SaleItems,
    StockCard,
    /// Audit trail of backup and restore actions
    Backup,
}

impl TableName {
    /// Every table, parents first.
    pub const ALL: [TableName; 11] = [
        TableName::Users,
        TableName::Suppliers,
        TableName::Categories,
        TableName::Products,
        TableName::ProductUnits,
        TableName::Inventory,
        TableName::ResuppliedItems,
        TableName::Sales,
        TableName::SaleItems,
        TableName::StockCard,
        TableName::Backup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Users => "users",
            TableName::Suppliers => "suppliers",
            TableName::Categories => "categories",
            TableName::Products => "products",
            TableName::ProductUnits => "product_units",
            TableName::Inventory => "inventory",
            TableName::ResuppliedItems => "resupplied_items",
            TableName::Sales => "sales",
            TableName::SaleItems => "sale_items",
            TableName::StockCard => "stock_card",
            TableName::Backup => "backup",
        }
    }

    /// Primary key column of the table
    pub fn primary_key(&self) -> &'static str {
        match self {
            TableName::Users => "user_id",
            TableName::Suppliers => "supplier_id",
            TableName::Categories => "category_id",
            TableName::Products => "product_id",
            TableName::ProductUnits => "unit_id",
            TableName::Inventory => "inventory_id",
            TableName::ResuppliedItems => "resupplied_items_id",
            TableName::Sales => "sales_id",
            TableName::SaleItems => "sales_items_id",
            TableName::StockCard => "stock_card_id",
            TableName::Backup => "backup_id",
        }
    }

    /// The audit table is never cleared or overwritten by a restore.
    pub fn is_audit(&self) -> bool {
        matches!(self, TableName::Backup)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableName {
    type Err = TindaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| TindaError::InvalidState(format!("Unknown table: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_puts_parents_first() {
        assert!(TableName::Suppliers < TableName::Products);
        assert!(TableName::Categories < TableName::Products);
        assert!(TableName::Products < TableName::Inventory);
        assert!(TableName::Sales < TableName::SaleItems);
        assert!(TableName::SaleItems < TableName::StockCard);
    }

    #[test]
    fn test_serde_names_match_as_str() {
        for table in TableName::ALL {
            let json = serde_json::to_string(&table).unwrap();
            assert_eq!(json, format!("\"{}\"", table.as_str()));
            assert_eq!(table.as_str().parse::<TableName>().unwrap(), table);
        }
    }

    #[test]
    fn test_unknown_name_rejected() {
        assert!("reports".parse::<TableName>().is_err());
        assert!(serde_json::from_str::<TableName>("\"reports\"").is_err());
    }
}
