//! # Schema Metadata
//!
//! The shapes of the six persistent tables, declared once as static data.
//!
//! ## Why Data, Not Just SQL
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Consumes This Module                             │
//! │                                                                         │
//! │  migrations/sqlite/001_initial_schema.sql  (authoritative DDL)         │
//! │       │  table/column names must match these descriptors               │
//! │       ▼                                                                 │
//! │  rentledger-db::pool     verifies an opened file actually contains     │
//! │                          these tables before registering it            │
//! │  read-side tooling       resolves foreign keys to display columns      │
//! │                          through Relation (sku → skus.name, ...)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The relation descriptors are the single place that records which column
//! points at which lookup table and which column of it a human wants to see.

// =============================================================================
// Descriptor Types
// =============================================================================

/// A foreign-key relation from a column to a lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    /// The referenced table.
    pub table: &'static str,
    /// The key column in the referenced table.
    pub key: &'static str,
    /// The column shown to humans instead of the raw key.
    pub display: &'static str,
}

/// One column of a persistent table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    /// Set if this column is a foreign key.
    pub relation: Option<Relation>,
}

impl ColumnDef {
    const fn plain(name: &'static str) -> Self {
        ColumnDef {
            name,
            relation: None,
        }
    }

    const fn related(name: &'static str, relation: Relation) -> Self {
        ColumnDef {
            name,
            relation: Some(relation),
        }
    }
}

/// One persistent table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    /// Rows can never be updated or deleted once inserted.
    pub append_only: bool,
    /// The primary key is generated by the store rather than caller-supplied.
    pub generated_key: bool,
}

impl TableDef {
    /// Looks up a column descriptor by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Iterates the foreign-key relations of this table.
    pub fn relations(&self) -> impl Iterator<Item = (&'static str, Relation)> + '_ {
        self.columns
            .iter()
            .filter_map(|c| c.relation.map(|r| (c.name, r)))
    }
}

// =============================================================================
// Table Descriptors
// =============================================================================

pub const CATEGORIES: TableDef = TableDef {
    name: "categories",
    columns: &[
        ColumnDef::plain("id"),
        ColumnDef::plain("name"),
        ColumnDef::plain("notes"),
    ],
    append_only: false,
    generated_key: true,
};

pub const SKUS: TableDef = TableDef {
    name: "skus",
    columns: &[
        ColumnDef::plain("sku"),
        ColumnDef::plain("name"),
        ColumnDef::plain("notes"),
    ],
    append_only: false,
    generated_key: false,
};

pub const INVENTORY: TableDef = TableDef {
    name: "inventory",
    columns: &[
        ColumnDef::plain("inv_nr"),
        ColumnDef::related(
            "sku",
            Relation {
                table: "skus",
                key: "sku",
                display: "name",
            },
        ),
        ColumnDef::related(
            "category",
            Relation {
                table: "categories",
                key: "id",
                display: "name",
            },
        ),
        ColumnDef::plain("img_path"),
        ColumnDef::plain("notes"),
    ],
    append_only: false,
    generated_key: false,
};

pub const CUSTOMERS: TableDef = TableDef {
    name: "customers",
    columns: &[
        ColumnDef::plain("id"),
        ColumnDef::plain("name"),
        ColumnDef::plain("contacts"),
        ColumnDef::plain("notes"),
    ],
    append_only: true,
    generated_key: false,
};

const LEDGER_COLUMNS: &[ColumnDef] = &[
    ColumnDef::plain("id"),
    ColumnDef::plain("time"),
    ColumnDef::related(
        "inv_nr",
        Relation {
            table: "inventory",
            key: "inv_nr",
            display: "notes",
        },
    ),
    ColumnDef::related(
        "customer_id",
        Relation {
            table: "customers",
            key: "id",
            display: "name",
        },
    ),
];

pub const CHECKOUT: TableDef = TableDef {
    name: "checkout",
    columns: LEDGER_COLUMNS,
    append_only: true,
    generated_key: true,
};

pub const CHECKIN: TableDef = TableDef {
    name: "checkin",
    columns: LEDGER_COLUMNS,
    append_only: true,
    generated_key: true,
};

/// Every persistent table, in dependency order.
///
/// An opened file qualifies as a RentLedger store exactly when all of these
/// tables are present.
pub const ALL_TABLES: [&TableDef; 6] = [
    &CATEGORIES,
    &SKUS,
    &INVENTORY,
    &CUSTOMERS,
    &CHECKOUT,
    &CHECKIN,
];

// =============================================================================
// Unit Tests
// =============================================================================
