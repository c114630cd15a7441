//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::stores;

/// Database row for a store.
///
/// The connection columns are populated only for READY stores. `None`
/// writes NULL on update so a store leaving READY loses its details.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = stores)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StoreRow {
    pub id: String,
    pub name: String,
    pub status: String,
    pub url: Option<String>,
    pub admin_user: Option<String>,
    pub admin_password: Option<String>,
    pub owner_id: String,
    pub created_at: String,
}
