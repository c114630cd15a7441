//! SQLite store repository implementation.
//!
//! Diesel calls are blocking, so each operation runs on Tokio's blocking
//! pool with its own pooled connection. Saves are a single upsert keyed on
//! the id; the unique index on `name` still rejects a second store with a
//! taken name. Updates never insert, so a deleted record stays deleted.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::StoreRow;
use crate::adapter::outbound::sqlite::database::schema::stores;
use crate::domain::{
    AdminPrincipal, DomainError, Endpoint, Lifecycle, OwnerId, Store, StoreId, StoreName,
    StoreStatus,
};
use crate::error::{Error, Result};
use crate::port::outbound::store::StoreRepository;

type Conn = diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>;

/// SQLite-backed store repository.
#[derive(Clone)]
pub struct SqliteStoreRepository {
    pool: DbPool,
}

impl SqliteStoreRepository {
    /// Create a new repository over a migrated connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_conn<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Conn) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| Error::Connection(e.to_string()))?;
            op(&mut conn)
        })
        .await
        .map_err(|e| Error::Database(e.to_string()))?
    }

    fn to_row(store: &Store) -> StoreRow {
        let endpoint = match store.lifecycle() {
            Lifecycle::Ready(endpoint) => Some(endpoint),
            Lifecycle::Provisioning | Lifecycle::Failed => None,
        };
        StoreRow {
            id: store.id().to_string(),
            name: store.name().to_string(),
            status: store.status().as_str().to_string(),
            url: endpoint.map(|e| e.url.clone()),
            admin_user: endpoint.map(|e| e.admin.username.clone()),
            admin_password: endpoint.map(|e| e.admin.password.clone()),
            owner_id: store.owner().to_string(),
            created_at: store
                .created_at()
                .to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }

    fn from_row(row: StoreRow) -> Result<Store> {
        let status: StoreStatus = row.status.parse().map_err(Error::Parse)?;
        let name = StoreName::parse(&row.name)?;
        let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| Error::Parse(e.to_string()))?
            .with_timezone(&Utc);

        let inconsistent = |reason: &'static str| DomainError::InconsistentRecord {
            id: row.id.clone(),
            reason,
        };

        let lifecycle = match (status, row.url, row.admin_user, row.admin_password) {
            (StoreStatus::Ready, Some(url), Some(user), Some(password)) => {
                Lifecycle::Ready(Endpoint {
                    url,
                    admin: AdminPrincipal::new(user, password),
                })
            }
            (StoreStatus::Ready, ..) => {
                return Err(inconsistent("READY without connection details").into())
            }
            (_, None, None, None) if status == StoreStatus::Provisioning => {
                Lifecycle::Provisioning
            }
            (_, None, None, None) => Lifecycle::Failed,
            _ => return Err(inconsistent("connection details on a non-READY store").into()),
        };

        Ok(Store::restore(
            StoreId::from(row.id),
            name,
            lifecycle,
            OwnerId::new(row.owner_id),
            created_at,
        ))
    }
}

/// The id conflict is resolved by the upsert, so a unique violation can
/// only come from the name index.
fn write_error(err: diesel::result::Error, name: &str) -> Error {
    match err {
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DomainError::DuplicateName {
                name: name.to_string(),
            }
            .into()
        }
        other => Error::Database(other.to_string()),
    }
}

#[async_trait]
impl StoreRepository for SqliteStoreRepository {
    async fn save(&self, store: &Store) -> Result<()> {
        let row = Self::to_row(store);
        self.with_conn(move |conn| {
            diesel::insert_into(stores::table)
                .values(&row)
                .on_conflict(stores::id)
                .do_update()
                .set(&row)
                .execute(conn)
                .map_err(|e| write_error(e, &row.name))?;
            Ok(())
        })
        .await
    }

    async fn update(&self, store: &Store) -> Result<bool> {
        let row = Self::to_row(store);
        self.with_conn(move |conn| {
            let updated = diesel::update(stores::table.find(&row.id))
                .set(&row)
                .execute(conn)
                .map_err(|e| write_error(e, &row.name))?;
            Ok(updated > 0)
        })
        .await
    }

    async fn get(&self, id: &StoreId) -> Result<Option<Store>> {
        let id = id.to_string();
        let row = self
            .with_conn(move |conn| {
                stores::table
                    .find(id)
                    .select(StoreRow::as_select())
                    .first::<StoreRow>(conn)
                    .optional()
                    .map_err(|e| Error::Database(e.to_string()))
            })
            .await?;

        row.map(Self::from_row).transpose()
    }

    async fn find_by_name(&self, name: &StoreName) -> Result<Option<Store>> {
        let name = name.to_string();
        let row = self
            .with_conn(move |conn| {
                stores::table
                    .filter(stores::name.eq(name))
                    .select(StoreRow::as_select())
                    .first::<StoreRow>(conn)
                    .optional()
                    .map_err(|e| Error::Database(e.to_string()))
            })
            .await?;

        row.map(Self::from_row).transpose()
    }

    async fn list(&self, owner: Option<&OwnerId>) -> Result<Vec<Store>> {
        let owner = owner.map(ToString::to_string);
        let rows = self
            .with_conn(move |conn| {
                let mut query = stores::table
                    .select(StoreRow::as_select())
                    .order(stores::created_at.desc())
                    .into_boxed();
                if let Some(owner) = owner {
                    query = query.filter(stores::owner_id.eq(owner));
                }
                query
                    .load::<StoreRow>(conn)
                    .map_err(|e| Error::Database(e.to_string()))
            })
            .await?;

        rows.into_iter().map(Self::from_row).collect()
    }

    async fn delete(&self, id: &StoreId) -> Result<bool> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let deleted = diesel::delete(stores::table.find(id))
                .execute(conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(deleted > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
    use crate::testkit::domain;

    fn setup() -> SqliteStoreRepository {
        let pool = create_pool(":memory:").unwrap();
        run_migrations(&pool).unwrap();
        SqliteStoreRepository::new(pool)
    }

    fn endpoint() -> Endpoint {
        Endpoint {
            url: "http://shop.localhost".into(),
            admin: AdminPrincipal::new("user", "password"),
        }
    }

    async fn insert_raw(repo: &SqliteStoreRepository, row: StoreRow) {
        repo.with_conn(move |conn| {
            diesel::insert_into(stores::table)
                .values(&row)
                .execute(conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(())
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn save_and_get_round_trip_each_lifecycle() {
        let repo = setup();
        let mut store = domain::store("shop");

        repo.save(&store).await.unwrap();
        assert_eq!(repo.get(store.id()).await.unwrap().as_ref(), Some(&store));

        store.mark_ready(endpoint());
        repo.save(&store).await.unwrap();
        let ready = repo.get(store.id()).await.unwrap().unwrap();
        assert_eq!(ready.status(), StoreStatus::Ready);
        assert_eq!(ready.endpoint_url(), Some("http://shop.localhost"));

        store.mark_failed();
        repo.save(&store).await.unwrap();
        let failed = repo.get(store.id()).await.unwrap().unwrap();
        assert_eq!(failed.status(), StoreStatus::Failed);
        assert!(failed.admin_principal().is_none());
    }

    #[tokio::test]
    async fn find_by_name_and_delete() {
        let repo = setup();
        let store = domain::store("shop");
        repo.save(&store).await.unwrap();

        let found = repo.find_by_name(store.name()).await.unwrap();
        assert_eq!(found.map(|s| s.id().clone()), Some(store.id().clone()));
        assert!(repo
            .find_by_name(&domain::name("other"))
            .await
            .unwrap()
            .is_none());

        assert!(repo.delete(store.id()).await.unwrap());
        assert!(!repo.delete(store.id()).await.unwrap());
    }

    #[tokio::test]
    async fn list_is_newest_first_and_filters_by_owner() {
        let repo = setup();
        let older = Store::restore(
            StoreId::new(),
            domain::name("older"),
            Lifecycle::Provisioning,
            OwnerId::new("alice"),
            Utc::now() - chrono::Duration::minutes(5),
        );
        let newer = Store::new(domain::name("newer"), OwnerId::new("bob"));
        repo.save(&older).await.unwrap();
        repo.save(&newer).await.unwrap();

        let names: Vec<String> = repo
            .list(None)
            .await
            .unwrap()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["newer", "older"]);

        let alice = repo.list(Some(&OwnerId::new("alice"))).await.unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].id(), older.id());
    }

    #[tokio::test]
    async fn ready_row_without_details_is_rejected() {
        let repo = setup();
        let store = domain::store("shop");
        let mut row = SqliteStoreRepository::to_row(&store);
        row.status = "READY".into();
        insert_raw(&repo, row).await;

        let err = repo.get(store.id()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Domain(DomainError::InconsistentRecord { .. })
        ));
    }

    #[tokio::test]
    async fn failed_row_with_details_is_rejected() {
        let repo = setup();
        let store = domain::store("shop");
        let mut row = SqliteStoreRepository::to_row(&store);
        row.status = "FAILED".into();
        row.url = Some("http://shop.localhost".into());
        insert_raw(&repo, row).await;

        assert!(repo.get(store.id()).await.is_err());
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected_by_the_schema() {
        let repo = setup();
        repo.save(&domain::store("shop")).await.unwrap();

        let result = repo.save(&domain::store("shop")).await;
        assert!(matches!(
            result,
            Err(Error::Domain(DomainError::DuplicateName { ref name })) if name == "shop"
        ));
    }

    #[tokio::test]
    async fn update_does_not_bring_back_a_deleted_store() {
        let repo = setup();
        let mut store = domain::store("shop");
        repo.save(&store).await.unwrap();
        repo.delete(store.id()).await.unwrap();

        store.mark_ready(endpoint());
        assert!(!repo.update(&store).await.unwrap());
        assert!(repo.get(store.id()).await.unwrap().is_none());
        assert!(repo.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_overwrites_an_existing_store() {
        let repo = setup();
        let mut store = domain::store("shop");
        repo.save(&store).await.unwrap();

        store.mark_ready(endpoint());
        assert!(repo.update(&store).await.unwrap());
        let ready = repo.get(store.id()).await.unwrap().unwrap();
        assert_eq!(ready.connection_details().map(|d| d.url), Some("http://shop.localhost".to_string()));

        store.mark_failed();
        assert!(repo.update(&store).await.unwrap());
        let failed = repo.get(store.id()).await.unwrap().unwrap();
        assert!(failed.endpoint_url().is_none());
    }
}
