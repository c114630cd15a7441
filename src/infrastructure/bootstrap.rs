//! Composition root for runtime wiring.
//!
//! [`App`] owns the shared lock registry and hands the same repository and
//! launcher to every service, so the CLI and the relay server observe one
//! consistent view of each store.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::process::TokioProcessLauncher;
use crate::adapter::outbound::sqlite::{create_pool, run_migrations, SqliteStoreRepository};
use crate::application::provision::{CredentialSource, Deprovisioner, LockRegistry, Provisioner};
use crate::application::relay::LogRelay;
use crate::application::store::StoreService;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::process::ProcessLauncher;
use crate::port::outbound::store::StoreRepository;

/// Fully wired application services.
pub struct App {
    pub stores: StoreService,
    pub relay: Arc<LogRelay>,
    pub locks: Arc<LockRegistry>,
}

impl App {
    /// Wire the services against SQLite and real `helm`/`kubectl` processes.
    ///
    /// # Errors
    /// Fails if the database cannot be opened or migrated.
    pub fn build(config: &Config) -> Result<Self> {
        let pool = create_pool(&config.database)?;
        run_migrations(&pool)?;
        info!(database = %config.database, "database ready");

        Ok(Self::with_parts(
            config,
            Arc::new(SqliteStoreRepository::new(pool)),
            Arc::new(TokioProcessLauncher::new()),
        ))
    }

    /// Wire the services around the given repository and launcher.
    pub fn with_parts(
        config: &Config,
        repository: Arc<dyn StoreRepository>,
        launcher: Arc<dyn ProcessLauncher>,
    ) -> Self {
        let locks = Arc::new(LockRegistry::new());
        let credentials = CredentialSource::new(
            config.credentials.clone(),
            config.deploy.generate_credentials,
        );

        let provisioner = Arc::new(Provisioner::new(
            Arc::clone(&locks),
            Arc::clone(&launcher),
            Arc::clone(&repository),
            config.deploy.clone(),
            credentials,
            config.server.log_channel_capacity,
        ));
        let deprovisioner = Arc::new(Deprovisioner::new(launcher, config.deploy.clone()));

        Self {
            stores: StoreService::new(Arc::clone(&repository), deprovisioner, Arc::clone(&locks)),
            relay: Arc::new(LogRelay::new(provisioner, repository)),
            locks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OwnerId, StoreStatus};
    use crate::testkit::process::{ProcessScript, ScriptedLauncher};
    use crate::testkit::relay::RecordingSink;
    use crate::testkit::config;

    #[tokio::test]
    async fn build_runs_migrations_on_a_fresh_database() {
        let app = App::build(&config::app_config()).unwrap();

        let store = app.stores.create("shop", OwnerId::new("alice")).await.unwrap();
        assert_eq!(app.stores.get(store.id()).await.unwrap(), store);
    }

    #[tokio::test]
    async fn services_share_one_repository() {
        let pool = create_pool(":memory:").unwrap();
        run_migrations(&pool).unwrap();
        let launcher = Arc::new(ScriptedLauncher::with_scripts(vec![ProcessScript::exit(0)]));
        let app = App::with_parts(
            &config::app_config(),
            Arc::new(SqliteStoreRepository::new(pool)),
            launcher,
        );

        let store = app.stores.create("shop", OwnerId::new("alice")).await.unwrap();
        app.relay.relay(store.id(), &mut RecordingSink::new()).await.unwrap();

        let provisioned = app.stores.get(store.id()).await.unwrap();
        assert_eq!(provisioned.status(), StoreStatus::Ready);
        assert!(app.locks.is_empty());
    }
}
