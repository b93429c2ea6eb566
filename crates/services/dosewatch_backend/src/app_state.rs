// --- File: crates/services/dosewatch_backend/src/app_state.rs ---
use dosewatch_common::{config_error, DoseWatchError};
use dosewatch_config::AppConfig;
use dosewatch_db::DbClient;
use dosewatch_reminders::ReminderContext;
use std::sync::Arc;
use tracing::info;

use crate::service_factory::DoseWatchServiceFactory;

#[cfg(feature = "push")]
use {
    dosewatch_db::{
        PushSubscriptionRepository, SqlPushSubscriptionRepository, SqlVapidKeyRepository,
        VapidKeyRepository,
    },
    dosewatch_push::{resolve_vapid_keys, PushState},
};

/// Everything the routers and the scheduler share, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub db: DbClient,
    pub reminders: Arc<ReminderContext>,
    #[cfg(feature = "push")]
    pub push: Arc<PushState>,
}

impl AppState {
    /// Opens the database, creates missing tables, resolves the VAPID key
    /// pair and wires the enabled channel senders into the reminder context.
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, DoseWatchError> {
        let db = DbClient::new(&config).await?;

        #[allow(unused_mut)]
        let mut factory = DoseWatchServiceFactory::new(&config);

        #[cfg(feature = "push")]
        let push = {
            let vapid_repository = SqlVapidKeyRepository::new(db.clone());
            vapid_repository.init_schema().await?;
            let subscriptions = SqlPushSubscriptionRepository::new(db.clone());
            subscriptions.init_schema().await?;

            let keys = resolve_vapid_keys(config.push.as_ref(), &vapid_repository)
                .await
                .map_err(config_error)?;
            factory = factory.with_push(&config, keys.as_ref());

            Arc::new(PushState {
                subscriptions,
                vapid_public_key: keys.map(|k| k.public_key),
            })
        };

        let reminders = ReminderContext::from_config(
            db.clone(),
            &factory,
            &config.reminders,
            config.push.as_ref(),
        )?;
        reminders.init_schema().await?;
        info!("Database schema ready");

        Ok(Self {
            db,
            reminders: Arc::new(reminders),
            #[cfg(feature = "push")]
            push,
        })
    }
}
