//! Account backup and restore flows.

use super::{Effects, no_effects};
use crate::actions::{RestoreFailure, WalletAction};
use crate::environment::WalletEnvironment;
use crate::error::WalletError;
use crate::providers::IdentitySdk;
use crate::state::{BackupRestoreState, WalletState};
use idwallet_core::effect::Effect;
use idwallet_core::environment::Clock;
use idwallet_core::reducer::Reducer;
use idwallet_core::smallvec;
use std::marker::PhantomData;

/// Reducer for creating and restoring account backups.
pub struct BackupReducer<S, C>
where
    S: IdentitySdk + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    _marker: PhantomData<fn() -> (S, C)>,
}

impl<S, C> BackupReducer<S, C>
where
    S: IdentitySdk + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<S, C> Default for BackupReducer<S, C>
where
    S: IdentitySdk + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, C> Clone for BackupReducer<S, C>
where
    S: IdentitySdk + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<S, C> Reducer for BackupReducer<S, C>
where
    S: IdentitySdk + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    type State = WalletState;
    type Action = WalletAction;
    type Environment = WalletEnvironment<S, C>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects {
        match action {
            WalletAction::StartBackup => {
                tracing::info!("Creating account backup");
                state.backup_restore = BackupRestoreState::Processing;

                let sdk = env.sdk.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    match sdk.backup().await {
                        Ok(archive) => Some(WalletAction::BackupCompleted { archive }),
                        Err(e) => Some(WalletAction::BackupFailed {
                            message: e.to_string(),
                        }),
                    }
                }))]
            },

            WalletAction::BackupCompleted { archive } => {
                tracing::info!(bytes = archive.0.len(), "Backup created");
                state.backup_restore = BackupRestoreState::Success;
                no_effects()
            },

            WalletAction::BackupFailed { message } => {
                tracing::error!(%message, "Backup failed");
                state.backup_restore = BackupRestoreState::Error { message };
                no_effects()
            },

            WalletAction::StartRestore { archive } => {
                tracing::info!(bytes = archive.0.len(), "Restoring from backup");
                state.backup_restore = BackupRestoreState::Processing;

                let sdk = env.sdk.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    match sdk.restore(&archive).await {
                        Ok(()) => Some(WalletAction::RestoreCompleted),
                        Err(WalletError::RestoreVerificationFailed) => {
                            Some(WalletAction::RestoreFailed {
                                failure: RestoreFailure::Verification,
                            })
                        },
                        Err(WalletError::RestoreDataRecoveryFailed) => {
                            Some(WalletAction::RestoreFailed {
                                failure: RestoreFailure::DataRecovery,
                            })
                        },
                        Err(e) => Some(WalletAction::RestoreFailed {
                            failure: RestoreFailure::Other {
                                message: e.to_string(),
                            },
                        }),
                    }
                }))]
            },

            WalletAction::RestoreCompleted => {
                tracing::info!("Restore completed");
                state.backup_restore = BackupRestoreState::Success;
                state.registered = true;
                no_effects()
            },

            WalletAction::RestoreFailed { failure } => {
                state.backup_restore = match failure {
                    RestoreFailure::Verification => {
                        tracing::error!("Restore verification failed");
                        BackupRestoreState::VerificationFailed
                    },
                    RestoreFailure::DataRecovery => {
                        tracing::error!("Restore data recovery failed");
                        BackupRestoreState::DataRecoveryFailed
                    },
                    RestoreFailure::Other { message } => {
                        tracing::error!(%message, "Restore failed");
                        BackupRestoreState::Error { message }
                    },
                };
                no_effects()
            },

            other => {
                tracing::debug!(action = ?other, "Action not handled by backup reducer");
                no_effects()
            },
        }
    }
}
