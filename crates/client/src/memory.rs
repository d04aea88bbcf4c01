//! In-memory account store with document-store write semantics.
//!
//! The unlock is a relative decrement with no balance guard, the same
//! write a document database offers. Two unlocks in flight can therefore
//! overdraw the balance, which the HTTP API prevents with a conditional
//! update.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use companion_core::credits::{apply_unlock, AccountSnapshot};
use companion_core::gallery::ContentKey;
use companion_core::types::Credits;
use tokio::sync::Mutex;

use crate::error::RemoteError;
use crate::remote::{AccountRemote, RemoteAccount};

#[derive(Debug)]
pub struct MemoryRemote {
    record: Mutex<Option<RemoteAccount>>,
    fail_writes: AtomicBool,
    unlock_calls: AtomicUsize,
}

impl MemoryRemote {
    pub fn new(account: AccountSnapshot) -> Self {
        Self {
            record: Mutex::new(Some(RemoteAccount {
                account,
                is_admin: false,
            })),
            fail_writes: AtomicBool::new(false),
            unlock_calls: AtomicUsize::new(0),
        }
    }

    /// A store holding no record for the session.
    pub fn empty() -> Self {
        Self {
            record: Mutex::new(None),
            fail_writes: AtomicBool::new(false),
            unlock_calls: AtomicUsize::new(0),
        }
    }

    pub async fn set_admin(&self, is_admin: bool) {
        if let Some(record) = self.record.lock().await.as_mut() {
            record.is_admin = is_admin;
        }
    }

    /// Make subsequent unlock writes fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Apply an out-of-band edit, as an admin or payment approval would.
    pub async fn update<F>(&self, edit: F)
    where
        F: FnOnce(&mut AccountSnapshot),
    {
        if let Some(record) = self.record.lock().await.as_mut() {
            edit(&mut record.account);
        }
    }

    pub async fn account(&self) -> Option<AccountSnapshot> {
        self.record.lock().await.as_ref().map(|r| r.account.clone())
    }

    /// Number of unlock writes received, successful or not.
    pub fn unlock_calls(&self) -> usize {
        self.unlock_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountRemote for MemoryRemote {
    async fn fetch_account(&self) -> Result<RemoteAccount, RemoteError> {
        self.record.lock().await.clone().ok_or(RemoteError::Missing)
    }

    async fn debit_and_unlock(&self, key: &ContentKey, cost: Credits) -> Result<(), RemoteError> {
        self.unlock_calls.fetch_add(1, Ordering::SeqCst);
        // Network round trip.
        tokio::task::yield_now().await;

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RemoteError::Rejected {
                status: 503,
                code: "UNAVAILABLE".into(),
                message: "Store is not accepting writes".into(),
            });
        }
        let mut record = self.record.lock().await;
        let record = record.as_mut().ok_or(RemoteError::Missing)?;
        apply_unlock(&mut record.account, key, cost);
        Ok(())
    }
}
