//! Device identity provider
//!
//! Lazily creates and persists a unique device identifier. Every request the
//! client makes carries it.
//!
//! Two concurrent first-launch calls can each generate an id before either
//! write lands; the store is last-write-wins, so the persisted value converges
//! but the two callers may briefly disagree.

use std::sync::Arc;

use rand::Rng;
use snapi_domain::constants::{DEVICE_ID_KEY, DEVICE_ID_PREFIX};
use tracing::{debug, info, warn};

use crate::storage::{SecureStore, StorageResult};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_SUFFIX_LEN: usize = 8;

/// Provides the stable per-install device identifier
#[derive(Clone)]
pub struct DeviceIdentityProvider {
    store: Arc<dyn SecureStore>,
}

impl DeviceIdentityProvider {
    pub fn new(store: Arc<dyn SecureStore>) -> Self {
        Self { store }
    }

    /// Return the persisted device id, creating it on first use.
    ///
    /// Never fails: when the store cannot be read or written, a fresh
    /// unpersisted id is returned for this call only.
    pub async fn device_id(&self) -> String {
        match self.load_or_create().await {
            Ok(id) => id,
            Err(err) => {
                warn!(error = %err, "device id store unavailable, using ephemeral id");
                generate_device_id()
            }
        }
    }

    async fn load_or_create(&self) -> StorageResult<String> {
        if let Some(existing) = self.store.get(DEVICE_ID_KEY).await? {
            if !existing.is_empty() {
                return Ok(existing);
            }
        }

        let id = generate_device_id();
        self.store.set(DEVICE_ID_KEY, &id).await?;
        info!(device_id = %id, "generated new device id");
        Ok(id)
    }
}

/// Generate `snapi-<unix millis base36>-<8 random base36 chars>`.
#[must_use]
pub fn generate_device_id() -> String {
    let millis = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..RANDOM_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();

    let id = format!("{DEVICE_ID_PREFIX}-{}-{suffix}", to_base36(millis));
    debug!(device_id = %id, "device id generated");
    id
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
