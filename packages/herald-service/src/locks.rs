use std::{
	collections::HashMap,
	sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-issue async mutexes. Holding the guard for an issue id serializes centroid
/// read-modify-write cycles on that issue within this process.
#[derive(Default)]
pub struct IssueLocks {
	locks: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}
impl IssueLocks {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn lock(&self, issue_id: i64) -> OwnedMutexGuard<()> {
		let lock = {
			let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);

			// Entries nobody holds or waits on are only referenced by the map.
			locks.retain(|_, lock| Arc::strong_count(lock) > 1);

			Arc::clone(locks.entry(issue_id).or_default())
		};

		lock.lock_owned().await
	}

	pub fn len(&self) -> usize {
		self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
