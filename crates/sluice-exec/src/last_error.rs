//! Process-wide record of the most recent pipeline failure.
//!
//! Creation failures have no pipeline instance to hold their message, so
//! every failure is also recorded here.

use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;

static LAST_ERROR: Lazy<Mutex<Option<String>>> = Lazy::new(|| Mutex::new(None));

fn slot() -> MutexGuard<'static, Option<String>> {
    match LAST_ERROR.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub fn last_error() -> Option<String> {
    slot().clone()
}

pub fn clear_last_error() {
    *slot() = None;
}

pub(crate) fn set_last_error(message: &str) {
    *slot() = Some(message.to_string());
}
