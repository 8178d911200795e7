//! Shared helpers for WASM API operations
//!
//! Console logging, serialization across the JS boundary, access to the
//! global session, and conversion of JS numbers into positions.

use std::sync::MutexGuard;

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use super::tab::{PENDING_CHANGES, SESSION};
use crate::error::TabError;
use crate::models::position::offset_from_f64;
use crate::models::{Position, Rational};
use crate::session::{Change, TabSession};

// ============================================================================
// Logging Macros
// ============================================================================

/// Log a debug message with [WASM] prefix
#[macro_export]
macro_rules! wasm_log {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_debug(&format!($($arg)*))
    };
}

/// Log an info message with [WASM] prefix
#[macro_export]
macro_rules! wasm_info {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_info(&format!($($arg)*))
    };
}

/// Log a warning message with [WASM] ⚠️ prefix
#[macro_export]
macro_rules! wasm_warn {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_warn(&format!($($arg)*))
    };
}

/// Log an error message with [WASM] ❌ prefix
#[macro_export]
macro_rules! wasm_error {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_error(&format!($($arg)*))
    };
}

pub fn log_debug(msg: &str) {
    web_sys::console::log_1(&format!("[WASM] {}", msg).into());
}

pub fn log_info(msg: &str) {
    web_sys::console::info_1(&format!("[WASM] {}", msg).into());
}

pub fn log_warn(msg: &str) {
    web_sys::console::warn_1(&format!("[WASM] ⚠️ {}", msg).into());
}

pub fn log_error(msg: &str) {
    web_sys::console::error_1(&format!("[WASM] ❌ {}", msg).into());
}

// ============================================================================
// Serialization/Deserialization Helpers
// ============================================================================

/// Deserialize a value from JavaScript with automatic error handling
pub fn deserialize<T: DeserializeOwned>(value: JsValue, error_context: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log_error(&msg);
        JsValue::from_str(&msg)
    })
}

/// Like [`deserialize`], but `undefined`/`null` yield `T::default()`
pub fn deserialize_or_default<T: DeserializeOwned + Default>(
    value: JsValue,
    error_context: &str,
) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        Ok(T::default())
    } else {
        deserialize(value, error_context)
    }
}

/// Serialize a value to JavaScript with automatic error handling
///
/// Maps become plain objects (`{"0": ..., "5": ...}`) rather than JS `Map`s.
pub fn serialize<T: Serialize>(value: &T, error_context: &str) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log_error(&msg);
        JsValue::from_str(&msg)
    })
}

// ============================================================================
// Session Access
// ============================================================================

fn lock_session() -> Result<MutexGuard<'static, Option<TabSession>>, JsValue> {
    SESSION
        .lock()
        .map_err(|e| validation_error(format!("Failed to lock tab: {}", e)))
}

/// Run `f` against the loaded session
pub fn with_session<R>(
    f: impl FnOnce(&mut TabSession) -> Result<R, JsValue>,
) -> Result<R, JsValue> {
    let mut guard = lock_session()?;
    let session = guard
        .as_mut()
        .ok_or_else(|| validation_error("No tab loaded"))?;
    f(session)
}

/// Install `session` as the global one, forwarding its changes to the
/// pending queue drained by `takeChanges`
pub fn install_session(mut session: TabSession) -> Result<(), JsValue> {
    session.subscribe(Box::new(|change: &Change| {
        if let Ok(mut pending) = PENDING_CHANGES.lock() {
            pending.push(*change);
        }
    }));
    *lock_session()? = Some(session);
    Ok(())
}

// ============================================================================
// Position Conversion
// ============================================================================

/// Convert a position for a write. Negative or off-grid values are ignored
/// with a warning, returning `None`.
pub fn write_position(value: f64, context: &str) -> Option<Position> {
    match Position::try_from(value) {
        Ok(position) => Some(position),
        Err(e) => {
            log_warn(&format!("{}: ignoring position {} ({})", context, value, e));
            None
        }
    }
}

/// Convert a position for a read; invalid values are an error
pub fn read_position(value: f64) -> Result<Position, JsValue> {
    Position::try_from(value).map_err(tab_error)
}

/// Convert a signed offset (shift amount, grid subunit)
pub fn offset(value: f64) -> Result<Rational, JsValue> {
    offset_from_f64(value).map_err(tab_error)
}

// ============================================================================
// Result Conversion Helpers
// ============================================================================

/// Convert a core error to a JsValue
pub fn tab_error(err: TabError) -> JsValue {
    validation_error(err.to_string())
}

/// Convert a validation error to a JsValue
pub fn validation_error(msg: impl Into<String>) -> JsValue {
    let msg = msg.into();
    log_error(&msg);
    JsValue::from_str(&msg)
}
