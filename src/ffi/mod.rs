//! C ABI entry surface. Every call takes a JSON payload and answers with JSON;
//! strings handed out must be released with `training_free_string`.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::str::FromStr;

use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::ffi::error::{ErrorCode, FFIError};
use crate::types::UserRole;

pub mod contact;
pub mod core;
pub mod error;
pub mod event;
pub mod module;
pub mod participant;
pub mod session;
pub mod user;

pub use error::FFIResult;

/// Error handling helper for FFI boundaries (returns error code)
pub fn handle_status_result<F>(func: F) -> c_int
where
    F: FnOnce() -> FFIResult<()>,
{
    match func() {
        Ok(_) => ErrorCode::Success as c_int,
        Err(e) => {
            warn!(
                "FFI call failed: {} ({})",
                e,
                e.details.as_deref().unwrap_or("no details")
            );
            e.code as c_int
        }
    }
}

/// Serialize `Ok(T)` or the `FFIError` to JSON. The returned string is owned by the caller.
pub fn handle_json_result<F, T>(func: F) -> *mut c_char
where
    F: FnOnce() -> FFIResult<T>,
    T: Serialize,
{
    let json_string = match func() {
        Ok(value) => serde_json::to_string(&value),
        Err(ffi_error) => {
            warn!("FFI call failed: {}", ffi_error);
            serde_json::to_string(&ffi_error)
        }
    };

    let final_json = match json_string {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to serialize FFI result: {}", e);
            serde_json::json!({
                "code": ErrorCode::InternalError,
                "message": format!("Failed to serialize result: {}", e),
                "details": null,
            })
            .to_string()
        }
    };

    match CString::new(final_json) {
        Ok(c_string) => c_string.into_raw(),
        Err(e) => {
            error!("Failed to create CString: {}", e);
            std::ptr::null_mut()
        }
    }
}

/// Caller identity carried by every payload
#[derive(Debug, Deserialize)]
pub(crate) struct AuthCtxDto {
    pub user_id: String,
    pub role: String,
}

impl TryFrom<AuthCtxDto> for AuthContext {
    type Error = FFIError;

    fn try_from(v: AuthCtxDto) -> Result<Self, Self::Error> {
        let user_id = Uuid::from_str(&v.user_id)
            .map_err(|_| FFIError::new(ErrorCode::InvalidUuid, &format!("Invalid user_id '{}'", v.user_id)))?;
        let role = UserRole::from_str(&v.role)
            .ok_or_else(|| FFIError::invalid_argument(&format!("Unknown role '{}'", v.role)))?;
        Ok(AuthContext::new(user_id, role))
    }
}

/// Read a UTF-8 C string argument.
pub(crate) unsafe fn read_str<'a>(ptr: *const c_char, name: &str) -> FFIResult<&'a str> {
    if ptr.is_null() {
        return Err(FFIError::null_pointer(name));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| FFIError::new(ErrorCode::InvalidUtf8, &format!("'{}' is not valid UTF-8", name)))
}

/// Decode a JSON payload argument.
pub(crate) unsafe fn parse_payload<T: DeserializeOwned>(ptr: *const c_char) -> FFIResult<T> {
    let json = unsafe { read_str(ptr, "payload_json") }?;
    serde_json::from_str(json).map_err(|e| FFIError::invalid_argument(&format!("Invalid JSON payload: {}", e)))
}

pub(crate) fn parse_uuid(value: &str, field: &str) -> FFIResult<Uuid> {
    Uuid::from_str(value)
        .map_err(|_| FFIError::new(ErrorCode::InvalidUuid, &format!("Invalid UUID for '{}': {}", field, value)))
}

/// Store `value` as JSON in the caller's out pointer.
pub(crate) unsafe fn write_json<T: Serialize>(out: *mut *mut c_char, value: &T) -> FFIResult<()> {
    if out.is_null() {
        return Err(FFIError::null_pointer("result"));
    }
    let json = serde_json::to_string(value)
        .map_err(|e| FFIError::internal(format!("JSON serialization failed: {}", e)))?;
    let c_string = CString::new(json).map_err(|e| FFIError::internal(format!("CString creation failed: {}", e)))?;
    unsafe { *out = c_string.into_raw() };
    Ok(())
}

/// Release a string previously returned by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}
