// =========================================================================
// USER DOMAIN – FFI BINDINGS
// =========================================================================
use crate::auth::AuthContext;
use crate::domains::user::types::NewUser;
use crate::ffi::error::{FFIError, FFIResult};
use crate::ffi::{handle_json_result, handle_status_result, parse_payload, parse_uuid, write_json, AuthCtxDto};
use crate::globals;

use serde::Deserialize;
use std::os::raw::{c_char, c_int};

#[derive(Deserialize)]
struct AuthOnly {
    auth: AuthCtxDto,
}

/// Payload { "new_user": NewUser, "auth": AuthCtxDto }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_user_create(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            new_user: NewUser,
            auth: AuthCtxDto,
        }
        let p: P = parse_payload(payload_json)?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_user_service()?;
        let user = globals::block_on(async { svc.create_user(p.new_user, &auth).await.map_err(FFIError::from) })?;
        write_json(result, &user)
    })
}

/// Payload { "id": "uuid", "auth": AuthCtxDto }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_user_get(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            id: String,
            auth: AuthCtxDto,
        }
        let p: P = parse_payload(payload_json)?;
        let id = parse_uuid(&p.id, "id")?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_user_service()?;
        let user = globals::block_on(async { svc.get_user(id, &auth).await.map_err(FFIError::from) })?;
        write_json(result, &user)
    })
}

/// Payload { "auth": AuthCtxDto }. Answers with the user list or an error object;
/// the string must be released with `training_free_string`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_user_list(payload_json: *const c_char) -> *mut c_char {
    handle_json_result(|| -> FFIResult<_> {
        let p: AuthOnly = unsafe { parse_payload(payload_json) }?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_user_service()?;
        globals::block_on(async { svc.get_all_users(&auth).await.map_err(FFIError::from) })
    })
}
