// =========================================================================
// SESSION DOMAIN – FFI BINDINGS
// =========================================================================
use crate::auth::AuthContext;
use crate::domains::session::types::{NewSession, UpdateSession};
use crate::ffi::error::FFIError;
use crate::ffi::{handle_status_result, parse_payload, parse_uuid, write_json, AuthCtxDto};
use crate::globals;

use serde::Deserialize;
use std::os::raw::{c_char, c_int};

/// Payload { "new_session": NewSession, "auth": AuthCtxDto }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_session_create(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            new_session: NewSession,
            auth: AuthCtxDto,
        }
        let p: P = parse_payload(payload_json)?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_session_service()?;
        let session = globals::block_on(async { svc.create_session(p.new_session, &auth).await.map_err(FFIError::from) })?;
        write_json(result, &session)
    })
}

/// Payload { "id": "uuid", "update": UpdateSession, "auth": AuthCtxDto }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_session_update(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            id: String,
            update: UpdateSession,
            auth: AuthCtxDto,
        }
        let p: P = parse_payload(payload_json)?;
        let id = parse_uuid(&p.id, "id")?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_session_service()?;
        let session = globals::block_on(async { svc.update_session(id, p.update, &auth).await.map_err(FFIError::from) })?;
        write_json(result, &session)
    })
}
