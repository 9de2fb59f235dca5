// =========================================================================
// MODULE DOMAIN – FFI BINDINGS
// =========================================================================
use crate::auth::AuthContext;
use crate::domains::module::types::{NewModule, UpdateModule};
use crate::ffi::error::FFIError;
use crate::ffi::{handle_status_result, parse_payload, parse_uuid, write_json, AuthCtxDto};
use crate::globals;

use serde::Deserialize;
use std::os::raw::{c_char, c_int};

/// Payload { "new_module": NewModule, "auth": AuthCtxDto }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_module_create(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            new_module: NewModule,
            auth: AuthCtxDto,
        }
        let p: P = parse_payload(payload_json)?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_module_service()?;
        let module = globals::block_on(async { svc.create_module(p.new_module, &auth).await.map_err(FFIError::from) })?;
        write_json(result, &module)
    })
}

/// Payload { "id": "uuid", "update": UpdateModule, "auth": AuthCtxDto }.
/// Setting `event_id` moves the module and its sessions to another event.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_module_update(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            id: String,
            update: UpdateModule,
            auth: AuthCtxDto,
        }
        let p: P = parse_payload(payload_json)?;
        let id = parse_uuid(&p.id, "id")?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_module_service()?;
        let module =
            globals::block_on(async { svc.update_module(id, p.update, &auth).await.map_err(FFIError::from) })?;
        write_json(result, &module)
    })
}

/// Payload { "id": "uuid", "auth": AuthCtxDto }. Deletes the module and its sessions.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_module_delete(payload_json: *const c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            id: String,
            auth: AuthCtxDto,
        }
        let p: P = parse_payload(payload_json)?;
        let id = parse_uuid(&p.id, "id")?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_module_service()?;
        globals::block_on(async { svc.delete_module(id, &auth).await.map_err(FFIError::from) })
    })
}
