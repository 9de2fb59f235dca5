// =========================================================================
// EVENT DOMAIN – FFI BINDINGS
// =========================================================================
use crate::auth::AuthContext;
use crate::domains::event::types::{CloneEventRequest, NewEvent};
use crate::ffi::error::FFIError;
use crate::ffi::{handle_status_result, parse_payload, parse_uuid, write_json, AuthCtxDto};
use crate::globals;

use log::debug;
use serde::{Deserialize, Serialize};
use std::os::raw::{c_char, c_int};
use uuid::Uuid;

#[derive(Deserialize)]
struct IdPayload {
    id: String,
    auth: AuthCtxDto,
}

#[derive(Serialize)]
struct ClonedEvent {
    id: Uuid,
}

#[derive(Serialize)]
struct ExportedReport {
    filename: String,
    mime_type: String,
    data_url: String,
}

/// Payload { "new_event": NewEvent, "auth": AuthCtxDto }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_event_create(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            new_event: NewEvent,
            auth: AuthCtxDto,
        }
        let p: P = parse_payload(payload_json)?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_event_service()?;
        let created = globals::block_on(async { svc.create_event(p.new_event, &auth).await.map_err(FFIError::from) })?;
        write_json(result, &created)
    })
}

/// Payload { "id": "uuid", "auth": AuthCtxDto }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_event_get(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        let p: IdPayload = parse_payload(payload_json)?;
        let id = parse_uuid(&p.id, "id")?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_event_service()?;
        let event = globals::block_on(async { svc.get_event(id, &auth).await.map_err(FFIError::from) })?;
        write_json(result, &event)
    })
}

/// Payload { "request": CloneEventRequest, "auth": AuthCtxDto }; answers { "id": "uuid" }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_event_clone(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            request: CloneEventRequest,
            auth: AuthCtxDto,
        }
        let p: P = parse_payload(payload_json)?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_event_service()?;
        let id = globals::block_on(async { svc.clone_event(p.request, &auth).await.map_err(FFIError::from) })?;
        write_json(result, &ClonedEvent { id })
    })
}

/// Payload { "id": "uuid", "auth": AuthCtxDto }; answers { filename, mime_type, data_url }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_event_export(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        let p: IdPayload = parse_payload(payload_json)?;
        let id = parse_uuid(&p.id, "id")?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_export_service()?;
        let file = globals::block_on(async { svc.export_event_report(id, &auth).await.map_err(FFIError::from) })?;
        debug!("Encoding {} ({} bytes) for the caller", file.filename, file.bytes.len());
        write_json(
            result,
            &ExportedReport {
                data_url: file.data_url(),
                filename: file.filename,
                mime_type: file.mime_type,
            },
        )
    })
}

/// Payload { "id": "uuid", "auth": AuthCtxDto }; answers the day groups
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_event_sessions_by_day(
    payload_json: *const c_char,
    result: *mut *mut c_char,
) -> c_int {
    handle_status_result(|| unsafe {
        let p: IdPayload = parse_payload(payload_json)?;
        let id = parse_uuid(&p.id, "id")?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_event_service()?;
        let groups = globals::block_on(async { svc.sessions_grouped_by_day(id, &auth).await.map_err(FFIError::from) })?;
        write_json(result, &groups)
    })
}
