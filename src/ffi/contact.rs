// =========================================================================
// CONTACT AND ATTACHMENT DIRECTORY – FFI BINDINGS
// =========================================================================
use crate::auth::AuthContext;
use crate::domains::attachment::types::NewAttachment;
use crate::domains::contact::types::{NewContact, UpdateContact};
use crate::ffi::error::FFIError;
use crate::ffi::{handle_status_result, parse_payload, parse_uuid, write_json, AuthCtxDto};
use crate::globals;

use serde::Deserialize;
use std::os::raw::{c_char, c_int};

#[derive(Deserialize)]
struct IdPayload {
    id: String,
    auth: AuthCtxDto,
}

/// Payload { "new_contact": NewContact, "auth": AuthCtxDto }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_contact_create(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            new_contact: NewContact,
            auth: AuthCtxDto,
        }
        let p: P = parse_payload(payload_json)?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_contact_service()?;
        let contact =
            globals::block_on(async { svc.create_contact(p.new_contact, &auth).await.map_err(FFIError::from) })?;
        write_json(result, &contact)
    })
}

/// Payload { "id": "uuid", "auth": AuthCtxDto }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_contact_get(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        let p: IdPayload = parse_payload(payload_json)?;
        let id = parse_uuid(&p.id, "id")?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_contact_service()?;
        let contact = globals::block_on(async { svc.get_contact(id, &auth).await.map_err(FFIError::from) })?;
        write_json(result, &contact)
    })
}

/// Payload { "id": "uuid", "update": UpdateContact, "auth": AuthCtxDto }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_contact_update(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            id: String,
            update: UpdateContact,
            auth: AuthCtxDto,
        }
        let p: P = parse_payload(payload_json)?;
        let id = parse_uuid(&p.id, "id")?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_contact_service()?;
        let contact =
            globals::block_on(async { svc.update_contact(id, p.update, &auth).await.map_err(FFIError::from) })?;
        write_json(result, &contact)
    })
}

/// Payload { "new_attachment": NewAttachment, "auth": AuthCtxDto }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_attachment_create(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            new_attachment: NewAttachment,
            auth: AuthCtxDto,
        }
        let p: P = parse_payload(payload_json)?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_attachment_service()?;
        let attachment = globals::block_on(async {
            svc.create_attachment(p.new_attachment, &auth)
                .await
                .map_err(FFIError::from)
        })?;
        write_json(result, &attachment)
    })
}

/// Payload { "id": "uuid", "auth": AuthCtxDto }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_attachment_get(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        let p: IdPayload = parse_payload(payload_json)?;
        let id = parse_uuid(&p.id, "id")?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_attachment_service()?;
        let attachment = globals::block_on(async { svc.get_attachment(id, &auth).await.map_err(FFIError::from) })?;
        write_json(result, &attachment)
    })
}
