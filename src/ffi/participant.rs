// =========================================================================
// PARTICIPANT DOMAIN – FFI BINDINGS
// =========================================================================
use crate::auth::AuthContext;
use crate::domains::participant::types::NewParticipant;
use crate::ffi::error::FFIError;
use crate::ffi::{handle_status_result, parse_payload, write_json, AuthCtxDto};
use crate::globals;

use serde::Deserialize;
use std::os::raw::{c_char, c_int};

/// Payload { "new_participant": NewParticipant, "auth": AuthCtxDto }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_participant_create(
    payload_json: *const c_char,
    result: *mut *mut c_char,
) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            new_participant: NewParticipant,
            auth: AuthCtxDto,
        }
        let p: P = parse_payload(payload_json)?;
        let auth: AuthContext = p.auth.try_into()?;
        let svc = globals::get_participant_service()?;
        let participant = globals::block_on(async {
            svc.create_participant(p.new_participant, &auth)
                .await
                .map_err(FFIError::from)
        })?;
        write_json(result, &participant)
    })
}
