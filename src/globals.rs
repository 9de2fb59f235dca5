use crate::config::Settings;
use crate::database;
use crate::domains::attachment::{AttachmentRepository, AttachmentService, AttachmentServiceImpl, SqliteAttachmentRepository};
use crate::domains::contact::{ContactRepository, ContactService, ContactServiceImpl, SqliteContactRepository};
use crate::domains::event::{CodeSequence, EventRepository, EventService, EventServiceImpl, SqliteCodeSequence, SqliteEventRepository};
use crate::domains::export::{ExportService, ExportServiceImpl};
use crate::domains::module::{ModuleRepository, ModuleService, ModuleServiceImpl, SqliteModuleRepository};
use crate::domains::participant::{ParticipantRepository, ParticipantService, ParticipantServiceImpl, SqliteParticipantRepository};
use crate::domains::session::{SessionRepository, SessionService, SessionServiceImpl, SqliteSessionRepository};
use crate::domains::user::{SqliteUserRepository, UserRepository, UserService, UserServiceImpl};
use crate::ffi::error::{FFIError, FFIResult};
use lazy_static::lazy_static;
use log::info;
use sqlx::SqlitePool;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::runtime::Runtime;

/// Every service of the crate wired against one pool.
#[derive(Clone)]
pub struct Services {
    pub pool: SqlitePool,
    pub users: Arc<dyn UserService>,
    pub contacts: Arc<dyn ContactService>,
    pub attachments: Arc<dyn AttachmentService>,
    pub events: Arc<dyn EventService>,
    pub modules: Arc<dyn ModuleService>,
    pub sessions: Arc<dyn SessionService>,
    pub participants: Arc<dyn ParticipantService>,
    pub export: Arc<dyn ExportService>,
}

impl Services {
    /// Build repositories and services over an already migrated pool.
    pub fn build(pool: SqlitePool, settings: &Settings) -> Self {
        let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(pool.clone()));
        let contact_repo: Arc<dyn ContactRepository> = Arc::new(SqliteContactRepository::new(pool.clone()));
        let attachment_repo: Arc<dyn AttachmentRepository> =
            Arc::new(SqliteAttachmentRepository::new(pool.clone()));
        let event_repo: Arc<dyn EventRepository> = Arc::new(SqliteEventRepository::new(pool.clone()));
        let module_repo: Arc<dyn ModuleRepository> = Arc::new(SqliteModuleRepository::new(pool.clone()));
        let session_repo: Arc<dyn SessionRepository> = Arc::new(SqliteSessionRepository::new(pool.clone()));
        let participant_repo: Arc<dyn ParticipantRepository> =
            Arc::new(SqliteParticipantRepository::new(pool.clone()));
        let code_sequence: Arc<dyn CodeSequence> = Arc::new(SqliteCodeSequence::new(
            settings.event_code_prefix.clone(),
            settings.event_code_padding,
        ));

        Self {
            users: Arc::new(UserServiceImpl::new(user_repo.clone())),
            contacts: Arc::new(ContactServiceImpl::new(contact_repo)),
            attachments: Arc::new(AttachmentServiceImpl::new(attachment_repo.clone())),
            events: Arc::new(EventServiceImpl::new(
                pool.clone(),
                event_repo.clone(),
                module_repo.clone(),
                session_repo.clone(),
                participant_repo.clone(),
                code_sequence,
            )),
            modules: Arc::new(ModuleServiceImpl::new(
                pool.clone(),
                module_repo.clone(),
                event_repo.clone(),
                session_repo.clone(),
            )),
            sessions: Arc::new(SessionServiceImpl::new(
                pool.clone(),
                session_repo.clone(),
                module_repo.clone(),
                user_repo.clone(),
                attachment_repo,
            )),
            participants: Arc::new(ParticipantServiceImpl::new(participant_repo.clone(), user_repo)),
            export: Arc::new(ExportServiceImpl::new(event_repo, module_repo, session_repo, participant_repo)),
            pool,
        }
    }

    /// Open the configured database, migrate it and build the services.
    pub async fn connect(settings: &Settings) -> FFIResult<Self> {
        let pool = database::connect_and_migrate(settings).await?;
        Ok(Self::build(pool, settings))
    }
}

// Global state definitions
lazy_static! {
    static ref INIT_MUTEX: tokio::sync::Mutex<()> = tokio::sync::Mutex::new(());
    static ref INITIALIZED: AtomicBool = AtomicBool::new(false);

    // The pool is bound to the runtime that opened it, so every FFI call runs here.
    static ref RUNTIME: std::io::Result<Runtime> = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("training-core")
        .build();

    static ref DB_POOL: Mutex<Option<SqlitePool>> = Mutex::new(None);
    static ref USER_SERVICE: Mutex<Option<Arc<dyn UserService>>> = Mutex::new(None);
    static ref CONTACT_SERVICE: Mutex<Option<Arc<dyn ContactService>>> = Mutex::new(None);
    static ref ATTACHMENT_SERVICE: Mutex<Option<Arc<dyn AttachmentService>>> = Mutex::new(None);
    static ref EVENT_SERVICE: Mutex<Option<Arc<dyn EventService>>> = Mutex::new(None);
    static ref MODULE_SERVICE: Mutex<Option<Arc<dyn ModuleService>>> = Mutex::new(None);
    static ref SESSION_SERVICE: Mutex<Option<Arc<dyn SessionService>>> = Mutex::new(None);
    static ref PARTICIPANT_SERVICE: Mutex<Option<Arc<dyn ParticipantService>>> = Mutex::new(None);
    static ref EXPORT_SERVICE: Mutex<Option<Arc<dyn ExportService>>> = Mutex::new(None);
}

/// Run a future to completion on the shared runtime.
pub fn block_on<F, T>(future: F) -> FFIResult<T>
where
    F: Future<Output = FFIResult<T>>,
{
    let runtime = RUNTIME
        .as_ref()
        .map_err(|e| FFIError::internal(format!("Tokio runtime unavailable: {}", e)))?;
    runtime.block_on(future)
}

pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

// --- Getter Functions ---

pub fn get_db_pool() -> FFIResult<SqlitePool> {
    DB_POOL.lock().map_err(|_| FFIError::internal("DB_POOL lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::not_initialized("Database pool"))
}
pub fn get_user_service() -> FFIResult<Arc<dyn UserService>> {
    USER_SERVICE.lock().map_err(|_| FFIError::internal("USER_SERVICE lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::not_initialized("UserService"))
}
pub fn get_contact_service() -> FFIResult<Arc<dyn ContactService>> {
    CONTACT_SERVICE.lock().map_err(|_| FFIError::internal("CONTACT_SERVICE lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::not_initialized("ContactService"))
}
pub fn get_attachment_service() -> FFIResult<Arc<dyn AttachmentService>> {
    ATTACHMENT_SERVICE.lock().map_err(|_| FFIError::internal("ATTACHMENT_SERVICE lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::not_initialized("AttachmentService"))
}
pub fn get_event_service() -> FFIResult<Arc<dyn EventService>> {
    EVENT_SERVICE.lock().map_err(|_| FFIError::internal("EVENT_SERVICE lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::not_initialized("EventService"))
}
pub fn get_module_service() -> FFIResult<Arc<dyn ModuleService>> {
    MODULE_SERVICE.lock().map_err(|_| FFIError::internal("MODULE_SERVICE lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::not_initialized("ModuleService"))
}
pub fn get_session_service() -> FFIResult<Arc<dyn SessionService>> {
    SESSION_SERVICE.lock().map_err(|_| FFIError::internal("SESSION_SERVICE lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::not_initialized("SessionService"))
}
pub fn get_participant_service() -> FFIResult<Arc<dyn ParticipantService>> {
    PARTICIPANT_SERVICE.lock().map_err(|_| FFIError::internal("PARTICIPANT_SERVICE lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::not_initialized("ParticipantService"))
}
pub fn get_export_service() -> FFIResult<Arc<dyn ExportService>> {
    EXPORT_SERVICE.lock().map_err(|_| FFIError::internal("EXPORT_SERVICE lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::not_initialized("ExportService"))
}

/// Initialize global services. Later calls are no-ops once one has succeeded.
pub async fn initialize(settings: &Settings) -> FFIResult<()> {
    let _guard = INIT_MUTEX.lock().await;

    if INITIALIZED.load(Ordering::Acquire) {
        return Ok(());
    }

    let result = initialize_internal(settings).await;

    if result.is_ok() {
        INITIALIZED.store(true, Ordering::Release);
    }

    result
}

async fn initialize_internal(settings: &Settings) -> FFIResult<()> {
    info!("Initializing training core against {}", settings.database_url);
    let services = Services::connect(settings).await?;
    install(services)?;
    info!("Training core initialized");
    Ok(())
}

fn install(services: Services) -> FFIResult<()> {
    *DB_POOL.lock().map_err(|_| FFIError::internal("DB_POOL lock poisoned".to_string()))? = Some(services.pool);
    *USER_SERVICE.lock().map_err(|_| FFIError::internal("USER_SERVICE lock poisoned".to_string()))? = Some(services.users);
    *CONTACT_SERVICE.lock().map_err(|_| FFIError::internal("CONTACT_SERVICE lock poisoned".to_string()))? = Some(services.contacts);
    *ATTACHMENT_SERVICE.lock().map_err(|_| FFIError::internal("ATTACHMENT_SERVICE lock poisoned".to_string()))? = Some(services.attachments);
    *EVENT_SERVICE.lock().map_err(|_| FFIError::internal("EVENT_SERVICE lock poisoned".to_string()))? = Some(services.events);
    *MODULE_SERVICE.lock().map_err(|_| FFIError::internal("MODULE_SERVICE lock poisoned".to_string()))? = Some(services.modules);
    *SESSION_SERVICE.lock().map_err(|_| FFIError::internal("SESSION_SERVICE lock poisoned".to_string()))? = Some(services.sessions);
    *PARTICIPANT_SERVICE.lock().map_err(|_| FFIError::internal("PARTICIPANT_SERVICE lock poisoned".to_string()))? = Some(services.participants);
    *EXPORT_SERVICE.lock().map_err(|_| FFIError::internal("EXPORT_SERVICE lock poisoned".to_string()))? = Some(services.export);
    Ok(())
}
