use crate::auth::AuthContext;
use crate::domains::event::repository::EventRepository;
use crate::domains::export::report::{EventReport, SessionLine};
use crate::domains::export::types::{EventReportFile, XLSX_MIME_TYPE};
use crate::domains::module::repository::ModuleRepository;
use crate::domains::participant::repository::ParticipantRepository;
use crate::domains::permission::Permission;
use crate::domains::session::repository::SessionRepository;
use crate::errors::{DomainError, ServiceError, ServiceResult};
use async_trait::async_trait;
use chrono::Utc;
use log::info;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

/// Trait defining report export operations
#[async_trait]
pub trait ExportService: Send + Sync {
    /// Build the xlsx workbook describing an event's programme.
    async fn export_event_report(&self, event_id: Uuid, auth: &AuthContext) -> ServiceResult<EventReportFile>;
}

/// Implementation of the export service
#[derive(Clone)]
pub struct ExportServiceImpl {
    event_repo: Arc<dyn EventRepository>,
    module_repo: Arc<dyn ModuleRepository>,
    session_repo: Arc<dyn SessionRepository>,
    participant_repo: Arc<dyn ParticipantRepository>,
}

impl ExportServiceImpl {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        module_repo: Arc<dyn ModuleRepository>,
        session_repo: Arc<dyn SessionRepository>,
        participant_repo: Arc<dyn ParticipantRepository>,
    ) -> Self {
        Self {
            event_repo,
            module_repo,
            session_repo,
            participant_repo,
        }
    }

    async fn collect(&self, event_id: Uuid, auth: &AuthContext) -> ServiceResult<EventReport> {
        let event = self.event_repo.find_by_id(event_id).await?;
        if let Some(user_id) = auth.trainer_scope() {
            if !self.event_repo.has_trainer_session(event_id, user_id).await? {
                return Err(ServiceError::PermissionDenied(
                    "Trainers may only export events with an assigned session".to_string(),
                ));
            }
        }
        let counts = self.event_repo.counts(event_id).await?;

        let mut modules = Vec::new();
        let mut module_names = HashMap::new();
        for module in self.module_repo.find_by_event(event_id, false).await? {
            let session_count = self.module_repo.session_count(module.id).await?;
            module_names.insert(module.id, module.name.clone());
            modules.push((module, session_count));
        }

        let mut sessions = Vec::new();
        for session in self
            .session_repo
            .find_by_event(event_id, false, auth.trainer_scope())
            .await?
        {
            let trainer_names = self.session_repo.trainer_names(session.id).await?;
            sessions.push(SessionLine {
                module_name: module_names.get(&session.module_id).cloned().unwrap_or_default(),
                session,
                trainer_names,
            });
        }

        let participants = self.participant_repo.find_by_event(event_id).await?;

        Ok(EventReport {
            event,
            counts,
            modules,
            sessions,
            participants,
        })
    }
}

#[async_trait]
impl ExportService for ExportServiceImpl {
    async fn export_event_report(&self, event_id: Uuid, auth: &AuthContext) -> ServiceResult<EventReportFile> {
        auth.authorize(Permission::ExportEvents)?;

        let report = self.collect(event_id, auth).await?;
        let filename = EventReportFile::filename_for(&report.event.code, Utc::now().naive_utc());
        let (module_count, session_count) = (report.modules.len(), report.sessions.len());

        // blocking: deflate runs on the blocking pool
        let bytes = task::spawn_blocking(move || report.to_xlsx())
            .await
            .map_err(|e| DomainError::Report(format!("Workbook task failed: {}", e)))??;

        info!(
            "Exported event {} to {} ({} modules, {} sessions, {} bytes)",
            event_id,
            filename,
            module_count,
            session_count,
            bytes.len()
        );

        Ok(EventReportFile {
            filename,
            mime_type: XLSX_MIME_TYPE.to_string(),
            bytes,
        })
    }
}
