//! The playground session: the one place the components meet.

use std::rc::Rc;

use anyhow::Result;
use devportal_core::db::SessionStore;
use tokio_util::sync::CancellationToken;

use crate::curl;
use crate::error::PlaygroundError;
use crate::executor::{self, Execution, Executor};
use crate::history::HistoryLog;
use crate::model::{CredentialDescriptor, ResponseRecord};
use crate::presets::Preset;
use crate::request::{OutgoingRequest, RequestState};
use crate::vault::KeyVault;

/// Owns the request being edited, the credential, the history and the
/// single current response.
#[derive(Debug)]
pub struct Playground {
    pub request: RequestState,
    pub vault: KeyVault,
    pub history: HistoryLog,
    descriptors: Vec<CredentialDescriptor>,
    current: Option<ResponseRecord>,
    in_flight: bool,
    missing_credential: bool,
}

impl Playground {
    /// Fresh session. The credential is restored from `store` if present.
    pub fn new(
        base_url: impl Into<String>,
        descriptors: Vec<CredentialDescriptor>,
        store: Rc<SessionStore>,
    ) -> Result<Self> {
        Ok(Self {
            request: RequestState::new(base_url),
            vault: KeyVault::restore(store)?,
            history: HistoryLog::new(),
            descriptors,
            current: None,
            in_flight: false,
            missing_credential: false,
        })
    }

    pub fn descriptors(&self) -> &[CredentialDescriptor] {
        &self.descriptors
    }

    pub fn matched_descriptor(&self) -> Option<&CredentialDescriptor> {
        self.vault.matched(&self.descriptors)
    }

    pub fn set_credential(&mut self, value: &str) -> Result<()> {
        self.vault.set_raw_credential(value)?;
        self.missing_credential = false;
        Ok(())
    }

    pub fn clear_credential(&mut self) -> Result<()> {
        self.vault.clear()
    }

    /// Whether the last submission was refused for lack of a credential.
    pub fn missing_credential(&self) -> bool {
        self.missing_credential
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn current_response(&self) -> Option<&ResponseRecord> {
        self.current.as_ref()
    }

    pub fn apply_preset(&mut self, preset: &Preset) {
        self.request.apply_preset(preset);
    }

    /// Replay a history entry into the request being edited.
    pub fn replay(&mut self, entry_id: u64) -> bool {
        match self.history.get(entry_id).cloned() {
            Some(entry) => {
                HistoryLog::replay_into(&mut self.request, &entry);
                true
            }
            None => false,
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn curl(&self) -> String {
        curl::to_curl(&self.request, &self.vault)
    }

    /// Snapshot the request and mark it in flight.
    ///
    /// Refused while another request runs, or without a credential. Neither
    /// refusal changes any other state.
    pub fn begin(&mut self) -> Result<OutgoingRequest, PlaygroundError> {
        if self.in_flight {
            return Err(PlaygroundError::AlreadyInFlight);
        }
        match executor::prepare(&self.request, &self.vault) {
            Ok(request) => {
                self.missing_credential = false;
                self.in_flight = true;
                Ok(request)
            }
            Err(err) => {
                if err == PlaygroundError::MissingCredential {
                    tracing::debug!("send refused: no API key set");
                    self.missing_credential = true;
                }
                Err(err)
            }
        }
    }

    /// Drop the in-flight mark of a request that was never handed to a worker.
    pub fn abandon(&mut self) {
        self.in_flight = false;
    }

    /// Record a finished execution. Returns the new history entry's id.
    pub fn complete(&mut self, execution: Execution) -> u64 {
        let id = execution.entry.id;
        self.in_flight = false;
        self.current = Some(execution.response);
        self.history.push(execution.entry);
        id
    }

    /// Begin, run and complete in one step.
    pub async fn execute(
        &mut self,
        executor: &Executor,
        cancel: CancellationToken,
    ) -> Result<u64, PlaygroundError> {
        let request = self.begin()?;
        let execution = executor.run(request, cancel).await;
        Ok(self.complete(execution))
    }
}
