//! API playground: build a request against the developer API, send it with
//! the caller's key, inspect the response, replay it from history or export
//! it as a curl command.

pub mod config;
pub mod curl;
pub mod error;
pub mod executor;
pub mod history;
pub mod inspector;
pub mod model;
pub mod presets;
pub mod request;
pub mod session;
pub mod ui;
pub mod vault;
pub mod view;

pub use config::PlaygroundConfig;
pub use error::{BodyError, PlaygroundError, TransportError};
pub use executor::{Execution, Executor, HttpExecutor, ReqwestTransport, Transport, TransportResponse};
pub use history::{HISTORY_LIMIT, HistoryLog};
pub use model::{CredentialDescriptor, HistoryEntry, HttpMethod, KeyType, ResponseRecord};
pub use request::{OutgoingRequest, RequestState};
pub use session::Playground;
pub use vault::KeyVault;
pub use view::PlaygroundView;
