//! Application wiring.
//!
//! Everything a command needs is built once here at start-up and passed in,
//! so tests can assemble the same context around local fakes.

use std::sync::Arc;

use anyhow::{bail, Context as _};
use gastro_advisor::{AdvisorConfig, FoodAdvisor};
use gastro_model::GUEST_USER_ID;
use gastro_store::{DataGateway, GuestSymptomStore, RealtimeClient, SymptomRepository};
use tracing::info;

use crate::config::Args;

/// Who is using the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// No account; symptoms stay on this machine
    Guest,
    Authenticated { user_id: String },
}

impl Session {
    /// Owner id for symptom records.
    pub fn user_id(&self) -> &str {
        match self {
            Session::Guest => GUEST_USER_ID,
            Session::Authenticated { user_id } => user_id,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Session::Guest)
    }
}

/// Dependencies shared by all commands.
pub struct AppContext {
    pub session: Session,
    pub gateway: DataGateway,
    /// Guest store or remote table, depending on the session
    pub symptoms: Arc<dyn SymptomRepository>,
    pub advisor: AdvisorConfig,
}

impl AppContext {
    /// Build the context from validated arguments.
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let gateway = DataGateway::new(args.backend_config()).context("Failed to create backend client")?;
        let session = args.session();
        let symptoms: Arc<dyn SymptomRepository> = match &session {
            Session::Guest => Arc::new(GuestSymptomStore::in_dir(&args.data_dir)),
            Session::Authenticated { .. } => Arc::new(gateway.symptoms()),
        };
        info!(mode = symptoms.kind(), user_id = %session.user_id(), "Session ready");

        Ok(Self::new(session, gateway, symptoms, args.advisor_config()))
    }

    pub fn new(
        session: Session,
        gateway: DataGateway,
        symptoms: Arc<dyn SymptomRepository>,
        advisor: AdvisorConfig,
    ) -> Self {
        Self {
            session,
            gateway,
            symptoms,
            advisor,
        }
    }

    /// The signed-in user, or an error naming the command that needs one.
    pub fn require_user(&self, command: &str) -> anyhow::Result<&str> {
        match &self.session {
            Session::Authenticated { user_id } => Ok(user_id),
            Session::Guest => bail!("`{}` needs a signed-in user: set GASTRO_USER_ID and SUPABASE_ACCESS_TOKEN", command),
        }
    }

    /// Build the food advisor; fails only when the advisor is not configured.
    pub fn food_advisor(&self) -> anyhow::Result<FoodAdvisor> {
        Ok(FoodAdvisor::from_config(&self.advisor)?)
    }

    pub fn realtime(&self) -> anyhow::Result<RealtimeClient> {
        Ok(RealtimeClient::new(self.gateway.rest().config())?)
    }
}
