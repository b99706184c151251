//! Application wiring
//!
//! Builds the one `Session`, `Router` and `ApiClient` a run of the client
//! shares, and hands out views bound to them.

use std::sync::Arc;

use crate::api::{ApiClient, ApiResult, LedgerApi};
use crate::config::Config;
use crate::model::AccountId;
use crate::navigation::{Route, Router};
use crate::report::{Clock, SystemClock};
use crate::session::Session;
use crate::views::{
    AccountDetailView, AccountsView, CategoriesView, ChartsView, DashboardView, TransactionsView,
};

pub struct App {
    pub config: Config,
    pub session: Session,
    pub router: Arc<Router>,
    pub client: Arc<ApiClient>,
    pub clock: Arc<dyn Clock>,
}

impl App {
    /// Wire the client for `config`. `ephemeral` keeps the token in memory.
    pub fn init(config: Config, ephemeral: bool) -> ApiResult<Self> {
        let session = if ephemeral {
            Session::in_memory()
        } else {
            Session::file(config.session.token_path())
        };
        Self::with_session(config, session)
    }

    pub fn with_session(config: Config, session: Session) -> ApiResult<Self> {
        let router = Arc::new(Router::new(session.clone()));
        let client = Arc::new(ApiClient::new(
            config.client_config(),
            session.clone(),
            router.clone(),
        )?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.display.calendar));

        tracing::debug!(
            base_url = %config.api.base_url,
            authenticated = session.is_authenticated(),
            "Client initialized"
        );

        Ok(Self {
            config,
            session,
            router,
            client,
            clock,
        })
    }

    /// Run the navigation guard for `route`
    pub fn open(&self, route: Route) -> Route {
        self.router.open(route)
    }

    fn api(&self) -> Arc<dyn LedgerApi> {
        self.client.clone()
    }

    pub fn dashboard(&self) -> DashboardView {
        DashboardView::new(self.api(), self.clock.clone())
    }

    pub fn accounts(&self) -> AccountsView {
        AccountsView::new(self.api())
    }

    pub fn account_detail(&self, account_id: AccountId) -> AccountDetailView {
        AccountDetailView::new(self.api(), account_id)
    }

    pub fn categories(&self) -> CategoriesView {
        CategoriesView::new(self.api())
    }

    pub fn transactions(&self) -> TransactionsView {
        TransactionsView::new(self.api(), self.clock.clone())
            .with_filter(self.config.display.default_filter)
    }

    pub fn charts(&self) -> ChartsView {
        ChartsView::new(self.api(), self.clock.clone())
    }
}
