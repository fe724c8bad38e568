use std::{fmt, sync::Arc};

use secvo_core::{
    AuthCrypto, AuthService, ProcessorSettings, ScanDispatcher, ScanIntake,
    ScanProcessor, ScanRepository, ScanViewer, StoreContext,
};

use crate::infra::config::Config;

pub type SharedIntake = Arc<ScanIntake<dyn ScanRepository>>;
pub type SharedViewer = Arc<ScanViewer<dyn ScanRepository>>;
pub type SharedDispatcher = Arc<ScanDispatcher<dyn ScanRepository>>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: StoreContext,
    pub auth: Arc<AuthService>,
    pub intake: SharedIntake,
    pub viewer: SharedViewer,
    pub dispatcher: SharedDispatcher,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.store.backend_name())
            .field("dev_mode", &self.config.dev_mode)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire the domain services onto an already connected store.
    pub fn new(
        config: Arc<Config>,
        store: StoreContext,
        crypto: Arc<AuthCrypto>,
    ) -> Self {
        let scans = store.scans();

        let auth = AuthService::new(store.users(), store.sessions(), crypto)
            .with_session_ttl(config.auth.session_ttl());

        let processor = ScanProcessor::new(
            Arc::clone(&scans),
            ProcessorSettings {
                simulated_delay: config.processor.simulated_delay(),
            },
        );
        let dispatcher = ScanDispatcher::new(processor)
            .with_stale_after(config.processor.stale_after());

        Self {
            intake: Arc::new(ScanIntake::new(Arc::clone(&scans))),
            viewer: Arc::new(ScanViewer::new(scans)),
            dispatcher: Arc::new(dispatcher),
            auth: Arc::new(auth),
            store,
            config,
        }
    }

    pub fn processor(&self) -> &ScanProcessor<dyn ScanRepository> {
        self.dispatcher.processor()
    }
}
