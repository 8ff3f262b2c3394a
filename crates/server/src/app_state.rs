use feed_client::QuakeMapService;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) service: QuakeMapService,
}
