//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{AdmissionService, LinkService};

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub admission: Arc<AdmissionService>,
    /// Trust forwarding headers when identifying callers.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(link_service: LinkService, admission: AdmissionService, behind_proxy: bool) -> Self {
        Self {
            link_service: Arc::new(link_service),
            admission: Arc::new(admission),
            behind_proxy,
        }
    }
}
