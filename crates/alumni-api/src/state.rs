use std::sync::Arc;

use alumni_db::Database;

use crate::services::{MajorService, MessageService, OpportunityService, UserService};
use crate::tokens::TokenService;

pub type AppState = Arc<AppStateInner>;

/// Every service is built once here and shared by all handlers.
pub struct AppStateInner {
    pub tokens: TokenService,
    pub users: UserService,
    pub opportunities: OpportunityService,
    pub majors: MajorService,
    pub messages: MessageService,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>, access_secret: &str, refresh_secret: &str) -> AppState {
        Arc::new(Self {
            tokens: TokenService::new(db.clone(), access_secret, refresh_secret),
            users: UserService::new(db.clone()),
            opportunities: OpportunityService::new(db.clone()),
            majors: MajorService::new(db.clone()),
            messages: MessageService::new(db),
        })
    }
}
