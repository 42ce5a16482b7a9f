use db::DBService;
use services::services::auth::Authenticator;

/// Handler state. The pool inside `DBService` is shared across clones.
#[derive(Clone)]
pub struct AppState {
    db: DBService,
    auth: Authenticator,
}

impl AppState {
    pub fn new(db: DBService, auth: Authenticator) -> Self {
        Self { db, auth }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn auth(&self) -> &Authenticator {
        &self.auth
    }
}
