//! Signed-in user record. The token exchange happens elsewhere; this only
//! keeps what it produced.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::storage::{self, KvStore, KEY_AUTH};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRecord {
    pub is_logged_in: bool,
    pub access_token: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_picture: Option<String>,
}

pub struct Session {
    record: AuthRecord,
    store: Rc<dyn KvStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("is_logged_in", &self.record.is_logged_in)
            .field("user_name", &self.record.user_name)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Restore whatever was persisted; a corrupt record means signed out.
    pub fn restore(store: Rc<dyn KvStore>) -> Self {
        let record = storage::load_or_default(store.as_ref(), KEY_AUTH);
        Self { record, store }
    }

    pub fn record(&self) -> &AuthRecord {
        &self.record
    }

    pub fn is_signed_in(&self) -> bool {
        self.record.is_logged_in
    }

    pub fn user_name(&self) -> Option<&str> {
        self.record
            .user_name
            .as_deref()
            .filter(|_| self.record.is_logged_in)
    }

    pub fn sign_in(&mut self, token: &str, profile: Profile) -> Result<()> {
        if token.trim().is_empty() {
            return Err(Error::invalid_input("Access token cannot be empty."));
        }
        self.record = AuthRecord {
            is_logged_in: true,
            access_token: Some(token.to_string()),
            user_name: Some(profile.name),
            user_email: Some(profile.email),
            user_picture: profile.picture,
        };
        info!(user = ?self.record.user_name, "signed in");
        storage::save(self.store.as_ref(), KEY_AUTH, &self.record)
    }

    pub fn sign_out(&mut self) -> Result<()> {
        self.record = AuthRecord::default();
        info!("signed out");
        self.store.remove(KEY_AUTH)
    }
}
