//! Email + password identity service.
//!
//! Credentials live under `accounts/{uid}`, outside anything a client can
//! read through the access rules, so this service talks to the unguarded
//! store directly.

use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{AgendaError, AgendaResult, FieldError};
use crate::profile::profile_path;
use crate::push_id::generate_uid;
use crate::rules::{ACCOUNTS_ROOT, APPOINTMENTS_ROOT};
use crate::session::{Identity, Session};
use crate::store::{RecordStore, StorePath};
use crate::user::{NewUser, User, is_valid_email};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Account {
    email: String,
    password_hash: String,
    created_at: String,
}

pub struct AuthService {
    store: Arc<dyn RecordStore>,
    session: Session,
    /// Held from the duplicate-email check until the account is written.
    registrations: Arc<Mutex<()>>,
}

fn hash_password(password: &str) -> AgendaResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AgendaError::Store(format!("Failed to hash password: {e}")))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn password_error(password: &str) -> Option<FieldError> {
    if password.is_empty() {
        Some(FieldError::required("password"))
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        Some(FieldError::new(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ))
    } else {
        None
    }
}

impl AuthService {
    /// `store` must be the unguarded store: accounts are not client-visible.
    /// Every service writing to the same store must share `registrations`.
    pub fn new(
        store: Arc<dyn RecordStore>,
        session: Session,
        registrations: Arc<Mutex<()>>,
    ) -> Self {
        AuthService {
            store,
            session,
            registrations,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Create the account and its profile, then sign in as the new user.
    pub async fn register(&self, new_user: NewUser, password: &str) -> AgendaResult<User> {
        let mut errors = match new_user.validate() {
            Ok(()) => Vec::new(),
            Err(AgendaError::Validation(errors)) => errors,
            Err(e) => return Err(e),
        };
        errors.extend(password_error(password));
        if !errors.is_empty() {
            return Err(AgendaError::Validation(errors));
        }

        let email = new_user.email.trim().to_lowercase();
        let _registering = self.registrations.lock().await;
        if self.find_account(&email).await?.is_some() {
            return Err(AgendaError::EmailTaken(email));
        }

        let uid = generate_uid();
        let created_at = chrono::Utc::now().to_rfc3339();
        let account = Account {
            email: email.clone(),
            password_hash: hash_password(password)?,
            created_at: created_at.clone(),
        };

        self.store
            .set(&account_path(&uid)?, serde_json::to_value(&account)?)
            .await?;

        let user = new_user.into_user(&uid, &created_at);
        self.store.set(&profile_path(&uid)?, user.to_record()?).await?;

        self.session.sign_in(Identity {
            uid: uid.clone(),
            email,
        });
        tracing::info!(uid = %uid, "user registered");
        Ok(user)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AgendaResult<Identity> {
        let email = email.trim().to_lowercase();

        let mut errors = Vec::new();
        if !is_valid_email(&email) {
            errors.push(FieldError::new("email", "is not a valid address"));
        }
        errors.extend(password_error(password));
        if !errors.is_empty() {
            return Err(AgendaError::Validation(errors));
        }

        let Some((uid, account)) = self.find_account(&email).await? else {
            tracing::info!("sign-in failed: unknown email");
            return Err(AgendaError::InvalidCredentials);
        };
        if !verify_password(password, &account.password_hash) {
            tracing::info!(uid = %uid, "sign-in failed: wrong password");
            return Err(AgendaError::InvalidCredentials);
        }

        let identity = Identity { uid, email };
        self.session.sign_in(identity.clone());
        tracing::info!(uid = %identity.uid, "signed in");
        Ok(identity)
    }

    pub fn sign_out(&self) {
        if let Some(identity) = self.session.current() {
            tracing::info!(uid = %identity.uid, "signed out");
        }
        self.session.sign_out();
    }

    /// Remove the signed-in user's appointments, profile and credentials.
    pub async fn delete_account(&self) -> AgendaResult<()> {
        let uid = self.session.require()?.uid;

        let appointments = StorePath::root().child(APPOINTMENTS_ROOT)?.child(&uid)?;
        self.store.remove(&appointments).await?;
        self.store.remove(&profile_path(&uid)?).await?;
        self.store.remove(&account_path(&uid)?).await?;

        self.session.sign_out();
        tracing::info!(uid = %uid, "account deleted");
        Ok(())
    }

    async fn find_account(&self, email: &str) -> AgendaResult<Option<(String, Account)>> {
        let accounts = self
            .store
            .get(&StorePath::root().child(ACCOUNTS_ROOT)?)
            .await?
            .unwrap_or(Value::Null);

        let found = accounts
            .as_object()
            .into_iter()
            .flatten()
            .filter_map(|(uid, value)| {
                let account: Account = serde_json::from_value(value.clone()).ok()?;
                (account.email == email).then(|| (uid.clone(), account))
            })
            .next();
        Ok(found)
    }
}

fn account_path(uid: &str) -> AgendaResult<StorePath> {
    StorePath::root().child(ACCOUNTS_ROOT)?.child(uid)
}
