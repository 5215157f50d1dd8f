use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::db::Database;
use crate::models::User;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    SignedIn(User),
    SignedOut,
}

/// Opaque token returned by `SessionContext::subscribe`, used to remove
/// the subscription again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionHandle(u64);

type Callback = Box<dyn FnMut(&SessionEvent) + Send>;

/// Process-local session state with an explicit lifecycle: constructed
/// at startup, disposed at shutdown. Subscribers are invoked on every
/// session change.
pub struct SessionContext {
    current: Option<User>,
    subscribers: Vec<(u64, Callback)>,
    next_handle: u64,
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            current: None,
            subscribers: Vec::new(),
            next_handle: 0,
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&SessionEvent) + Send + 'static,
    ) -> SubscriptionHandle {
        let handle = SubscriptionHandle(self.next_handle);
        self.next_handle += 1;
        self.subscribers.push((handle.0, Box::new(callback)));
        handle
    }

    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) {
        self.subscribers.retain(|(id, _)| *id != handle.0);
    }

    /// Drops all subscribers and any signed-in user.
    pub fn dispose(&mut self) {
        self.subscribers.clear();
        self.current = None;
    }

    pub async fn sign_in(
        &mut self,
        db: &Database,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let user = db
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_salt, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(email = %user.email, "signed in");
        self.apply(Some(user.clone()));
        Ok(user)
    }

    /// Creates the account and signs it in, like the hosted backends
    /// this flow is modelled on.
    pub async fn sign_up(
        &mut self,
        db: &Database,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        if db.get_user_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let salt = generate_salt();
        let hash = hash_password(password, &salt);
        let user = db.create_user(email, &hash, &salt).await?;

        tracing::info!(email = %user.email, "account created");
        self.apply(Some(user.clone()));
        Ok(user)
    }

    pub fn sign_out(&mut self) {
        tracing::info!("signed out");
        self.apply(None);
    }

    fn apply(&mut self, user: Option<User>) {
        self.current = user.clone();
        let event = match user {
            Some(user) => SessionEvent::SignedIn(user),
            None => SessionEvent::SignedOut,
        };
        for (_, callback) in &mut self.subscribers {
            callback(&event);
        }
    }
}

pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::{Arc, Mutex};

    fn user(email: &str) -> User {
        User {
            id: 1,
            email: email.to_string(),
            password_hash: String::new(),
            password_salt: String::new(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn hashed_password_verifies_with_its_salt_only() {
        let salt = generate_salt();
        let hash = hash_password("secret", &salt);
        assert!(verify_password("secret", &salt, &hash));
        assert!(!verify_password("wrong", &salt, &hash));
        assert!(!verify_password("secret", &generate_salt(), &hash));
    }

    #[test]
    fn salts_are_unique_per_call() {
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn subscribers_see_session_changes_until_unsubscribed() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut session = SessionContext::new();
        let handle = session.subscribe(move |event| {
            let entry = match event {
                SessionEvent::SignedIn(user) => format!("in:{}", user.email),
                SessionEvent::SignedOut => "out".to_string(),
            };
            sink.lock().unwrap().push(entry);
        });

        session.apply(Some(user("a@b.c")));
        assert!(session.is_authenticated());
        session.sign_out();
        assert!(!session.is_authenticated());

        session.unsubscribe(handle);
        session.apply(Some(user("d@e.f")));

        assert_eq!(*seen.lock().unwrap(), vec!["in:a@b.c", "out"]);
    }

    #[test]
    fn dispose_clears_user_and_subscribers() {
        let seen = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&seen);

        let mut session = SessionContext::new();
        session.subscribe(move |_| *sink.lock().unwrap() += 1);
        session.apply(Some(user("a@b.c")));

        session.dispose();
        assert!(session.current_user().is_none());
        session.sign_out();

        assert_eq!(*seen.lock().unwrap(), 1);
    }
}
