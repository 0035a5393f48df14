//! Bearer tokens handed out at sign-in.
//!
//! Tokens live only in memory: restarting the server signs everyone out.

use std::collections::HashMap;
use std::sync::Arc;

use agenda_core::Identity;
use rand::Rng;
use rand::distributions::Alphanumeric;
use tokio::sync::RwLock;

const TOKEN_LEN: usize = 40;

#[derive(Clone, Default)]
pub struct TokenRegistry {
    tokens: Arc<RwLock<HashMap<String, Identity>>>,
}

impl TokenRegistry {
    pub async fn issue(&self, identity: Identity) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();

        self.tokens.write().await.insert(token.clone(), identity);
        token
    }

    pub async fn resolve(&self, token: &str) -> Option<Identity> {
        self.tokens.read().await.get(token).cloned()
    }

    pub async fn revoke(&self, token: &str) {
        self.tokens.write().await.remove(token);
    }

    /// Drop every token issued to `uid`.
    pub async fn revoke_user(&self, uid: &str) {
        self.tokens
            .write()
            .await
            .retain(|_, identity| identity.uid != uid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(uid: &str) -> Identity {
        Identity {
            uid: uid.into(),
            email: format!("{uid}@x.com"),
        }
    }

    #[tokio::test]
    async fn issued_tokens_resolve_until_revoked() {
        let registry = TokenRegistry::default();
        let token = registry.issue(identity("U1")).await;

        assert_eq!(token.len(), TOKEN_LEN);
        assert_eq!(registry.resolve(&token).await, Some(identity("U1")));

        registry.revoke(&token).await;
        assert_eq!(registry.resolve(&token).await, None);
    }

    #[tokio::test]
    async fn revoke_user_keeps_other_users() {
        let registry = TokenRegistry::default();
        let first = registry.issue(identity("U1")).await;
        let second = registry.issue(identity("U1")).await;
        let other = registry.issue(identity("U2")).await;

        registry.revoke_user("U1").await;

        assert!(registry.resolve(&first).await.is_none());
        assert!(registry.resolve(&second).await.is_none());
        assert!(registry.resolve(&other).await.is_some());
    }
}
