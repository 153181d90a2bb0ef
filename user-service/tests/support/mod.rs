#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common_auth::{AuthContext, JwtConfig, JwtVerifier, Role, UserId};
use user_service::metrics::AuthMetrics;
use user_service::models::UserRecord;
use user_service::password;
use user_service::repository::{RepoError, UserRepository};
use user_service::tokens::{TokenConfig, TokenSigner, TokenSubject};
use user_service::AppState;

pub const TEST_SECRET: &[u8] = b"test-signing-secret";

/// In-memory stand-in for the Postgres repository. The uniqueness check
/// runs under the same lock as the insert, mirroring the atomicity the
/// database constraint provides.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<UserRecord>>,
    accesses: AtomicUsize,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of repository calls made so far; lets tests assert that a
    /// rejected request never reached the store.
    pub fn access_count(&self) -> usize {
        self.accesses.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.accesses.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        self.touch();
        let users = self.users.lock().expect("lock");
        Ok(users.iter().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, RepoError> {
        self.touch();
        let users = self.users.lock().expect("lock");
        Ok(users.iter().find(|user| user.id == *id).cloned())
    }

    async fn create(&self, record: UserRecord) -> Result<UserRecord, RepoError> {
        self.touch();
        let mut users = self.users.lock().expect("lock");
        if users.iter().any(|user| user.email == record.email) {
            return Err(RepoError::DuplicateEmail);
        }
        users.push(record.clone());
        Ok(record)
    }

    async fn update(&self, record: UserRecord) -> Result<UserRecord, RepoError> {
        self.touch();
        let mut users = self.users.lock().expect("lock");
        if users
            .iter()
            .any(|user| user.email == record.email && user.id != record.id)
        {
            return Err(RepoError::DuplicateEmail);
        }
        match users.iter_mut().find(|user| user.id == record.id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(record)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<UserRecord, RepoError> {
        self.touch();
        let mut users = self.users.lock().expect("lock");
        match users.iter().position(|user| user.id == *id) {
            Some(index) => Ok(users.remove(index)),
            None => Err(RepoError::NotFound),
        }
    }

    async fn list(&self, page: u32, page_size: u32) -> Result<(Vec<UserRecord>, i64), RepoError> {
        self.touch();
        let users = self.users.lock().expect("lock");
        let total = users.len() as i64;
        let skip = (page.saturating_sub(1) as usize) * page_size as usize;
        let records = users
            .iter()
            .skip(skip)
            .take(page_size as usize)
            .cloned()
            .collect();
        Ok((records, total))
    }
}

pub fn test_state(repo: Arc<MemoryUserRepository>) -> AppState {
    AppState {
        repo,
        verifier: Arc::new(JwtVerifier::new(TEST_SECRET, JwtConfig::new())),
        signer: Arc::new(TokenSigner::new(
            TEST_SECRET,
            TokenConfig { ttl_seconds: 60 },
        )),
        metrics: Arc::new(AuthMetrics::new().expect("metrics")),
    }
}

pub async fn seed_user(
    repo: &MemoryUserRepository,
    email: &str,
    plaintext: &str,
    role: Role,
) -> UserRecord {
    let password_hash = password::hash_blocking(plaintext).expect("hash");
    let record = UserRecord::new(
        "Test".to_string(),
        "User".to_string(),
        email.to_string(),
        password_hash,
        role,
    );
    repo.create(record).await.expect("seed user")
}

/// Builds an authenticated context by issuing a real token and running it
/// back through the verifier, the same path a request would take.
pub fn auth_context(state: &AppState, role: Role) -> AuthContext {
    let issued = state
        .signer
        .issue(TokenSubject {
            user_id: UserId::generate(),
            email: "caller@example.com".to_string(),
            role,
        })
        .expect("issue token");
    let claims = state
        .verifier
        .verify(&issued.access_token)
        .expect("verify token");
    AuthContext {
        claims,
        token: issued.access_token,
    }
}
