//! In-memory fakes for every provider trait.
//!
//! Each fake records the calls it received so tests can assert both the
//! outcome and which vendors were (not) contacted.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use ragchat_types::{AuthenticatedUser, CreditRecord, Message, RetrievedChunk};

use crate::error::ProviderError;
use crate::providers::{
    ChatCompletionProvider, ClientSecret, CreditLedger, DeltaStream, EmbeddingProvider,
    IdentityProvider, RealtimeSessionProvider, VectorIndex,
};
use crate::rag::RetrievalOptions;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn fake_error(what: &str) -> ProviderError {
    ProviderError::Api { provider: "fake", status: 503, message: format!("{what} unavailable") }
}

// ── Embeddings ────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FakeEmbedder {
    vectors: Vec<Vec<f32>>,
    fail: bool,
    queries: Mutex<Vec<String>>,
}

impl FakeEmbedder {
    pub fn returning(vectors: Vec<Vec<f32>>) -> Self {
        Self { vectors, ..Self::default() }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<Vec<f32>>, ProviderError> {
        lock(&self.queries).push(text.to_owned());
        if self.fail {
            return Err(fake_error("embedding"));
        }
        Ok(self.vectors.clone())
    }
}

// ── Vector index ──────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FakeIndex {
    chunks: Vec<RetrievedChunk>,
    fail: bool,
    searches: Mutex<Vec<(Vec<f32>, RetrievalOptions)>>,
}

impl FakeIndex {
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: texts.into_iter().map(RetrievedChunk::new).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn searches(&self) -> Vec<(Vec<f32>, RetrievalOptions)> {
        lock(&self.searches).clone()
    }
}

#[async_trait]
impl VectorIndex for FakeIndex {
    async fn search(
        &self,
        vector: &[f32],
        options: &RetrievalOptions,
    ) -> Result<Vec<RetrievedChunk>, ProviderError> {
        lock(&self.searches).push((vector.to_vec(), *options));
        if self.fail {
            return Err(fake_error("vector index"));
        }
        Ok(self.chunks.iter().take(options.top_k).cloned().collect())
    }
}

// ── Chat completions ──────────────────────────────────────────────────────────

/// One scripted item of a fake completion stream.
#[derive(Debug, Clone)]
pub enum ScriptedDelta {
    Text(String),
    Error(String),
}

#[derive(Debug, Default)]
pub struct FakeChat {
    script: Vec<ScriptedDelta>,
    fail_open: bool,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl FakeChat {
    pub fn streaming<I, S>(deltas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: deltas.into_iter().map(|d| ScriptedDelta::Text(d.into())).collect(),
            ..Self::default()
        }
    }

    pub fn scripted(script: Vec<ScriptedDelta>) -> Self {
        Self { script, ..Self::default() }
    }

    /// Fails before any byte is streamed.
    pub fn failing() -> Self {
        Self { fail_open: true, ..Self::default() }
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl ChatCompletionProvider for FakeChat {
    async fn stream_chat(&self, messages: &[Message]) -> Result<DeltaStream, ProviderError> {
        lock(&self.requests).push(messages.to_vec());
        if self.fail_open {
            return Err(fake_error("completion"));
        }
        let items: Vec<Result<String, ProviderError>> = self
            .script
            .iter()
            .map(|s| match s {
                ScriptedDelta::Text(t) => Ok(t.clone()),
                ScriptedDelta::Error(e) => Err(ProviderError::Stream(e.clone())),
            })
            .collect();
        Ok(stream::iter(items).boxed())
    }
}

// ── Realtime sessions ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FakeRealtime {
    secret: Option<ClientSecret>,
    fail: bool,
    instructions: Mutex<Vec<String>>,
}

impl FakeRealtime {
    pub fn granting(value: &str) -> Self {
        Self {
            secret: Some(ClientSecret { value: value.to_owned(), expires_at: 1_700_000_000 }),
            ..Self::default()
        }
    }

    /// Answers successfully but without a client secret.
    pub fn without_secret() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn calls(&self) -> usize {
        lock(&self.instructions).len()
    }

    pub fn instructions(&self) -> Vec<String> {
        lock(&self.instructions).clone()
    }
}

#[async_trait]
impl RealtimeSessionProvider for FakeRealtime {
    async fn create_session(&self, instructions: &str) -> Result<Option<ClientSecret>, ProviderError> {
        lock(&self.instructions).push(instructions.to_owned());
        if self.fail {
            return Err(fake_error("realtime"));
        }
        Ok(self.secret.clone())
    }
}

// ── Identity ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FakeIdentity {
    users: HashMap<String, AuthenticatedUser>,
    fail: bool,
    lookups: Mutex<Vec<String>>,
}

impl FakeIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, token: &str, user: AuthenticatedUser) -> Self {
        self.users.insert(token.to_owned(), user);
        self
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn lookups(&self) -> usize {
        lock(&self.lookups).len()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn get_user(&self, token: &str) -> Result<Option<AuthenticatedUser>, ProviderError> {
        lock(&self.lookups).push(token.to_owned());
        if self.fail {
            return Err(fake_error("identity"));
        }
        Ok(self.users.get(token).cloned())
    }
}

// ── Credit ledger ─────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FakeLedger {
    records: Mutex<HashMap<String, CreditRecord>>,
    created: Mutex<Vec<AuthenticatedUser>>,
    writes: Mutex<Vec<(String, i64)>>,
    fail_find: bool,
    fail_set: bool,
    fail_create: bool,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, user_id: &str, chats_left: i64) -> Self {
        lock(&self.records).insert(
            user_id.to_owned(),
            CreditRecord { user_id: user_id.to_owned(), role: "user".into(), chats_left },
        );
        self
    }

    pub fn failing_find(mut self) -> Self {
        self.fail_find = true;
        self
    }

    pub fn failing_set(mut self) -> Self {
        self.fail_set = true;
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn chats_left(&self, user_id: &str) -> Option<i64> {
        lock(&self.records).get(user_id).map(|r| r.chats_left)
    }

    pub fn writes(&self) -> Vec<(String, i64)> {
        lock(&self.writes).clone()
    }

    pub fn created(&self) -> Vec<AuthenticatedUser> {
        lock(&self.created).clone()
    }
}

#[async_trait]
impl CreditLedger for FakeLedger {
    async fn find(&self, user_id: &str) -> Result<Option<CreditRecord>, ProviderError> {
        if self.fail_find {
            return Err(fake_error("ledger"));
        }
        Ok(lock(&self.records).get(user_id).cloned())
    }

    async fn set_chats_left(&self, user_id: &str, chats_left: i64) -> Result<(), ProviderError> {
        lock(&self.writes).push((user_id.to_owned(), chats_left));
        if self.fail_set {
            return Err(fake_error("ledger"));
        }
        if let Some(record) = lock(&self.records).get_mut(user_id) {
            record.chats_left = chats_left;
        }
        Ok(())
    }

    async fn create_user(&self, user: &AuthenticatedUser) -> Result<(), ProviderError> {
        if self.fail_create {
            return Err(fake_error("ledger"));
        }
        lock(&self.created).push(user.clone());
        lock(&self.records).insert(
            user.id.clone(),
            CreditRecord { user_id: user.id.clone(), role: "user".into(), chats_left: 0 },
        );
        Ok(())
    }
}
