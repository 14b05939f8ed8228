//! Feed client: talks to the posts API and keeps the local view in sync.
pub mod client;
pub mod render;
pub mod store;

use log::{debug, warn};

use crate::feed::client::{ClientError, FeedClient, ImageAttachment, PostDraft};
use crate::feed::store::{
    CreateOutcome, FeedStore, FeedUser, FetchOutcome, FetchTicket, NoticeLevel, CREATE_ERROR_FALLBACK,
    FETCH_ERROR_FALLBACK,
};

/// Couples the API client with the store. One owner drives it at a time.
pub struct Feed {
    client: FeedClient,
    store: FeedStore,
}

impl Feed {
    pub fn new(client: FeedClient) -> Self {
        Self { client, store: FeedStore::new() }
    }

    pub fn store(&self) -> &FeedStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FeedStore {
        &mut self.store
    }

    async fn run_fetch(&mut self, ticket: FetchTicket) {
        let mut ticket = ticket;
        loop {
            let result = self
                .client
                .list_posts()
                .await
                .map_err(|e| e.user_message(FETCH_ERROR_FALLBACK));
            match self.store.complete_fetch(ticket, result) {
                FetchOutcome::Applied => return,
                FetchOutcome::Dropped => {
                    debug!("dropped stale feed response");
                    return;
                }
                FetchOutcome::Superseded => {
                    debug!("feed response predates a confirmed change, fetching again");
                    match self.store.begin_fetch() {
                        Some(next) => ticket = next,
                        None => return,
                    }
                }
            }
        }
    }

    /// Identifies (or clears) the user; fetches when the user actually changed.
    pub async fn set_user(&mut self, user: Option<FeedUser>) {
        if let Some(ticket) = self.store.set_user(user) {
            self.run_fetch(ticket).await;
        }
    }

    /// User-initiated refresh / retry.
    pub async fn refresh(&mut self) {
        if let Some(ticket) = self.store.begin_fetch() {
            self.run_fetch(ticket).await;
        }
    }

    /// Validates locally, then submits. Invalid drafts never leave the client.
    pub async fn submit(
        &mut self,
        draft: &PostDraft,
        image: Option<ImageAttachment>,
    ) -> Result<CreateOutcome, ClientError> {
        if let Err(e) = draft.validate() {
            self.store.notify(NoticeLevel::Error, e.to_string());
            return Err(e);
        }
        if !self.client.has_token() {
            let e = ClientError::NotLoggedIn;
            self.store.notify(NoticeLevel::Error, e.to_string());
            return Err(e);
        }

        let result = self.client.create_post(draft, image).await;
        let outcome = match &result {
            Ok(created) => self.store.complete_create(Ok(created.clone())),
            Err(e) => {
                warn!("create post failed: {}", e);
                self.store.complete_create(Err(e.user_message(CREATE_ERROR_FALLBACK)))
            }
        };
        if outcome == CreateOutcome::NeedsRefetch {
            self.refresh().await;
        }
        result.map(|_| outcome)
    }
}
