// src/feed/store.rs
//
// Client-side feed state. The server is the source of truth: a fetch that
// completes in order replaces the local list wholesale. Responses overtaken by
// a newer fetch or a user switch are dropped. A response that began before a
// confirmed mutation is not applied either, and the caller fetches again.

use uuid::Uuid;

use crate::models::post::Post;

/// The identified user the feed is shown to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedUser {
    pub id: String,
    pub username: String,
}

/// What the feed view should show right now.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedState<'a> {
    /// No user; nothing is fetched.
    Idle,
    Loading,
    Error(&'a str),
    Empty,
    Populated(&'a [Post]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient notification, e.g. after a post was shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Handed out when a fetch starts and presented again when it completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    user_id: String,
}

/// What happened to a finished fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// Overtaken by a newer fetch or a user switch; nothing to do.
    Dropped,
    /// Started before a mutation was confirmed. The list it carries may miss
    /// that mutation, so fetch again instead of applying it.
    Superseded,
}

/// Result of confirming a create with the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The echoed post is at the top of the feed.
    Prepended,
    /// The server didn't echo the post; fetch again.
    NeedsRefetch,
    Failed,
}

#[derive(Debug, Default)]
pub struct FeedStore {
    user: Option<FeedUser>,
    posts: Vec<Post>,
    loading: bool,
    error: Option<String>,
    seq: u64,
    latest_fetch: u64,
    // fetches with seq at or below this started before the last confirmed mutation
    mutation_floor: u64,
    notices: Vec<Notice>,
}

pub const FETCH_ERROR_FALLBACK: &str = "Unable to load feed right now.";
pub const CREATE_ERROR_FALLBACK: &str = "Could not share your post. Try again!";

impl FeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&FeedUser> {
        self.user.as_ref()
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn state(&self) -> FeedState<'_> {
        if self.user.is_none() {
            FeedState::Idle
        } else if self.loading {
            FeedState::Loading
        } else if let Some(err) = &self.error {
            FeedState::Error(err)
        } else if self.posts.is_empty() {
            FeedState::Empty
        } else {
            FeedState::Populated(&self.posts)
        }
    }

    /// Switches the identified user. Returns a ticket when a fetch should start.
    pub fn set_user(&mut self, user: Option<FeedUser>) -> Option<FetchTicket> {
        if self.user == user {
            return None;
        }
        self.user = user;
        self.posts.clear();
        self.error = None;
        self.loading = false;
        match self.user {
            Some(_) => self.begin_fetch(),
            None => {
                // anything in flight now belongs to someone else
                self.latest_fetch = self.bump();
                None
            }
        }
    }

    fn bump(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Starts a (re)fetch. `None` when there is no user to fetch for.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        let user_id = self.user.as_ref()?.id.clone();
        let seq = self.bump();
        self.latest_fetch = seq;
        self.loading = true;
        self.error = None;
        Some(FetchTicket { seq, user_id })
    }

    /// Applies a finished fetch, unless it was overtaken.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: Result<Vec<Post>, String>) -> FetchOutcome {
        let same_user = self.user.as_ref().is_some_and(|u| u.id == ticket.user_id);
        if ticket.seq != self.latest_fetch || !same_user {
            return FetchOutcome::Dropped;
        }
        self.loading = false;
        if ticket.seq <= self.mutation_floor {
            return FetchOutcome::Superseded;
        }
        match result {
            Ok(posts) => {
                self.posts = posts;
                self.error = None;
            }
            Err(message) => self.error = Some(message),
        }
        FetchOutcome::Applied
    }

    fn confirm_mutation(&mut self) {
        self.mutation_floor = self.seq;
        self.loading = false;
    }

    /// Applies the outcome of a create request.
    pub fn complete_create(&mut self, result: Result<Option<Post>, String>) -> CreateOutcome {
        match result {
            Ok(Some(post)) => {
                self.confirm_mutation();
                self.posts.retain(|p| p.id != post.id);
                self.posts.insert(0, post);
                self.error = None;
                self.notify(NoticeLevel::Success, "Shared to your feed!");
                CreateOutcome::Prepended
            }
            Ok(None) => {
                self.confirm_mutation();
                self.notify(NoticeLevel::Success, "Shared to your feed!");
                CreateOutcome::NeedsRefetch
            }
            Err(message) => {
                self.notify(NoticeLevel::Error, message);
                CreateOutcome::Failed
            }
        }
    }

    /// Replaces a post with the server's updated copy.
    pub fn apply_update(&mut self, post: Post) {
        self.confirm_mutation();
        if let Some(slot) = self.posts.iter_mut().find(|p| p.id == post.id) {
            *slot = post;
        }
    }

    pub fn apply_delete(&mut self, id: Uuid) {
        self.confirm_mutation();
        self.posts.retain(|p| p.id != id);
    }

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice { level, message: message.into() });
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::post::AuthorRef;
    use chrono::Utc;

    fn user(id: &str) -> FeedUser {
        FeedUser { id: id.into(), username: id.into() }
    }

    fn post(title: &str) -> Post {
        Post {
            id: Uuid::new_v4(),
            title: title.into(),
            content: "body".into(),
            author: AuthorRef { id: Uuid::new_v4(), username: Some("ana".into()) },
            image_url: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn no_user_means_no_fetch() {
        let mut store = FeedStore::new();
        assert_eq!(store.state(), FeedState::Idle);
        assert!(store.begin_fetch().is_none());
        assert!(store.set_user(None).is_none());
    }

    #[test]
    fn walks_through_loading_empty_and_populated() {
        let mut store = FeedStore::new();
        let ticket = store.set_user(Some(user("ana"))).unwrap();
        assert_eq!(store.state(), FeedState::Loading);

        assert_eq!(store.complete_fetch(ticket, Ok(vec![])), FetchOutcome::Applied);
        assert_eq!(store.state(), FeedState::Empty);

        let ticket = store.begin_fetch().unwrap();
        store.complete_fetch(ticket, Ok(vec![post("a")]));
        assert!(matches!(store.state(), FeedState::Populated(p) if p.len() == 1));
    }

    #[test]
    fn fetch_error_is_shown_until_retry() {
        let mut store = FeedStore::new();
        let ticket = store.set_user(Some(user("ana"))).unwrap();
        store.complete_fetch(ticket, Err("boom".into()));
        assert_eq!(store.state(), FeedState::Error("boom"));

        let retry = store.begin_fetch().unwrap();
        assert_eq!(store.state(), FeedState::Loading);
        store.complete_fetch(retry, Ok(vec![post("a")]));
        assert!(matches!(store.state(), FeedState::Populated(_)));
    }

    #[test]
    fn superseded_fetch_is_dropped() {
        let mut store = FeedStore::new();
        let first = store.set_user(Some(user("ana"))).unwrap();
        let second = store.begin_fetch().unwrap();

        assert_eq!(store.complete_fetch(second, Ok(vec![post("fresh")])), FetchOutcome::Applied);
        assert_eq!(store.complete_fetch(first, Ok(vec![post("stale")])), FetchOutcome::Dropped);
        assert_eq!(store.posts()[0].title, "fresh");
    }

    #[test]
    fn response_for_previous_user_is_dropped() {
        let mut store = FeedStore::new();
        let ana_fetch = store.set_user(Some(user("ana"))).unwrap();
        let _ben_fetch = store.set_user(Some(user("ben"))).unwrap();

        assert_eq!(store.complete_fetch(ana_fetch, Ok(vec![post("ana's")])), FetchOutcome::Dropped);
        assert!(store.posts().is_empty());
    }

    #[test]
    fn fetch_started_before_create_does_not_erase_it() {
        let mut store = FeedStore::new();
        let initial = store.set_user(Some(user("ana"))).unwrap();
        store.complete_fetch(initial, Ok(vec![post("old")]));

        let in_flight = store.begin_fetch().unwrap();
        let created = post("mine");
        assert_eq!(store.complete_create(Ok(Some(created.clone()))), CreateOutcome::Prepended);

        assert_eq!(store.complete_fetch(in_flight, Ok(vec![post("old")])), FetchOutcome::Superseded);
        assert_eq!(store.posts()[0].id, created.id);
        assert_eq!(store.state(), FeedState::Populated(store.posts()));
    }

    #[test]
    fn create_during_first_load_still_ends_with_server_list() {
        let mut store = FeedStore::new();
        let initial = store.set_user(Some(user("ana"))).unwrap();
        let mine = post("mine");
        store.complete_create(Ok(Some(mine.clone())));

        let server = vec![mine.clone(), post("p1"), post("p2"), post("p3")];
        let outcome = store.complete_fetch(initial, Ok(server[1..].to_vec()));
        assert_eq!(outcome, FetchOutcome::Superseded);

        let refetch = store.begin_fetch().unwrap();
        assert_eq!(store.state(), FeedState::Loading);
        assert_eq!(store.complete_fetch(refetch, Ok(server.clone())), FetchOutcome::Applied);
        assert_eq!(store.posts(), server.as_slice());
    }

    #[test]
    fn later_fetch_wins_over_local_state() {
        let mut store = FeedStore::new();
        let t = store.set_user(Some(user("ana"))).unwrap();
        store.complete_fetch(t, Ok(vec![]));
        store.complete_create(Ok(Some(post("optimistic"))));

        let t = store.begin_fetch().unwrap();
        let server = vec![post("server-a"), post("server-b")];
        assert_eq!(store.complete_fetch(t, Ok(server.clone())), FetchOutcome::Applied);
        assert_eq!(store.posts(), server.as_slice());
    }

    #[test]
    fn create_without_echo_asks_for_refetch() {
        let mut store = FeedStore::new();
        store.set_user(Some(user("ana")));
        assert_eq!(store.complete_create(Ok(None)), CreateOutcome::NeedsRefetch);
        assert_eq!(store.drain_notices()[0].level, NoticeLevel::Success);
    }

    #[test]
    fn failed_create_raises_error_notice_and_keeps_feed() {
        let mut store = FeedStore::new();
        let t = store.set_user(Some(user("ana"))).unwrap();
        store.complete_fetch(t, Ok(vec![post("a")]));

        assert_eq!(store.complete_create(Err("nope".into())), CreateOutcome::Failed);
        let notices = store.drain_notices();
        assert_eq!(notices, vec![Notice { level: NoticeLevel::Error, message: "nope".into() }]);
        assert_eq!(store.posts().len(), 1);
        assert!(store.drain_notices().is_empty());
    }

    #[test]
    fn update_and_delete_patch_local_list() {
        let mut store = FeedStore::new();
        let t = store.set_user(Some(user("ana"))).unwrap();
        let mut p = post("a");
        store.complete_fetch(t, Ok(vec![p.clone(), post("b")]));

        p.title = "edited".into();
        store.apply_update(p.clone());
        assert_eq!(store.posts()[0].title, "edited");

        store.apply_delete(p.id);
        assert_eq!(store.posts().len(), 1);
    }
}
