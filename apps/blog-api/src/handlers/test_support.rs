//! Fixtures shared by handler tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use blog_core::domain::{Blog, Entry, User};
use blog_core::error::{RepoError, SearchError};
use blog_core::ports::{BaseRepository, EntryRepository, EntrySearchIndex};
use blog_core::{Page, PageRequest};
use blog_infra::{InMemoryDatabase, InMemoryEntrySearchIndex};

use crate::config::AppConfig;
use crate::state::AppState;

/// Per-operation call counts.
#[derive(Debug, Default)]
pub struct Calls {
    pub saves: AtomicUsize,
    pub finds: AtomicUsize,
    pub lists: AtomicUsize,
    pub deletes: AtomicUsize,
    pub searches: AtomicUsize,
}

impl Calls {
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    fn hit(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// Entry store that counts calls and can be told to fail.
pub struct CountingEntries {
    inner: Arc<InMemoryDatabase>,
    pub calls: Calls,
    pub fail: bool,
}

impl CountingEntries {
    fn check(&self) -> Result<(), RepoError> {
        if self.fail {
            return Err(RepoError::Connection("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EntryRepository for CountingEntries {
    async fn save(&self, entry: Entry) -> Result<Entry, RepoError> {
        Calls::hit(&self.calls.saves);
        self.check()?;
        EntryRepository::save(self.inner.as_ref(), entry).await
    }

    async fn find_one_with_eager_relationships(&self, id: i64) -> Result<Option<Entry>, RepoError> {
        Calls::hit(&self.calls.finds);
        self.check()?;
        self.inner.find_one_with_eager_relationships(id).await
    }

    async fn find_by_blog_owner_order_by_date_desc(
        &self,
        login: &str,
        page: &PageRequest,
    ) -> Result<Page<Entry>, RepoError> {
        Calls::hit(&self.calls.lists);
        self.check()?;
        self.inner.find_by_blog_owner_order_by_date_desc(login, page).await
    }

    async fn find_ids_by_blog(&self, blog_id: i64) -> Result<Vec<i64>, RepoError> {
        Calls::hit(&self.calls.finds);
        self.check()?;
        self.inner.find_ids_by_blog(blog_id).await
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        Calls::hit(&self.calls.deletes);
        self.check()?;
        EntryRepository::delete(self.inner.as_ref(), id).await
    }
}

/// Search index that counts calls and can be told to fail.
pub struct CountingIndex {
    pub inner: InMemoryEntrySearchIndex,
    pub calls: Calls,
    pub fail: bool,
}

impl CountingIndex {
    fn check(&self) -> Result<(), SearchError> {
        if self.fail {
            return Err(SearchError::Connection("index unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EntrySearchIndex for CountingIndex {
    async fn save(&self, entry: &Entry) -> Result<(), SearchError> {
        Calls::hit(&self.calls.saves);
        self.check()?;
        self.inner.save(entry).await
    }

    async fn delete(&self, id: i64) -> Result<(), SearchError> {
        Calls::hit(&self.calls.deletes);
        self.check()?;
        self.inner.delete(id).await
    }

    async fn search(&self, query: &str, page: &PageRequest) -> Result<Page<Entry>, SearchError> {
        Calls::hit(&self.calls.searches);
        self.check()?;
        self.inner.search(query, page).await
    }
}

/// In-memory application state with counting entry collaborators.
pub struct Fixture {
    pub state: AppState,
    pub db: Arc<InMemoryDatabase>,
    pub entries: Arc<CountingEntries>,
    pub index: Arc<CountingIndex>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_failures(false, false)
    }

    pub fn with_failures(store_fails: bool, index_fails: bool) -> Self {
        let db = Arc::new(InMemoryDatabase::new());
        let entries = Arc::new(CountingEntries {
            inner: db.clone(),
            calls: Calls::default(),
            fail: store_fails,
        });
        let index = Arc::new(CountingIndex {
            inner: InMemoryEntrySearchIndex::new().unwrap(),
            calls: Calls::default(),
            fail: index_fails,
        });

        let mut state = AppState::in_memory(&AppConfig::default());
        state.users = db.clone();
        state.blogs = db.clone();
        state.tags = db.clone();
        state.entries = entries.clone();
        state.entry_search = index.clone();

        Self {
            state,
            db,
            entries,
            index,
        }
    }

    /// Create a user owning one blog; returns the bearer header value and the blog id.
    pub async fn user_with_blog(&self, login: &str) -> (String, i64) {
        let user = BaseRepository::<User, i64>::save(
            self.db.as_ref(),
            User::new(login.to_string(), format!("{login}@example.com"), "hash".to_string()),
        )
        .await
        .unwrap();
        let user_id = user.id.unwrap();

        let mut blog = Blog::new(format!("{login}'s blog"), login.to_string());
        blog.user_id = Some(user_id);
        let blog = BaseRepository::<Blog, i64>::save(self.db.as_ref(), blog)
            .await
            .unwrap();

        (self.bearer(user_id, login), blog.id.unwrap())
    }

    pub fn bearer(&self, user_id: i64, login: &str) -> String {
        let token = self
            .state
            .tokens
            .generate_token(user_id, login, vec!["user".to_string()])
            .unwrap();
        format!("Bearer {token}")
    }
}

/// Initialize the full route tree over the given state.
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(actix_web::middleware::from_fn(
                    crate::middleware::timing::request_timing,
                ))
                .app_data(actix_web::web::Data::new($state))
                .configure(crate::handlers::configure_routes),
        )
        .await
    };
}

pub(crate) use init_app;
