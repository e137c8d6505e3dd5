use async_trait::async_trait;
use ns_core::{Article, ArticleOrigin, ArticleStorage, Comment, Counter, Error, Result, StoreFilter, StoreQuery};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

struct Document {
    article: Article,
    likes: HashSet<String>,
    comments: Vec<Comment>,
}

impl Document {
    fn new(article: Article) -> Self {
        Self {
            article,
            likes: HashSet::new(),
            comments: Vec::new(),
        }
    }
}

/// The `news` collection with its `likes` and `comments` subcollections.
pub struct MemoryStore {
    documents: HashMap<String, Document>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
        }
    }

    fn matches(article: &Article, filter: &Option<StoreFilter>) -> bool {
        match filter {
            None => true,
            Some(StoreFilter::Category(category)) => article.category == *category,
            Some(StoreFilter::Country(country)) => article
                .location
                .as_ref()
                .map_or(false, |l| l.country == *country),
        }
    }

    pub fn query(&self, query: &StoreQuery) -> Vec<Article> {
        let mut articles = self
            .documents
            .values()
            .map(|d| &d.article)
            .filter(|a| Self::matches(a, &query.filter))
            .cloned()
            .collect::<Vec<_>>();
        // id as secondary key keeps ordering deterministic across HashMap iteration
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at).then_with(|| a.id.cmp(&b.id)));
        articles.truncate(query.limit);
        articles
    }

    pub fn insert(&mut self, mut article: Article) -> String {
        if article.id.is_empty() || self.documents.contains_key(&article.id) {
            article.id = Uuid::new_v4().simple().to_string();
        }
        article.origin = ArticleOrigin::Store;
        let id = article.id.clone();
        self.documents.insert(id.clone(), Document::new(article));
        id
    }

    fn document_mut(&mut self, id: &str) -> Result<&mut Document> {
        self.documents
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("article {}", id)))
    }

    pub fn increment(&mut self, id: &str, counter: Counter, delta: i64) -> Result<u64> {
        let article = &mut self.document_mut(id)?.article;
        let field = match counter {
            Counter::Views => &mut article.views,
            Counter::Likes => &mut article.likes,
            Counter::Comments => &mut article.comments,
        };
        *field = if delta.is_negative() {
            field.saturating_sub(delta.unsigned_abs())
        } else {
            field.saturating_add(delta as u64)
        };
        Ok(*field)
    }

    pub fn toggle_like(&mut self, id: &str, user_id: &str) -> Result<bool> {
        let likes = &mut self.document_mut(id)?.likes;
        let liked = if likes.remove(user_id) {
            false
        } else {
            likes.insert(user_id.to_string())
        };
        self.increment(id, Counter::Likes, if liked { 1 } else { -1 })?;
        Ok(liked)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::new())),
        }
    }

    /// Seed the store, keeping each article's id unless it is empty or taken.
    pub async fn with_articles(articles: Vec<Article>) -> Self {
        let storage = Self::new();
        {
            let mut store = storage.store.write().await;
            for article in articles {
                store.insert(article);
            }
        }
        storage
    }

    /// Seed the store from a JSON array of articles.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Storage(format!("Failed to read {}: {}", path.display(), e)))?;
        let articles: Vec<Article> = serde_json::from_str(&raw)?;
        debug!("Seeding memory store with {} articles from {}", articles.len(), path.display());
        Ok(Self::with_articles(articles).await)
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.documents.len()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleStorage for MemoryStorage {
    async fn query(&self, query: &StoreQuery) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(store.query(query))
    }

    async fn get_article(&self, id: &str) -> Result<Option<Article>> {
        let store = self.store.read().await;
        Ok(store.documents.get(id).map(|d| d.article.clone()))
    }

    async fn add_article(&self, article: &Article) -> Result<String> {
        let mut store = self.store.write().await;
        let mut article = article.clone();
        article.id = String::new();
        Ok(store.insert(article))
    }

    async fn increment(&self, id: &str, counter: Counter, delta: i64) -> Result<u64> {
        let mut store = self.store.write().await;
        store.increment(id, counter, delta)
    }

    async fn has_like(&self, id: &str, user_id: &str) -> Result<bool> {
        let store = self.store.read().await;
        Ok(store
            .documents
            .get(id)
            .map_or(false, |d| d.likes.contains(user_id)))
    }

    async fn toggle_like(&self, id: &str, user_id: &str) -> Result<bool> {
        let mut store = self.store.write().await;
        store.toggle_like(id, user_id)
    }

    async fn add_comment(&self, id: &str, comment: &Comment) -> Result<Comment> {
        let mut store = self.store.write().await;
        let document = store.document_mut(id)?;
        let mut comment = comment.clone();
        comment.id = Uuid::new_v4().simple().to_string();
        document.comments.push(comment.clone());
        Ok(comment)
    }

    async fn get_comments(&self, id: &str, limit: usize) -> Result<Vec<Comment>> {
        let store = self.store.read().await;
        let mut comments = store
            .documents
            .get(id)
            .map(|d| d.comments.clone())
            .unwrap_or_default();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        comments.truncate(limit);
        Ok(comments)
    }
}
