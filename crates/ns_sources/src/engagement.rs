use chrono::Utc;
use ns_core::{Article, ArticleStorage, Category, Comment, Counter, Error, Result, StoreFilter, StoreQuery};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_COMMENT_LIMIT: usize = 50;
pub const DEFAULT_RELATED_LIMIT: usize = 5;

/// Per-article reads and writes: views, likes, comments and write-back of
/// external articles.
pub struct ArticleService {
    storage: Arc<dyn ArticleStorage>,
}

impl ArticleService {
    pub fn new(storage: Arc<dyn ArticleStorage>) -> Self {
        Self { storage }
    }

    /// Fetch an article and count the view.
    pub async fn get_article(&self, id: &str) -> Result<Article> {
        let mut article = self
            .storage
            .get_article(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("article {}", id)))?;

        match self.storage.increment(id, Counter::Views, 1).await {
            Ok(views) => article.views = views,
            Err(e) => warn!("Failed to record view for {}: {}", id, e),
        }
        Ok(article)
    }

    /// Category of a stored article, without counting a view.
    pub async fn article_category(&self, id: &str) -> Result<Category> {
        self.storage
            .get_article(id)
            .await?
            .map(|a| a.category)
            .ok_or_else(|| Error::NotFound(format!("article {}", id)))
    }

    /// Flip the user's like; returns whether the article is now liked.
    pub async fn toggle_like(&self, id: &str, user_id: &str) -> Result<bool> {
        if user_id.trim().is_empty() {
            return Err(Error::InvalidRequest("a user is required to like an article".to_string()));
        }
        let liked = self.storage.toggle_like(id, user_id).await?;
        debug!("{} {} {}", user_id, if liked { "liked" } else { "unliked" }, id);
        Ok(liked)
    }

    pub async fn has_user_liked(&self, id: &str, user_id: &str) -> bool {
        if user_id.trim().is_empty() {
            return false;
        }
        self.storage.has_like(id, user_id).await.unwrap_or_else(|e| {
            warn!("Failed to check like for {}: {}", id, e);
            false
        })
    }

    pub async fn add_comment(&self, id: &str, user_id: &str, text: &str) -> Result<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidRequest("comment text is empty".to_string()));
        }
        let comment = Comment {
            id: String::new(),
            user_id: user_id.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
            likes: 0,
        };
        let stored = self.storage.add_comment(id, &comment).await?;
        if let Err(e) = self.storage.increment(id, Counter::Comments, 1).await {
            warn!("Failed to bump comment count for {}: {}", id, e);
        }
        Ok(stored)
    }

    pub async fn get_comments(&self, id: &str, limit: Option<usize>) -> Result<Vec<Comment>> {
        self.storage
            .get_comments(id, limit.unwrap_or(DEFAULT_COMMENT_LIMIT))
            .await
    }

    /// Other store articles in the same category. Failures yield an empty list.
    pub async fn related_articles(&self, id: &str, category: Category, limit: Option<usize>) -> Vec<Article> {
        let limit = limit.unwrap_or(DEFAULT_RELATED_LIMIT);
        let query = StoreQuery::filtered(StoreFilter::Category(category), limit + 5);
        match self.storage.query(&query).await {
            Ok(articles) => articles.into_iter().filter(|a| a.id != id).take(limit).collect(),
            Err(e) => {
                warn!("Failed to load related articles for {}: {}", id, e);
                Vec::new()
            }
        }
    }

    /// Persist an external article under a new store key. Store articles are
    /// left alone and failures are only logged.
    pub async fn save_external_article(&self, article: &Article) -> Option<String> {
        if !article.is_external() {
            return None;
        }
        match self.storage.add_article(article).await {
            Ok(id) => {
                info!("💾 Saved external article '{}' as {}", article.title, id);
                Some(id)
            }
            Err(e) => {
                warn!("Failed to save external article '{}': {}", article.title, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use ns_core::{ArticleOrigin, SourceRef};
    use ns_storage::MemoryStorage;

    fn article(id: &str, category: Category, hour: i64) -> Article {
        Article {
            id: id.to_string(),
            title: format!("Title {}", id),
            description: "Description".to_string(),
            content: String::new(),
            image_url: None,
            published_at: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap() + Duration::hours(hour),
            source: SourceRef::default(),
            url: Some(format!("https://example.test/{}", id)),
            category,
            location: None,
            views: 0,
            likes: 0,
            comments: 0,
            origin: ArticleOrigin::Store,
        }
    }

    async fn service() -> ArticleService {
        let storage = MemoryStorage::with_articles(vec![
            article("a", Category::Sports, 1),
            article("b", Category::Sports, 2),
            article("c", Category::Sports, 3),
            article("d", Category::Health, 4),
        ])
        .await;
        ArticleService::new(Arc::new(storage))
    }

    #[tokio::test]
    async fn test_get_article_counts_views() {
        let service = service().await;
        assert_eq!(service.get_article("a").await.unwrap().views, 1);
        assert_eq!(service.get_article("a").await.unwrap().views, 2);
        assert!(matches!(service.get_article("zzz").await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_toggle_like_round_trip() {
        let service = service().await;
        assert!(!service.has_user_liked("a", "u1").await);
        assert!(service.toggle_like("a", "u1").await.unwrap());
        assert!(service.has_user_liked("a", "u1").await);
        assert_eq!(service.get_article("a").await.unwrap().likes, 1);

        assert!(!service.toggle_like("a", "u1").await.unwrap());
        assert!(!service.has_user_liked("a", "u1").await);
        assert_eq!(service.get_article("a").await.unwrap().likes, 0);

        assert!(!service.has_user_liked("a", "").await);
        assert!(matches!(service.toggle_like("missing", "u1").await, Err(Error::NotFound(_))));
        assert!(matches!(service.toggle_like("a", " ").await, Err(Error::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_concurrent_toggles_keep_count_consistent() {
        let service = Arc::new(service().await);
        let toggles = (0..4).map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.toggle_like("a", "u1").await.unwrap() })
        });
        let results = futures::future::join_all(toggles).await;
        let liked = results.into_iter().filter(|r| *r.as_ref().unwrap()).count();
        assert_eq!(liked, 2);

        assert!(!service.has_user_liked("a", "u1").await);
        assert_eq!(service.get_article("a").await.unwrap().likes, 0);
    }

    #[tokio::test]
    async fn test_comments_are_counted_and_newest_first() {
        let service = service().await;
        service.add_comment("b", "u1", "first").await.unwrap();
        service.add_comment("b", "u2", "second").await.unwrap();
        assert!(service.add_comment("b", "u3", "   ").await.is_err());

        let comments = service.get_comments("b", None).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert!(comments[0].created_at >= comments[1].created_at);
        assert!(comments.iter().all(|c| !c.id.is_empty()));
        assert_eq!(service.get_article("b").await.unwrap().comments, 2);
    }

    #[tokio::test]
    async fn test_related_excludes_self() {
        let service = service().await;
        let related = service.related_articles("c", Category::Sports, None).await;
        let ids: Vec<&str> = related.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        let related = service.related_articles("c", Category::Sports, Some(1)).await;
        assert_eq!(related.len(), 1);

        assert_eq!(service.article_category("d").await.unwrap(), Category::Health);
        assert_eq!(service.get_article("d").await.unwrap().views, 1);
    }

    #[tokio::test]
    async fn test_only_external_articles_are_saved() {
        let service = service().await;
        assert_eq!(service.save_external_article(&article("x", Category::General, 0)).await, None);

        let mut external = article("x", Category::General, 0);
        external.origin = ArticleOrigin::External;
        let id = service.save_external_article(&external).await.unwrap();
        assert_ne!(id, "x");
        let saved = service.get_article(&id).await.unwrap();
        assert_eq!(saved.origin, ArticleOrigin::Store);
    }
}
