use crate::domain::model::{BlogPost, NewBlogPost};
use crate::domain::ports::{fetch_all, first_row, RequestContext, TableStore};
use crate::domain::query::Query;
use crate::domain::slug::slugify;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::require_text;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const BLOG_TABLE: &str = "blog";

#[derive(Debug, Clone, Deserialize)]
pub struct BlogForm {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: String,
    /// 以逗號分隔
    #[serde(default)]
    pub categories: String,
}

/// 文章與其網址 slug
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogEntry {
    #[serde(flatten)]
    pub post: BlogPost,
    pub slug: String,
}

impl From<BlogPost> for BlogEntry {
    fn from(post: BlogPost) -> Self {
        let slug = slugify(&post.title);
        Self { post, slug }
    }
}

pub fn parse_categories(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|category| !category.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Clone)]
pub struct BlogService {
    tables: Arc<dyn TableStore>,
}

impl BlogService {
    pub fn new(tables: Arc<dyn TableStore>) -> Self {
        Self { tables }
    }

    /// 最新的文章在前
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<BlogEntry>> {
        let query = Query::table(BLOG_TABLE).order("id", false);
        let posts: Vec<BlogPost> = fetch_all(self.tables.as_ref(), ctx, &query).await?;

        tracing::debug!("📰 Loaded {} blog posts", posts.len());
        Ok(posts.into_iter().map(BlogEntry::from).collect())
    }

    /// 資料表沒有 slug 欄位，因此讀取全部文章後比對標題產生的 slug
    pub async fn find_by_slug(&self, ctx: &RequestContext, slug: &str) -> Result<BlogEntry> {
        let query = Query::table(BLOG_TABLE);
        let posts: Vec<BlogPost> = fetch_all(self.tables.as_ref(), ctx, &query).await?;

        posts
            .into_iter()
            .find(|post| slugify(&post.title) == slug)
            .map(BlogEntry::from)
            .ok_or_else(|| SiteError::not_found(format!("bejegyzés ({})", slug)))
    }

    pub async fn create(&self, ctx: &RequestContext, form: &BlogForm) -> Result<BlogEntry> {
        require_text("Cím", &form.title)?;
        require_text("Tartalom", &form.content)?;

        let new_post = NewBlogPost {
            title: form.title.clone(),
            content: form.content.clone(),
            image_url: form.image_url.trim().to_string(),
            categories: parse_categories(&form.categories),
        };

        let rows = self
            .tables
            .insert(ctx, BLOG_TABLE, serde_json::to_value([&new_post])?)
            .await?;
        let post: BlogPost = first_row(rows, BLOG_TABLE)?;

        tracing::info!("📰 Blog post {} created: {}", post.id, post.title);
        Ok(BlogEntry::from(post))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::fake::FakeBackend;
    use serde_json::json;

    fn service_with(rows: Vec<serde_json::Value>) -> (BlogService, FakeBackend) {
        let fake = FakeBackend::new();
        fake.seed(BLOG_TABLE, rows);
        (BlogService::new(Arc::new(fake.clone())), fake)
    }

    #[test]
    fn test_parse_categories() {
        assert_eq!(
            parse_categories(" hírek, frissítés ,, játék ,"),
            vec!["hírek", "frissítés", "játék"]
        );
        assert!(parse_categories("  ").is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first_with_slugs() {
        let (service, _) = service_with(vec![
            json!({"id": 1, "title": "First Post", "content": "a"}),
            json!({"id": 2, "title": "Second Post!", "content": "b"}),
        ]);

        let entries = service.list(&RequestContext::anonymous()).await.unwrap();
        assert_eq!(entries[0].post.id, 2);
        assert_eq!(entries[0].slug, "second-post");
        assert_eq!(entries[1].slug, "first-post");
    }

    #[tokio::test]
    async fn test_find_by_slug() {
        let (service, _) = service_with(vec![
            json!({"id": 1, "title": "Patch 1.1 megjelent", "content": "a"}),
            json!({"id": 2, "title": "Új bolt típusok", "content": "b"}),
        ]);
        let ctx = RequestContext::anonymous();

        let found = service.find_by_slug(&ctx, "j-bolt-tpusok").await.unwrap();
        assert_eq!(found.post.id, 2);

        let missing = service.find_by_slug(&ctx, "nincs-ilyen").await;
        assert!(matches!(missing, Err(SiteError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_create_splits_categories_and_returns_slug() {
        let (service, fake) = service_with(vec![]);
        let form = BlogForm {
            title: "Hello World".to_string(),
            content: "<p>Szia</p>".to_string(),
            image_url: " https://img.example/x.png ".to_string(),
            categories: "news, update".to_string(),
        };

        let entry = service.create(&RequestContext::anonymous(), &form).await.unwrap();

        assert_eq!(entry.slug, "hello-world");
        assert_eq!(entry.post.categories, vec!["news", "update"]);
        assert_eq!(entry.post.image_url.as_deref(), Some("https://img.example/x.png"));
        assert_eq!(fake.rows(BLOG_TABLE).len(), 1);
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let (service, fake) = service_with(vec![]);
        let form = BlogForm {
            title: "  ".to_string(),
            content: "x".to_string(),
            image_url: String::new(),
            categories: String::new(),
        };

        let result = service.create(&RequestContext::anonymous(), &form).await;
        assert!(matches!(result, Err(SiteError::ValidationError { .. })));
        assert!(fake.rows(BLOG_TABLE).is_empty());
    }
}
