use clap::Subcommand;
use ns_core::{AggregationRequest, Article, Category, Result};

use crate::aggregator::NewsAggregator;
use crate::engagement::ArticleService;

#[derive(Subcommand, Debug, Clone)]
pub enum NewsCommands {
    /// Show the aggregated feed
    News {
        /// Restrict to one category (business, technology, ...)
        #[arg(long)]
        category: Option<Category>,
        /// Show top headlines instead of the latest articles
        #[arg(long)]
        trending: bool,
        /// Defaults to the configured page size
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Search stored and external articles
    Search {
        term: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one stored article with its comments and related articles
    Article { id: String },
}

pub async fn handle_command(
    command: NewsCommands,
    aggregator: &NewsAggregator,
    articles: &ArticleService,
    page_size: usize,
) -> Result<()> {
    match command {
        NewsCommands::News {
            category,
            trending,
            limit,
        } => {
            let request = AggregationRequest::global(limit.unwrap_or(page_size))
                .with_category(category)
                .trending(trending);
            let feed = aggregator.get_news(&request).await?;
            println!("Found {} articles", feed.len());
            print_articles(&feed);
        }
        NewsCommands::Search { term, limit } => {
            let feed = aggregator
                .search_news(&term, &AggregationRequest::global(limit.unwrap_or(page_size)))
                .await?;
            println!("Found {} articles matching '{}'", feed.len(), term.trim());
            print_articles(&feed);
        }
        NewsCommands::Article { id } => {
            let article = articles.get_article(&id).await?;
            println!("{}", article.title);
            println!("{} · {} · {}", article.source.name, article.category, article.published_at.to_rfc3339());
            println!("👁️ {}  ❤️ {}  💬 {}", article.views, article.likes, article.comments);
            println!();
            println!("{}", article.description);

            let comments = articles.get_comments(&id, None).await?;
            if !comments.is_empty() {
                println!();
                println!("Comments:");
                for comment in comments {
                    println!("  {}: {}", comment.user_id, comment.text);
                }
            }

            let related = articles.related_articles(&id, article.category, None).await;
            if !related.is_empty() {
                println!();
                println!("Related:");
                print_articles(&related);
            }
        }
    }
    Ok(())
}

fn print_articles(articles: &[Article]) {
    for article in articles {
        let emoji = if article.is_external() { "🌐" } else { "🗄️" };
        println!(
            "{} [{}] {} ({}, {})",
            emoji,
            article.category,
            article.title,
            article.source.name,
            article.published_at.format("%Y-%m-%d %H:%M")
        );
    }
}
