//! Query command - fetch one capability from the terminal

use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;

use crate::api::types::QueryResponse;
use crate::api::AppState;
use crate::domain::analytics::{
    DEFAULT_DUPLICATE_TABLE, DEFAULT_DUPLICATE_THRESHOLD, DEFAULT_GAP_THRESHOLD,
    DEFAULT_MATCH_COUNT, DEFAULT_MAX_RECOMMENDATIONS, DEFAULT_SIMILARITY_THRESHOLD,
};
use crate::domain::query::QueryData;
use crate::domain::{
    ContentGapsQuery, HybridSearchQuery, KeywordFilters, KeywordRecommendationsQuery, PageKind,
    PostFilters, PostStatus, RevenueFilters, SemanticDuplicatesQuery,
};
use crate::infrastructure::services::PageParams;

#[derive(Args)]
pub struct QueryArgs {
    #[command(subcommand)]
    pub capability: Capability,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Subcommand)]
pub enum Capability {
    /// Keywords a blog has no good content for
    ContentGaps {
        #[arg(long)]
        blog_id: String,
        #[arg(long, default_value_t = DEFAULT_GAP_THRESHOLD)]
        gap_threshold: f64,
    },

    /// Embedding coverage per table
    EmbeddingsStats,

    /// Hybrid full-text and vector search over posts
    Search {
        query: String,
        /// Comma separated embedding, e.g. 0.1,0.2,0.3
        #[arg(long, value_delimiter = ',')]
        embedding: Option<Vec<f32>>,
        #[arg(long)]
        blog_id: Option<String>,
        #[arg(long, default_value_t = DEFAULT_MATCH_COUNT)]
        match_count: u32,
    },

    /// Keywords semantically close to a post
    KeywordRecommendations {
        #[arg(long)]
        post_id: String,
        #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
        similarity_threshold: f64,
        #[arg(long, default_value_t = DEFAULT_MAX_RECOMMENDATIONS)]
        max_recommendations: u32,
    },

    /// Post and keyword counts per niche
    NicheStatistics,

    /// Near-identical rows of a table
    SemanticDuplicates {
        #[arg(long, default_value = DEFAULT_DUPLICATE_TABLE)]
        table_name: String,
        #[arg(long, default_value_t = DEFAULT_DUPLICATE_THRESHOLD)]
        similarity_threshold: f64,
    },

    /// Posts table
    Posts {
        #[arg(long)]
        blog_id: Option<String>,
        #[arg(long, value_parser = parse_status)]
        status: Option<PostStatus>,
        #[arg(long)]
        search: Option<String>,
    },

    /// Keywords table
    Keywords {
        #[arg(long)]
        niche: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },

    /// Revenue records with totals
    Revenue {
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        post_id: Option<String>,
    },

    /// A whole dashboard page (analytics, content, keywords, monetization)
    Page {
        name: String,
        #[arg(long)]
        blog_id: Option<String>,
        #[arg(long)]
        post_id: Option<String>,
    },
}

fn parse_status(value: &str) -> Result<PostStatus, String> {
    serde_json::from_value(Value::String(value.to_lowercase()))
        .map_err(|_| format!("unknown status '{}'", value))
}

fn response<T: Serialize>(fetched: Option<QueryData<Vec<T>>>) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(QueryResponse::from(fetched))?)
}

pub async fn run(args: QueryArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let state = crate::create_app_state(&config)?;

    let output = fetch(&state, args.capability).await?;

    let text = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", text);

    Ok(())
}

async fn fetch(state: &AppState, capability: Capability) -> anyhow::Result<Value> {
    match capability {
        Capability::ContentGaps {
            blog_id,
            gap_threshold,
        } => {
            let query = ContentGapsQuery::for_blog(blog_id).with_threshold(gap_threshold);
            response(state.analytics.content_gaps(&query).await?)
        }
        Capability::EmbeddingsStats => response(state.analytics.embeddings_stats().await?),
        Capability::Search {
            query,
            embedding,
            blog_id,
            match_count,
        } => {
            let query = HybridSearchQuery {
                query,
                embedding,
                blog_id,
                match_count,
            };
            response(state.analytics.hybrid_search(&query).await?)
        }
        Capability::KeywordRecommendations {
            post_id,
            similarity_threshold,
            max_recommendations,
        } => {
            let query = KeywordRecommendationsQuery {
                post_id,
                similarity_threshold,
                max_recommendations,
            };
            response(state.analytics.keyword_recommendations(&query).await?)
        }
        Capability::NicheStatistics => response(state.analytics.niche_statistics().await?),
        Capability::SemanticDuplicates {
            table_name,
            similarity_threshold,
        } => {
            let query = SemanticDuplicatesQuery::for_table(table_name)
                .with_threshold(similarity_threshold);
            response(state.analytics.semantic_duplicates(&query).await?)
        }
        Capability::Posts {
            blog_id,
            status,
            search,
        } => {
            let filters = PostFilters {
                blog_id,
                status,
                search,
            };
            response(state.content.posts(filters).await?)
        }
        Capability::Keywords { niche, search } => {
            response(state.content.keywords(KeywordFilters { niche, search }).await?)
        }
        Capability::Revenue { source, post_id } => {
            let filters = RevenueFilters { source, post_id };
            let mut output = response(state.content.revenue(filters.clone()).await?)?;
            let summary = state.content.revenue_summary(filters).await?;

            if let (Value::Object(map), Some(summary)) = (&mut output, summary) {
                map.insert("summary".to_string(), serde_json::to_value(summary.rows)?);
            }

            Ok(output)
        }
        Capability::Page {
            name,
            blog_id,
            post_id,
        } => {
            let kind = PageKind::parse(&name)
                .ok_or_else(|| anyhow::anyhow!("Unknown page '{}'", name))?;
            let params = PageParams {
                blog_id,
                post_id,
                ..PageParams::default()
            };

            Ok(serde_json::to_value(state.pages.page(kind, &params).await?)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use crate::domain::data_service::MockDataServiceClient;
    use crate::infrastructure::query_cache::QueryCache;
    use clap::Parser;
    use std::sync::Arc;

    fn parse(args: &[&str]) -> Capability {
        let mut argv = vec!["content-ops-dashboard", "query"];
        argv.extend_from_slice(args);

        match Cli::try_parse_from(argv).unwrap().command {
            Command::Query(query) => query.capability,
            Command::Serve => panic!("expected query command"),
        }
    }

    #[test]
    fn test_parse_defaults() {
        match parse(&["content-gaps", "--blog-id", "blog-1"]) {
            Capability::ContentGaps {
                blog_id,
                gap_threshold,
            } => {
                assert_eq!(blog_id, "blog-1");
                assert_eq!(gap_threshold, DEFAULT_GAP_THRESHOLD);
            }
            _ => panic!("wrong capability"),
        }
    }

    #[test]
    fn test_parse_embedding_list() {
        match parse(&["search", "rust", "--embedding", "0.1,0.2,0.3"]) {
            Capability::Search { embedding, .. } => {
                assert_eq!(embedding, Some(vec![0.1, 0.2, 0.3]));
            }
            _ => panic!("wrong capability"),
        }
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("Draft"), Ok(PostStatus::Draft));
        assert!(parse_status("deleted").is_err());
    }

    #[tokio::test]
    async fn test_fetch_prints_query_response() {
        let mut client = MockDataServiceClient::new();
        client
            .expect_call_procedure()
            .returning(|_| Ok(vec![serde_json::json!({"niche": "tech", "post_count": 4})]));
        let state = AppState::new(QueryCache::new(Arc::new(client)));

        let output = fetch(&state, Capability::NicheStatistics).await.unwrap();

        assert_eq!(output["status"], "success");
        assert_eq!(output["data"][0]["niche"], "tech");
    }

    #[tokio::test]
    async fn test_fetch_revenue_adds_summary() {
        let mut client = MockDataServiceClient::new();
        client.expect_select().times(1).returning(|_| {
            Ok(vec![serde_json::json!({"id": "r1", "source": "affiliate", "amount": 7.0, "currency": "USD"})])
        });
        let state = AppState::new(QueryCache::new(Arc::new(client)));

        let output = fetch(
            &state,
            Capability::Revenue {
                source: None,
                post_id: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(output["summary"]["totals"]["USD"], 7.0);
    }
}
