//! Content domain - management tables, post editor and revenue records

mod keyword;
mod post;
mod revenue;

pub use keyword::{Keyword, KeywordFilters, KeywordsQuery, KEYWORDS_TABLE};
pub use post::{Post, PostFilters, PostStatus, PostUpdate, PostsQuery, POSTS_TABLE};
pub use revenue::{RevenueEntry, RevenueFilters, RevenueQuery, RevenueSummary, REVENUE_TABLE};
