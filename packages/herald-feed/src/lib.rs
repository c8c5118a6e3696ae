pub mod fetch;
pub mod rss;

mod error;

pub use error::{Error, Result};
pub use fetch::{CrawlItem, FeedSource, RssFetcher, fetch_all, sources};
pub use rss::RssEntry;
