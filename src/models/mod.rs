pub mod dto;
pub mod filter;
pub mod manga;
pub mod statistics;

pub use dto::{AccumulatedResults, ItemView, ResultPage, SessionView};
pub use filter::{
    ContentRating, Demographic, FilterSpec, PublicationStatus, SearchRequest, SortDirection,
    SortKey, TagMatchMode, TagSet,
};
pub use manga::{
    LocalizedText, MangaListResponse, MangaRecord, MangaSummary, MangaTag, TagListResponse,
    DESCRIPTION_PLACEHOLDER, TITLE_PLACEHOLDER,
};
pub use statistics::{MangaStatistics, RatingStatistics, StatisticsResponse};
