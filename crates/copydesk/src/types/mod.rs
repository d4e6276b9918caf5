//! Core types for copydesk

pub mod record;
pub mod request;
pub mod response;

pub use record::{RecordMeta, RetrievedDocument, SearchHit, VectorRecord};
pub use request::{ArticleRequest, IngestRequest, MarketingPostRequest, RagRequest, SearchRequest};
pub use response::{
    ArticleResponse, BackfillFailure, BackfillReport, IngestReport, MarketingPostResponse,
    RagAnswer, RecordListResponse, SearchResponse,
};
