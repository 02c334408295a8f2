pub mod aggregator;
pub mod chunker;
pub mod embedding;
pub mod estimator;
pub mod pipeline;
pub mod processor;
pub mod sink;
pub mod tokenizer;

pub use aggregator::{WeightedVector, aggregate};
pub use chunker::{Batched, chunk_tokens, group};
pub use embedding::{EmbeddingClient, EmbeddingService, OpenAiEmbeddingService};
pub use estimator::{FileEstimate, TokenEstimate, TokenEstimator};
pub use pipeline::DirectoryPipeline;
pub use processor::{DocumentProcessor, ProcessDocument};
pub use sink::{BatchSink, JsonlSink};
pub use tokenizer::Tokenizer;
