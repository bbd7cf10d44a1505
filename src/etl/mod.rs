pub mod batch;
pub mod cleaner;
pub mod extractor;
pub mod factory;
pub mod filter;
pub mod loader;
pub mod pipeline;
pub mod transformations;
pub mod transformer;

pub use extractor::Extractor;
pub use factory::etl_factory;
pub use loader::Loader;
pub use pipeline::EtlPipeline;
pub use transformer::{TransformOutput, Transformer};
