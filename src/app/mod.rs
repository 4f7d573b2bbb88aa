pub mod aggregator;
pub mod classifier;
pub mod controller;
pub mod entities;
pub mod resolver;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregator::IntakeAggregator;
pub use classifier::ProblemClassifier;
pub use controller::{AppController, Capabilities, IntakeReceipt};
pub use entities::EntityExtractor;
pub use resolver::{FallbackPolicy, TranscriptionResolver};
