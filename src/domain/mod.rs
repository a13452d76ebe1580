// Blog posts read from the article store
pub mod article;

// Domain-specific error types
pub mod errors;

// Instruments and alias table
pub mod instrument;

// Polarity lexicon and metadata rule tables
pub mod lexicon;

// Repository traits
pub mod repositories;

// Sentiment records and their labels
pub mod sentiment;
