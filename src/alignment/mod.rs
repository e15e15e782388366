pub mod anchor;
pub mod distance;
pub mod extraction;
pub mod interpolation;
pub mod matcher;
pub mod report;
pub mod tokenization;
pub mod voice_activity;
pub mod word_mapper;
