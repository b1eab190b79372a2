//! 노무비 명세서・근로계약서 생성 CLI

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
