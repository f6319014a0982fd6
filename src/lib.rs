pub mod cli;
pub mod config;
pub mod critique;
pub mod dialogue;
pub mod doctor;
pub mod enhancement;
pub mod error;
pub mod interactive;
pub mod llm;
pub mod markdown;
pub mod personas;
pub mod pipeline;
pub mod profiles;
pub mod prompts;
pub mod provider;
pub mod rules;
pub mod security;
pub mod server;
pub mod telemetry;
