//! Support Chat - Conversational support assistant backend
//!
//! Answers visitor questions from a retrieved knowledge corpus, picks up the
//! visitor's name and phone as the conversation goes, and forwards each
//! completed contact to the CRM exactly once.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
