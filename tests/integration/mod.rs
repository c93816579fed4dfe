//! Integration Tests Module
//!
//! End-to-end tests for MarketLens against local stub servers: analysis
//! orchestration over SQLite, the chat proxy route, and the HTTP API.

// Shared stub servers and fixtures
mod support;

// Orchestrator + cache + provider/analytics backends
mod orchestration_test;

// Server-side chat proxy
mod chat_proxy_test;

// HTTP API routes
mod api_test;
