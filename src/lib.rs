//! Storefront API - Product catalog, Stripe checkout and order reconciliation
//!
//! This crate implements the backend of a small online store: a product
//! catalog, hosted checkout sessions, webhook-driven order reconciliation
//! and a stub question-answering endpoint.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
