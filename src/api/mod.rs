//! API Module
//!
//! HTTP handlers and routing for the cache service REST API.
//!
//! # Endpoints
//! - `PUT /set`, `GET /get/:key`, `DELETE /del/:key` - single-key operations
//! - `GET /ttl/:key`, `POST /extend/:key` - expiry inspection and extension
//! - `POST /mget`, `PUT /mset`, `POST /mdel` - batch operations
//! - `GET /keys`, `GET /match`, `DELETE /match` - key listing and pattern operations
//! - `POST /prune`, `POST /clear` - maintenance
//! - `GET /stats`, `GET /health` - observability

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
