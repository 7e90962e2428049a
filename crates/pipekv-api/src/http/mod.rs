//! HTTP REST API endpoints.
//!
//! # Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/api/redis/pipeline/save` | POST | Bulk write (pipelined) |
//! | `/api/redis/normal/save` | POST | Bulk write (sequential) |
//! | `/api/redis/pipeline/get` | GET | Bulk read (pipelined) |
//! | `/api/redis/pipeline/increment` | POST | Increment counters |
//! | `/api/redis/pipeline/delete` | DELETE | Delete keys |
//! | `/api/redis/pipeline/exists` | GET | Check key existence |
//! | `/api/redis/test/generate` | POST | Generate sample data |
//! | `/api/redis/test/compare` | POST | Pipeline vs sequential timing |
//! | `/api/redis/health` | GET | Liveness check |
//! | `/ready` | GET | Readiness check (pings the store) |

pub mod routes;
pub mod state;

pub use routes::{create_router, create_router_with_body_limit, ApiError, DEFAULT_BODY_LIMIT};
pub use state::AppState;
