//! # Atlas API Client
//!
//! A typed, read-only client for a PostgREST-style backend that exposes
//! several schemas behind one endpoint.
//!
//! - `SessionFactory` / `create_session`: authenticate once per schema.
//! - `Session::from::<T>()`: start a `QueryBuilder` for the table behind a
//!   `Record` type; chain `select`, `filter`, `order`, `limit`, then `execute`.
//! - `mapper`: turns raw JSON rows into records according to their
//!   `RowSchema`.
//! - `Transport`: the seam to the network; `HttpTransport` is the reqwest
//!   implementation.
//!
//! Errors are returned, never logged here; callers decide what to do with them.

mod auth;
pub mod error;
pub mod filter;
pub mod mapper;
pub mod query;
pub mod responses;
pub mod session;
pub mod transport;

// --- Public API ---
pub use error::{ClientError, MappingError};
pub use filter::{Condition, Operand, Operator, Predicate};
pub use query::{QueryBuilder, QueryRequest, ResultSet};
pub use responses::ServiceErrorResponse;
pub use session::{create_session, Session, SessionFactory};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport};
