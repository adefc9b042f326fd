pub mod error;
pub mod supabase;

pub use error::DatabaseError;
pub use supabase::SupabaseClient;

/// Reference DDL for the PostgREST-backed deployment.
pub const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");
