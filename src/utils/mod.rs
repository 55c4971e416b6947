pub mod pagination;
pub mod revoked_tokens;
pub mod sql_filter;
