pub(crate) mod mcp;
pub(crate) mod send;
