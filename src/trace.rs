pub(crate) const CONNECTION_TRACING_EVENT_TARGET: &str = "docstore::connection";
pub(crate) const OPERATION_TRACING_EVENT_TARGET: &str = "docstore::operation";
