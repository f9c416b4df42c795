/// Endpoint of the research agent when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5001/research";

/// Name of the query-string parameter carrying the user query.
pub const QUERY_PARAM: &str = "query";

/// Message shown when the submitted query is blank.
pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a question or topic.";

/// Message shown when the agent answers with JSON that lacks required fields.
pub const SHAPE_ERROR_MESSAGE: &str = "Unexpected response shape from server.";
