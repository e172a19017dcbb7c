pub mod add_text_route;
pub mod add_website_route;
pub mod ingest_request;
pub mod ingest_response;
pub mod upload_route;
