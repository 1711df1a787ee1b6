// Success story handlers
use actix_web::{web, HttpResponse, Result};
use log::error;

use crate::store::{DataStore, StoryStore};
use crate::utils::responses::ResponseBuilder;

/// List published adoption success stories, newest first
///
/// Public route; drafts never appear here.
///
/// # Errors
/// Never fails at the actix level
pub async fn list_stories(store: web::Data<dyn DataStore>) -> Result<HttpResponse> {
    match store.list_published_stories().await {
        Ok(stories) => Ok(ResponseBuilder::ok_json(&stories)),
        Err(err) => {
            error!("Story listing query failed: {err}");
            Ok(ResponseBuilder::server_error())
        }
    }
}
