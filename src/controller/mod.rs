//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input
//! and coordinates between the model and the remote/storage components.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `navigation`: Popular list, search and trailer lookups
//! - `rental`: Rent confirmation, returns and persistence status

mod input;
mod navigation;
mod rental;

use std::sync::Arc;

use crate::error::FetchError;
use crate::model::AppModel;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<AppModel>,
}

impl AppController {
    pub fn new(model: Arc<AppModel>) -> Self {
        Self { model }
    }

    pub(crate) fn format_error(error: &FetchError) -> String {
        format!("Error: {}", error.user_message())
    }
}
