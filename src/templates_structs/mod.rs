// Template context structures for Askama templates, organized by page.

use actix_session::Session;

use crate::session::{csrf, take_flash};

pub const APP_NAME: &str = "Agreements";

/// Common context shared by all pages.
/// Templates access these as `ctx.app_name`, `ctx.csrf_token`, etc.
pub struct PageContext {
    pub app_name: String,
    pub csrf_token: String,
    pub flash: Option<String>,
    pub current_path: String,
}

impl PageContext {
    pub fn build(session: &Session, current_path: &str) -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            csrf_token: csrf::get_or_create_token(session),
            flash: take_flash(session),
            current_path: current_path.to_string(),
        }
    }
}

mod agreement;
mod api;
mod dashboard;

pub use self::agreement::{AgreementDetailTemplate, AgreementFormTemplate, AgreementFormValues};
pub use self::api::{ApiAgreementListQuery, ApiErrorResponse, PaginatedResponse};
pub use self::dashboard::DashboardTemplate;
