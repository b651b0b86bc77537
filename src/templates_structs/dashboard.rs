use askama::Template;

use super::PageContext;
use crate::dashboard::view::DashboardView;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub view: DashboardView,
}
