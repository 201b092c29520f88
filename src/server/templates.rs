use crate::core::{Label, Page};
use askama::Template;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub page: Page<String>,
    pub labels: &'a [Label],
}
