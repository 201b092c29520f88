use crate::core::{is_image_name, list_images, move_file, paginate, parse_page_param};
use crate::error::{AppError, Result};
use crate::server::templates::IndexTemplate;
use crate::state::AppState;
use crate::utils::security::validate_file_name;
use askama::Template;
use axum::extract::rejection::FormRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Form;
use serde::Deserialize;
use tokio::fs;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Default)]
pub struct LabelForm {
    pub image: Option<String>,
    pub label: Option<String>,
}

impl LabelForm {
    /// Keeps the first value of each field. Repeats and unknown fields are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "image" if form.image.is_none() => form.image = Some(value),
                "label" if form.label.is_none() => form.label = Some(value),
                _ => {}
            }
        }
        form
    }
}

/// `GET /?page=N`: the image grid for one page.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>> {
    let images = list_images(state.images_dir()).await?;

    let requested = parse_page_param(query.page.as_deref());
    let page = paginate(&images, requested, state.config.items_per_page);

    let template = IndexTemplate {
        page,
        labels: state.labels.labels(),
    };

    Ok(Html(template.render()?))
}

/// `POST /label`: moves `image` into the folder of label number `label`.
pub async fn assign_label(
    State(state): State<AppState>,
    form: std::result::Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<(StatusCode, &'static str)> {
    let Form(pairs) = form.map_err(|rejection| {
        debug!("Rejected label form: {}", rejection);
        AppError::validation("image", "Missing image or label")
    })?;
    let form = LabelForm::from_pairs(pairs);

    let image = form.image.unwrap_or_default();
    let label = form.label.unwrap_or_default();

    if image.is_empty() || label.is_empty() {
        return Err(AppError::validation("image", "Missing image or label"));
    }

    let choice = label
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|i| state.labels.get(i))
        .ok_or_else(|| AppError::validation("label", "Invalid label"))?;

    let image = validate_file_name(&image)?;
    if !is_image_name(image) {
        return Err(AppError::validation("image", "Not an image file"));
    }

    let _guard = state.fs_gate.read().await;

    // Label folders live next to the images; only file content may move
    let source = state.images_dir().join(image);
    if !fs::metadata(&source).await?.is_file() {
        return Err(AppError::InvalidPath {
            message: "Not an image file".to_string(),
        });
    }

    let destination_dir = state.images_dir().join(&choice.text);
    move_file(&source, &destination_dir, image).await?;

    info!(
        "Labeled image {} with label '{}' ({})",
        image, choice.text, choice.index
    );

    Ok((StatusCode::OK, "OK"))
}
