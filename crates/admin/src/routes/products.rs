//! Product route handlers.
//!
//! Create and edit are multipart forms carrying the image upload. The body
//! limit comes from `CATALOG_MAX_UPLOAD_BYTES`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use tower_sessions::Session;

use catalog_core::validation::validate_product;
use catalog_core::{ProductId, SupplierId, ValidationErrors, parse_amount};

use crate::db::{ProductRepository, SupplierRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{
    Authorized, CanAddProduct, CanDeleteProduct, CanEditProduct, OptionalAuth, set_flash,
    take_flash,
};
use crate::models::{ProductInput, ProductWithSupplier, Supplier, Viewer};
use crate::services::{ImageUpload, ProductService, ProductServiceError};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Raw product form fields, as posted.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub supplier_id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub active: bool,
    pub image: Option<ImageUpload>,
}

impl ProductForm {
    /// Read every multipart field. Unknown fields are ignored; an empty
    /// file part (no file chosen) yields no image.
    async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == "image" {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                if !file_name.is_empty() || !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            match name.as_str() {
                "supplier_id" => form.supplier_id = value,
                "name" => form.name = value,
                "description" => form.description = value,
                "price" => form.price = value,
                "active" => form.active = true,
                _ => {}
            }
        }

        Ok(form)
    }

    /// Parse into a service input, or collect what is wrong with the raw
    /// fields together with the regular field rules.
    fn parse(&self) -> std::result::Result<ProductInput, (ValidationErrors, Vec<String>)> {
        let supplier_id = self.supplier_id.trim().parse::<SupplierId>().ok();
        let price = parse_amount(&self.price).ok();

        if let (Some(supplier_id), Some(price)) = (supplier_id, price) {
            return Ok(ProductInput {
                supplier_id,
                name: self.name.trim().to_owned(),
                description: self.description.trim().to_owned(),
                price,
                active: self.active,
            });
        }

        let errors = validate_product(
            self.name.trim(),
            self.description.trim(),
            price.unwrap_or(Decimal::ZERO),
        );
        let mut notifications = Vec::new();
        if supplier_id.is_none() {
            notifications.push("The Supplier field is required.".to_owned());
        }
        if price.is_none() {
            notifications.push("The Price field must be a valid amount.".to_owned());
        }
        notifications.extend(errors.messages());
        Err((errors, notifications))
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Product list page.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub viewer: Viewer,
    pub flash: Option<String>,
    pub products: Vec<ProductWithSupplier>,
}

/// Product details page.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub viewer: Viewer,
    pub item: ProductWithSupplier,
}

/// Values echoed back into the product form.
#[derive(Debug, Clone)]
pub struct ProductFormValues {
    pub supplier_id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub active: bool,
    /// Current image on edit.
    pub image: Option<String>,
}

impl Default for ProductFormValues {
    fn default() -> Self {
        Self {
            supplier_id: String::new(),
            name: String::new(),
            description: String::new(),
            price: String::new(),
            active: true,
            image: None,
        }
    }
}

impl From<&ProductWithSupplier> for ProductFormValues {
    fn from(item: &ProductWithSupplier) -> Self {
        let product = &item.product;
        Self {
            supplier_id: product.supplier_id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_input_string(),
            active: product.active,
            image: Some(product.image.clone()),
        }
    }
}

impl ProductFormValues {
    fn from_form(form: &ProductForm, image: Option<String>) -> Self {
        Self {
            supplier_id: form.supplier_id.clone(),
            name: form.name.clone(),
            description: form.description.clone(),
            price: form.price.clone(),
            active: form.active,
            image,
        }
    }
}

/// Create/edit product page.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub viewer: Viewer,
    pub heading: &'static str,
    pub action: String,
    pub image_required: bool,
    pub suppliers: Vec<Supplier>,
    pub values: ProductFormValues,
    pub errors: ValidationErrors,
    pub notifications: Vec<String>,
}

/// Delete confirmation page.
#[derive(Template, WebTemplate)]
#[template(path = "products/delete.html")]
pub struct ProductDeleteTemplate {
    pub viewer: Viewer,
    pub item: ProductWithSupplier,
}

// =============================================================================
// Helpers
// =============================================================================

async fn load_product(state: &AppState, id: ProductId) -> Result<ProductWithSupplier> {
    ProductRepository::new(state.pool())
        .get_with_supplier(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_owned()))
}

fn form_feedback(err: ProductServiceError) -> Result<(ValidationErrors, Vec<String>)> {
    match err.notifications() {
        Some(notifications) => {
            let errors = match err {
                ProductServiceError::Validation(errors) => errors,
                _ => ValidationErrors::new(),
            };
            Ok((errors, notifications))
        }
        None => Err(err.into()),
    }
}

struct FormPage {
    heading: &'static str,
    action: String,
    image_required: bool,
}

async fn render_form(
    state: &AppState,
    viewer: Viewer,
    page: FormPage,
    values: ProductFormValues,
    errors: ValidationErrors,
    notifications: Vec<String>,
) -> Result<Response> {
    let suppliers = SupplierRepository::new(state.pool()).list().await?;

    Ok(ProductFormTemplate {
        viewer,
        heading: page.heading,
        action: page.action,
        image_required: page.image_required,
        suppliers,
        values,
        errors,
        notifications,
    }
    .into_response())
}

fn new_form_page() -> FormPage {
    FormPage {
        heading: "New product",
        action: "/products/new".to_owned(),
        image_required: true,
    }
}

fn edit_form_page(id: ProductId) -> FormPage {
    FormPage {
        heading: "Edit product",
        action: format!("/products/{id}/edit"),
        image_required: false,
    }
}

// =============================================================================
// Read Routes
// =============================================================================

/// List all products with their supplier.
#[tracing::instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool())
        .list_with_suppliers()
        .await?;

    Ok(ProductsIndexTemplate {
        viewer: Viewer::new(user),
        flash: take_flash(&session).await,
        products,
    })
}

/// Product details.
#[tracing::instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    Ok(ProductShowTemplate {
        viewer: Viewer::new(user),
        item: load_product(&state, id).await?,
    })
}

// =============================================================================
// Create
// =============================================================================

/// Empty creation form.
pub async fn new_page(
    State(state): State<AppState>,
    auth: Authorized<CanAddProduct>,
) -> Result<Response> {
    render_form(
        &state,
        Viewer::from(auth.0),
        new_form_page(),
        ProductFormValues::default(),
        ValidationErrors::new(),
        Vec::new(),
    )
    .await
}

/// Create a product from the multipart form.
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    auth: Authorized<CanAddProduct>,
    multipart: Multipart,
) -> Result<Response> {
    let form = ProductForm::from_multipart(multipart).await?;
    let viewer = Viewer::from(auth.0);
    let values = ProductFormValues::from_form(&form, None);

    let input = match form.parse() {
        Ok(input) => input,
        Err((errors, notifications)) => {
            return render_form(&state, viewer, new_form_page(), values, errors, notifications)
                .await;
        }
    };

    match ProductService::new(state.pool(), state.images())
        .add(input, form.image)
        .await
    {
        Ok(product) => Ok(Redirect::to(&format!("/products/{}", product.id)).into_response()),
        Err(err) => {
            let (errors, notifications) = form_feedback(err)?;
            render_form(&state, viewer, new_form_page(), values, errors, notifications).await
        }
    }
}

// =============================================================================
// Edit
// =============================================================================

/// Edit form.
#[tracing::instrument(skip(state, auth))]
pub async fn edit_page(
    State(state): State<AppState>,
    auth: Authorized<CanEditProduct>,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let item = load_product(&state, id).await?;

    render_form(
        &state,
        Viewer::from(auth.0),
        edit_form_page(id),
        ProductFormValues::from(&item),
        ValidationErrors::new(),
        Vec::new(),
    )
    .await
}

/// Apply product edits. Without a new file the current image is kept.
#[tracing::instrument(skip(state, auth, multipart))]
pub async fn update(
    State(state): State<AppState>,
    auth: Authorized<CanEditProduct>,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Response> {
    let current = load_product(&state, id).await?;
    let form = ProductForm::from_multipart(multipart).await?;
    let viewer = Viewer::from(auth.0);
    let values = ProductFormValues::from_form(&form, Some(current.product.image.clone()));

    let input = match form.parse() {
        Ok(input) => input,
        Err((errors, notifications)) => {
            return render_form(&state, viewer, edit_form_page(id), values, errors, notifications)
                .await;
        }
    };

    match ProductService::new(state.pool(), state.images())
        .update(id, input, form.image)
        .await
    {
        Ok(_) => Ok(Redirect::to(&format!("/products/{id}")).into_response()),
        Err(err) => {
            let (errors, notifications) = form_feedback(err)?;
            render_form(&state, viewer, edit_form_page(id), values, errors, notifications).await
        }
    }
}

// =============================================================================
// Delete
// =============================================================================

/// Delete confirmation.
#[tracing::instrument(skip(state, auth))]
pub async fn delete_page(
    State(state): State<AppState>,
    auth: Authorized<CanDeleteProduct>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    Ok(ProductDeleteTemplate {
        viewer: Viewer::from(auth.0),
        item: load_product(&state, id).await?,
    })
}

/// Delete the product and its image.
#[tracing::instrument(skip(state, _auth, session))]
pub async fn delete(
    State(state): State<AppState>,
    _auth: Authorized<CanDeleteProduct>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    ProductService::new(state.pool(), state.images())
        .remove(id)
        .await?;

    set_flash(&session, "Product deleted.").await?;
    Ok(Redirect::to("/products").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            supplier_id: SupplierId::new_v4().to_string(),
            name: " Caneca ".to_owned(),
            description: "Caneca de cerâmica".to_owned(),
            price: "R$ 1.234,50".to_owned(),
            active: true,
            image: None,
        }
    }

    #[test]
    fn test_parse_valid_form() {
        let input = form().parse().unwrap();
        assert_eq!(input.name, "Caneca");
        assert_eq!(input.price, Decimal::new(123_450, 2));
        assert!(input.validate().is_empty());
    }

    #[test]
    fn test_parse_reports_bad_price_and_supplier() {
        let bad = ProductForm {
            supplier_id: "not-a-uuid".to_owned(),
            price: "abc".to_owned(),
            name: String::new(),
            ..form()
        };
        let (errors, notifications) = bad.parse().unwrap_err();
        assert!(errors.message_for("name").is_some());
        assert!(notifications.contains(&"The Supplier field is required.".to_owned()));
        assert!(notifications.contains(&"The Price field must be a valid amount.".to_owned()));
    }

    #[test]
    fn test_form_feedback_for_upload_conflict() {
        let err = ProductServiceError::Upload(crate::services::UploadError::AlreadyExists);
        let (errors, notifications) = form_feedback(err).unwrap();
        assert!(errors.is_empty());
        assert_eq!(notifications, vec!["A file with this name already exists!"]);
        assert!(form_feedback(ProductServiceError::NotFound).is_err());
    }
}
