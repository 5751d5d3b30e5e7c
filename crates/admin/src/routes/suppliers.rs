//! Supplier route handlers.
//!
//! Listing and details are public; writes need the matching
//! `supplier:*` claim. The address has its own fragment endpoints so it can
//! be edited in a modal without reloading the page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use catalog_core::{SupplierId, SupplierKind, ValidationErrors};

use crate::db::SupplierRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{
    Authorized, CanAddSupplier, CanDeleteSupplier, CanEditSupplier, OptionalAuth, set_flash,
    take_flash,
};
use crate::models::{Address, AddressInput, Supplier, SupplierDetails, SupplierInput, Viewer};
use crate::services::{SupplierService, SupplierServiceError};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Supplier form data. Address fields are only posted on creation.
#[derive(Debug, Deserialize)]
pub struct SupplierForm {
    pub name: String,
    pub document: String,
    pub kind: SupplierKind,
    pub active: Option<String>,
    #[serde(flatten)]
    pub address: AddressForm,
}

impl SupplierForm {
    fn supplier_input(&self) -> SupplierInput {
        SupplierInput::new(&self.name, &self.document, self.kind, self.active.is_some())
    }
}

/// Address form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddressForm {
    pub street: String,
    pub number: String,
    pub complement: String,
    pub zip_code: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

impl From<AddressForm> for AddressInput {
    fn from(form: AddressForm) -> Self {
        Self {
            street: form.street,
            number: form.number,
            complement: Some(form.complement),
            zip_code: form.zip_code,
            neighborhood: form.neighborhood,
            city: form.city,
            state: form.state,
        }
    }
}

/// JSON reply after a successful address update.
#[derive(Debug, Serialize)]
pub struct AddressUpdated {
    pub success: bool,
    /// Fragment URL to reload the address panel from.
    pub url: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Supplier list page.
#[derive(Template, WebTemplate)]
#[template(path = "suppliers/index.html")]
pub struct SuppliersIndexTemplate {
    pub viewer: Viewer,
    pub flash: Option<String>,
    pub suppliers: Vec<Supplier>,
}

/// Supplier details page.
#[derive(Template, WebTemplate)]
#[template(path = "suppliers/show.html")]
pub struct SupplierShowTemplate {
    pub viewer: Viewer,
    pub details: SupplierDetails,
}

/// Values echoed back into the supplier form.
#[derive(Debug, Clone)]
pub struct SupplierFormValues {
    pub name: String,
    pub document: String,
    pub kind: SupplierKind,
    pub active: bool,
}

impl Default for SupplierFormValues {
    fn default() -> Self {
        Self {
            name: String::new(),
            document: String::new(),
            kind: SupplierKind::Individual,
            active: true,
        }
    }
}

impl From<&Supplier> for SupplierFormValues {
    fn from(supplier: &Supplier) -> Self {
        Self {
            name: supplier.name.clone(),
            document: supplier.document.clone(),
            kind: supplier.kind,
            active: supplier.active,
        }
    }
}

impl From<&SupplierForm> for SupplierFormValues {
    fn from(form: &SupplierForm) -> Self {
        Self {
            name: form.name.clone(),
            document: form.document.clone(),
            kind: form.kind,
            active: form.active.is_some(),
        }
    }
}

/// Create/edit supplier page.
#[derive(Template, WebTemplate)]
#[template(path = "suppliers/form.html")]
pub struct SupplierFormTemplate {
    pub viewer: Viewer,
    pub heading: &'static str,
    pub action: String,
    pub cancel_url: String,
    /// The address block is part of the form only on creation.
    pub with_address: bool,
    pub values: SupplierFormValues,
    pub address: AddressInput,
    pub kinds: [SupplierKind; 2],
    pub errors: ValidationErrors,
    pub notifications: Vec<String>,
}

/// Delete confirmation page.
#[derive(Template, WebTemplate)]
#[template(path = "suppliers/delete.html")]
pub struct SupplierDeleteTemplate {
    pub viewer: Viewer,
    pub details: SupplierDetails,
    pub notifications: Vec<String>,
}

/// Address panel fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/address.html")]
pub struct AddressFragmentTemplate {
    pub supplier_id: SupplierId,
    pub address: Option<Address>,
    pub can_edit: bool,
}

/// Address edit form fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/address_form.html")]
pub struct AddressFormTemplate {
    pub supplier_id: SupplierId,
    pub address: AddressInput,
    pub errors: ValidationErrors,
}

// =============================================================================
// Helpers
// =============================================================================

async fn load_details(state: &AppState, id: SupplierId) -> Result<SupplierDetails> {
    SupplierService::new(state.pool())
        .details(id)
        .await
        .map_err(AppError::from)
}

/// Split a service error into form feedback, or propagate it.
fn form_feedback(err: SupplierServiceError) -> Result<(ValidationErrors, Vec<String>)> {
    match err {
        SupplierServiceError::Validation(errors) => {
            let messages = errors.messages();
            Ok((errors, messages))
        }
        SupplierServiceError::DuplicateDocument | SupplierServiceError::HasProducts => {
            Ok((ValidationErrors::new(), vec![err.to_string()]))
        }
        other => Err(other.into()),
    }
}

fn supplier_path(id: SupplierId) -> String {
    format!("/suppliers/{id}")
}

// =============================================================================
// Read Routes
// =============================================================================

/// List all suppliers.
#[tracing::instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<impl IntoResponse> {
    let suppliers = SupplierRepository::new(state.pool()).list().await?;

    Ok(SuppliersIndexTemplate {
        viewer: Viewer::new(user),
        flash: take_flash(&session).await,
        suppliers,
    })
}

/// Supplier details with address and products.
#[tracing::instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<SupplierId>,
) -> Result<impl IntoResponse> {
    Ok(SupplierShowTemplate {
        viewer: Viewer::new(user),
        details: load_details(&state, id).await?,
    })
}

// =============================================================================
// Create
// =============================================================================

/// Empty creation form.
pub async fn new_page(auth: Authorized<CanAddSupplier>) -> impl IntoResponse {
    SupplierFormTemplate {
        viewer: Viewer::from(auth.0),
        heading: "New supplier",
        action: "/suppliers/new".to_owned(),
        cancel_url: "/suppliers".to_owned(),
        with_address: true,
        values: SupplierFormValues::default(),
        address: AddressInput::default(),
        kinds: SupplierKind::ALL,
        errors: ValidationErrors::new(),
        notifications: Vec::new(),
    }
}

/// Create a supplier with its address.
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    auth: Authorized<CanAddSupplier>,
    Form(form): Form<SupplierForm>,
) -> Result<Response> {
    let values = SupplierFormValues::from(&form);
    let input = form.supplier_input();
    let address = AddressInput::from(form.address);

    match SupplierService::new(state.pool())
        .add(input, address.clone())
        .await
    {
        Ok(supplier) => Ok(Redirect::to(&supplier_path(supplier.id)).into_response()),
        Err(err) => {
            let (errors, notifications) = form_feedback(err)?;
            Ok(SupplierFormTemplate {
                viewer: Viewer::from(auth.0),
                heading: "New supplier",
                action: "/suppliers/new".to_owned(),
                cancel_url: "/suppliers".to_owned(),
                with_address: true,
                values,
                address,
                kinds: SupplierKind::ALL,
                errors,
                notifications,
            }
            .into_response())
        }
    }
}

// =============================================================================
// Edit
// =============================================================================

/// Edit form for name, document, kind and status.
#[tracing::instrument(skip(state, auth))]
pub async fn edit_page(
    State(state): State<AppState>,
    auth: Authorized<CanEditSupplier>,
    Path(id): Path<SupplierId>,
) -> Result<impl IntoResponse> {
    let supplier = SupplierRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("supplier".to_owned()))?;

    Ok(SupplierFormTemplate {
        viewer: Viewer::from(auth.0),
        heading: "Edit supplier",
        action: format!("/suppliers/{id}/edit"),
        cancel_url: supplier_path(id),
        with_address: false,
        values: SupplierFormValues::from(&supplier),
        address: AddressInput::default(),
        kinds: SupplierKind::ALL,
        errors: ValidationErrors::new(),
        notifications: Vec::new(),
    })
}

/// Apply supplier edits.
#[tracing::instrument(skip(state, auth, form))]
pub async fn update(
    State(state): State<AppState>,
    auth: Authorized<CanEditSupplier>,
    Path(id): Path<SupplierId>,
    Form(form): Form<SupplierForm>,
) -> Result<Response> {
    let values = SupplierFormValues::from(&form);

    match SupplierService::new(state.pool())
        .update(id, form.supplier_input())
        .await
    {
        Ok(_) => Ok(Redirect::to(&supplier_path(id)).into_response()),
        Err(err) => {
            let (errors, notifications) = form_feedback(err)?;
            Ok(SupplierFormTemplate {
                viewer: Viewer::from(auth.0),
                heading: "Edit supplier",
                action: format!("/suppliers/{id}/edit"),
                cancel_url: supplier_path(id),
                with_address: false,
                values,
                address: AddressInput::default(),
                kinds: SupplierKind::ALL,
                errors,
                notifications,
            }
            .into_response())
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
    auth: Authorized<CanDeleteSupplier>,
    Path(id): Path<SupplierId>,
) -> Result<impl IntoResponse> {
    Ok(SupplierDeleteTemplate {
        viewer: Viewer::from(auth.0),
        details: load_details(&state, id).await?,
        notifications: Vec::new(),
    })
}

/// Delete the supplier, unless it still has products.
#[tracing::instrument(skip(state, auth, session))]
pub async fn delete(
    State(state): State<AppState>,
    auth: Authorized<CanDeleteSupplier>,
    session: Session,
    Path(id): Path<SupplierId>,
) -> Result<Response> {
    match SupplierService::new(state.pool()).remove(id).await {
        Ok(()) => {
            set_flash(&session, "Supplier deleted.").await?;
            Ok(Redirect::to("/suppliers").into_response())
        }
        Err(err) => {
            let (_, notifications) = form_feedback(err)?;
            Ok(SupplierDeleteTemplate {
                viewer: Viewer::from(auth.0),
                details: load_details(&state, id).await?,
                notifications,
            }
            .into_response())
        }
    }
}

// =============================================================================
// Address
// =============================================================================

/// Address panel fragment.
#[tracing::instrument(skip(state, user))]
pub async fn address(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<SupplierId>,
) -> Result<impl IntoResponse> {
    let details = load_details(&state, id).await?;

    Ok(AddressFragmentTemplate {
        supplier_id: id,
        address: details.address,
        can_edit: Viewer::new(user).can("supplier:edit"),
    })
}

/// Address edit form fragment.
#[tracing::instrument(skip(state, _auth))]
pub async fn address_edit_page(
    State(state): State<AppState>,
    _auth: Authorized<CanEditSupplier>,
    Path(id): Path<SupplierId>,
) -> Result<impl IntoResponse> {
    let details = load_details(&state, id).await?;

    Ok(AddressFormTemplate {
        supplier_id: id,
        address: details
            .address
            .as_ref()
            .map(AddressInput::from)
            .unwrap_or_default(),
        errors: ValidationErrors::new(),
    })
}

/// Save the address. Replies with JSON on success and with the form
/// fragment (with errors) otherwise.
#[tracing::instrument(skip(state, _auth, form))]
pub async fn address_update(
    State(state): State<AppState>,
    _auth: Authorized<CanEditSupplier>,
    Path(id): Path<SupplierId>,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let input = AddressInput::from(form);

    match SupplierService::new(state.pool())
        .update_address(id, input.clone())
        .await
    {
        Ok(_) => Ok(Json(AddressUpdated {
            success: true,
            url: format!("/suppliers/{id}/address"),
        })
        .into_response()),
        Err(SupplierServiceError::Validation(errors)) => Ok(AddressFormTemplate {
            supplier_id: id,
            address: input,
            errors,
        }
        .into_response()),
        Err(other) => Err(other.into()),
    }
}
