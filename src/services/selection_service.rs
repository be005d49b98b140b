use std::fmt::Display;
use thiserror::Error;
use tracing::{debug, info};
use validator::Validate;

use crate::{
    models::{
        FormSubmission, Product, ProductEditForm, ProductId, Service, ServiceEditForm, ServiceId,
    },
    services::confirmation::Confirmation,
};

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("Row {id} not found")]
    RowNotFound { id: String },

    #[error("No row selected")]
    NothingSelected,

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Edit form does not belong to the selected row")]
    RowMismatch,

    #[error("Confirmation prompt failed: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Form posted by an edit dialog.
pub trait EditForm: Validate {
    fn to_submission(&self) -> FormSubmission;
}

impl EditForm for ProductEditForm {
    fn to_submission(&self) -> FormSubmission {
        ProductEditForm::to_submission(self)
    }
}

impl EditForm for ServiceEditForm {
    fn to_submission(&self) -> FormSubmission {
        ServiceEditForm::to_submission(self)
    }
}

/// A row of a selectable management table.
pub trait TableRow: Clone {
    type Id: Copy + Eq + Display;
    type Form: EditForm;

    /// URL segment of the table (`inventario`, `servicios`).
    const RESOURCE: &'static str;
    /// Whether a selected row can be quoted.
    const QUOTABLE: bool;

    fn row_id(&self) -> Self::Id;
    fn label(&self) -> &str;
    /// Edit form prefilled from the typed row.
    fn edit_form(&self) -> Self::Form;
    fn form_row_id(form: &Self::Form) -> Self::Id;
}

impl TableRow for Product {
    type Id = ProductId;
    type Form = ProductEditForm;

    const RESOURCE: &'static str = "inventario";
    const QUOTABLE: bool = false;

    fn row_id(&self) -> ProductId {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn edit_form(&self) -> ProductEditForm {
        ProductEditForm {
            id: self.id,
            nombre: self.name.clone(),
            descripcion: self.description.clone().unwrap_or_default(),
            precio: self.price.to_string(),
            cantidad_stock: self.stock.to_string(),
        }
    }

    fn form_row_id(form: &ProductEditForm) -> ProductId {
        form.id
    }
}

impl TableRow for Service {
    type Id = ServiceId;
    type Form = ServiceEditForm;

    const RESOURCE: &'static str = "servicios";
    const QUOTABLE: bool = true;

    fn row_id(&self) -> ServiceId {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn edit_form(&self) -> ServiceEditForm {
        ServiceEditForm {
            id: self.id,
            nombre: self.name.clone(),
            descripcion: self.description.clone(),
            costo_servicio: self.cost.to_string(),
        }
    }

    fn form_row_id(form: &ServiceEditForm) -> ServiceId {
        form.id
    }
}

/// Which toolbar buttons are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableActions {
    pub edit: bool,
    pub delete: bool,
    pub quote: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditDialog<F> {
    pub action: String,
    pub form: F,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDialog {
    pub action: String,
    pub message: String,
}

/// Single-row selection over a table populated once from the catalog.
///
/// The selected row is tracked by index into the typed rows, never read
/// back from what was painted.
#[derive(Debug, Clone)]
pub struct TableSelection<R: TableRow> {
    rows: Vec<R>,
    selected: Option<usize>,
}

impl<R: TableRow> TableSelection<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self {
            rows,
            selected: None,
        }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Highlight the row with `id`, replacing any previous selection.
    pub fn select(&mut self, id: R::Id) -> Result<&R, SelectionError> {
        let index = self
            .rows
            .iter()
            .position(|row| row.row_id() == id)
            .ok_or_else(|| SelectionError::RowNotFound { id: id.to_string() })?;

        debug!("Selected {} row {}", R::RESOURCE, id);
        self.selected = Some(index);
        Ok(&self.rows[index])
    }

    pub fn selected(&self) -> Option<&R> {
        self.selected.map(|index| &self.rows[index])
    }

    pub fn is_selected(&self, id: R::Id) -> bool {
        self.selected().map(|row| row.row_id() == id).unwrap_or(false)
    }

    pub fn actions(&self) -> TableActions {
        let selected = self.selected.is_some();
        TableActions {
            edit: selected,
            delete: selected,
            quote: selected && R::QUOTABLE,
        }
    }

    pub fn edit_dialog(&self) -> Result<EditDialog<R::Form>, SelectionError> {
        let row = self.selected().ok_or(SelectionError::NothingSelected)?;
        Ok(EditDialog {
            action: format!("/{}/modificar/{}/", R::RESOURCE, row.row_id()),
            form: row.edit_form(),
        })
    }

    /// Validate an edited form for the selected row and turn it into a post.
    pub fn submit_edit(&self, form: &R::Form) -> Result<FormSubmission, SelectionError> {
        let row = self.selected().ok_or(SelectionError::NothingSelected)?;
        if R::form_row_id(form) != row.row_id() {
            return Err(SelectionError::RowMismatch);
        }

        form.validate()
            .map_err(|e| SelectionError::ValidationError {
                message: e.to_string(),
            })?;

        info!("Submitting edit of {} row {}", R::RESOURCE, row.row_id());
        Ok(form.to_submission())
    }

    pub fn delete_dialog(&self) -> Result<DeleteDialog, SelectionError> {
        let row = self.selected().ok_or(SelectionError::NothingSelected)?;
        Ok(DeleteDialog {
            action: format!("/{}/eliminar/{}/", R::RESOURCE, row.row_id()),
            message: format!(
                "Are you sure you want to delete {}? This action cannot be undone.",
                row.label()
            ),
        })
    }

    /// Ask before deleting the selected row; `None` if declined.
    pub fn confirm_delete(
        &self,
        confirmation: &dyn Confirmation,
    ) -> Result<Option<FormSubmission>, SelectionError> {
        let dialog = self.delete_dialog()?;
        if !confirmation.confirm(&dialog.message)? {
            debug!("Delete of {} cancelled", dialog.action);
            return Ok(None);
        }

        info!("Submitting delete {}", dialog.action);
        Ok(Some(FormSubmission::post(
            dialog.action,
            std::iter::empty::<(String, String)>(),
        )))
    }

    /// Page that quotes the selected row, for quotable tables.
    pub fn quote_target(&self) -> Option<String> {
        if !R::QUOTABLE {
            return None;
        }
        self.selected()
            .map(|row| format!("/{}/cotizar/{}/", R::RESOURCE, row.row_id()))
    }
}
