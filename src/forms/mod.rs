use std::collections::BTreeMap;

mod delete_dialog;
mod product_form;

pub use delete_dialog::{
    AdminUserDeletion, DeleteAction, DeleteDialog, Notification, NotificationKind,
    ProductDeletion,
};
pub use product_form::{FormMode, FormState, ProductField, ProductForm, SubmitOutcome};

/// Validation messages keyed by field name.
pub type FieldErrors = BTreeMap<String, String>;
