//! Declarative description of dynamic form fields
//!
//! A form is an ordered `Vec<FieldDescriptor>`. The JSON shape matches the
//! field definitions served by the backend (`type`
//! discriminant, camelCase attributes), so form definitions can be shipped
//! as JSON and deserialized directly.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::datatable::{PageRequest, PaginatedData};
use crate::error::FetchError;

/// JSON record (`{ [key: string]: any }`)
pub type Record = Map<String, Value>;

/// Backend payload used to prefill a form, keyed by field id
pub type BackendRecord = Record;

/// Values collected from a form on submit, keyed by field id
pub type FormResult = Record;

/// Validation messages keyed by field id
pub type ErrorMap = BTreeMap<String, String>;

/// Option entry of select-like fields: a plain scalar or a labeled record
pub type SelectOption = Value;

pub type LocalBoxFuture<T> = Pin<Box<dyn Future<Output = T>>>;

type AsyncFn<A, T> = dyn Fn(A) -> LocalBoxFuture<Result<T, FetchError>> + Send + Sync;

/// Cloneable handle to a caller-supplied async operation
///
/// The handle itself is `Send + Sync` so descriptors can live in reactive
/// signals; the returned future is not, since it runs on the UI thread.
pub struct AsyncCallback<A, T> {
    inner: Arc<AsyncFn<A, T>>,
}

impl<A: 'static, T: 'static> AsyncCallback<A, T> {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FetchError>> + 'static,
    {
        let inner: Arc<AsyncFn<A, T>> =
            Arc::new(move |arg: A| -> LocalBoxFuture<Result<T, FetchError>> { Box::pin(f(arg)) });
        Self { inner }
    }

    pub fn call(&self, arg: A) -> LocalBoxFuture<Result<T, FetchError>> {
        (self.inner)(arg)
    }
}

impl<A, T> Clone for AsyncCallback<A, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, T> PartialEq for AsyncCallback<A, T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<A, T> fmt::Debug for AsyncCallback<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AsyncCallback(..)")
    }
}

/// Loads one page of options for a lazy select
pub type Fetcher = AsyncCallback<PageRequest, PaginatedData<Record>>;
/// Loads the option matching the current value of a lazy select
pub type OneFetcher = AsyncCallback<Value, Record>;
/// Uploads a file and returns its temporary server copy
pub type Uploader = AsyncCallback<UploadFile, TempFile>;
/// Deletes a persisted file by id
pub type Deleter = AsyncCallback<u64, ()>;
/// Persists a new file order: (owner id, ordered file ids)
pub type Reorderer = AsyncCallback<(u64, Vec<u64>), ()>;

/// Synchronous predicate attached directly to a field
#[derive(Clone)]
pub struct FieldValidator(Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>);

impl FieldValidator {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn check(&self, value: &Value) -> Result<(), String> {
        (self.0)(value)
    }
}

impl PartialEq for FieldValidator {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FieldValidator(..)")
    }
}

/// Field validation: a rule expression or a custom predicate
#[derive(Clone, Debug, PartialEq)]
pub enum Validation {
    /// Rule expression, e.g. `"required|min:3"`
    Rules(String),
    Custom(FieldValidator),
}

impl From<&str> for Validation {
    fn from(expr: &str) -> Self {
        Self::Rules(expr.to_string())
    }
}

impl From<FieldValidator> for Validation {
    fn from(validator: FieldValidator) -> Self {
        Self::Custom(validator)
    }
}

impl Serialize for Validation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Validation::Rules(expr) => serializer.serialize_str(expr),
            Validation::Custom(_) => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Validation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Validation::Rules)
    }
}

// ============================================================================
// Files
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[default]
    Image,
    Video,
    Doc,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Doc => "doc",
        }
    }

    /// Value for the `accept` attribute of a file input
    pub fn accept(&self) -> &'static str {
        match self {
            Self::Image => "image/*",
            Self::Video => "video/*",
            Self::Doc => ".pdf,.doc,.docx,.xls,.xlsx,.odt,.ods,.txt",
        }
    }
}

/// How a file field hands its files to the form result
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum FileValueType {
    /// Files are uploaded immediately, the value holds server copies
    #[default]
    DirectUpload,
    /// Files are kept client-side and submitted with the form
    FormData,
}

/// Persisted media record as returned by the backend
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ServerFile {
    pub id: u64,
    pub uuid: String,
    pub file_name: String,
    pub mime_type: String,
    pub original_url: String,
    #[serde(default)]
    pub model_type: String,
    #[serde(default)]
    pub model_id: u64,
    #[serde(default)]
    pub collection_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub disk: String,
    #[serde(default)]
    pub conversions_disk: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub order_column: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub preview_url: String,
}

/// File freshly uploaded to a temporary location
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct TempFile {
    pub path: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
}

/// Either kind of file a `directUpload` field can hold
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum FileEntry {
    Server(ServerFile),
    Temp(TempFile),
}

impl FileEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Server(file) => &file.file_name,
            Self::Temp(file) => &file.name,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Server(file) => Some(&file.original_url),
            Self::Temp(file) => file.original_url.as_deref(),
        }
    }
}

/// File picked in the browser, not uploaded yet
#[derive(Clone, Debug, PartialEq, Default)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

// ============================================================================
// Field variants
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Vertical,
    Horizontal,
}

/// Payload of `input`, `textarea`, `date` and `password` fields
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TextField {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_class: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NumberField {
    /// `None` when empty or when the last assignment was not numeric
    pub value: Option<f64>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub input_class: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MaskField {
    pub value: String,
    pub mask: Option<String>,
    pub auto_clear: Option<bool>,
    pub input_class: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VirtualScrollerOptions {
    pub item_size: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectField {
    pub select_option: Vec<SelectOption>,
    pub filter: Option<bool>,
    pub value: Value,
    /// Record key holding the option value (default `"value"`)
    pub select_value: Option<String>,
    /// Record key holding the option label (default `"label"`)
    pub select_label: Option<String>,
    pub virtual_scroller_options: Option<VirtualScrollerOptions>,
    pub input_class: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MultiSelectField {
    pub select_option: Vec<SelectOption>,
    pub filter: Option<bool>,
    pub value: Vec<Value>,
    pub select_value: Option<String>,
    pub select_label: Option<String>,
    pub input_class: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TreeSelectField {
    pub select_option: Vec<SelectOption>,
    pub filter: Option<bool>,
    pub value: Value,
    pub select_label: Option<String>,
    pub select_value: Option<String>,
    /// Record key holding nested options (default `"children"`)
    pub children_key: Option<String>,
    pub input_class: Option<String>,
}

/// Select whose options are loaded page by page through `fetcher`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LazySelectField {
    pub select_label: Option<String>,
    pub select_value: Option<String>,
    pub filter: Option<bool>,
    pub value: Value,
    pub input_class: Option<String>,
    #[serde(skip)]
    pub fetcher: Option<Fetcher>,
    #[serde(skip)]
    pub one_fetcher: Option<OneFetcher>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RadioField {
    pub select_option: Vec<SelectOption>,
    pub value: Value,
    #[serde(rename = "alignement")]
    pub alignment: Option<Alignment>,
    pub select_value: Option<String>,
    pub select_label: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckboxField {
    pub select_option: Vec<SelectOption>,
    pub value: Vec<Value>,
    #[serde(rename = "alignement")]
    pub alignment: Option<Alignment>,
    pub select_value: Option<String>,
    pub select_label: Option<String>,
}

/// Slot rendered by the application itself
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateField {
    pub value: Value,
    pub options: Option<Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FileField {
    pub file_type: FileType,
    pub allow_multiple: Option<bool>,
    /// Files already attached to the record being edited
    pub read_files: Option<Vec<ServerFile>>,
    /// Bytes
    pub max_file_size: Option<u64>,
    pub file_limit: Option<usize>,
    pub doc_preview_img_url: Option<String>,
    pub video_preview_img_url: Option<String>,
    pub invalid_file_size_message: Option<String>,
    pub invalid_file_type_message: Option<String>,
    pub invalid_file_limit_message: Option<String>,
    pub value_type: FileValueType,
    pub value: Vec<FileEntry>,
    /// Files waiting for a `formData` submit
    #[serde(skip)]
    pub pending: Vec<UploadFile>,
    #[serde(skip)]
    pub uploader: Option<Uploader>,
    #[serde(skip)]
    pub deleter: Option<Deleter>,
    #[serde(skip)]
    pub reorderer: Option<Reorderer>,
}

/// Field variant, discriminated by `type` in JSON
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Input(TextField),
    Textarea(TextField),
    Date(TextField),
    Password(TextField),
    Number(NumberField),
    Select(SelectField),
    MultiSelect(MultiSelectField),
    TreeSelect(TreeSelectField),
    LazySelect(LazySelectField),
    Mask(MaskField),
    Radio(RadioField),
    Checkbox(CheckboxField),
    #[serde(alias = "filepond")]
    File(FileField),
    Template(TemplateField),
}

impl FieldKind {
    /// JSON discriminant of the variant
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Input(_) => "input",
            Self::Textarea(_) => "textarea",
            Self::Date(_) => "date",
            Self::Password(_) => "password",
            Self::Number(_) => "number",
            Self::Select(_) => "select",
            Self::MultiSelect(_) => "multiselect",
            Self::TreeSelect(_) => "treeselect",
            Self::LazySelect(_) => "lazyselect",
            Self::Mask(_) => "mask",
            Self::Radio(_) => "radio",
            Self::Checkbox(_) => "checkbox",
            Self::File(_) => "file",
            Self::Template(_) => "template",
        }
    }

    pub fn input() -> Self {
        Self::Input(TextField::default())
    }

    pub fn number() -> Self {
        Self::Number(NumberField::default())
    }

    pub fn select(options: Vec<SelectOption>) -> Self {
        Self::Select(SelectField {
            select_option: options,
            ..SelectField::default()
        })
    }

    /// Options of select-like variants, if any
    pub fn options(&self) -> Option<&[SelectOption]> {
        match self {
            Self::Select(f) => Some(&f.select_option),
            Self::MultiSelect(f) => Some(&f.select_option),
            Self::TreeSelect(f) => Some(&f.select_option),
            Self::Radio(f) => Some(&f.select_option),
            Self::Checkbox(f) => Some(&f.select_option),
            _ => None,
        }
    }
}

/// One form field: common attributes plus its variant
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Unique within a form
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
    #[serde(default)]
    pub container_class: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            validation: None,
            container_class: String::new(),
            disabled: false,
            placeholder: None,
            kind,
        }
    }

    pub fn with_validation(mut self, validation: impl Into<Validation>) -> Self {
        self.validation = Some(validation.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_container_class(mut self, class: impl Into<String>) -> Self {
        self.container_class = class.into();
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_form_definition() {
        let form: Vec<FieldDescriptor> = serde_json::from_value(json!([
            {
                "id": "name",
                "label": "Nom",
                "type": "input",
                "value": "",
                "validation": "required|min:3",
                "containerClass": "col-6"
            },
            { "id": "age", "label": "Age", "type": "number", "value": 18, "suffix": "ans" },
            {
                "id": "status",
                "label": "Statut",
                "type": "select",
                "selectOption": [{ "label": "Actif", "value": 1 }],
                "value": 1
            },
            { "id": "photos", "label": "Photos", "type": "filepond", "fileType": "image" }
        ]))
        .unwrap();

        assert_eq!(form.len(), 4);
        assert_eq!(form[0].validation, Some(Validation::from("required|min:3")));
        assert_eq!(form[0].container_class, "col-6");
        match &form[1].kind {
            FieldKind::Number(n) => {
                assert_eq!(n.value, Some(18.0));
                assert_eq!(n.suffix.as_deref(), Some("ans"));
            }
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(form[2].kind.options().map(|o| o.len()), Some(1));
        assert_eq!(form[3].type_name(), "file");
    }

    #[test]
    fn test_custom_validation_serializes_as_null() {
        let field = FieldDescriptor::new("code", "Code", FieldKind::input())
            .with_validation(FieldValidator::new(|_| Ok(())));
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["validation"], Value::Null);
        assert_eq!(json["type"], "input");
    }

    #[test]
    fn test_async_callback_identity() {
        let deleter: Deleter = AsyncCallback::new(|_id: u64| async { Ok::<(), FetchError>(()) });
        let same = deleter.clone();
        let other: Deleter = AsyncCallback::new(|_id: u64| async { Ok::<(), FetchError>(()) });
        assert_eq!(deleter, same);
        assert_ne!(deleter, other);
    }
}
