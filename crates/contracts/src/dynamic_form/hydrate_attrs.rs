//! Presentation attributes derived from a field descriptor
//!
//! `hydrate_attrs` is recomputed on every render: it reads the descriptor
//! and the current error map and never mutates anything. `hydrate_on`
//! returns the event handlers a field needs; only file fields have one.

use std::collections::BTreeMap;

use serde_json::Value;

use super::types::{
    Alignment, ErrorMap, FieldDescriptor, FieldKind, FileType, FileValueType, Fetcher, OneFetcher,
    Deleter, Reorderer, SelectOption, ServerFile, Uploader,
};
use super::value::to_display_string;
use crate::config::LibraryConfig;

const INVALID_CLASS: &str = "p-invalid";
const DEFAULT_OPTION_VALUE: &str = "value";
const DEFAULT_OPTION_LABEL: &str = "label";
const DEFAULT_CHILDREN_KEY: &str = "children";

/// DOM id of a field inside the form `prefix`
pub fn id_for(prefix: &str, item: &FieldDescriptor) -> String {
    format!("{}-{}", prefix, item.id)
}

/// Attributes handed to the rendering layer for one field
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeBag {
    pub class: String,
    /// Cleared for widgets that put the id on an inner input instead
    pub id: Option<String>,
    pub disabled: bool,
    pub placeholder: Option<String>,
    pub extra: ExtraAttrs,
}

impl AttributeBag {
    /// Id of the focusable element, wherever the widget puts it
    pub fn dom_id(&self) -> Option<&str> {
        match &self.extra {
            ExtraAttrs::Date(a) => Some(&a.input_id),
            ExtraAttrs::Number(a) => Some(&a.input_id),
            ExtraAttrs::Password(a) => Some(&a.input_id),
            ExtraAttrs::Select(a) => Some(&a.input_id),
            ExtraAttrs::MultiSelect(a) => Some(&a.select.input_id),
            ExtraAttrs::TreeSelect(a) => Some(&a.input_id),
            ExtraAttrs::LazySelect(a) => Some(&a.input_id),
            _ => self.id.as_deref(),
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.class.split_whitespace().any(|c| c == INVALID_CLASS)
    }
}

/// Variant-specific attributes; `None` leaves the base bag as is
#[derive(Clone, Debug, PartialEq)]
pub enum ExtraAttrs {
    None,
    Date(DateAttrs),
    Number(NumberAttrs),
    Password(PasswordAttrs),
    Mask(MaskAttrs),
    Select(SelectAttrs),
    MultiSelect(MultiSelectAttrs),
    TreeSelect(TreeSelectAttrs),
    LazySelect(LazySelectAttrs),
    Choice(ChoiceAttrs),
    File(FileAttrs),
}

#[derive(Clone, Debug, PartialEq)]
pub struct DateAttrs {
    pub input_id: String,
    pub input_class: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NumberAttrs {
    pub input_type: &'static str,
    pub input_class: String,
    pub input_id: String,
    pub use_grouping: bool,
    pub invalid: bool,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PasswordAttrs {
    pub toggle_mask: bool,
    pub feedback: bool,
    pub input_class: String,
    pub autocomplete: &'static str,
    pub input_id: String,
    pub invalid: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MaskAttrs {
    pub auto_clear: bool,
    pub mask: Option<String>,
    pub input_class: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectAttrs {
    pub options: Vec<SelectOption>,
    /// `None` when options are plain strings
    pub option_value: Option<String>,
    /// `None` when options are plain strings
    pub option_label: Option<String>,
    pub input_class: String,
    pub input_id: String,
    pub filter: Option<bool>,
    pub invalid: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultiSelectAttrs {
    pub select: SelectAttrs,
    pub empty_filter_message: String,
    pub display: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeSelectAttrs {
    pub options: Vec<SelectOption>,
    pub invalid: bool,
    pub input_class: String,
    pub select_label: Option<String>,
    pub select_value: Option<String>,
    pub children_key: Option<String>,
    pub input_id: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LazySelectAttrs {
    pub invalid: bool,
    pub input_class: String,
    pub select_label: Option<String>,
    pub select_value: Option<String>,
    pub filter: Option<bool>,
    pub fetcher: Option<Fetcher>,
    pub one_fetcher: Option<OneFetcher>,
    pub input_id: String,
}

/// Radio and checkbox groups
#[derive(Clone, Debug, PartialEq)]
pub struct ChoiceAttrs {
    pub alignment: Option<Alignment>,
    pub options: Vec<SelectOption>,
    pub invalid: bool,
    pub select_label: Option<String>,
    pub select_value: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FileAttrs {
    pub allow_multiple: Option<bool>,
    pub read_files: Vec<ServerFile>,
    pub doc_preview_img_url: String,
    pub video_preview_img_url: String,
    pub uploader: Option<Uploader>,
    pub deleter: Option<Deleter>,
    pub reorderer: Option<Reorderer>,
    pub accepted_file_types: FileType,
    pub invalid_file_type_message: Option<String>,
    pub max_file_size: Option<u64>,
    pub invalid_file_size_message: Option<String>,
    pub file_limit: Option<usize>,
    pub invalid_file_limit_message: Option<String>,
    pub value_type: FileValueType,
}

fn compose_class(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn widget_class(input_class: Option<&String>) -> String {
    compose_class(&["w-full", input_class.map(String::as_str).unwrap_or("")])
}

/// Option keys for select-like widgets: a plain string first option needs no
/// value/label split, anything else falls back to `"value"` / `"label"`.
pub fn option_keys(
    options: &[SelectOption],
    select_value: Option<&String>,
    select_label: Option<&String>,
) -> (Option<String>, Option<String>) {
    if matches!(options.first(), Some(Value::String(_))) {
        return (None, None);
    }
    (
        Some(select_value.cloned().unwrap_or_else(|| DEFAULT_OPTION_VALUE.to_string())),
        Some(select_label.cloned().unwrap_or_else(|| DEFAULT_OPTION_LABEL.to_string())),
    )
}

/// Attributes of a field with the embedded configuration
pub fn hydrate_attrs(prefix: &str, item: &FieldDescriptor, errors: Option<&ErrorMap>) -> AttributeBag {
    hydrate_attrs_with(LibraryConfig::embedded(), prefix, item, errors)
}

pub fn hydrate_attrs_with(
    config: &LibraryConfig,
    prefix: &str,
    item: &FieldDescriptor,
    errors: Option<&ErrorMap>,
) -> AttributeBag {
    let is_invalid = errors.map_or(false, |e| e.contains_key(&item.id));
    let invalid_class = if is_invalid { INVALID_CLASS } else { "" };
    let conditional_input_class = match &item.kind {
        FieldKind::Input(f) | FieldKind::Textarea(f) => f.input_class.as_deref().unwrap_or(""),
        _ => "",
    };
    let dom_id = id_for(prefix, item);

    let mut bag = AttributeBag {
        class: compose_class(&["w-full", invalid_class, conditional_input_class]),
        id: Some(dom_id.clone()),
        disabled: item.disabled,
        placeholder: item.placeholder.clone(),
        extra: ExtraAttrs::None,
    };

    bag.extra = match &item.kind {
        FieldKind::Input(_) | FieldKind::Textarea(_) | FieldKind::Template(_) => ExtraAttrs::None,
        FieldKind::Date(f) => {
            bag.id = None;
            ExtraAttrs::Date(DateAttrs {
                input_id: dom_id,
                input_class: f.input_class.clone(),
            })
        }
        FieldKind::Number(f) => {
            bag.id = None;
            ExtraAttrs::Number(NumberAttrs {
                input_type: "number",
                input_class: widget_class(f.input_class.as_ref()),
                input_id: dom_id,
                use_grouping: true,
                invalid: is_invalid,
                prefix: f.prefix.clone(),
                suffix: f.suffix.clone(),
            })
        }
        FieldKind::Password(f) => {
            bag.id = None;
            ExtraAttrs::Password(PasswordAttrs {
                toggle_mask: true,
                feedback: false,
                input_class: widget_class(f.input_class.as_ref()),
                autocomplete: "current-password",
                input_id: dom_id,
                invalid: is_invalid,
            })
        }
        FieldKind::Mask(f) => ExtraAttrs::Mask(MaskAttrs {
            auto_clear: f.auto_clear.unwrap_or(true),
            mask: f.mask.clone(),
            input_class: widget_class(f.input_class.as_ref()),
        }),
        FieldKind::Select(f) => {
            bag.id = None;
            let (option_value, option_label) =
                option_keys(&f.select_option, f.select_value.as_ref(), f.select_label.as_ref());
            ExtraAttrs::Select(SelectAttrs {
                options: f.select_option.clone(),
                option_value,
                option_label,
                input_class: widget_class(f.input_class.as_ref()),
                input_id: dom_id,
                filter: f.filter,
                invalid: is_invalid,
            })
        }
        FieldKind::MultiSelect(f) => {
            bag.id = None;
            let (option_value, option_label) =
                option_keys(&f.select_option, f.select_value.as_ref(), f.select_label.as_ref());
            ExtraAttrs::MultiSelect(MultiSelectAttrs {
                select: SelectAttrs {
                    options: f.select_option.clone(),
                    option_value,
                    option_label,
                    input_class: widget_class(f.input_class.as_ref()),
                    input_id: dom_id,
                    filter: f.filter,
                    invalid: is_invalid,
                },
                empty_filter_message: config.form.empty_filter_message.clone(),
                display: "chip",
            })
        }
        FieldKind::TreeSelect(f) => {
            bag.id = None;
            ExtraAttrs::TreeSelect(TreeSelectAttrs {
                options: f.select_option.clone(),
                invalid: is_invalid,
                input_class: widget_class(f.input_class.as_ref()),
                select_label: f.select_label.clone(),
                select_value: f.select_value.clone(),
                children_key: f.children_key.clone(),
                input_id: dom_id,
            })
        }
        FieldKind::LazySelect(f) => {
            bag.id = None;
            ExtraAttrs::LazySelect(LazySelectAttrs {
                invalid: is_invalid,
                input_class: widget_class(f.input_class.as_ref()),
                select_label: f.select_label.clone(),
                select_value: f.select_value.clone(),
                filter: f.filter,
                fetcher: f.fetcher.clone(),
                one_fetcher: f.one_fetcher.clone(),
                input_id: dom_id,
            })
        }
        FieldKind::Radio(f) => ExtraAttrs::Choice(ChoiceAttrs {
            alignment: f.alignment,
            options: f.select_option.clone(),
            invalid: is_invalid,
            select_label: f.select_label.clone(),
            select_value: f.select_value.clone(),
        }),
        FieldKind::Checkbox(f) => ExtraAttrs::Choice(ChoiceAttrs {
            alignment: f.alignment,
            options: f.select_option.clone(),
            invalid: is_invalid,
            select_label: f.select_label.clone(),
            select_value: f.select_value.clone(),
        }),
        FieldKind::File(f) => ExtraAttrs::File(FileAttrs {
            allow_multiple: f.allow_multiple,
            read_files: f.read_files.clone().unwrap_or_default(),
            doc_preview_img_url: f
                .doc_preview_img_url
                .clone()
                .unwrap_or_else(|| config.file.doc_preview_img_url.clone()),
            video_preview_img_url: f
                .video_preview_img_url
                .clone()
                .unwrap_or_else(|| config.file.video_preview_img_url.clone()),
            uploader: f.uploader.clone(),
            deleter: f.deleter.clone(),
            reorderer: f.reorderer.clone(),
            accepted_file_types: f.file_type,
            invalid_file_type_message: f.invalid_file_type_message.clone(),
            max_file_size: f.max_file_size,
            invalid_file_size_message: f.invalid_file_size_message.clone(),
            file_limit: f.file_limit,
            invalid_file_limit_message: f.invalid_file_limit_message.clone(),
            value_type: f.value_type,
        }),
    };

    bag
}

// ============================================================================
// Options
// ============================================================================

/// `(value, label)` pairs for rendering select options
pub fn option_pairs(
    options: &[SelectOption],
    option_value: Option<&str>,
    option_label: Option<&str>,
) -> Vec<(String, String)> {
    let value_key = option_value.unwrap_or(DEFAULT_OPTION_VALUE);
    let label_key = option_label.unwrap_or(DEFAULT_OPTION_LABEL);
    options
        .iter()
        .map(|option| match option {
            Value::Object(record) => (
                record.get(value_key).map(to_display_string).unwrap_or_default(),
                record.get(label_key).map(to_display_string).unwrap_or_default(),
            ),
            scalar => {
                let text = to_display_string(scalar);
                (text.clone(), text)
            }
        })
        .collect()
}

/// Typed value of the option whose rendered value is `raw`
pub fn resolve_option(options: &[SelectOption], option_value: Option<&str>, raw: &str) -> Option<Value> {
    let value_key = option_value.unwrap_or(DEFAULT_OPTION_VALUE);
    options.iter().find_map(|option| {
        let value = match option {
            Value::Object(record) => record.get(value_key).cloned().unwrap_or(Value::Null),
            scalar => scalar.clone(),
        };
        (to_display_string(&value) == raw).then_some(value)
    })
}

/// Depth-first rows of a tree of options: `(value, label, depth)`
pub fn tree_option_rows(
    options: &[SelectOption],
    select_value: Option<&str>,
    select_label: Option<&str>,
    children_key: Option<&str>,
) -> Vec<(String, String, usize)> {
    fn walk(
        options: &[SelectOption],
        keys: (&str, &str, &str),
        depth: usize,
        rows: &mut Vec<(String, String, usize)>,
    ) {
        let (value_key, label_key, children_key) = keys;
        for option in options {
            match option {
                Value::Object(record) => {
                    rows.push((
                        record.get(value_key).map(to_display_string).unwrap_or_default(),
                        record.get(label_key).map(to_display_string).unwrap_or_default(),
                        depth,
                    ));
                    if let Some(Value::Array(children)) = record.get(children_key) {
                        walk(children, keys, depth + 1, rows);
                    }
                }
                scalar => {
                    let text = to_display_string(scalar);
                    rows.push((text.clone(), text, depth));
                }
            }
        }
    }

    let mut rows = Vec::new();
    walk(
        options,
        (
            select_value.unwrap_or(DEFAULT_OPTION_VALUE),
            select_label.unwrap_or(DEFAULT_OPTION_LABEL),
            children_key.unwrap_or(DEFAULT_CHILDREN_KEY),
        ),
        0,
        &mut rows,
    );
    rows
}

/// Typed value of the tree option whose rendered value is `raw`, at any depth
pub fn resolve_tree_option(
    options: &[SelectOption],
    select_value: Option<&str>,
    children_key: Option<&str>,
    raw: &str,
) -> Option<Value> {
    let children_key = children_key.unwrap_or(DEFAULT_CHILDREN_KEY);
    options.iter().find_map(|option| match option {
        Value::Object(record) => {
            let value = record
                .get(select_value.unwrap_or(DEFAULT_OPTION_VALUE))
                .cloned()
                .unwrap_or(Value::Null);
            if to_display_string(&value) == raw {
                return Some(value);
            }
            match record.get(children_key) {
                Some(Value::Array(children)) => {
                    resolve_tree_option(children, select_value, Some(children_key), raw)
                }
                _ => None,
            }
        }
        scalar => (to_display_string(scalar) == raw).then(|| scalar.clone()),
    })
}

// ============================================================================
// Events
// ============================================================================

pub const READ_FILES_UPDATED: &str = "update:readFiles";

/// Payload of events emitted by field widgets
#[derive(Clone, Debug, PartialEq)]
pub enum FieldEvent {
    ReadFilesUpdated(Vec<ServerFile>),
}

pub type EventHandler = fn(&mut FieldDescriptor, FieldEvent);

/// Event name -> handler mutating the descriptor the event belongs to
#[derive(Clone, Debug, Default)]
pub struct EventMap {
    handlers: BTreeMap<&'static str, EventHandler>,
}

impl EventMap {
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    pub fn handles(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Run the handler for `name` against `item`; false when nothing handles it
    pub fn dispatch(&self, name: &str, item: &mut FieldDescriptor, event: FieldEvent) -> bool {
        match self.handlers.get(name) {
            Some(handler) => {
                handler(item, event);
                true
            }
            None => false,
        }
    }
}

fn update_read_files(item: &mut FieldDescriptor, event: FieldEvent) {
    let FieldEvent::ReadFilesUpdated(files) = event;
    if let FieldKind::File(field) = &mut item.kind {
        field.read_files = Some(files);
    }
}

/// Event handlers a field's widget should be wired with
pub fn hydrate_on(item: Option<&FieldDescriptor>) -> EventMap {
    let mut map = EventMap::default();
    if let Some(FieldDescriptor {
        kind: FieldKind::File(_),
        ..
    }) = item
    {
        map.handlers.insert(READ_FILES_UPDATED, update_read_files as EventHandler);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic_form::types::{
        CheckboxField, FileField, MultiSelectField, SelectField, TemplateField, TextField,
    };
    use serde_json::json;

    fn base_bag(prefix: &str, item: &FieldDescriptor) -> AttributeBag {
        AttributeBag {
            class: "w-full".to_string(),
            id: Some(id_for(prefix, item)),
            disabled: item.disabled,
            placeholder: item.placeholder.clone(),
            extra: ExtraAttrs::None,
        }
    }

    fn errors_for(id: &str) -> ErrorMap {
        ErrorMap::from([(id.to_string(), "Champ requis".to_string())])
    }

    #[test]
    fn test_id_for() {
        let item = FieldDescriptor::new("email", "Email", FieldKind::input());
        assert_eq!(id_for("login", &item), "login-email");
    }

    #[test]
    fn test_base_only_variants_equal_base_bag() {
        let fields = [
            FieldDescriptor::new("a", "A", FieldKind::input()).with_placeholder("..."),
            FieldDescriptor::new("b", "B", FieldKind::Textarea(TextField::default())).disabled(true),
            FieldDescriptor::new("c", "C", FieldKind::Template(TemplateField::default())),
        ];
        for item in &fields {
            assert_eq!(hydrate_attrs("form", item, None), base_bag("form", item));
        }
    }

    #[test]
    fn test_invalid_class_and_input_class() {
        let item = FieldDescriptor::new(
            "name",
            "Nom",
            FieldKind::Input(TextField {
                value: String::new(),
                input_class: Some("uppercase".to_string()),
            }),
        );
        let bag = hydrate_attrs("f", &item, Some(&errors_for("name")));
        assert_eq!(bag.class, "w-full p-invalid uppercase");
        assert!(bag.is_invalid());

        let other_errors = errors_for("other");
        let bag = hydrate_attrs("f", &item, Some(&other_errors));
        assert_eq!(bag.class, "w-full uppercase");
    }

    #[test]
    fn test_select_with_plain_string_options_has_null_keys() {
        let item = FieldDescriptor::new(
            "city",
            "Ville",
            FieldKind::select(vec![json!("Antananarivo"), json!("Toamasina")]),
        );
        let bag = hydrate_attrs("f", &item, None);
        assert_eq!(bag.id, None);
        match bag.extra {
            ExtraAttrs::Select(select) => {
                assert_eq!(select.option_value, None);
                assert_eq!(select.option_label, None);
                assert_eq!(select.input_id, "f-city");
            }
            other => panic!("unexpected extra {:?}", other),
        }

        let multi = FieldDescriptor::new(
            "tags",
            "Tags",
            FieldKind::MultiSelect(MultiSelectField {
                select_option: vec![json!("a"), json!("b")],
                ..MultiSelectField::default()
            }),
        );
        match hydrate_attrs("f", &multi, None).extra {
            ExtraAttrs::MultiSelect(attrs) => {
                assert_eq!(attrs.select.option_value, None);
                assert_eq!(attrs.select.option_label, None);
                assert_eq!(attrs.empty_filter_message, "Pas de résultat");
                assert_eq!(attrs.display, "chip");
            }
            other => panic!("unexpected extra {:?}", other),
        }
    }

    #[test]
    fn test_select_with_records_uses_defaults_or_overrides() {
        let options = vec![json!({ "label": "Actif", "value": 1 })];
        let item = FieldDescriptor::new("status", "Statut", FieldKind::select(options.clone()));
        match hydrate_attrs("f", &item, None).extra {
            ExtraAttrs::Select(select) => {
                assert_eq!(select.option_value.as_deref(), Some("value"));
                assert_eq!(select.option_label.as_deref(), Some("label"));
            }
            other => panic!("unexpected extra {:?}", other),
        }

        let custom = FieldDescriptor::new(
            "status",
            "Statut",
            FieldKind::Select(SelectField {
                select_option: options,
                select_value: Some("id".to_string()),
                select_label: Some("name".to_string()),
                ..SelectField::default()
            }),
        );
        match hydrate_attrs("f", &custom, Some(&errors_for("status"))).extra {
            ExtraAttrs::Select(select) => {
                assert_eq!(select.option_value.as_deref(), Some("id"));
                assert_eq!(select.option_label.as_deref(), Some("name"));
                assert!(select.invalid);
            }
            other => panic!("unexpected extra {:?}", other),
        }
    }

    #[test]
    fn test_number_and_password_move_id_to_input() {
        let number = FieldDescriptor::new("age", "Age", FieldKind::number());
        let bag = hydrate_attrs("f", &number, None);
        assert_eq!(bag.id, None);
        assert_eq!(bag.dom_id(), Some("f-age"));
        match bag.extra {
            ExtraAttrs::Number(attrs) => {
                assert_eq!(attrs.input_type, "number");
                assert_eq!(attrs.input_class, "w-full");
                assert!(attrs.use_grouping);
            }
            other => panic!("unexpected extra {:?}", other),
        }

        let password = FieldDescriptor::new("pwd", "Mot de passe", FieldKind::Password(TextField::default()));
        match hydrate_attrs("f", &password, None).extra {
            ExtraAttrs::Password(attrs) => {
                assert!(attrs.toggle_mask);
                assert!(!attrs.feedback);
                assert_eq!(attrs.autocomplete, "current-password");
            }
            other => panic!("unexpected extra {:?}", other),
        }
    }

    #[test]
    fn test_file_defaults_from_config() {
        let item = FieldDescriptor::new("docs", "Documents", FieldKind::File(FileField::default()));
        match hydrate_attrs("f", &item, None).extra {
            ExtraAttrs::File(attrs) => {
                assert!(attrs.read_files.is_empty());
                assert_eq!(attrs.doc_preview_img_url, "/images/Doc.jpg");
                assert_eq!(attrs.video_preview_img_url, "/images/Video.jpg");
                assert_eq!(attrs.value_type, FileValueType::DirectUpload);
            }
            other => panic!("unexpected extra {:?}", other),
        }
    }

    #[test]
    fn test_option_pairs_and_resolve() {
        let records = vec![json!({ "id": 1, "name": "Riz" }), json!({ "id": 2, "name": "Café" })];
        assert_eq!(
            option_pairs(&records, Some("id"), Some("name")),
            vec![("1".to_string(), "Riz".to_string()), ("2".to_string(), "Café".to_string())]
        );
        assert_eq!(resolve_option(&records, Some("id"), "2"), Some(json!(2)));
        assert_eq!(resolve_option(&records, Some("id"), "3"), None);

        let plain = vec![json!("oui"), json!("non")];
        assert_eq!(option_pairs(&plain, None, None)[1], ("non".to_string(), "non".to_string()));
        assert_eq!(resolve_option(&plain, None, "oui"), Some(json!("oui")));
    }

    #[test]
    fn test_tree_option_rows() {
        let tree = vec![json!({
            "value": "fruits",
            "label": "Fruits",
            "children": [{ "value": "litchi", "label": "Litchi" }]
        })];
        let rows = tree_option_rows(&tree, None, None, None);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], ("litchi".to_string(), "Litchi".to_string(), 1));
        assert_eq!(resolve_tree_option(&tree, None, None, "litchi"), Some(json!("litchi")));
        assert_eq!(resolve_tree_option(&tree, None, None, "mangue"), None);
    }

    #[test]
    fn test_hydrate_on_only_wires_file_fields() {
        assert!(hydrate_on(None).is_empty());

        let checkbox = FieldDescriptor::new("c", "C", FieldKind::Checkbox(CheckboxField::default()));
        assert!(hydrate_on(Some(&checkbox)).is_empty());

        let mut file = FieldDescriptor::new("photos", "Photos", FieldKind::File(FileField::default()));
        let events = hydrate_on(Some(&file));
        assert!(events.handles(READ_FILES_UPDATED));

        let uploaded = ServerFile {
            id: 7,
            file_name: "photo.jpg".to_string(),
            ..ServerFile::default()
        };
        assert!(events.dispatch(
            READ_FILES_UPDATED,
            &mut file,
            FieldEvent::ReadFilesUpdated(vec![uploaded.clone()])
        ));
        match &file.kind {
            FieldKind::File(f) => assert_eq!(f.read_files, Some(vec![uploaded])),
            other => panic!("unexpected kind {:?}", other),
        }
        assert!(!events.dispatch("click", &mut file, FieldEvent::ReadFilesUpdated(vec![])));
    }
}
