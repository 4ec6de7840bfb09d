//! Named validation rules with French messages
//!
//! Rules are registered into an explicit [`RuleRegistry`] that the caller
//! builds once and passes to whatever validates forms. Field descriptors
//! reference rules through expressions such as `"required|between:1,10"`.
//!
//! Base rules follow the semantics of the usual Laravel-style rule set:
//! everything except `required` accepts empty values.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::types::{ErrorMap, FieldDescriptor, Validation};
use super::value::{is_empty, js_number, js_number_str, to_display_string};
use crate::config::LibraryConfig;
use crate::error::FormError;

/// `Ok(())` when the value passes, otherwise the message to display
pub type RuleFn = Arc<dyn Fn(&Value, &[String]) -> Result<(), String> + Send + Sync>;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("email pattern is valid")
});

static NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[٠-٩0-9]+$").expect("numeric pattern is valid"));

/// Replace `$1`, `$2`, ... with the rule arguments (first occurrence each)
pub fn format_message(template: &str, args: &[String]) -> String {
    args.iter().enumerate().fold(template.to_string(), |acc, (i, arg)| {
        acc.replacen(&format!("${}", i + 1), arg, 1)
    })
}

/// Wrap a boolean predicate with a message template
fn message<F>(predicate: F, template: &'static str) -> RuleFn
where
    F: Fn(&Value, &[String]) -> bool + Send + Sync + 'static,
{
    Arc::new(move |value: &Value, args: &[String]| {
        if predicate(value, args) {
            Ok(())
        } else {
            Err(format_message(template, args))
        }
    })
}

/// Apply `check` to each element of a list, or to the value itself
fn every(value: &Value, check: impl Fn(&Value) -> bool) -> bool {
    match value {
        Value::Array(items) => items.iter().all(check),
        other => check(other),
    }
}

fn arg_number(args: &[String], index: usize) -> f64 {
    args.get(index).map(|a| js_number_str(a)).unwrap_or(f64::NAN)
}

fn length_of(value: &Value) -> usize {
    to_display_string(value).chars().count()
}

// ============================================================================
// Base rules
// ============================================================================

fn required(value: &Value, _args: &[String]) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::Array(items) => !items.is_empty(),
        other => !to_display_string(other).trim().is_empty(),
    }
}

fn email(value: &Value, _args: &[String]) -> bool {
    if is_empty(value) {
        return true;
    }
    every(value, |v| EMAIL_RE.is_match(&to_display_string(v)))
}

fn min(value: &Value, args: &[String]) -> bool {
    if is_empty(value) {
        return true;
    }
    let bound = arg_number(args, 0);
    every(value, |v| length_of(v) as f64 >= bound)
}

fn max(value: &Value, args: &[String]) -> bool {
    if is_empty(value) {
        return true;
    }
    let bound = arg_number(args, 0);
    every(value, |v| length_of(v) as f64 <= bound)
}

fn min_value(value: &Value, args: &[String]) -> bool {
    if is_empty(value) {
        return true;
    }
    let bound = arg_number(args, 0);
    every(value, |v| js_number(v) >= bound)
}

fn max_value(value: &Value, args: &[String]) -> bool {
    if is_empty(value) {
        return true;
    }
    let bound = arg_number(args, 0);
    every(value, |v| js_number(v) <= bound)
}

fn numeric(value: &Value, _args: &[String]) -> bool {
    if is_empty(value) {
        return true;
    }
    every(value, |v| NUMERIC_RE.is_match(&to_display_string(v)))
}

fn between(value: &Value, args: &[String]) -> bool {
    if is_empty(value) {
        return true;
    }
    let (low, high) = (arg_number(args, 0), arg_number(args, 1));
    every(value, |v| {
        let n = js_number(v);
        low <= n && n <= high
    })
}

/// `args[0]` is the value of the other field, `args[1]` its label
fn confirmed(value: &Value, args: &[String]) -> bool {
    match args.first() {
        Some(target) => to_display_string(value) == *target,
        None => false,
    }
}

fn is_not(value: &Value, args: &[String]) -> bool {
    match args.first() {
        Some(other) => to_display_string(value) != *other,
        None => true,
    }
}

// ============================================================================
// Custom rules
// ============================================================================

fn not_empty_array(value: &Value, _args: &[String]) -> Result<(), String> {
    match value {
        Value::Array(items) if items.is_empty() => Err("Choix requis".to_string()),
        Value::Array(_) => Ok(()),
        _ => Err("Champs invalide".to_string()),
    }
}

fn strict_min_value(value: &Value, args: &[String]) -> Result<(), String> {
    let n = js_number(value);
    if n.is_nan() {
        return Err("Nombre invalide".to_string());
    }
    let bound = arg_number(args, 0);
    if bound.is_nan() {
        return Err("Validateur invalide".to_string());
    }
    if n <= bound {
        return Err(format!(
            "Doit être strictement supérieur à {}",
            args.first().map(String::as_str).unwrap_or_default()
        ));
    }
    Ok(())
}

fn strict_max_value(value: &Value, args: &[String]) -> Result<(), String> {
    let n = js_number(value);
    if n.is_nan() {
        return Err("Nombre invalide".to_string());
    }
    let bound = arg_number(args, 0);
    if bound.is_nan() {
        return Err("Validateur invalide".to_string());
    }
    if n >= bound {
        return Err(format!(
            "Doit être strictement inférieur à {}",
            args.first().map(String::as_str).unwrap_or_default()
        ));
    }
    Ok(())
}

fn starts_with(value: &Value, args: &[String]) -> Result<(), String> {
    let text = to_display_string(value);
    if text.is_empty() {
        return Ok(());
    }
    if args.iter().any(|prefix| text.starts_with(prefix.as_str())) {
        Ok(())
    } else {
        Err(format!("Doit commencer par {}", args.join(" ou ")))
    }
}

fn ends_with(value: &Value, args: &[String]) -> Result<(), String> {
    let text = to_display_string(value);
    if text.is_empty() {
        return Ok(());
    }
    if args.iter().any(|suffix| text.ends_with(suffix.as_str())) {
        Ok(())
    } else {
        Err(format!("Doit se terminer par {}", args.join(" ou ")))
    }
}

// ============================================================================
// Registry
// ============================================================================

/// One `name:arg1,arg2` segment of a rule expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCall {
    pub name: String,
    pub args: Vec<String>,
}

/// Split `"required|between:1,10"` into rule calls
pub fn parse_expression(expr: &str) -> Result<Vec<RuleCall>, FormError> {
    expr.split('|')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (name, args) = match segment.split_once(':') {
                Some((name, args)) => (
                    name.trim(),
                    args.split(',').map(|a| a.trim().to_string()).collect(),
                ),
                None => (segment, Vec::new()),
            };
            if name.is_empty() {
                return Err(FormError::InvalidExpression(expr.to_string()));
            }
            Ok(RuleCall {
                name: name.to_string(),
                args,
            })
        })
        .collect()
}

#[derive(Clone)]
pub struct RuleRegistry {
    rules: HashMap<String, RuleFn>,
    default_message: String,
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.rules.keys().collect();
        names.sort();
        f.debug_struct("RuleRegistry")
            .field("rules", &names)
            .finish()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

impl RuleRegistry {
    /// Registry without any rule
    pub fn new() -> Self {
        Self::empty_with(LibraryConfig::embedded())
    }

    fn empty_with(config: &LibraryConfig) -> Self {
        Self {
            rules: HashMap::new(),
            default_message: config.form.default_validation_message.clone(),
        }
    }

    /// Base and custom rules, messages from the embedded configuration
    pub fn with_default_rules() -> Self {
        Self::with_config(LibraryConfig::embedded())
    }

    pub fn with_config(config: &LibraryConfig) -> Self {
        let mut registry = Self::empty_with(config);

        registry.define_rule("required", message(required, "Champ requis"));
        registry.define_rule("email", message(email, "Email non valide"));
        registry.define_rule("min", message(min, "Doit avoir $1 de longueur au minimum"));
        registry.define_rule("max", message(max, "Doit avoir $1 de longueur au maximum"));
        registry.define_rule("min_value", message(min_value, "Doit supérieur à $1"));
        registry.define_rule("max_value", message(max_value, "Doit inférieur à $1"));
        registry.define_rule("numeric", message(numeric, "Doit être un nombre"));
        registry.define_rule("between", message(between, "Doit être entre $1 et $2"));
        registry.define_rule("confirmed", message(confirmed, "Doit être comme $2"));
        registry.define_rule("is_not", message(is_not, "Ne doit pas être $1"));

        registry.define_rule("not_empty_array", Arc::new(not_empty_array));
        registry.define_rule("strict_min_value", Arc::new(strict_min_value));
        registry.define_rule("strict_max_value", Arc::new(strict_max_value));
        registry.define_rule("starts_with", Arc::new(starts_with));
        registry.define_rule("ends_with", Arc::new(ends_with));

        log::debug!("Registered {} validation rules", registry.rules.len());
        registry
    }

    /// Register or replace a rule
    pub fn define_rule(&mut self, name: &str, rule: RuleFn) {
        if self.rules.insert(name.to_string(), rule).is_some() {
            log::debug!("Validation rule '{}' replaced", name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Fallback message for a field whose rules could not be evaluated
    pub fn default_message_for(&self, field_label: &str) -> String {
        self.default_message.replace("{field}", field_label)
    }

    pub fn validate(&self, name: &str, value: &Value, args: &[String]) -> Result<(), FormError> {
        let rule = self
            .rules
            .get(name)
            .ok_or_else(|| FormError::UnknownRule(name.to_string()))?;
        rule(value, args).map_err(FormError::Validation)
    }

    /// Run an expression, stopping at the first failing rule
    ///
    /// Arguments written `@field_id` are replaced by the current value of that
    /// field in `form`.
    pub fn validate_expression(
        &self,
        expr: &str,
        value: &Value,
        form: &[FieldDescriptor],
    ) -> Result<(), FormError> {
        for call in parse_expression(expr)? {
            let args = resolve_args(&call.args, form)?;
            self.validate(&call.name, value, &args)?;
        }
        Ok(())
    }

    pub fn validate_field(&self, field: &FieldDescriptor, form: &[FieldDescriptor]) -> Result<(), FormError> {
        match &field.validation {
            None => Ok(()),
            Some(Validation::Rules(expr)) => self.validate_expression(expr, &field.value(), form),
            Some(Validation::Custom(validator)) => {
                validator.check(&field.value()).map_err(FormError::Validation)
            }
        }
    }

    /// Messages of every invalid field, keyed by field id
    pub fn validate_form(&self, form: &[FieldDescriptor]) -> ErrorMap {
        let mut errors = ErrorMap::new();
        for field in form {
            match self.validate_field(field, form) {
                Ok(()) => {}
                Err(FormError::Validation(message)) => {
                    errors.insert(field.id.clone(), message);
                }
                Err(err) => {
                    log::warn!("Field '{}' could not be validated: {}", field.id, err);
                    errors.insert(field.id.clone(), self.default_message_for(&field.label));
                }
            }
        }
        errors
    }
}

fn resolve_args(args: &[String], form: &[FieldDescriptor]) -> Result<Vec<String>, FormError> {
    args.iter()
        .map(|arg| match arg.strip_prefix('@') {
            Some(target) => form
                .iter()
                .find(|f| f.id == target)
                .map(|f| to_display_string(&f.value()))
                .ok_or_else(|| FormError::InvalidExpression(format!("unknown field reference {}", arg))),
            None => Ok(arg.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic_form::types::{FieldKind, FieldValidator, NumberField};
    use serde_json::json;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn check(name: &str, value: Value, rule_args: &[&str]) -> Result<(), String> {
        RuleRegistry::with_default_rules()
            .validate(name, &value, &args(rule_args))
            .map_err(|e| e.display_message())
    }

    #[test]
    fn test_format_message() {
        assert_eq!(format_message("Doit être entre $1 et $2", &args(&["1", "5"])), "Doit être entre 1 et 5");
        assert_eq!(format_message("Champ requis", &[]), "Champ requis");
    }

    #[test]
    fn test_required() {
        assert_eq!(check("required", json!(""), &[]), Err("Champ requis".to_string()));
        assert_eq!(check("required", json!("   "), &[]), Err("Champ requis".to_string()));
        assert_eq!(check("required", Value::Null, &[]), Err("Champ requis".to_string()));
        assert_eq!(check("required", json!([]), &[]), Err("Champ requis".to_string()));
        assert_eq!(check("required", json!(false), &[]), Err("Champ requis".to_string()));
        assert!(check("required", json!("x"), &[]).is_ok());
        assert!(check("required", json!(0), &[]).is_ok());
    }

    #[test]
    fn test_base_rules_messages() {
        assert_eq!(
            check("min", json!("ab"), &["3"]),
            Err("Doit avoir 3 de longueur au minimum".to_string())
        );
        assert!(check("max", json!("abc"), &["3"]).is_ok());
        assert_eq!(check("min_value", json!(2), &["5"]), Err("Doit supérieur à 5".to_string()));
        assert_eq!(check("max_value", json!("9"), &["5"]), Err("Doit inférieur à 5".to_string()));
        assert_eq!(check("between", json!(11), &["1", "10"]), Err("Doit être entre 1 et 10".to_string()));
        assert!(check("between", json!("10"), &["1", "10"]).is_ok());
        assert_eq!(check("numeric", json!("12a"), &[]), Err("Doit être un nombre".to_string()));
        assert!(check("numeric", json!(" "), &[]).is_err());
        assert_eq!(check("is_not", json!("admin"), &["admin"]), Err("Ne doit pas être admin".to_string()));
    }

    #[test]
    fn test_empty_values_pass_optional_rules() {
        for name in ["email", "min", "max", "min_value", "max_value", "numeric", "between"] {
            assert!(check(name, json!(""), &["1", "2"]).is_ok(), "{} rejected an empty value", name);
        }
    }

    #[test]
    fn test_email() {
        assert!(check("email", json!("rakoto@example.mg"), &[]).is_ok());
        assert_eq!(check("email", json!("rakoto@"), &[]), Err("Email non valide".to_string()));
    }

    #[test]
    fn test_not_empty_array() {
        assert_eq!(check("not_empty_array", json!("a"), &[]), Err("Champs invalide".to_string()));
        assert_eq!(check("not_empty_array", json!([]), &[]), Err("Choix requis".to_string()));
        assert!(check("not_empty_array", json!([1]), &[]).is_ok());
    }

    #[test]
    fn test_strict_bounds() {
        assert_eq!(
            check("strict_min_value", json!(5), &["5"]),
            Err("Doit être strictement supérieur à 5".to_string())
        );
        assert!(check("strict_min_value", json!(6), &["5"]).is_ok());
        assert_eq!(check("strict_min_value", json!("abc"), &["5"]), Err("Nombre invalide".to_string()));
        assert_eq!(check("strict_min_value", json!(6), &["x"]), Err("Validateur invalide".to_string()));

        assert_eq!(
            check("strict_max_value", json!(5), &["5"]),
            Err("Doit être strictement inférieur à 5".to_string())
        );
        assert!(check("strict_max_value", json!("4.5"), &["5"]).is_ok());
    }

    #[test]
    fn test_starts_and_ends_with() {
        assert!(check("starts_with", json!(""), &["03"]).is_ok());
        assert!(check("starts_with", json!("0341234567"), &["032", "034"]).is_ok());
        assert_eq!(
            check("starts_with", json!("0391234567"), &["032", "034"]),
            Err("Doit commencer par 032 ou 034".to_string())
        );
        assert!(check("ends_with", json!("photo.jpg"), &[".jpg", ".png"]).is_ok());
        assert_eq!(
            check("ends_with", json!("photo.gif"), &[".jpg"]),
            Err("Doit se terminer par .jpg".to_string())
        );
    }

    #[test]
    fn test_unknown_rule() {
        let registry = RuleRegistry::new();
        assert!(!registry.contains("required"));
        assert!(matches!(
            registry.validate("required", &json!(""), &[]),
            Err(FormError::UnknownRule(_))
        ));
    }

    #[test]
    fn test_define_custom_rule() {
        let mut registry = RuleRegistry::new();
        registry.define_rule(
            "even",
            Arc::new(|value: &Value, _args: &[String]| {
                if js_number(value) % 2.0 == 0.0 {
                    Ok(())
                } else {
                    Err("Doit être pair".to_string())
                }
            }),
        );
        assert!(registry.validate("even", &json!(4), &[]).is_ok());
        assert!(registry.validate("even", &json!(3), &[]).is_err());
    }

    #[test]
    fn test_parse_expression() {
        let calls = parse_expression("required| between:1, 10 |").unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].name, "between");
        assert_eq!(calls[1].args, args(&["1", "10"]));
        assert!(parse_expression(":3").is_err());
    }

    #[test]
    fn test_validate_form() {
        let registry = RuleRegistry::with_default_rules();
        let mut password = FieldDescriptor::new("password", "Mot de passe", FieldKind::input());
        password.set_value(json!("secret")).unwrap();
        let mut confirmation = FieldDescriptor::new("confirmation", "Confirmation", FieldKind::input())
            .with_validation("required|confirmed:@password,Mot de passe");
        confirmation.set_value(json!("secrte")).unwrap();

        let form = vec![
            password,
            confirmation,
            FieldDescriptor::new("name", "Nom", FieldKind::input()).with_validation("required|min:3"),
            FieldDescriptor::new(
                "qty",
                "Quantité",
                FieldKind::Number(NumberField { value: Some(3.0), ..NumberField::default() }),
            )
            .with_validation(FieldValidator::new(|v| {
                if js_number(v) > 2.0 {
                    Err("Trop grand".to_string())
                } else {
                    Ok(())
                }
            })),
            FieldDescriptor::new("code", "Code", FieldKind::input()).with_validation("unknown_rule"),
        ];

        let errors = registry.validate_form(&form);
        assert_eq!(errors.get("confirmation").map(String::as_str), Some("Doit être comme Mot de passe"));
        assert_eq!(errors.get("name").map(String::as_str), Some("Champ requis"));
        assert_eq!(errors.get("qty").map(String::as_str), Some("Trop grand"));
        assert_eq!(errors.get("code").map(String::as_str), Some("Le champ Code est invalide"));
        assert!(!errors.contains_key("password"));
    }
}
