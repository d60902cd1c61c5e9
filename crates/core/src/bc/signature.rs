use serde_json::Value;

use crate::db::ParameterRecord;

/// Render one parameter the way it would appear in a declaration, e.g.
/// `array $params`, `&$event` or `$mode = 'full'`.
///
/// The type prefix prefers the declared type name, then the `array` and
/// `callable` hints, then the class type hint.
pub fn render_parameter(parameter: &ParameterRecord) -> String {
    let mut out = String::new();
    let prefix = if parameter.has_type {
        parameter.type_name.as_deref().unwrap_or("")
    } else if parameter.is_array {
        "array"
    } else if parameter.is_callable {
        "callable"
    } else {
        parameter.type_class.as_deref().unwrap_or("")
    };
    if !prefix.is_empty() {
        out.push_str(prefix);
        out.push(' ');
    }
    if parameter.is_passed_by_reference {
        out.push('&');
    }
    out.push('$');
    out.push_str(&parameter.name);
    if parameter.has_default_value {
        out.push_str(" = ");
        out.push_str(&render_default(parameter));
    }
    out
}

/// Render a whole parameter list, comma-separated.
pub fn render_signature(parameters: &[ParameterRecord]) -> String {
    parameters.iter().map(render_parameter).collect::<Vec<_>>().join(", ")
}

fn render_default(parameter: &ParameterRecord) -> String {
    if let Some(constant) = parameter.default_constant.as_deref().filter(|c| !c.is_empty()) {
        // Named constants are rendered as written, not as their value.
        return constant.to_string();
    }
    match parameter.default_value.as_deref() {
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(value) => render_literal(&value),
            Err(_) => raw.to_string(),
        },
        None => String::from("null"),
    }
}

/// Render a captured default value as source-level literal text.
///
/// Array entries are joined with a bare comma so a rendering never contains
/// the `", "` separator that signature comparison splits on.
fn render_literal(value: &Value) -> String {
    match value {
        Value::Null => String::from("null"),
        Value::Bool(true) => String::from("true"),
        Value::Bool(false) => String::from("false"),
        Value::Number(number) => number.to_string(),
        Value::String(text) => quote_string(text),
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(render_literal).collect();
            format!("array({})", rendered.join(","))
        }
        Value::Object(entries) => {
            let rendered: Vec<String> = entries
                .iter()
                .map(|(key, value)| format!("{} => {}", quote_string(key), render_literal(value)))
                .collect();
            format!("array({})", rendered.join(","))
        }
    }
}

fn quote_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        if ch == '\\' || ch == '\'' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

/// Whether calls written against `source` keep working against `target`.
///
/// Compatible widenings are making an existing parameter optional and
/// appending parameters that carry defaults; anything else in the shared
/// prefix (renames, type changes, removals, reordering, even a changed
/// default) is incompatible.
pub fn is_signature_compatible(source: &str, target: &str) -> bool {
    if source == target {
        return true;
    }
    let source_parts = split_signature(source);
    let target_parts = split_signature(target);
    if target_parts.len() < source_parts.len() {
        return false;
    }
    let (prefix, appended) = target_parts.split_at(source_parts.len());
    if prefix != source_parts.as_slice() {
        // Defaults are stripped from the target side only; a parameter may
        // become optional without breaking existing calls.
        let stripped_prefix: Vec<&str> = prefix.iter().map(|p| strip_default(p)).collect();
        if stripped_prefix != source_parts {
            return false;
        }
    }
    appended.iter().all(|part| part.contains(" = "))
}

fn split_signature(signature: &str) -> Vec<&str> {
    if signature.is_empty() {
        Vec::new()
    } else {
        signature.split(", ").collect()
    }
}

fn strip_default(token: &str) -> &str {
    match token.find(" = ") {
        Some(index) => &token[..index],
        None => token,
    }
}
