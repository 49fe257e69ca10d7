//! Prompt template rendering. A Mustache subset over a `serde_json::Value` context.
//!
//! Supported: `{{name}}`, `{{{name}}}`, `{{& name}}`, dotted names, `{{.}}`,
//! sections `{{#name}}..{{/name}}`, inverted sections `{{^name}}..{{/name}}` and
//! comments `{{! .. }}`. Nothing is HTML-escaped; prompts are not markup.
//! A section, inverted, closing or comment tag alone on its line removes that whole line.

use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

static TAG_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?s)\{\{(\{)?\s*([#^/!&])?\s*(.*?)\s*\}?\}\}").expect("tag regex is valid")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("unclosed section '{0}'")]
    Unclosed(String),

    #[error("closing tag '{found}' does not match open section '{expected}'")]
    Mismatched { expected: String, found: String },

    #[error("closing tag '{0}' without open section")]
    Orphan(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Var(String),
    Section {
        name: String,
        inverted: bool,
        children: Vec<Node>,
    },
}

/// Render `template` against `context`. Pure: same inputs give byte-identical output.
pub fn render(template: &str, context: &Value) -> Result<String, RenderError> {
    let nodes = parse(template)?;
    let mut out = String::with_capacity(template.len());
    let mut stack = vec![context];
    render_nodes(&nodes, &mut stack, &mut out);
    Ok(out)
}

fn parse(template: &str) -> Result<Vec<Node>, RenderError> {
    // Open sections: (name, inverted, nodes collected so far in the enclosing scope).
    let mut open: Vec<(String, bool, Vec<Node>)> = Vec::new();
    let mut current: Vec<Node> = Vec::new();
    let mut last = 0;

    for caps in TAG_RE.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let sigil = caps.get(2).map(|m| m.as_str());
        let (text_end, resume) = match sigil {
            Some("!" | "#" | "^" | "/") => standalone_line(template, whole.start(), whole.end())
                .filter(|(line_start, _)| *line_start >= last)
                .unwrap_or((whole.start(), whole.end())),
            _ => (whole.start(), whole.end()),
        };
        if text_end > last {
            current.push(Node::Text(template[last..text_end].to_string()));
        }
        last = resume;

        let name = caps.get(3).map(|m| m.as_str()).unwrap_or_default().to_string();

        match sigil {
            Some("!") => {}
            Some("#") | Some("^") => {
                let enclosing = std::mem::take(&mut current);
                open.push((name, sigil == Some("^"), enclosing));
            }
            Some("/") => {
                let (open_name, inverted, enclosing) =
                    open.pop().ok_or_else(|| RenderError::Orphan(name.clone()))?;
                if open_name != name {
                    return Err(RenderError::Mismatched {
                        expected: open_name,
                        found: name,
                    });
                }
                let children = std::mem::replace(&mut current, enclosing);
                current.push(Node::Section {
                    name,
                    inverted,
                    children,
                });
            }
            // `{{{x}}}`, `{{& x}}` and `{{x}}` render identically.
            _ => current.push(Node::Var(name)),
        }
    }

    if let Some((name, _, _)) = open.pop() {
        return Err(RenderError::Unclosed(name));
    }
    if last < template.len() {
        current.push(Node::Text(template[last..].to_string()));
    }
    Ok(current)
}

/// Span of the line holding the tag at `start..end`, newline included, when nothing but
/// whitespace shares that line.
fn standalone_line(template: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let line_start = template[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = template[end..]
        .find('\n')
        .map_or(template.len(), |i| end + i + 1);
    let alone = template[line_start..start].trim().is_empty()
        && template[end..line_end].trim().is_empty();
    alone.then_some((line_start, line_end))
}

fn render_nodes<'v>(nodes: &[Node], stack: &mut Vec<&'v Value>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(name) => {
                if let Some(value) = lookup(stack, name) {
                    push_value(value, out);
                }
            }
            Node::Section {
                name,
                inverted,
                children,
            } => {
                let value = lookup(stack, name);
                let truthy = value.is_some_and(is_truthy);
                if *inverted {
                    if !truthy {
                        render_nodes(children, stack, out);
                    }
                    continue;
                }
                let Some(value) = value.filter(|v| is_truthy(v)) else {
                    continue;
                };
                match value {
                    Value::Array(items) => {
                        for item in items {
                            stack.push(item);
                            render_nodes(children, stack, out);
                            stack.pop();
                        }
                    }
                    other => {
                        stack.push(other);
                        render_nodes(children, stack, out);
                        stack.pop();
                    }
                }
            }
        }
    }
}

/// Resolve a (possibly dotted) name against the context stack, innermost first.
fn lookup<'a>(stack: &[&'a Value], name: &str) -> Option<&'a Value> {
    if name == "." {
        return stack.last().copied();
    }
    let mut parts = name.split('.');
    let head = parts.next()?;
    let mut value = stack
        .iter()
        .rev()
        .find_map(|ctx| ctx.as_object().and_then(|obj| obj.get(head)))?;
    for part in parts {
        value = value.as_object()?.get(part)?;
    }
    Some(value)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Number(_) | Value::Object(_) => true,
    }
}

fn push_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        other => out.push_str(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_variables() {
        let out = render("Hi {{name}}, {{{raw}}} {{& amp}}!", &json!({"name": "Ann", "raw": "<b>", "amp": "&"}))
            .unwrap();
        assert_eq!(out, "Hi Ann, <b> &!");
    }

    #[test]
    fn test_render_missing_is_empty() {
        assert_eq!(render("[{{nope}}]", &json!({})).unwrap(), "[]");
    }

    #[test]
    fn test_render_does_not_escape_quotes() {
        let out = render("\"{{message}}\"", &json!({"message": "I'm \"fine\" & ok"})).unwrap();
        assert_eq!(out, "\"I'm \"fine\" & ok\"");
    }

    #[test]
    fn test_render_list_of_scalars() {
        let out = render("{{#intents}}- {{.}}\n{{/intents}}", &json!({"intents": ["a", "b"]})).unwrap();
        assert_eq!(out, "- a\n- b\n");
    }

    #[test]
    fn test_render_list_of_objects_with_optional_fields() {
        let ctx = json!({"logs": [
            {"date": "2025-01-08", "weight": "70kg"},
            {"date": "2025-01-07", "meal": "salad"}
        ]});
        let tpl = "{{#logs}}{{date}}:{{#weight}} w={{weight}}{{/weight}}{{#meal}} m={{meal}}{{/meal}};{{/logs}}";
        assert_eq!(render(tpl, &ctx).unwrap(), "2025-01-08: w=70kg;2025-01-07: m=salad;");
    }

    #[test]
    fn test_render_inverted_section() {
        let tpl = "{{#logs}}x{{/logs}}{{^logs}}none{{/logs}}";
        assert_eq!(render(tpl, &json!({"logs": []})).unwrap(), "none");
        assert_eq!(render(tpl, &json!({"logs": [1]})).unwrap(), "x");
    }

    #[test]
    fn test_render_outer_scope_visible_in_section() {
        let tpl = "{{#items}}{{prefix}}{{.}} {{/items}}";
        assert_eq!(render(tpl, &json!({"prefix": "#", "items": [1, 2]})).unwrap(), "#1 #2 ");
    }

    #[test]
    fn test_render_dotted_and_comment() {
        let out = render("{{! ignored }}{{user.name}}", &json!({"user": {"name": "Bo"}})).unwrap();
        assert_eq!(out, "Bo");
    }

    #[test]
    fn test_render_multiline_comment() {
        let out = render("A{{! multi\nline }}B", &json!({})).unwrap();
        assert_eq!(out, "AB");
    }

    #[test]
    fn test_standalone_tags_leave_no_blank_lines() {
        let tpl = "Logs:\n{{#logs}}\n- {{.}}\n{{/logs}}\n{{^logs}}\nnone\n{{/logs}}\n  {{! note }}\nEnd";
        assert_eq!(
            render(tpl, &json!({"logs": ["d1", "d2"]})).unwrap(),
            "Logs:\n- d1\n- d2\nEnd"
        );
        assert_eq!(render(tpl, &json!({"logs": []})).unwrap(), "Logs:\nnone\nEnd");
    }

    #[test]
    fn test_inline_section_keeps_surrounding_text() {
        let tpl = "- {{#w}}w={{w}}{{/w}}\nnext";
        assert_eq!(render(tpl, &json!({"w": "70kg"})).unwrap(), "- w=70kg\nnext");
        assert_eq!(render(tpl, &json!({})).unwrap(), "- \nnext");
    }

    #[test]
    fn test_render_is_idempotent() {
        let tpl = "Intents: {{#intents}}{{.}},{{/intents}} Message: {{message}}";
        let ctx = json!({"intents": ["plan_meal", "chat"], "message": "I ran 5km"});
        let a = render(tpl, &ctx).unwrap();
        let b = render(tpl, &ctx).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_render_unbalanced_sections() {
        assert_eq!(
            render("{{#a}}x", &json!({})),
            Err(RenderError::Unclosed("a".into()))
        );
        assert_eq!(render("x{{/a}}", &json!({})), Err(RenderError::Orphan("a".into())));
        assert!(matches!(
            render("{{#a}}{{/b}}", &json!({})),
            Err(RenderError::Mismatched { .. })
        ));
    }
}
