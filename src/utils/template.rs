//! Missing-key tolerant `{name}` templates
//!
//! Remarks and addresses of proxy hosts are user-authored strings such as
//! `"{SERVER} - {USERNAME}"`. Expansion never fails on an unknown variable:
//! the placeholder is echoed back verbatim. Only malformed brace syntax is
//! an error, and it is caught by [`validate`] before a template is stored.
//!
//! Syntax:
//! * `{name}` is a placeholder; `name` is the verbatim text between the braces
//!   and must be non-empty, so `{}` is malformed
//! * there are no positional fields or format specs: `{0}` is the placeholder
//!   named `0` and `{a:>4}` the one named `a:>4`
//! * `{{` and `}}` produce a literal `{` and `}`
//! * any other `{` or `}` is malformed

use std::borrow::Cow;
use std::collections::HashMap;

use thiserror::Error;

/// Failure to parse a template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("malformed template at byte {offset}: {reason}")]
    MalformedTemplate { offset: usize, reason: &'static str },
}

fn malformed(offset: usize, reason: &'static str) -> TemplateError {
    TemplateError::MalformedTemplate { offset, reason }
}

/// Variable bindings whose lookup falls back to echoing the placeholder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatVariables(HashMap<String, String>);

impl FormatVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Bound value of `name`, or the literal `{name}` when unbound
    pub fn resolve<'a>(&'a self, name: &str) -> Cow<'a, str> {
        match self.0.get(name) {
            Some(value) => Cow::Borrowed(value.as_str()),
            None => Cow::Owned(format!("{{{}}}", name)),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, String>> for FormatVariables {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormatVariables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

// Braces are ASCII, so every slice boundary below is a char boundary.
fn parse(template: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    let bytes = template.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                if literal_start < i {
                    segments.push(Segment::Literal(&template[literal_start..i]));
                }
                if bytes.get(i + 1) == Some(&b'{') {
                    segments.push(Segment::Literal(&template[i..i + 1]));
                    i += 2;
                } else {
                    let rest = &bytes[i + 1..];
                    match rest.iter().position(|&b| b == b'{' || b == b'}') {
                        Some(n) if rest[n] == b'}' => {
                            if n == 0 {
                                return Err(malformed(i, "empty placeholder name"));
                            }
                            segments.push(Segment::Placeholder(&template[i + 1..i + 1 + n]));
                            i += n + 2;
                        }
                        Some(n) => {
                            return Err(malformed(i + 1 + n, "unexpected '{' in placeholder name"))
                        }
                        None => return Err(malformed(i, "unterminated placeholder")),
                    }
                }
                literal_start = i;
            }
            b'}' => {
                if bytes.get(i + 1) != Some(&b'}') {
                    return Err(malformed(i, "single '}' encountered"));
                }
                if literal_start < i {
                    segments.push(Segment::Literal(&template[literal_start..i]));
                }
                segments.push(Segment::Literal(&template[i..i + 1]));
                i += 2;
                literal_start = i;
            }
            _ => i += 1,
        }
    }

    if literal_start < bytes.len() {
        segments.push(Segment::Literal(&template[literal_start..]));
    }
    Ok(segments)
}

/// Expand a template against a set of variables
///
/// # Arguments
///
/// * `template` - The template string
/// * `variables` - Bindings for placeholder names
///
/// # Returns
///
/// The expanded string; unbound placeholders are kept as `{name}`
pub fn expand(template: &str, variables: &FormatVariables) -> Result<String, TemplateError> {
    let segments = parse(template)?;
    let mut out = String::with_capacity(template.len());
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(name) => out.push_str(&variables.resolve(name)),
        }
    }
    Ok(out)
}

/// Check that a template parses, without substituting anything
pub fn validate(template: &str) -> Result<(), TemplateError> {
    expand(template, &FormatVariables::new()).map(|_| ())
}

/// Distinct placeholder names in order of first appearance
pub fn placeholders(template: &str) -> Result<Vec<&str>, TemplateError> {
    let mut names: Vec<&str> = Vec::new();
    for segment in parse(template)? {
        if let Segment::Placeholder(name) = segment {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> FormatVariables {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_unbound_placeholder_echoes() {
        assert_eq!(
            expand("Hello {name}!", &FormatVariables::new()).unwrap(),
            "Hello {name}!"
        );
    }

    #[test]
    fn test_bound_placeholder_substitutes() {
        assert_eq!(
            expand("Hello {name}!", &vars(&[("name", "World")])).unwrap(),
            "Hello World!"
        );
    }

    #[test]
    fn test_mixed_bound_and_unbound() {
        let out = expand("{server} – {unknown}", &vars(&[("server", "EU-1")])).unwrap();
        assert_eq!(out, "EU-1 – {unknown}");
    }

    #[test]
    fn test_escaped_braces() {
        assert_eq!(
            expand("{{literal}} {x}", &vars(&[("x", "1")])).unwrap(),
            "{literal} 1"
        );
        assert_eq!(expand("}}{{", &FormatVariables::new()).unwrap(), "}{");
    }

    #[test]
    fn test_values_are_not_reexpanded() {
        let out = expand("{a}", &vars(&[("a", "{b}"), ("b", "nope")])).unwrap();
        assert_eq!(out, "{b}");
    }

    #[test]
    fn test_validate() {
        assert!(validate("no placeholders here").is_ok());
        assert!(validate("").is_ok());
        assert!(validate("{a}{b} {c}").is_ok());

        assert_eq!(
            validate("prefix {unterminated"),
            Err(TemplateError::MalformedTemplate {
                offset: 7,
                reason: "unterminated placeholder"
            })
        );
        assert!(validate("stray } brace").is_err());
        assert!(validate("empty {}").is_err());
        assert!(validate("{a{b}}").is_err());
        assert!(validate("{").is_err());
        assert!(validate("}").is_err());
    }

    #[test]
    fn test_numeric_names_are_named_placeholders() {
        assert_eq!(expand("{0}", &FormatVariables::new()).unwrap(), "{0}");
        assert_eq!(expand("{0}-{1}", &vars(&[("0", "x")])).unwrap(), "x-{1}");
        assert_eq!(expand("{a:>4}", &vars(&[("a:>4", "y")])).unwrap(), "y");
    }

    #[test]
    fn test_multibyte_text() {
        let out = expand("🇩🇪 {name} ✓", &vars(&[("name", "Frankfurt")])).unwrap();
        assert_eq!(out, "🇩🇪 Frankfurt ✓");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            placeholders("{a} {b} {a} {{c}}").unwrap(),
            vec!["a", "b"]
        );
        assert!(placeholders("{").is_err());
    }

    #[test]
    fn test_resolve() {
        let v = vars(&[("k", "v")]);
        assert_eq!(v.resolve("k"), "v");
        assert_eq!(v.resolve("missing"), "{missing}");
        assert_eq!(v.get("missing"), None);
    }
}
