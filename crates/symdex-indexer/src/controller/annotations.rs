//! Doc block reading for controller methods
//!
//! Handles the two tag shapes the analyzer cares about: typed parameter tags
//! (`@param string $view`) and Doctrine-style annotations with an argument
//! list (`@Route("/blog/{id}", name="blog_show")`).

/// Modifier keywords allowed between a doc block and the declaration it documents
const MODIFIERS: &[&str] = &[
    "public", "protected", "private", "static", "final", "abstract", "readonly",
];

/// A single `@tag` of a doc block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTag {
    /// Tag name without the `@` (`param`, `Route`, `Sensio\...\Template`)
    pub name: String,
    /// Everything after the name, continuation lines joined with a space
    pub value: String,
}

impl DocTag {
    /// Last segment of a namespaced annotation name
    pub fn short_name(&self) -> &str {
        self.name.rsplit('\\').next().unwrap_or(&self.name)
    }

    pub fn is(&self, name: &str) -> bool {
        self.short_name().eq_ignore_ascii_case(name)
    }

    /// `(type, $variable)` for a tag naming exactly one type and a variable
    ///
    /// Union types (`string|null`) name more than one type and yield `None`.
    pub fn typed_variable(&self) -> Option<(&str, &str)> {
        let mut words = self.value.split_whitespace();
        let first = words.next()?;
        if first.starts_with('$') {
            return None;
        }
        let variable = words.next()?;
        if !variable.starts_with('$') || variable.len() < 2 {
            return None;
        }
        if first.contains('|') || first.contains('&') {
            return None;
        }
        Some((first, variable))
    }

    /// Argument list of an annotation, if the tag carries one
    pub fn arguments(&self) -> Option<AnnotationArguments> {
        let value = self.value.trim_start();
        let inner = value.strip_prefix('(')?;
        let close = matching_paren(inner)?;
        Some(AnnotationArguments::parse(&inner[..close]))
    }
}

/// Arguments of `@Name(...)`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationArguments {
    pub positional: Vec<String>,
    pub named: Vec<(String, String)>,
}

impl AnnotationArguments {
    fn parse(text: &str) -> Self {
        let mut args = Self::default();
        for part in split_top_level(text) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match split_named(part) {
                Some((key, value)) => args.named.push((key.to_string(), unquote(value))),
                None => args.positional.push(unquote(part)),
            }
        }
        args
    }

    /// First positional argument (`@Template("...")`), or the `value` key
    pub fn value(&self) -> Option<&str> {
        self.positional
            .first()
            .map(String::as_str)
            .or_else(|| self.named("value"))
    }

    pub fn named(&self, key: &str) -> Option<&str> {
        self.named
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// The doc block directly preceding `offset`, if any
///
/// Only whitespace, attributes and modifier keywords may separate the block
/// from the declaration.
pub fn doc_comment_before(source: &str, offset: usize) -> Option<&str> {
    let before = source.get(..offset)?;
    let doc_end = before.rfind("*/")?;
    let doc_start = before[..doc_end].rfind("/**")?;
    // The closest `*/` must end the doc block itself, not a later plain comment
    if before[doc_start + 3..doc_end].contains("*/") {
        return None;
    }

    let between = before[doc_end + 2..].trim();
    if between.is_empty() || between.starts_with('#') || only_modifiers(between) {
        return Some(&source[doc_start..doc_end + 2]);
    }
    None
}

fn only_modifiers(text: &str) -> bool {
    text.split_whitespace()
        .all(|word| MODIFIERS.iter().any(|m| m.eq_ignore_ascii_case(word)))
}

/// Split a doc block into its tags
pub fn parse_doc_block(doc: &str) -> Vec<DocTag> {
    let body = doc
        .trim()
        .trim_start_matches("/**")
        .trim_end_matches("*/");

    let mut tags: Vec<DocTag> = Vec::new();
    for line in body.lines() {
        let line = line.trim().trim_start_matches('*').trim();

        if let Some(rest) = line.strip_prefix('@') {
            let name_end = rest
                .find(|c: char| c.is_whitespace() || c == '(')
                .unwrap_or(rest.len());
            let name = &rest[..name_end];
            if name.is_empty() {
                continue;
            }
            tags.push(DocTag {
                name: name.to_string(),
                value: rest[name_end..].trim().to_string(),
            });
            continue;
        }

        // Multi-line annotation arguments
        if let Some(last) = tags.last_mut() {
            if !line.is_empty() && open_parens(&last.value) > 0 {
                last.value.push(' ');
                last.value.push_str(line);
            }
        }
    }
    tags
}

fn open_parens(text: &str) -> i32 {
    let mut depth = 0;
    let mut quote: Option<char> = None;
    for c in text.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth -= 1,
            _ => {}
        }
    }
    depth
}

/// Index of the `)` closing an already opened parenthesis
fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 1;
    let mut quote: Option<char> = None;
    for (index, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '(') | (None, '{') => depth += 1,
            (None, '}') => depth -= 1,
            (None, ')') => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas outside quotes, braces and parentheses
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (index, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '(') | (None, '{') | (None, '[') => depth += 1,
            (None, ')') | (None, '}') | (None, ']') => depth -= 1,
            (None, ',') if depth == 0 => {
                parts.push(&text[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// `key="value"` or `key: "value"`, with the key outside any quotes
fn split_named(part: &str) -> Option<(&str, &str)> {
    let sep = part.find(['=', ':'])?;
    let key = part[..sep].trim();
    if key.is_empty() || !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some((key, part[sep + 1..].trim()))
}

fn unquote(value: &str) -> String {
    crate::text::strip_quotes(value).to_string()
}
