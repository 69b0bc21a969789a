use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

const DELIMITER: &str = "---";

/// Parsed front-matter header. Keys keep their on-disk spelling
/// (`allowed-tools`, `disallowedTools`, ...).
pub type Frontmatter = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    pub frontmatter: Frontmatter,
    pub body: String,
}

impl ParsedDocument {
    pub fn has_frontmatter(&self) -> bool {
        !self.frontmatter.is_empty()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.frontmatter.get(key).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.frontmatter.get(key)
    }

    /// Deserialize the header into a typed front-matter struct.
    pub fn deserialize<F: DeserializeOwned>(&self) -> crate::Result<F> {
        serde_json::from_value(Value::Object(self.frontmatter.clone()))
            .map_err(|e| crate::Error::Parse(format!("Invalid frontmatter: {}", e)))
    }
}

/// Split a markdown document into its YAML header and body.
///
/// Never fails: a document without a leading `---` line, without a closing
/// `---` line, or whose header is not a YAML mapping comes back with an empty
/// header and the whole input as body.
pub fn parse_frontmatter(content: &str) -> ParsedDocument {
    let Some((header, body)) = split_document(content) else {
        return ParsedDocument {
            frontmatter: Frontmatter::new(),
            body: content.to_string(),
        };
    };

    match parse_header(header) {
        Ok(frontmatter) => ParsedDocument {
            frontmatter,
            body: body.to_string(),
        },
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring malformed frontmatter");
            ParsedDocument {
                frontmatter: Frontmatter::new(),
                body: content.to_string(),
            }
        }
    }
}

fn split_document(content: &str) -> Option<(&str, &str)> {
    let (first, rest) = content.split_once('\n')?;
    if first.trim_end() != DELIMITER {
        return None;
    }

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    None
}

fn parse_header(header: &str) -> crate::Result<Frontmatter> {
    if header.trim().is_empty() {
        return Ok(Frontmatter::new());
    }

    let yaml: serde_yaml_ng::Value = serde_yaml_ng::from_str(header)?;
    match serde_json::to_value(&yaml)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Frontmatter::new()),
        other => Err(crate::Error::Parse(format!(
            "Frontmatter must be a mapping, found {}",
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
