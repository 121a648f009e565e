use crate::domain::model::FieldMap;
use crate::utils::error::{LabelError, Result};
use regex::Regex;
use std::sync::LazyLock;

// `{{` / `}}` 為跳脫的大括號，`{Name}` 為佔位符，其餘單獨的大括號視為錯誤
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|\{|\}").expect("valid token pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// 以 `{FieldName}` 為佔位符的標籤模板，整個批次只解析一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(text: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        for caps in TOKEN.captures_iter(text) {
            let m = caps.get(0).expect("group 0 always participates");
            literal.push_str(&text[last..m.start()]);
            last = m.end();

            match m.as_str() {
                "{{" => literal.push('{'),
                "}}" => literal.push('}'),
                "{" | "}" => {
                    return Err(LabelError::template(format!(
                        "unmatched '{}' at byte {}",
                        m.as_str(),
                        m.start()
                    )));
                }
                _ => {
                    let name = caps.get(1).map(|g| g.as_str()).unwrap_or_default();
                    if name.is_empty() {
                        return Err(LabelError::template(format!(
                            "empty placeholder at byte {}",
                            m.start()
                        )));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name.to_string()));
                }
            }
        }

        literal.push_str(&text[last..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// 依首次出現順序列出不重複的佔位符名稱
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn missing_fields(&self, fields: &FieldMap) -> Vec<&str> {
        self.placeholders()
            .into_iter()
            .filter(|name| !fields.contains_key(*name))
            .collect()
    }

    pub fn render(&self, fields: &FieldMap) -> Result<String> {
        if let Some(field) = self.missing_fields(fields).first() {
            return Err(LabelError::MissingField {
                field: field.to_string(),
            });
        }

        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Placeholder(name) => {
                    if let Some(value) = fields.get(name) {
                        output.push_str(value);
                    }
                }
            }
        }
        Ok(output)
    }
}
