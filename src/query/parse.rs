//! Textual query form: `identifier("Stack") > static_text("Name")`.

use std::sync::LazyLock;

use regex::Regex;

use super::{ElementQuery, Role};
use crate::error::{Result, UiwrightError};

static STEP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s*([A-Za-z_]+)\s*(?:\(\s*"((?:[^"\\]|\\.)*)"\s*\))?\s*(>|$)"#)
        .expect("step pattern is valid")
});

pub(super) fn parse_query(input: &str) -> Result<ElementQuery> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == "root" {
        return Ok(ElementQuery::root());
    }

    let mut query = ElementQuery::root();
    let mut pos = 0;
    while pos < trimmed.len() {
        let caps = STEP
            .captures_at(trimmed, pos)
            .filter(|caps| caps.get(0).is_some_and(|m| m.start() == pos))
            .ok_or_else(|| {
                UiwrightError::InvalidQuery(format!(
                    "unexpected input at offset {pos}: '{}'",
                    &trimmed[pos..]
                ))
            })?;

        let role: Role = caps[1].parse()?;
        let id = caps.get(2).map(|m| unescape(m.as_str()));
        query = query.step(role, id.as_deref()).map_err(|e| match e {
            UiwrightError::Usage(msg) => UiwrightError::InvalidQuery(msg),
            other => other,
        })?;

        let end = caps.get(0).map_or(trimmed.len(), |m| m.end());
        if &caps[3] == ">" && end >= trimmed.len() {
            return Err(UiwrightError::InvalidQuery(
                "query ends with a dangling '>'".to_string(),
            ));
        }
        pos = end;
    }

    Ok(query)
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_display() {
        let query = ElementQuery::root()
            .identifier("CapitalView.PopulationStack")
            .static_text("Population: 21,542,000");
        let parsed: ElementQuery = query.to_string().parse().unwrap();
        assert_eq!(parsed, query);
    }

    #[test]
    fn test_parse_all_of_role_and_escapes() {
        let parsed: ElementQuery = r#"keyboard > button("a \"b\" \\ c")"#.parse().unwrap();
        assert_eq!(parsed, ElementQuery::root().keyboards().button(r#"a "b" \ c"#));
    }

    #[test]
    fn test_parse_id_containing_separator() {
        let parsed: ElementQuery = r#"static_text("a > b")"#.parse().unwrap();
        assert_eq!(parsed, ElementQuery::root().static_text("a > b"));
    }

    #[test]
    fn test_parse_identifier_then_role() {
        let parsed: ElementQuery = r#"identifier("List") > button("Back")"#.parse().unwrap();
        assert_eq!(parsed, ElementQuery::root().identifier("List").button("Back"));
        assert!(r#"other("List")"#.parse::<ElementQuery>().is_err());
    }

    #[test]
    fn test_parse_root() {
        assert!("root".parse::<ElementQuery>().unwrap().is_empty());
        assert!("  ".parse::<ElementQuery>().unwrap().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!("button >".parse::<ElementQuery>().is_err());
        assert!("widget(\"x\")".parse::<ElementQuery>().is_err());
        assert!("identifier".parse::<ElementQuery>().is_err());
        assert!("button(\"x\") cell".parse::<ElementQuery>().is_err());
    }
}
