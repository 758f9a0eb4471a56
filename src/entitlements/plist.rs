//! Property-list XML parsing and printing
//!
//! Parses into fully owned [`PlistValue`] trees via `roxmltree`; a malformed
//! document is a descriptive error carrying the file path and position.
//! Printing emits the standard Xcode plist header with tab indentation.

use std::collections::BTreeMap;

use super::EntitlementsError;

/// Top-level dictionary of a plist document
pub type PlistDict = BTreeMap<String, PlistValue>;

/// One plist value
#[derive(Debug, Clone, PartialEq)]
pub enum PlistValue {
    String(String),
    Bool(bool),
    Integer(i64),
    Real(f64),
    /// Base64 payload carried through verbatim
    Data(String),
    Array(Vec<PlistValue>),
    Dict(PlistDict),
}

/// Parse a plist document into its top-level dictionary.
///
/// `path` only labels errors; the content is passed in by the caller.
pub fn parse_dict(path: &str, content: &str) -> Result<PlistDict, EntitlementsError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(content, options).map_err(|e| {
        EntitlementsError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        }
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "plist" {
        return Err(parse_error(path, &doc, &root, "expected <plist> root element"));
    }

    let Some(top) = root.children().find(|n| n.is_element()) else {
        return Ok(PlistDict::new());
    };
    if top.tag_name().name() != "dict" {
        return Err(parse_error(path, &doc, &top, "expected <dict> under <plist>"));
    }

    parse_dict_node(path, &doc, &top)
}

fn parse_error(
    path: &str,
    doc: &roxmltree::Document<'_>,
    node: &roxmltree::Node<'_, '_>,
    message: &str,
) -> EntitlementsError {
    let pos = doc.text_pos_at(node.range().start);
    EntitlementsError::Parse {
        path: path.to_string(),
        message: format!("{message} at {}:{}", pos.row, pos.col),
    }
}

fn parse_dict_node(
    path: &str,
    doc: &roxmltree::Document<'_>,
    node: &roxmltree::Node<'_, '_>,
) -> Result<PlistDict, EntitlementsError> {
    let mut dict = PlistDict::new();
    let mut children = node.children().filter(|n| n.is_element());

    while let Some(key_node) = children.next() {
        if key_node.tag_name().name() != "key" {
            return Err(parse_error(path, doc, &key_node, "expected <key> in <dict>"));
        }
        let key = key_node.text().unwrap_or("").to_string();
        let Some(value_node) = children.next() else {
            return Err(parse_error(path, doc, &key_node, "<key> without a value"));
        };
        dict.insert(key, parse_value_node(path, doc, &value_node)?);
    }
    Ok(dict)
}

fn parse_value_node(
    path: &str,
    doc: &roxmltree::Document<'_>,
    node: &roxmltree::Node<'_, '_>,
) -> Result<PlistValue, EntitlementsError> {
    let text = || node.text().unwrap_or("").trim().to_string();
    match node.tag_name().name() {
        "string" => Ok(PlistValue::String(node.text().unwrap_or("").to_string())),
        "true" => Ok(PlistValue::Bool(true)),
        "false" => Ok(PlistValue::Bool(false)),
        "integer" => text()
            .parse()
            .map(PlistValue::Integer)
            .map_err(|_| parse_error(path, doc, node, "invalid <integer>")),
        "real" => text()
            .parse()
            .map(PlistValue::Real)
            .map_err(|_| parse_error(path, doc, node, "invalid <real>")),
        "data" => Ok(PlistValue::Data(text())),
        "array" => {
            let mut items = Vec::new();
            for child in node.children().filter(|n| n.is_element()) {
                items.push(parse_value_node(path, doc, &child)?);
            }
            Ok(PlistValue::Array(items))
        }
        "dict" => Ok(PlistValue::Dict(parse_dict_node(path, doc, node)?)),
        other => Err(parse_error(path, doc, node, &format!("unsupported plist element <{other}>"))),
    }
}

/// Print a top-level dictionary as a full plist document
pub fn print_document(dict: &PlistDict) -> String {
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
         <plist version=\"1.0\">\n",
    );
    print_dict(dict, 0, &mut out);
    out.push_str("</plist>\n");
    out
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push('\t');
    }
}

fn print_dict(dict: &PlistDict, depth: usize, out: &mut String) {
    indent(depth, out);
    if dict.is_empty() {
        out.push_str("<dict/>\n");
        return;
    }
    out.push_str("<dict>\n");
    for (key, value) in dict {
        indent(depth + 1, out);
        out.push_str("<key>");
        out.push_str(&escape(key));
        out.push_str("</key>\n");
        print_value(value, depth + 1, out);
    }
    indent(depth, out);
    out.push_str("</dict>\n");
}

fn print_value(value: &PlistValue, depth: usize, out: &mut String) {
    match value {
        PlistValue::String(s) => {
            indent(depth, out);
            out.push_str("<string>");
            out.push_str(&escape(s));
            out.push_str("</string>\n");
        }
        PlistValue::Bool(true) => {
            indent(depth, out);
            out.push_str("<true/>\n");
        }
        PlistValue::Bool(false) => {
            indent(depth, out);
            out.push_str("<false/>\n");
        }
        PlistValue::Integer(i) => {
            indent(depth, out);
            out.push_str(&format!("<integer>{i}</integer>\n"));
        }
        PlistValue::Real(r) => {
            indent(depth, out);
            out.push_str(&format!("<real>{r}</real>\n"));
        }
        PlistValue::Data(d) => {
            indent(depth, out);
            out.push_str(&format!("<data>{d}</data>\n"));
        }
        PlistValue::Array(items) => {
            indent(depth, out);
            if items.is_empty() {
                out.push_str("<array/>\n");
                return;
            }
            out.push_str("<array>\n");
            for item in items {
                print_value(item, depth + 1, out);
            }
            indent(depth, out);
            out.push_str("</array>\n");
        }
        PlistValue::Dict(dict) => print_dict(dict, depth, out),
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
