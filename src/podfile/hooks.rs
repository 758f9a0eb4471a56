//! Lifecycle-hook normalization
//!
//! CocoaPods allows only one `pre_install`/`post_install` block per Podfile,
//! but every contributing source may declare its own. When more than one
//! block of a name exists, each is rewritten into a numbered function
//! (`post_install1`, `post_install2`, …) keeping its original block
//! parameter, and a single dispatcher block of the original name is appended
//! that calls them in encounter order. A single block is left untouched.
//!
//! The transform works over the fixed hook grammar (header, optional `|param|`,
//! body closed by a matching `end`), not general Ruby. It is reversible:
//! [`denormalize`] recognizes the numbered functions and the dispatcher and
//! restores the original blocks, which is what keeps repeated merges
//! byte-identical.

use regex_lite::Regex;

/// Hook names subject to normalization
pub const HOOK_NAMES: &[&str] = &["pre_install", "post_install"];

/// One lifecycle-hook declaration found while scanning a Podfile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookBlock {
    /// Hook name (`pre_install`, `post_install`)
    pub hook_name: String,

    /// Block parameter name, if the block declared one
    pub block_param: Option<String>,

    /// Body lines between header and closing `end`, verbatim
    pub body: String,
}

/// A scanned block with its line span (header line ..= closing `end` line)
#[derive(Debug, Clone)]
struct ScannedBlock {
    header_line: usize,
    end_line: usize,
    block: HookBlock,
}

fn hook_header_regex(hook_name: &str) -> Regex {
    Regex::new(&format!(
        r"^(\s*){hook_name}\s+do(\s*\|\s*(\w+)\s*\|)?\s*$"
    ))
    .expect("hook header regex")
}

fn numbered_def_regex(hook_name: &str) -> Regex {
    Regex::new(&format!(r"^(\s*)def\s+{hook_name}(\d+)(?:\((\w+)\))?\s*$")).expect("def regex")
}

/// Does this line open a nested block the scanner must balance?
fn opens_block(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return false;
    }
    if trimmed == "begin" {
        return true;
    }
    for keyword in ["def ", "if ", "unless ", "case ", "while ", "until ", "for "] {
        if trimmed.starts_with(keyword) {
            return true;
        }
    }
    let do_tail = Regex::new(r"(^|\s)do(\s*\|[^|]*\|)?\s*$").expect("do regex");
    do_tail.is_match(trimmed)
}

fn closes_block(line: &str) -> bool {
    line.trim() == "end"
}

/// Find every block of `hook_name`, in encounter order.
fn scan(lines: &[&str], hook_name: &str) -> Vec<ScannedBlock> {
    let header = hook_header_regex(hook_name);
    let mut blocks = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let Some(captures) = header.captures(lines[i]) else {
            i += 1;
            continue;
        };
        let block_param = captures.get(3).map(|m| m.as_str().to_string());

        // Balance nested do/def blocks until this block's own end
        let mut depth = 1usize;
        let mut j = i + 1;
        while j < lines.len() && depth > 0 {
            if opens_block(lines[j]) {
                depth += 1;
            } else if closes_block(lines[j]) {
                depth -= 1;
            }
            if depth == 0 {
                break;
            }
            j += 1;
        }
        if j >= lines.len() {
            // Unterminated block; leave the rest untouched
            break;
        }

        blocks.push(ScannedBlock {
            header_line: i,
            end_line: j,
            block: HookBlock {
                hook_name: hook_name.to_string(),
                block_param,
                body: lines[i + 1..j].join("\n"),
            },
        });
        i = j + 1;
    }
    blocks
}

/// Scan a Podfile for hook blocks of one name.
pub fn scan_hooks(content: &str, hook_name: &str) -> Vec<HookBlock> {
    let lines: Vec<&str> = content.lines().collect();
    scan(&lines, hook_name).into_iter().map(|s| s.block).collect()
}

/// Normalize all known hooks in a Podfile.
pub fn normalize(content: &str) -> String {
    let mut merged = content.to_string();
    for hook_name in HOOK_NAMES {
        merged = normalize_hook(&merged, hook_name);
    }
    merged
}

fn normalize_hook(content: &str, hook_name: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let blocks = scan(&lines, hook_name);
    if blocks.len() <= 1 {
        // Single occurrence stays untouched, no renaming
        return content.to_string();
    }

    // Counter is local to this invocation; after a denormalize pass the
    // numbering always starts from 1.
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + blocks.len() + 3);
    let mut calls: Vec<(String, bool)> = Vec::new();
    let mut blocks_iter = blocks.iter().peekable();

    for (i, line) in lines.iter().enumerate() {
        match blocks_iter.peek() {
            Some(scanned) if scanned.header_line == i => {
                let function_name = format!("{hook_name}{}", calls.len() + 1);
                let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
                out.push(match &scanned.block.block_param {
                    Some(param) => format!("{indent}def {function_name}({param})"),
                    None => format!("{indent}def {function_name}"),
                });
                calls.push((function_name, scanned.block.block_param.is_some()));
                blocks_iter.next();
            }
            _ => out.push((*line).to_string()),
        }
    }

    // One dispatcher of the original name, calling every numbered function in
    // encounter order, passing the parameter only to declarers
    let any_param = calls.iter().any(|(_, has_param)| *has_param);
    out.push(String::new());
    if any_param {
        out.push(format!("{hook_name} do |installer|"));
    } else {
        out.push(format!("{hook_name} do"));
    }
    for (function_name, has_param) in &calls {
        if *has_param {
            out.push(format!("  {function_name} installer"));
        } else {
            out.push(format!("  {function_name}"));
        }
    }
    out.push("end".to_string());

    let mut result = out.join("\n");
    result.push('\n');
    result
}

/// Undo a previous [`normalize`] pass: drop dispatcher blocks and restore
/// numbered functions to plain hook blocks.
pub fn denormalize(content: &str) -> String {
    let mut restored = content.to_string();
    for hook_name in HOOK_NAMES {
        restored = denormalize_hook(&restored, hook_name);
    }
    restored
}

fn denormalize_hook(content: &str, hook_name: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let call_line = Regex::new(&format!(r"^\s*{hook_name}\d+(\s+\w+)?\s*$")).expect("call regex");

    // A dispatcher is a hook block whose body is nothing but calls to
    // numbered functions of the same name
    let mut drop_ranges: Vec<(usize, usize)> = Vec::new();
    for scanned in scan(&lines, hook_name) {
        let body_lines: Vec<&str> = scanned
            .block
            .body
            .lines()
            .filter(|l| !l.trim().is_empty())
            .collect();
        if !body_lines.is_empty() && body_lines.iter().all(|l| call_line.is_match(l)) {
            let mut start = scanned.header_line;
            // Also drop the separator blank line normalize() inserted
            if start > 0 && lines[start - 1].trim().is_empty() {
                start -= 1;
            }
            drop_ranges.push((start, scanned.end_line));
        }
    }

    let def_header = numbered_def_regex(hook_name);
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if drop_ranges.iter().any(|&(start, end)| i >= start && i <= end) {
            continue;
        }
        if let Some(captures) = def_header.captures(line) {
            let indent = captures.get(1).map(|m| m.as_str()).unwrap_or("");
            out.push(match captures.get(3) {
                Some(param) => format!("{indent}{hook_name} do |{}|", param.as_str()),
                None => format!("{indent}{hook_name} do"),
            });
            continue;
        }
        out.push((*line).to_string());
    }

    let mut result = out.join("\n");
    result.push('\n');
    result
}
