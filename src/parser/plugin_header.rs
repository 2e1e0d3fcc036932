//! Plugin main file header parser
//!
//! Reads the metadata block at the top of a plugin's main file.
//!
//! Format example:
//! ```text
//! <?php
//! /**
//!  * Plugin Name: Acme Tool
//!  * Version: 2.3.0
//!  * Author: Acme
//!  * Requires PHP: 7.4
//!  */
//! ```
//!
//! Only the first 8 KiB of the file are scanned, and the first occurrence of
//! each field wins.

use regex::Regex;

/// Number of bytes scanned for header fields
pub const HEADER_SCAN_BYTES: usize = 8 * 1024;

/// Header fields of a plugin main file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginHeader {
    pub name: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub author_uri: Option<String>,
    pub requires_php: Option<String>,
    pub requires_at_least: Option<String>,
}

/// Parser for plugin main file headers
pub struct PluginHeaderParser {
    /// Regex for a header line: `<prefix>Field Name: value`
    field_re: Regex,
    /// Regex for a trailing comment close or PHP close tag after the value
    trailing_close_re: Regex,
}

impl PluginHeaderParser {
    pub fn new() -> Self {
        Self {
            // Match: [<?php] [ \t/*#@]* Field: value
            field_re: Regex::new(
                r"(?mi)^(?:[ \t]*<\?php)?[ \t/*#@]*(Plugin Name|Version|Author URI|Author|Requires PHP|Requires at least):(.*)$",
            )
            .unwrap(),
            // Match: */ or ?> and everything after it
            trailing_close_re: Regex::new(r"\s*(?:\*/|\?>).*").unwrap(),
        }
    }

    /// Parse header fields from the beginning of `content`
    pub fn parse(&self, content: &str) -> PluginHeader {
        let content = truncate_to_char_boundary(content, HEADER_SCAN_BYTES);
        let mut header = PluginHeader::default();

        for caps in self.field_re.captures_iter(content) {
            let (Some(field), Some(value)) = (caps.get(1), caps.get(2)) else {
                continue;
            };

            let value = self.clean_value(value.as_str());
            if value.is_empty() {
                continue;
            }

            let slot = match field.as_str().to_ascii_lowercase().as_str() {
                "plugin name" => &mut header.name,
                "version" => &mut header.version,
                "author" => &mut header.author,
                "author uri" => &mut header.author_uri,
                "requires php" => &mut header.requires_php,
                "requires at least" => &mut header.requires_at_least,
                _ => continue,
            };

            if slot.is_none() {
                *slot = Some(value);
            }
        }

        header
    }

    fn clean_value(&self, value: &str) -> String {
        self.trailing_close_re.replace(value, "").trim().to_string()
    }
}

impl Default for PluginHeaderParser {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate_to_char_boundary(content: &str, max_bytes: usize) -> &str {
    if content.len() <= max_bytes {
        return content;
    }

    let mut end = max_bytes;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}
