//! z88dk-style assembler source builder.
//!
//! Produces the directives used by the page descriptors: `SECTION`,
//! `PUBLIC`, labels, `db` literal rows and `incbin`.

use std::fmt::Write;

/// Format a byte as a `0x`-prefixed two-digit hex literal.
pub fn format_byte(value: u8) -> String {
    format!("0x{:02x}", value)
}

/// In-memory assembler source.
#[derive(Debug, Default, Clone)]
pub struct AsmSource {
    text: String,
}

impl AsmSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Section header followed by an optional export list.
    pub fn header(&mut self, section: &str, publics: &[String]) -> &mut Self {
        let _ = write!(self.text, "\tSECTION {}\n\n", section);
        if !publics.is_empty() {
            let _ = write!(self.text, "\tPUBLIC {}\n\n", publics.join(", "));
        }
        self
    }

    pub fn label(&mut self, label: &str) -> &mut Self {
        let _ = writeln!(self.text, "{}:", label);
        self
    }

    /// A single `db` row.
    pub fn db(&mut self, row: &[u8]) -> &mut Self {
        let literals: Vec<String> = row.iter().map(|b| format_byte(*b)).collect();
        let _ = writeln!(self.text, "\tdb {}", literals.join(", "));
        self
    }

    /// Binary include followed by a blank line.
    pub fn incbin(&mut self, path: &str) -> &mut Self {
        let _ = write!(self.text, "\tincbin \"{}\"\n\n", path);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}
