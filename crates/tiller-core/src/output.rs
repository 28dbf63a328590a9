//! Line buffer for emitted code.

use std::collections::HashSet;

/// Collects emitted lines at the current indentation depth, plus imports
/// and helper snippets that are placed at the top of the file by
/// [`OutputAssembler::finish`].
#[derive(Debug, Default)]
pub struct OutputAssembler {
    lines: Vec<String>,
    depth: usize,
    imports: Vec<String>,
    helpers: Vec<String>,
}

impl OutputAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Append one line at the current depth.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let mut line = "\t".repeat(self.depth);
        line.push_str(text.as_ref());
        self.lines.push(line);
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Position marker for [`OutputAssembler::has_code_since`].
    pub fn mark(&self) -> usize {
        self.lines.len()
    }

    /// Whether any line other than a blank or a comment was written after `mark`.
    pub fn has_code_since(&self, mark: usize) -> bool {
        self.lines[mark.min(self.lines.len())..].iter().any(|line| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
    }

    /// Queue an import line; duplicates are dropped at finalization.
    pub fn import(&mut self, line: impl Into<String>) {
        self.imports.push(line.into());
    }

    /// Queue a helper snippet (may span several lines).
    pub fn helper(&mut self, snippet: impl Into<String>) {
        self.helpers.push(snippet.into());
    }

    /// Place imports and helpers, normalize blank lines and whitespace.
    pub fn finish(self) -> String {
        let mut lines = self.lines;

        // Imports go after the last import of the leading header.
        let mut insert_at = 0;
        for (i, line) in lines.iter().enumerate() {
            let line = line.trim();
            if is_import(line) {
                insert_at = i + 1;
            } else if !line.is_empty() && !line.starts_with('#') {
                break;
            }
        }

        let mut seen: HashSet<String> = lines.iter().map(|l| l.trim().to_string()).collect();
        let mut header = Vec::new();
        for import in self.imports {
            let import = import.trim().to_string();
            if seen.insert(import.clone()) {
                header.push(import);
            }
        }
        let has_imports = insert_at > 0 || !header.is_empty();
        if has_imports {
            header.push(String::new());
        }

        let mut seen_helpers = HashSet::new();
        for helper in self.helpers {
            let helper = helper.trim_end().to_string();
            if helper.is_empty() || !seen_helpers.insert(helper.clone()) {
                continue;
            }
            header.extend(helper.lines().map(str::to_string));
            header.push(String::new());
        }

        lines.splice(insert_at..insert_at, header);

        let mut out = String::new();
        let mut pending_blank = false;
        for line in &lines {
            let line = line.trim_end();
            if line.is_empty() {
                pending_blank = !out.is_empty();
                continue;
            }
            if pending_blank {
                out.push('\n');
                pending_blank = false;
            }
            out.push_str(line);
            out.push('\n');
        }
        if out.is_empty() {
            out.push('\n');
        }
        out
    }
}

fn is_import(line: &str) -> bool {
    line.starts_with("import ") || line.starts_with("from ")
}
