use std::fmt;
use std::io;
use std::path::Path;

use serde::Serialize;

/// Index of a file registered with a [`SourceManager`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FileId(pub u32);

/// A position in a source file. Lines and columns are 1-based; a location
/// with `line == 0` or `column == 0` is invalid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: FileId,
    pub line: u32,
    pub column: u32,
    /// Byte offset into the source buffer.
    pub offset: u32,
}

impl SourceLocation {
    pub fn new(file: FileId, line: u32, column: u32, offset: u32) -> Self {
        Self {
            file,
            line,
            column,
            offset,
        }
    }

    pub fn unknown() -> Self {
        Self {
            file: FileId(0),
            line: 0,
            column: 0,
            offset: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.line > 0 && self.column > 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open range `[begin, end)` in a source file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SourceRange {
    pub begin: SourceLocation,
    pub end: SourceLocation,
}

impl SourceRange {
    pub fn is_valid(&self) -> bool {
        self.begin.is_valid() && self.end.is_valid()
    }
}

struct FileEntry {
    name: String,
    content: String,
    /// Byte offset of each line start, for offset -> line/column lookup.
    line_offsets: Vec<u32>,
}

/// Owns source file contents and answers offset -> line/column queries
/// through a precomputed line-start index.
#[derive(Default)]
pub struct SourceManager {
    files: Vec<FileEntry>,
}

impl SourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a source file from disk and return its id.
    pub fn load_file(&mut self, path: &Path) -> io::Result<FileId> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.load_string(path.display().to_string(), content))
    }

    /// Register an in-memory named buffer and return its id.
    pub fn load_string(&mut self, name: impl Into<String>, content: impl Into<String>) -> FileId {
        let mut entry = FileEntry {
            name: name.into(),
            content: content.into(),
            line_offsets: Vec::new(),
        };
        compute_line_offsets(&mut entry);
        self.files.push(entry);
        FileId(self.files.len() as u32 - 1)
    }

    /// Full source text of a file. The id must come from this manager.
    pub fn source(&self, file: FileId) -> &str {
        &self.files[file.0 as usize].content
    }

    pub fn filename(&self, file: FileId) -> &str {
        &self.files[file.0 as usize].name
    }

    /// Map a byte offset to a full location. An offset equal to the content
    /// length resolves to the end-of-file position; anything past that is
    /// unknown.
    pub fn location(&self, file: FileId, offset: u32) -> SourceLocation {
        let Some(entry) = self.files.get(file.0 as usize) else {
            return SourceLocation::unknown();
        };
        if offset as usize > entry.content.len() {
            return SourceLocation::unknown();
        }

        let line = entry.line_offsets.partition_point(|&start| start <= offset) - 1;
        let column = offset - entry.line_offsets[line] + 1;

        SourceLocation {
            file,
            line: line as u32 + 1,
            column,
            offset,
        }
    }
}

fn compute_line_offsets(entry: &mut FileEntry) {
    entry.line_offsets.clear();
    entry.line_offsets.push(0);
    for (i, b) in entry.content.bytes().enumerate() {
        if b == b'\n' {
            entry.line_offsets.push(i as u32 + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_lookup_across_lines() {
        let mut sm = SourceManager::new();
        let file = sm.load_string("test.fl", "let x\nlet y\n");

        let loc = sm.location(file, 0);
        assert_eq!((loc.line, loc.column), (1, 1));

        let loc = sm.location(file, 4);
        assert_eq!((loc.line, loc.column), (1, 5));

        // First byte after the newline starts line 2.
        let loc = sm.location(file, 6);
        assert_eq!((loc.line, loc.column), (2, 1));
    }

    #[test]
    fn end_of_file_offset_is_valid() {
        let mut sm = SourceManager::new();
        let file = sm.load_string("test.fl", "ab");

        let loc = sm.location(file, 2);
        assert!(loc.is_valid());
        assert_eq!((loc.line, loc.column), (1, 3));

        assert!(!sm.location(file, 3).is_valid());
    }

    #[test]
    fn unknown_file_is_invalid() {
        let sm = SourceManager::new();
        assert!(!sm.location(FileId(7), 0).is_valid());
    }

    #[test]
    fn filename_and_source_round_trip() {
        let mut sm = SourceManager::new();
        let a = sm.load_string("a.fl", "aaa");
        let b = sm.load_string("b.fl", "bbb");
        assert_eq!(sm.filename(a), "a.fl");
        assert_eq!(sm.source(b), "bbb");
    }
}
