use super::SourceMap;
use super::vlq::encode_vlq;

#[derive(Debug, Clone)]
struct Edit {
    start: usize,
    end: usize,
    content: String,
}

/// Replaces byte ranges of an original text and tracks where every output
/// line came from.
#[derive(Debug)]
pub struct SourceSplicer<'a> {
    original: &'a str,
    edits: Vec<Edit>,
}

impl<'a> SourceSplicer<'a> {
    pub fn new(original: &'a str) -> Self {
        Self {
            original,
            edits: vec![],
        }
    }

    /// Schedules `original[start..end]` to be replaced by `content`.
    ///
    /// Returns false (and records nothing) for ranges that fall outside the
    /// text, split a character, or overlap an earlier edit.
    pub fn overwrite(&mut self, start: usize, end: usize, content: impl Into<String>) -> bool {
        let in_bounds = start <= end
            && end <= self.original.len()
            && self.original.is_char_boundary(start)
            && self.original.is_char_boundary(end);
        if !in_bounds {
            return false;
        }
        let overlaps = self
            .edits
            .iter()
            .any(|edit| start < edit.end && edit.start < end);
        if overlaps {
            return false;
        }
        self.edits.push(Edit {
            start,
            end,
            content: content.into(),
        });
        true
    }

    pub fn has_edits(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Produces the edited text and a source map pointing back at `source_name`.
    pub fn generate(&self, source_name: &str) -> (String, SourceMap) {
        let mut edits = self.edits.iter().collect::<Vec<_>>();
        edits.sort_by_key(|edit| edit.start);

        let mut code = String::with_capacity(self.original.len());
        let mut mappings = MappingsWriter::default();
        let mut original_pos = Position::default();
        let mut cursor = 0usize;

        for edit in edits {
            let unchanged = &self.original[cursor..edit.start];
            emit_unchanged(unchanged, &mut code, &mut mappings, &mut original_pos);

            let replaced_from = original_pos;
            edit.content.split_inclusive('\n').for_each(|segment| {
                if !is_bare_newline(segment) {
                    mappings.add_segment(replaced_from);
                }
                code.push_str(segment);
                mappings.advance(segment);
            });
            original_pos.advance(&self.original[edit.start..edit.end]);
            cursor = edit.end;
        }
        emit_unchanged(
            &self.original[cursor..],
            &mut code,
            &mut mappings,
            &mut original_pos,
        );

        let map = SourceMap::single_source(
            Some(file_name_of(source_name)),
            source_name.to_string(),
            self.original,
            mappings.finish(),
        );
        (code, map)
    }
}

fn emit_unchanged(
    text: &str,
    code: &mut String,
    mappings: &mut MappingsWriter,
    original_pos: &mut Position,
) {
    text.split_inclusive('\n').for_each(|segment| {
        if !is_bare_newline(segment) {
            mappings.add_segment(*original_pos);
        }
        code.push_str(segment);
        mappings.advance(segment);
        original_pos.advance(segment);
    });
}

fn is_bare_newline(segment: &str) -> bool {
    segment == "\n" || segment == "\r\n"
}

fn file_name_of(source_name: &str) -> String {
    source_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(source_name)
        .to_string()
}

/// Zero-based line and UTF-16 column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Position {
    line: i64,
    column: i64,
}

impl Position {
    fn advance(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += ch.len_utf16() as i64;
            }
        }
    }
}

#[derive(Debug, Default)]
struct MappingsWriter {
    out: String,
    generated: Position,
    line_has_segment: bool,
    prev_generated_column: i64,
    prev_original: Position,
}

impl MappingsWriter {
    fn add_segment(&mut self, original: Position) {
        if self.line_has_segment {
            self.out.push(',');
        }
        encode_vlq(self.generated.column - self.prev_generated_column, &mut self.out);
        // single source, index delta is always zero
        encode_vlq(0, &mut self.out);
        encode_vlq(original.line - self.prev_original.line, &mut self.out);
        encode_vlq(original.column - self.prev_original.column, &mut self.out);
        self.prev_generated_column = self.generated.column;
        self.prev_original = original;
        self.line_has_segment = true;
    }

    fn advance(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.out.push(';');
                self.generated.line += 1;
                self.generated.column = 0;
                self.prev_generated_column = 0;
                self.line_has_segment = false;
            } else {
                self.generated.column += ch.len_utf16() as i64;
            }
        }
    }

    fn finish(self) -> String {
        self.out
    }
}
