//! Side-by-side rendering of an alignment
//!
//! ```text
//! REF: the cat sat ****
//! HYP: a   cat sat down
//!      S           I
//! ```

use std::fmt::Write;

use crate::alignment::Alignment;
use crate::error::{Error, Result};
use crate::types::AlignmentOp;

const PLACEHOLDER: char = '*';

/// Rendering switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit the third row with S/D/I markers
    pub markers: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { markers: true }
    }
}

struct Column<'a> {
    reference: Cell<'a>,
    hypothesis: Cell<'a>,
    marker: char,
}

enum Cell<'a> {
    Word(&'a str),
    Placeholder,
}

fn token<'a, S: AsRef<str>>(tokens: &'a [S], index: usize, side: &str) -> Result<&'a str> {
    tokens.get(index).map(|t| t.as_ref()).ok_or_else(|| {
        Error::Shape(format!(
            "{side} index {index} out of range for {} tokens",
            tokens.len()
        ))
    })
}

fn columns<'a, S: AsRef<str>>(
    ops: &[AlignmentOp],
    reference: &'a [S],
    hypothesis: &'a [S],
) -> Result<Vec<Column<'a>>> {
    ops.iter()
        .map(|op| {
            let column = match *op {
                AlignmentOp::Hit {
                    reference: r,
                    hypothesis: h,
                }
                | AlignmentOp::Substitution {
                    reference: r,
                    hypothesis: h,
                } => Column {
                    reference: Cell::Word(token(reference, r, "reference")?),
                    hypothesis: Cell::Word(token(hypothesis, h, "hypothesis")?),
                    marker: op.marker(),
                },
                AlignmentOp::Deletion { reference: r } => Column {
                    reference: Cell::Word(token(reference, r, "reference")?),
                    hypothesis: Cell::Placeholder,
                    marker: op.marker(),
                },
                AlignmentOp::Insertion { hypothesis: h } => Column {
                    reference: Cell::Placeholder,
                    hypothesis: Cell::Word(token(hypothesis, h, "hypothesis")?),
                    marker: op.marker(),
                },
            };
            Ok(column)
        })
        .collect()
}

fn cell_width(cell: &Cell<'_>) -> usize {
    match cell {
        Cell::Word(word) => word.chars().count(),
        Cell::Placeholder => 0,
    }
}

fn push_cell(row: &mut String, cell: &Cell<'_>, width: usize) {
    match cell {
        Cell::Word(word) => {
            let _ = write!(row, "{word:<width$} ");
        }
        Cell::Placeholder => {
            row.extend(std::iter::repeat_n(PLACEHOLDER, width));
            row.push(' ');
        }
    }
}

/// Render `ops` as REF/HYP rows (plus an optional marker row).
///
/// Column width is the wider of the two tokens; the missing side of a deletion
/// or insertion is filled with `*`. Output has no trailing whitespace.
pub fn render<S: AsRef<str>>(
    ops: &[AlignmentOp],
    reference: &[S],
    hypothesis: &[S],
    options: &RenderOptions,
) -> Result<String> {
    let columns = columns(ops, reference, hypothesis)?;

    let mut ref_row = String::from("REF: ");
    let mut hyp_row = String::from("HYP: ");
    let mut marker_row = String::from("     ");

    for column in &columns {
        let width = cell_width(&column.reference).max(cell_width(&column.hypothesis));
        push_cell(&mut ref_row, &column.reference, width);
        push_cell(&mut hyp_row, &column.hypothesis, width);
        let _ = write!(marker_row, "{:<width$} ", column.marker);
    }

    let mut out = String::new();
    out.push_str(ref_row.trim_end());
    out.push('\n');
    out.push_str(hyp_row.trim_end());

    let marker_row = marker_row.trim_end();
    if options.markers && !marker_row.is_empty() {
        out.push('\n');
        out.push_str(marker_row);
    }

    Ok(out)
}

/// Render a whole alignment; multi-line alignments get one `line N` block each
pub fn render_alignment(alignment: &Alignment, options: &RenderOptions) -> Result<String> {
    let blocks = alignment
        .line_ops()
        .map(|ops| render(ops, &alignment.reference, &alignment.hypothesis, options))
        .collect::<Result<Vec<_>>>()?;

    if blocks.len() == 1 {
        return Ok(blocks.into_iter().next().unwrap_or_default());
    }

    let mut out = String::new();
    for (index, block) in blocks.iter().enumerate() {
        if index > 0 {
            out.push_str("\n\n");
        }
        let _ = writeln!(out, "line {}", index + 1);
        out.push_str(block);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::{align, align_sequences};
    use crate::types::WordSequence;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_render_all_operations() {
        let r = words("the cat sat");
        let h = words("a cat sat down");
        let ops = align(&r, &h);
        let rendered = render(&ops, &r, &h, &RenderOptions::default()).unwrap();
        let expected = [
            "REF: the cat sat ****",
            "HYP: a   cat sat down",
            "     S           I",
        ]
        .join("\n");
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_deletion_placeholder() {
        let r = words("hello big world");
        let h = words("hello world");
        let ops = align(&r, &h);
        let rendered = render(&ops, &r, &h, &RenderOptions { markers: false }).unwrap();
        assert_eq!(rendered, "REF: hello big world\nHYP: hello *** world");
    }

    #[test]
    fn test_hits_only_has_no_marker_row() {
        let r = words("same words");
        let ops = align(&r, &r);
        let rendered = render(&ops, &r, &r, &RenderOptions::default()).unwrap();
        assert_eq!(rendered, "REF: same words\nHYP: same words");
    }

    #[test]
    fn test_width_counts_chars_not_bytes() {
        let r = words("café");
        let h = words("cafe");
        let ops = align(&r, &h);
        let rendered = render(&ops, &r, &h, &RenderOptions::default()).unwrap();
        assert_eq!(rendered, "REF: café\nHYP: cafe\n     S");
    }

    #[test]
    fn test_out_of_range_index() {
        let ops = vec![AlignmentOp::Deletion { reference: 5 }];
        let err = render(&ops, &words("a"), &words(""), &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Shape(_)));
    }

    #[test]
    fn test_render_alignment_per_line() {
        let reference = WordSequence::Lines(vec![words("a b"), words("c")]);
        let hypothesis = WordSequence::Lines(vec![words("a"), words("c")]);
        let alignment = align_sequences(&reference, &hypothesis).unwrap();
        let rendered = render_alignment(&alignment, &RenderOptions::default()).unwrap();
        assert_eq!(
            rendered,
            "line 1\nREF: a b\nHYP: a *\n       D\n\nline 2\nREF: c\nHYP: c"
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let r = words("one two three four");
        let h = words("one too three for five");
        let ops = align(&r, &h);
        let first = render(&ops, &r, &h, &RenderOptions::default()).unwrap();
        let second = render(&ops, &r, &h, &RenderOptions::default()).unwrap();
        assert_eq!(first, second);
    }
}
