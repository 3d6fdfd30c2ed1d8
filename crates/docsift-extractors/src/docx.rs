//! DOCX text extraction using docx-rs.
//!
//! Walks body paragraphs and the paragraphs inside table cells, in
//! document order, concatenating run text.

use docsift_core::{DocError, DocResult};
use docx_rs::{DocumentChild, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild};

/// Extract the text of a DOCX document, one paragraph per line.
pub fn read_docx(content: &[u8]) -> DocResult<String> {
    let docx = docx_rs::read_docx(content)
        .map_err(|e| DocError::parse(format!("Failed to parse DOCX: {}", e)))?;

    let mut paragraphs: Vec<String> = Vec::new();

    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => {
                let text = paragraph_text(p);
                if !text.is_empty() {
                    paragraphs.push(text);
                }
            }
            DocumentChild::Table(t) => {
                for row in &t.rows {
                    let TableChild::TableRow(r) = row;
                    for cell in &r.cells {
                        let TableRowChild::TableCell(c) = cell;
                        for content in &c.children {
                            if let TableCellContent::Paragraph(p) = content {
                                let text = paragraph_text(p);
                                if !text.is_empty() {
                                    paragraphs.push(text);
                                }
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(p: &docx_rs::Paragraph) -> String {
    let mut text = String::new();

    for child in &p.children {
        match child {
            ParagraphChild::Run(r) => push_run(&mut text, r),
            ParagraphChild::Hyperlink(h) => {
                for child in &h.children {
                    if let ParagraphChild::Run(r) = child {
                        push_run(&mut text, r);
                    }
                }
            }
            _ => {}
        }
    }

    text
}

fn push_run(text: &mut String, run: &docx_rs::Run) {
    for run_child in &run.children {
        match run_child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}
