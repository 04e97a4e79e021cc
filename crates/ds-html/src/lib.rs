//! HTML tokenization and tree construction.

use ds_core::DomspyResult;
use ds_dom::Document;
use ds_dom::NodeId;
use ds_dom::is_raw_text_element;
use ds_dom::is_void_element;

mod entities;
mod tokenizer;

use tokenizer::Token;
use tokenizer::tokenize;

/// Parses raw HTML into a host [`Document`].
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn parse(&self, input: &str) -> DomspyResult<Document> {
        build_document(tokenize(input))
    }
}

fn build_document(tokens: Vec<Token>) -> DomspyResult<Document> {
    let mut doc = Document::new();
    let mut stack: Vec<(NodeId, String)> = vec![(NodeId::DOCUMENT, String::new())];

    for token in tokens {
        let current = stack.last().map(|(id, _)| *id).unwrap_or(NodeId::DOCUMENT);
        match token {
            Token::Text(text) => {
                let raw = stack
                    .last()
                    .map(|(_, name)| is_raw_text_element(name))
                    .unwrap_or(false);
                if raw {
                    doc.append_text(current, &text)?;
                } else {
                    doc.append_text(current, &entities::decode_entities(&text))?;
                }
            }
            Token::Comment(text) => {
                doc.append_comment(current, &text)?;
            }
            Token::Doctype(name) => {
                doc.append_doctype(current, &name)?;
            }
            Token::ProcessingInstruction { target, data } => {
                doc.append_processing_instruction(current, &target, &data)?;
            }
            Token::Start {
                name,
                attrs,
                self_closing,
            } => {
                let id = doc.append_element(current, &name, attrs)?;
                if !self_closing && !is_void_element(&name) {
                    stack.push((id, name));
                }
            }
            Token::End { name } => {
                // Stray end tags with no open element of that name are dropped.
                if let Some(position) = stack
                    .iter()
                    .skip(1)
                    .rposition(|(_, open)| *open == name)
                {
                    stack.truncate(position + 1);
                }
            }
        }
    }

    Ok(doc)
}
