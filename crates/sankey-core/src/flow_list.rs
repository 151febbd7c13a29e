//! Flow-list import: `source,target,value` rows as produced by the spreadsheet data editor.
//!
//! The result is a raw graph document ready for [`crate::FlowDataProcessor::process`]. Node
//! depths are inferred from the flow direction and node values are the larger of each node's
//! total inflow and outflow.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq)]
pub struct FlowRow {
    pub line: usize,
    pub source: String,
    pub target: String,
    pub value: f64,
}

#[derive(Debug, Default)]
struct NodeTotals {
    inflow: f64,
    outflow: f64,
    targets: Vec<usize>,
}

/// Parses flow-list text into a raw graph (`{"nodes": [...], "links": [...]}`).
pub fn parse_flow_list(text: &str) -> Result<Value> {
    let rows = parse_flow_rows(text)?;

    let mut nodes: IndexMap<String, NodeTotals> = IndexMap::new();
    for row in &rows {
        let s = node_slot(&mut nodes, &row.source);
        let t = node_slot(&mut nodes, &row.target);
        nodes[s].outflow += row.value;
        nodes[s].targets.push(t);
        nodes[t].inflow += row.value;
    }

    let depths = infer_depths(&nodes)?;

    let node_values: Vec<Value> = nodes
        .iter()
        .zip(&depths)
        .map(|((id, totals), depth)| {
            json!({
                "id": id,
                "value": totals.inflow.max(totals.outflow),
                "depth": depth,
            })
        })
        .collect();
    let link_values: Vec<Value> = rows
        .iter()
        .map(|row| {
            json!({
                "source": row.source,
                "target": row.target,
                "value": row.value,
            })
        })
        .collect();

    Ok(json!({ "nodes": node_values, "links": link_values }))
}

fn node_slot(nodes: &mut IndexMap<String, NodeTotals>, id: &str) -> usize {
    match nodes.get_index_of(id) {
        Some(i) => i,
        None => nodes.insert_full(id.to_string(), NodeTotals::default()).0,
    }
}

/// Parses the rows without building a graph. Blank lines, `%%` comments, an optional
/// `sankey`/`sankey-beta` header line and an optional `source,target,value` header row are
/// skipped.
pub fn parse_flow_rows(text: &str) -> Result<Vec<FlowRow>> {
    let mut p = CsvParser::new(text);
    let mut rows = Vec::new();
    let mut first_record = true;

    loop {
        p.consume_blank_and_comment_lines();
        if p.eof() {
            break;
        }
        let line = p.line;

        if first_record && p.rest_of_line().trim().to_ascii_lowercase().starts_with("sankey") {
            let header = p.rest_of_line().trim().to_ascii_lowercase();
            if header == "sankey" || header == "sankey-beta" {
                p.skip_line();
                continue;
            }
        }

        let fields = p.parse_record().map_err(|message| Error::FlowList { line, message })?;
        let [source, target, value] = <[String; 3]>::try_from(fields).map_err(|fields| {
            Error::FlowList {
                line,
                message: format!("expected 3 fields (source,target,value), found {}", fields.len()),
            }
        })?;

        let source = source.trim().to_string();
        let target = target.trim().to_string();
        let value_raw = value.trim();

        if first_record
            && source.eq_ignore_ascii_case("source")
            && target.eq_ignore_ascii_case("target")
            && value_raw.eq_ignore_ascii_case("value")
        {
            first_record = false;
            continue;
        }
        first_record = false;

        if source.is_empty() || target.is_empty() {
            return Err(Error::FlowList {
                line,
                message: "source and target must not be empty".to_string(),
            });
        }
        let value = value_raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| Error::FlowList {
                line,
                message: format!("invalid value '{value_raw}'"),
            })?;

        rows.push(FlowRow {
            line,
            source,
            target,
            value,
        });
    }

    Ok(rows)
}

/// Longest-path layering from the sources: every node sits one column right of its deepest
/// upstream node.
fn infer_depths(nodes: &IndexMap<String, NodeTotals>) -> Result<Vec<usize>> {
    let n = nodes.len();
    let mut depths = vec![0usize; n];
    let mut current: Vec<usize> = (0..n).collect();
    let mut next: Vec<usize> = Vec::new();
    let mut next_seen = vec![false; n];
    let mut x: usize = 0;

    while !current.is_empty() {
        for &node_idx in &current {
            depths[node_idx] = x;
            for &t in &nodes[node_idx].targets {
                if !next_seen[t] {
                    next_seen[t] = true;
                    next.push(t);
                }
            }
        }
        x += 1;
        if x > n {
            let node = current
                .first()
                .and_then(|&i| nodes.get_index(i))
                .map(|(id, _)| id.clone())
                .unwrap_or_default();
            return Err(Error::CircularFlow { node });
        }
        current = std::mem::take(&mut next);
        next_seen.fill(false);
    }
    Ok(depths)
}

struct CsvParser<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> CsvParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
        }
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn rest_of_line(&self) -> &'a str {
        let rest = self.rest();
        let end = rest.find(['\n', '\r']).unwrap_or(rest.len());
        &rest[..end]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_line(&mut self) {
        self.pos += self.rest_of_line().len();
        self.try_consume_newline();
    }

    fn consume_blank_and_comment_lines(&mut self) {
        loop {
            let line = self.rest_of_line().trim();
            if self.eof() || !(line.is_empty() || line.starts_with("%%")) {
                return;
            }
            self.skip_line();
        }
    }

    fn try_consume_newline(&mut self) -> bool {
        match self.peek_char() {
            Some('\n') => {
                self.pos += 1;
                self.line += 1;
                true
            }
            Some('\r') => {
                self.pos += 1;
                if self.peek_char() == Some('\n') {
                    self.pos += 1;
                }
                self.line += 1;
                true
            }
            _ => false,
        }
    }

    fn parse_record(&mut self) -> std::result::Result<Vec<String>, String> {
        let mut fields = vec![self.parse_field()?];
        while self.peek_char() == Some(',') {
            self.pos += 1;
            fields.push(self.parse_field()?);
        }
        if !self.try_consume_newline() && !self.eof() {
            return Err("expected end of record".to_string());
        }
        Ok(fields)
    }

    fn parse_field(&mut self) -> std::result::Result<String, String> {
        let leading = self.rest().len() - self.rest().trim_start_matches([' ', '\t']).len();
        if self.rest()[leading..].starts_with('"') {
            self.pos += leading;
            let out = self.parse_quoted_field()?;
            let trailing = self.rest().len() - self.rest().trim_start_matches([' ', '\t']).len();
            self.pos += trailing;
            return Ok(out);
        }
        self.parse_unquoted_field()
    }

    fn parse_unquoted_field(&mut self) -> std::result::Result<String, String> {
        let mut out = String::new();
        while let Some(ch) = self.peek_char() {
            if ch == ',' || ch == '\n' || ch == '\r' {
                break;
            }
            out.push(ch);
            self.pos += ch.len_utf8();
        }
        Ok(out)
    }

    fn parse_quoted_field(&mut self) -> std::result::Result<String, String> {
        self.pos += 1;
        let mut out = String::new();
        while let Some(ch) = self.peek_char() {
            self.pos += ch.len_utf8();
            match ch {
                '"' if self.peek_char() == Some('"') => {
                    self.pos += 1;
                    out.push('"');
                }
                '"' => return Ok(out),
                '\n' => {
                    self.line += 1;
                    out.push(ch);
                }
                _ => out.push(ch),
            }
        }
        Err("unterminated quoted field".to_string())
    }
}
