use crate::models::ImportRecord;
use thiserror::Error;
use tree_sitter::{Node, Parser};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to initialize Go grammar: {0}")]
    Init(String),
    #[error("source is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },
    #[error("missing package clause")]
    MissingPackageClause,
}

/// Inclusive range of source lines (0-based) occupied by one import
/// declaration, widened over the comment lines attached to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRegion {
    pub start: usize,
    pub end: usize,
}

/// Everything the pipeline needs from one parsed Go file
#[derive(Debug, Clone)]
pub struct ParsedSource {
    /// Name from the package clause
    pub package_name: String,
    /// Line of the package clause (0-based)
    pub package_line: usize,
    /// Byte column just past the package clause on that line, so the
    /// splice can truncate a declaration sharing the clause's line
    pub package_clause_end_column: usize,
    /// Import records in source order
    pub imports: Vec<ImportRecord>,
    /// Line regions to cut when splicing the regenerated block
    pub import_regions: Vec<LineRegion>,
}

/// Adapter around the tree-sitter Go grammar
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| ParseError::Init(e.to_string()))?;

        Ok(Self { parser })
    }

    pub fn parse(&mut self, source: &str) -> Result<ParsedSource, ParseError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ParseError::Init("parser produced no tree".to_string()))?;
        let root = tree.root_node();

        if root.has_error() {
            let position = first_error_position(root);
            return Err(ParseError::Syntax {
                line: position.row + 1,
                column: position.column + 1,
            });
        }

        let top_level: Vec<Node> = {
            let mut cursor = root.walk();
            root.children(&mut cursor).collect()
        };

        let mut package_name = None;
        let mut package_line = 0;
        let mut package_clause_end_column = 0;
        let mut imports = Vec::new();
        let mut import_regions = Vec::new();

        for (idx, node) in top_level.iter().enumerate() {
            match node.kind() {
                "package_clause" => {
                    package_name = package_identifier(*node, source);
                    package_line = node.end_position().row;
                    package_clause_end_column = node.end_position().column;
                }
                "import_declaration" => {
                    collect_specs(*node, source, &mut imports);
                    import_regions.push(declaration_region(&top_level, idx, package_line));
                }
                _ => {}
            }
        }

        let package_name = package_name.ok_or(ParseError::MissingPackageClause)?;

        Ok(ParsedSource {
            package_name,
            package_line,
            package_clause_end_column,
            imports,
            import_regions,
        })
    }
}

/// Line region of the import declaration at `idx`, widened over attached
/// comments: a comment chain directly above with no blank line in between,
/// a trailing comment on the closing line, and a comment chain directly
/// below unless that chain is glued to the next declaration (then it is
/// that declaration's doc comment and must survive). Comments on or above
/// the package clause line belong to the clause and stay out of the region.
fn declaration_region(top_level: &[Node], idx: usize, package_line: usize) -> LineRegion {
    let node = top_level[idx];
    let mut start = node.start_position().row;
    let mut end = node.end_position().row;

    let mut j = idx;
    while j > 0
        && top_level[j - 1].kind() == "comment"
        && top_level[j - 1].start_position().row > package_line
        && top_level[j - 1].end_position().row + 1 == start
    {
        start = top_level[j - 1].start_position().row;
        j -= 1;
    }

    let mut k = idx + 1;
    while k < top_level.len()
        && top_level[k].kind() == "comment"
        && top_level[k].start_position().row == end
    {
        end = top_level[k].end_position().row;
        k += 1;
    }

    let chain_start = k;
    let mut chain_end = end;
    while k < top_level.len()
        && top_level[k].kind() == "comment"
        && top_level[k].start_position().row == chain_end + 1
    {
        chain_end = top_level[k].end_position().row;
        k += 1;
    }
    if k > chain_start {
        let detached = match top_level.get(k) {
            Some(next) => next.start_position().row > chain_end + 1,
            None => true,
        };
        if detached {
            end = chain_end;
        }
    }

    LineRegion { start, end }
}

/// Collect the import specs of one import declaration, grouped or not.
fn collect_specs(node: Node, source: &str, imports: &mut Vec<ImportRecord>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "import_spec" => {
                if let Some(record) = spec_record(child, source) {
                    imports.push(record);
                }
            }
            "import_spec_list" => {
                collect_specs(child, source, imports);
            }
            _ => {}
        }
    }
}

/// Build an `ImportRecord` from one `import_spec` node.
fn spec_record(spec: Node, source: &str) -> Option<ImportRecord> {
    let path = spec.child_by_field_name("path")?;
    let alias = spec
        .child_by_field_name("name")
        .map(|name| node_text(name, source));

    Some(ImportRecord::new(node_text(path, source), alias))
}

fn package_identifier(clause: Node, source: &str) -> Option<String> {
    let mut cursor = clause.walk();
    let name = clause
        .children(&mut cursor)
        .find(|child| child.kind() == "package_identifier")
        .map(|child| node_text(child, source));
    name
}

fn node_text(node: Node, source: &str) -> String {
    source[node.byte_range()].to_string()
}

fn first_error_position(node: Node) -> tree_sitter::Point {
    if node.is_error() || node.is_missing() {
        return node.start_position();
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            return first_error_position(child);
        }
    }

    node.start_position()
}
