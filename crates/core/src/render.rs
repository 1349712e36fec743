use crate::models::ImportRecord;
use crate::parser::ParsedSource;

/// Render the canonical import block for the sequenced category groups.
///
/// Non-empty groups become contiguous runs of tab-indented import lines,
/// separated by exactly one blank line; empty groups contribute nothing.
pub fn render_import_block(groups: &[Vec<ImportRecord>]) -> String {
    let mut block = String::from("import (");
    for group in groups {
        if group.is_empty() {
            continue;
        }
        block.push('\n');
        for record in group {
            block.push('\t');
            block.push_str(&record.render());
            block.push('\n');
        }
    }
    block.push(')');

    block
}

/// Replace the original import declarations with the regenerated block.
///
/// The import line regions are cut from the source together with the blank
/// lines adjoining them, then the block is inserted directly after the
/// package clause line with one blank line on each side. Every other line
/// is carried over verbatim. Insertion is keyed on the parsed position of
/// the package clause, so a `package <name>` literal appearing in a string
/// elsewhere in the file is never touched.
pub fn splice(source: &str, parsed: &ParsedSource, block: &str) -> String {
    let lines: Vec<&str> = source.split('\n').collect();
    let package_line = parsed.package_line;
    let mut cut = vec![false; lines.len()];

    // Rows up to and including the package clause line are emitted as the
    // head below, so cutting starts past it.
    for region in &parsed.import_regions {
        let end = region.end.min(lines.len().saturating_sub(1));
        for row in region.start.max(package_line + 1)..=end {
            cut[row] = true;
        }
    }

    // Blank lines that touch a cut region collapse into it; the splice
    // reinstates exactly one separator on each side of the block.
    let mut grew = true;
    while grew {
        grew = false;
        for row in 0..lines.len() {
            if cut[row] || !lines[row].trim().is_empty() {
                continue;
            }
            let above = row > 0 && cut[row - 1];
            let below = row + 1 < lines.len() && cut[row + 1];
            if above || below {
                cut[row] = true;
                grew = true;
            }
        }
    }

    // A declaration sharing the package clause's line (`package p;import …`)
    // has no row of its own to cut; the clause line is truncated instead.
    let declaration_on_package_line = parsed
        .import_regions
        .iter()
        .any(|region| region.start <= package_line);

    let mut output = String::with_capacity(source.len() + block.len());
    for line in &lines[..package_line] {
        output.push_str(line);
        output.push('\n');
    }
    if declaration_on_package_line {
        output.push_str(lines[package_line][..parsed.package_clause_end_column].trim_end());
    } else {
        output.push_str(lines[package_line]);
    }
    output.push('\n');
    output.push('\n');
    output.push_str(block);
    output.push('\n');

    let rest: Vec<&str> = lines
        .iter()
        .enumerate()
        .skip(package_line + 1)
        .filter(|(row, _)| !cut[*row])
        .map(|(_, line)| *line)
        .collect();

    if !rest.is_empty() {
        if !rest[0].trim().is_empty() {
            output.push('\n');
        }
        output.push_str(&rest.join("\n"));
    }

    if !output.ends_with('\n') {
        output.push('\n');
    }

    output
}
