//! Declarative query files.
//!
//! ```xml
//! <Queries>
//!   <Query Name="SelectAll">SELECT GROUP_ID, GROUP_NAME FROM user_group</Query>
//!   <Query Name="SelectById"><![CDATA[SELECT * FROM user_group WHERE GROUP_ID = @id]]></Query>
//! </Queries>
//! ```
//!
//! Elements other than `Query` under the root are ignored. A query's SQL is
//! the concatenated text of the element, trimmed.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use dbkit_core::{Error, Result};

const ROOT: &str = "Queries";
const QUERY: &str = "Query";
const NAME: &str = "Name";

/// Read and parse a query file.
///
/// # Errors
///
/// [`Error::InvalidQueryFile`] if the file cannot be read or is malformed.
pub fn load_query_file(path: &Path) -> Result<HashMap<String, Arc<str>>> {
    let source = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|e| Error::InvalidQueryFile {
        path: source.clone(),
        reason: e.to_string(),
    })?;
    parse_queries(&text, &source)
}

/// Parse query-file XML. `source` names the file in errors.
///
/// # Errors
///
/// [`Error::InvalidQueryFile`] if the text is not XML, the root element is
/// not `Queries`, a `Query` lacks its `Name` attribute, or a name repeats.
pub fn parse_queries(text: &str, source: &str) -> Result<HashMap<String, Arc<str>>> {
    let invalid = |reason: String| Error::InvalidQueryFile {
        path: source.to_string(),
        reason,
    };

    let doc = roxmltree::Document::parse(text).map_err(|e| invalid(e.to_string()))?;
    let root = doc.root_element();
    if root.tag_name().name() != ROOT {
        return Err(invalid(format!(
            "root element is '{}', expected '{}'",
            root.tag_name().name(),
            ROOT
        )));
    }

    let mut queries = HashMap::new();
    for node in root
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == QUERY)
    {
        let line = doc.text_pos_at(node.range().start).row;
        let name = node
            .attribute(NAME)
            .ok_or_else(|| invalid(format!("line {}: Name attribute missing on a Query node", line)))?;

        let sql: String = node
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect();

        if queries
            .insert(name.to_string(), Arc::from(sql.trim()))
            .is_some()
        {
            return Err(invalid(format!("line {}: query '{}' defined twice", line, name)));
        }
    }

    Ok(queries)
}
