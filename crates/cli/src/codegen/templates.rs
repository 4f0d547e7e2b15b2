//! Source text for generated records, query files, layers and the module root.

use dbkit::{ColumnInfo, DataType};

use super::naming::{parameter_name, property_name, snake_case, NameStyle};

const HEADER: &str = "// Generated by `dbkit generate`. Changes are overwritten on the next run.\n";

/// One column of a generated record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Column name as the provider reports it
    pub column: String,
    /// Rust field identifier (may be a raw identifier)
    pub field: String,
    /// Parameter name without sigil
    pub parameter: String,
    /// Field type as written in the struct
    pub rust_type: String,
    /// Type of a by-key argument (the non-`Option` form when there is one)
    pub key_type: String,
    /// Whether reading the field by value needs a clone
    pub needs_clone: bool,
}

impl Property {
    /// Derive a property from a described column.
    pub fn new(column: &ColumnInfo, style: NameStyle, nullable: bool) -> Self {
        let property = property_name(&column.name, style);
        let (base, copy) = match column.data_type {
            DataType::Bool => ("bool", true),
            DataType::Int => ("i64", true),
            DataType::Float => ("f64", true),
            DataType::String => ("String", false),
            DataType::Bytes => ("Vec<u8>", false),
            DataType::Unknown => ("dbkit::Value", false),
        };
        // Unknown columns may hold NULL whatever the setting says
        let optional = nullable || column.data_type == DataType::Unknown;
        let rust_type = if optional {
            format!("Option<{}>", base)
        } else {
            base.to_string()
        };
        Self {
            column: column.name.clone(),
            field: snake_case(&property),
            parameter: parameter_name(&property),
            rust_type,
            key_type: base.to_string(),
            needs_clone: !copy,
        }
    }

    /// Field name as a plain label, without any `r#` prefix.
    pub fn label(&self) -> &str {
        self.field.trim_start_matches("r#")
    }
}

/// `<object>.rs`: the record struct and its column mapping.
pub fn render_record(name: &str, properties: &[Property]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    out.push_str("use dbkit::{Record, RecordMap};\n\n");
    out.push_str("#[derive(Debug, Default, Clone, PartialEq)]\n");
    out.push_str(&format!("pub struct {} {{\n", name));
    for p in properties {
        out.push_str(&format!("    pub {}: {},\n", p.field, p.rust_type));
    }
    out.push_str("}\n\n");
    out.push_str(&format!("impl Record for {} {{\n", name));
    out.push_str("    fn map_columns(map: &mut RecordMap<Self>) {\n");
    for p in properties {
        out.push_str(&format!(
            "        map.column({:?}, {:?}, |r, v| r.{} = v);\n",
            p.column,
            p.label(),
            p.field
        ));
    }
    out.push_str("    }\n}\n");
    out
}

/// `queries/<Object>.xml`: CRUD statements keyed on the first column.
pub fn render_queries(name: &str, table: &str, properties: &[Property], sigil: &str) -> String {
    let columns: Vec<String> = properties.iter().map(|p| xml_escape(&p.column)).collect();
    let params: Vec<String> = properties
        .iter()
        .map(|p| format!("{}{}", sigil, p.parameter))
        .collect();
    let table = xml_escape(table);
    let column_list = columns.join(", ");
    let key = format!("{} = {}", columns[0], params[0]);

    let assignments: Vec<String> = if columns.len() > 1 {
        columns
            .iter()
            .zip(&params)
            .skip(1)
            .map(|(c, p)| format!("{} = {}", c, p))
            .collect()
    } else {
        vec![key.clone()]
    };

    let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<Queries>\n");
    let mut query = |query_name: String, lines: Vec<String>| {
        out.push_str(&format!("  <Query Name=\"{}\">\n", query_name));
        for line in lines {
            out.push_str(&format!("    {}\n", line));
        }
        out.push_str("  </Query>\n");
    };

    query(
        format!("Select{}ById", name),
        vec![
            format!("SELECT {}", column_list),
            format!("FROM {}", table),
            format!("WHERE {}", key),
        ],
    );
    query(
        format!("SelectAll{}s", name),
        vec![format!("SELECT {}", column_list), format!("FROM {}", table)],
    );
    query(
        format!("Insert{}", name),
        vec![
            format!("INSERT INTO {} ({})", table, column_list),
            format!("VALUES ({})", params.join(", ")),
        ],
    );
    query(
        format!("Update{}", name),
        vec![
            format!("UPDATE {}", table),
            format!("SET {}", assignments.join(", ")),
            format!("WHERE {}", key),
        ],
    );
    query(
        format!("Delete{}ById", name),
        vec![format!("DELETE FROM {}", table), format!("WHERE {}", key)],
    );

    out.push_str("</Queries>\n");
    out
}

/// `<object>_layer.rs`: one method per generated query.
pub fn render_layer(name: &str, properties: &[Property]) -> String {
    let module = snake_case(name);
    let instance = module.trim_start_matches("r#").to_string();
    let key = &properties[0];
    let key_arg = &key.field;

    let parameter_list = |receiver: &str| -> String {
        properties
            .iter()
            .map(|p| {
                let value = if p.needs_clone {
                    format!("{}.{}.clone()", receiver, p.field)
                } else {
                    format!("{}.{}", receiver, p.field)
                };
                format!("            Parameter::new({:?}, {}),\n", p.parameter, value)
            })
            .collect()
    };

    let mut out = String::from(HEADER);
    out.push('\n');
    out.push_str("use dbkit::{Parameter, RecordLayer, Result, Session};\n\n");
    out.push_str(&format!("use super::{}::{};\n\n", module, name));
    out.push_str(&format!(
        "/// Named-query access for [`{name}`].\npub struct {name}Layer<'s>(RecordLayer<'s, {name}>);\n\n",
        name = name
    ));
    out.push_str(&format!("impl<'s> {}Layer<'s> {{\n", name));
    out.push_str("    pub fn new(session: &'s mut Session) -> Self {\n");
    out.push_str("        Self(RecordLayer::new(session))\n    }\n\n");

    out.push_str(&format!(
        "    pub fn select_{m}_by_id(&mut self, {k}: {t}) -> Result<Option<{n}>> {{\n",
        m = instance,
        k = key_arg,
        t = key.key_type,
        n = name
    ));
    out.push_str(&format!(
        "        let params = [Parameter::new({:?}, {})];\n",
        key.parameter, key_arg
    ));
    out.push_str(&format!(
        "        self.0.fill_one(\"Select{}ById\", &params)\n    }}\n\n",
        name
    ));

    out.push_str(&format!(
        "    pub fn select_all_{m}s(&mut self) -> Result<Vec<{n}>> {{\n",
        m = instance,
        n = name
    ));
    out.push_str(&format!(
        "        self.0.fill_many(\"SelectAll{}s\", &[])\n    }}\n\n",
        name
    ));

    for verb in ["insert", "update"] {
        let query = format!("{}{}", upper_first(verb), name);
        out.push_str(&format!(
            "    pub fn {v}_{m}(&mut self, record: &{n}) -> Result<u64> {{\n",
            v = verb,
            m = instance,
            n = name
        ));
        out.push_str("        let params = [\n");
        out.push_str(&parameter_list("record"));
        out.push_str("        ];\n");
        out.push_str(&format!(
            "        self.0.execute_non_query({:?}, &params)\n    }}\n\n",
            query
        ));
    }

    out.push_str(&format!(
        "    pub fn delete_{m}_by_id(&mut self, {k}: {t}) -> Result<u64> {{\n",
        m = instance,
        k = key_arg,
        t = key.key_type
    ));
    out.push_str(&format!(
        "        let params = [Parameter::new({:?}, {})];\n",
        key.parameter, key_arg
    ));
    out.push_str(&format!(
        "        self.0.execute_non_query(\"Delete{}ById\", &params)\n    }}\n}}\n",
        name
    ));
    out
}

/// `mod.rs`: module declarations and `register_all`.
pub fn render_mod(names: &[String]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for name in names {
        let module = snake_case(name);
        out.push_str(&format!("pub mod {};\npub mod {}_layer;\n", module, module.trim_start_matches("r#")));
    }
    out.push('\n');
    for name in names {
        let module = snake_case(name);
        out.push_str(&format!(
            "pub use {m}::{n};\npub use {l}_layer::{n}Layer;\n",
            m = module,
            l = module.trim_start_matches("r#"),
            n = name
        ));
    }
    out.push_str("\nuse std::path::Path;\n\nuse dbkit::{Result, Session};\n\n");
    out.push_str("/// Register every generated record and load its queries from `queries_dir`.\n");
    out.push_str("pub fn register_all(session: &mut Session, queries_dir: &Path) -> Result<()> {\n");
    for name in names {
        out.push_str(&format!("    session.register::<{}>()?;\n", name));
        out.push_str(&format!(
            "    session.add_queries_file::<{n}>(queries_dir.join(\"{n}.xml\"))?;\n",
            n = name
        ));
    }
    out.push_str("    Ok(())\n}\n");
    out
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
