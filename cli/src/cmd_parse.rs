//! `protocodec parse`: validate and pretty-print a PSDL file.

use anyhow::{Context, Result};
use protocodec_registry::{Definition, PsdlParser};

pub fn run(file: &str, verbose: bool) -> Result<()> {
    let content = std::fs::read_to_string(file).with_context(|| format!("read '{file}'"))?;
    let defs = PsdlParser::parse_all(&content).with_context(|| format!("parse '{file}'"))?;
    if defs.is_empty() {
        anyhow::bail!("'{file}' contains no definitions");
    }

    for def in &defs {
        match def {
            Definition::Message(schema) => {
                schema.validate().with_context(|| format!("validate '{}'", schema.name))?;
                println!("✓ message {} ({} fields)", schema.name, schema.fields.len());
                if let Some(desc) = &schema.description {
                    println!("  {desc}");
                }
                if verbose {
                    for f in &schema.fields {
                        println!(
                            "    {:>3}  {:24} {:?} {}  json={}",
                            f.tag, f.name, f.cardinality, f.ty, f.json_name
                        );
                    }
                }
            }
            Definition::Service(service) => {
                service.validate().with_context(|| format!("validate '{}'", service.name))?;
                println!("✓ service {} ({} methods)", service.name, service.methods.len());
                if verbose {
                    for m in &service.methods {
                        println!("    {}({}) -> {}", m.name, m.input, m.output);
                    }
                }
            }
        }
    }
    Ok(())
}
