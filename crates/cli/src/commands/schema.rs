use anyhow::{Context, Result};
use tessera_orm::Dialect;

use crate::migrations;

/// Print the demo schema as DDL, or just its table names
pub fn print(dialect: &str, tables_only: bool) -> Result<()> {
    let registry = migrations::bootstrap().context("demo schema failed to bootstrap")?;

    if tables_only {
        for name in registry.table_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let dialect: Dialect = dialect.parse()?;
    let statements = render(&registry, dialect)?;
    println!("{}", statements.join("\n\n"));
    Ok(())
}

fn render(registry: &tessera_orm::SchemaRegistry, dialect: Dialect) -> Result<Vec<String>> {
    let schema = registry
        .schema()
        .context("registry was bootstrapped without a schema")?;
    let statements = schema
        .to_create_sql(dialect)
        .with_context(|| format!("cannot render DDL for {}", dialect))?;
    tracing::debug!(%dialect, statements = statements.len(), "schema rendered");
    Ok(statements)
}
