//! Destination and reference analysis over the SQL AST
//!
//! Destinations are what a file creates or writes; references are what it
//! reads. Both come out as raw dotted identifiers; the planner normalizes
//! them against the ambient project. CTE names defined in WITH clauses at
//! any query depth are removed from the references before output.

use crate::object_name_to_string;
use bqp_core::plan::{FileAnalysis, StatementCategory};
use bqp_core::resource::ResourceKind;
use sqlparser::ast::{
    Expr, FromTable, ObjectName, ObjectType, Query, SchemaName, Statement, TableFactor,
    TableObject, TableWithJoins, Visit, Visitor,
};
use std::collections::BTreeSet;
use std::ops::ControlFlow;

/// Collects table references, multi-part function-call names (user-defined
/// routines) and CTE names in one AST pass.
#[derive(Default)]
struct RefVisitor {
    relations: BTreeSet<String>,
    functions: BTreeSet<String>,
    ctes: BTreeSet<String>,
}

impl Visitor for RefVisitor {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<()> {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.ctes.insert(cte.alias.name.value.clone());
            }
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_relation(&mut self, relation: &ObjectName) -> ControlFlow<()> {
        self.relations.insert(object_name_to_string(relation));
        ControlFlow::Continue(())
    }

    fn pre_visit_expr(&mut self, expr: &Expr) -> ControlFlow<()> {
        if let Expr::Function(func) = expr {
            // single-part names are builtin calls, not routines
            if func.name.0.len() > 1 {
                self.functions.insert(object_name_to_string(&func.name));
            }
        }
        ControlFlow::Continue(())
    }
}

fn table_factor_name(factor: &TableFactor) -> Option<String> {
    match factor {
        TableFactor::Table { name, .. } => Some(object_name_to_string(name)),
        _ => None,
    }
}

fn table_with_joins_name(table: &TableWithJoins) -> Option<String> {
    table_factor_name(&table.relation)
}

/// Destinations and coarse category of a single statement.
fn classify(stmt: &Statement) -> (Vec<(String, ResourceKind)>, StatementCategory) {
    use ResourceKind::{Routine, Schema, Table};
    use StatementCategory::{Ddl, Dml, Query as Qry};

    match stmt {
        Statement::CreateTable(create) => {
            (vec![(object_name_to_string(&create.name), Table)], Ddl)
        }
        Statement::CreateView(create_view) => {
            (vec![(object_name_to_string(&create_view.name), Table)], Ddl)
        }
        Statement::AlterTable(alter_table) => {
            (vec![(object_name_to_string(&alter_table.name), Table)], Ddl)
        }
        Statement::AlterView { name, .. } => (vec![(object_name_to_string(name), Table)], Ddl),
        Statement::Drop {
            object_type, names, ..
        } => {
            let kind = match object_type {
                ObjectType::Table | ObjectType::View | ObjectType::MaterializedView => Some(Table),
                ObjectType::Schema => Some(Schema),
                _ => None,
            };
            let dests = kind
                .map(|k| {
                    names
                        .iter()
                        .map(|n| (object_name_to_string(n), k))
                        .collect()
                })
                .unwrap_or_default();
            (dests, Ddl)
        }
        Statement::CreateSchema { schema_name, .. } => {
            let dests = match schema_name {
                SchemaName::Simple(name) => vec![(object_name_to_string(name), Schema)],
                _ => Vec::new(),
            };
            (dests, Ddl)
        }
        Statement::CreateFunction(create) => {
            (vec![(object_name_to_string(&create.name), Routine)], Ddl)
        }
        Statement::DropFunction(drop_function) => (
            drop_function
                .func_desc
                .iter()
                .map(|desc| (object_name_to_string(&desc.name), Routine))
                .collect(),
            Ddl,
        ),
        Statement::CreateProcedure { name, .. } => {
            (vec![(object_name_to_string(name), Routine)], Ddl)
        }
        Statement::DropProcedure { proc_desc, .. } => (
            proc_desc
                .iter()
                .map(|desc| (object_name_to_string(&desc.name), Routine))
                .collect(),
            Ddl,
        ),
        Statement::Insert(insert) => {
            let dests = match &insert.table {
                TableObject::TableName(name) => vec![(object_name_to_string(name), Table)],
                _ => Vec::new(),
            };
            (dests, Dml)
        }
        Statement::Update(update) => (
            table_with_joins_name(&update.table)
                .map(|n| vec![(n, Table)])
                .unwrap_or_default(),
            Dml,
        ),
        Statement::Delete(delete) => {
            let tables = match &delete.from {
                FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => tables,
            };
            (
                tables
                    .first()
                    .and_then(table_with_joins_name)
                    .map(|n| vec![(n, Table)])
                    .unwrap_or_default(),
                Dml,
            )
        }
        Statement::Merge { table, .. } => (
            table_factor_name(table)
                .map(|n| vec![(n, Table)])
                .unwrap_or_default(),
            Dml,
        ),
        // CALL targets are references, never destinations
        Statement::Call(_) => (Vec::new(), Qry),
        _ => (Vec::new(), Qry),
    }
}

/// Analyze parsed statements into destinations, references and the file's
/// statement category.
pub fn analyze(statements: &[Statement]) -> FileAnalysis {
    let mut visitor = RefVisitor::default();
    for stmt in statements {
        let _ = stmt.visit(&mut visitor);
    }

    let mut destinations: Vec<(String, ResourceKind)> = Vec::new();
    let mut calls: BTreeSet<String> = BTreeSet::new();
    let mut category = StatementCategory::Query;

    for stmt in statements {
        if let Statement::Call(func) = stmt {
            calls.insert(object_name_to_string(&func.name));
        }
        let (dests, stmt_category) = classify(stmt);
        for dest in dests {
            if !destinations.contains(&dest) {
                destinations.push(dest);
            }
        }
        category = category.min(stmt_category);
    }

    let mut references: BTreeSet<String> = visitor.relations;
    references.extend(visitor.functions);
    references.extend(calls);
    references.retain(|r| !visitor.ctes.contains(r.trim_matches('`')));

    FileAnalysis {
        destinations,
        references: references.into_iter().collect(),
        category,
    }
}

#[cfg(test)]
#[path = "analyzer_test.rs"]
mod tests;
