//! MySQL DDL parsing

mod column_parser;
mod constraint_parser;
mod data_types;
mod identifier_utils;
mod mysql_parser;
mod parsed;
mod preprocess_parser;
mod statement_parser;
mod table_parser;
mod token_parser_base;

pub use data_types::{map_data_type, DataType, TypeFamily, TypeMapping, FALLBACK_TYPE};
pub use mysql_parser::{parse_sources, parse_sql, parse_sql_with, ParseOptions, SqlSource};
pub use parsed::{
    ParseError, ParseResult, ParsedColumn, ParsedRelationship, ParsedTable, RelationshipOrigin,
    Severity,
};
pub use preprocess_parser::preprocess_sql;
pub use statement_parser::{classify_statement, split_definitions, split_statements, StatementKind};
